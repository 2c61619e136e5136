pub mod account;
pub mod client;
pub mod domains;
pub mod error;
pub mod image;
pub mod sharex;
pub mod uploads;
pub mod urls;

pub use client::{ApiClient, API_KEY_HEADER};
pub use error::{ApiError, ApiResult};
pub use uploads::UPLOAD_FIELD;
