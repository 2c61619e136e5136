pub mod collection;
pub mod domains;
pub mod uploads;
pub mod urls;
pub mod user;

pub use collection::{Collection, CollectionState, FetchOutcome, FetchTicket, Identified};
pub use domains::DomainStore;
pub use uploads::UploadStore;
pub use urls::UrlStore;
pub use user::UserState;
