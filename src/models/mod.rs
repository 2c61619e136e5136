pub mod account;
pub mod domain;
pub mod image;
pub mod sharex;
pub mod upload;
pub mod url;

pub use account::{Account, Credential, DisplayNameRequest, StatusMessage, TokenResponse};
pub use domain::{DomainList, DomainSettings};
pub use image::ImageInfo;
pub use sharex::{ConfigKind, GeneratedConfig, SharexConfig};
pub use upload::{file_stem, format_file_size, Upload, UploadList, UploadMetadata, UploadReceipt};
pub use url::{
    validate_target, CreateUrlRequest, CreatedUrl, RenameSlugRequest, ShortUrl, UrlList,
    UrlValidationError,
};
