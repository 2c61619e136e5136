pub mod credentials;
pub mod file;
pub mod memory;
pub mod trait_def;

pub use credentials::CredentialStore;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use trait_def::{KeyValueStore, StorageError, StorageResult};
