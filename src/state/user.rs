use std::sync::Arc;

use crate::models::DomainSettings;
use crate::storage::CredentialStore;

use super::{DomainStore, UploadStore, UrlStore};

/// Every piece of client-side state a view can touch.
///
/// Built once by the caller and handed to each view, so ownership and
/// lifetime of the stores are explicit.
#[derive(Clone)]
pub struct UserState {
    pub credentials: Arc<CredentialStore>,
    pub uploads: Arc<UploadStore>,
    pub urls: Arc<UrlStore>,
    pub domains: Arc<DomainStore>,
}

impl UserState {
    pub fn new(credentials: Arc<CredentialStore>) -> Self {
        let credential = credentials.credential();
        let domains = DomainStore::new(DomainSettings {
            active: credential.domain,
            eligible: credentials.available_domains(),
        });

        Self {
            credentials,
            uploads: Arc::new(UploadStore::new()),
            urls: Arc::new(UrlStore::new()),
            domains: Arc::new(domains),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_authenticated()
    }

    /// Empty the entity stores. The credential is left alone
    pub fn reset(&self) {
        self.uploads.set(Vec::new());
        self.urls.set(Vec::new());
        self.domains.clear();
    }
}
