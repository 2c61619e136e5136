//! Screen-level controllers.
//!
//! Each view reads from the injected stores, calls the backend on a user
//! action, applies the result to the stores and reports the outcome through
//! the [`Notifier`]. Errors never propagate out of a view: they become
//! notifications and a `None`/`false` return.

pub mod account;
pub mod config;
pub mod domains;
pub mod image;
pub mod session;
pub mod upload;
pub mod uploads;
pub mod urls;

pub use account::AccountView;
pub use config::ConfigView;
pub use domains::DomainsView;
pub use image::ImageView;
pub use session::SessionView;
pub use upload::UploadView;
pub use uploads::UploadsView;
pub use urls::UrlsView;

use std::sync::Arc;
use tracing::warn;

use crate::api::{ApiClient, ApiError};
use crate::config::PollingConfig;
use crate::notify::{Notification, Notifier, SESSION_EXPIRED};
use crate::state::UserState;
use crate::storage::StorageResult;

/// Dependencies shared by every view
#[derive(Clone)]
pub struct ViewContext {
    pub client: ApiClient,
    pub state: UserState,
    pub notifier: Arc<dyn Notifier>,
    pub polling: PollingConfig,
}

impl ViewContext {
    pub fn new(
        client: ApiClient,
        state: UserState,
        notifier: Arc<dyn Notifier>,
        polling: PollingConfig,
    ) -> Self {
        Self {
            client,
            state,
            notifier,
            polling,
        }
    }

    pub(crate) fn success(&self, message: impl Into<String>) {
        self.notifier.notify(Notification::success(message));
    }

    pub(crate) fn error(&self, message: impl Into<String>) {
        self.notifier.notify(Notification::error(message));
    }

    /// Report a failed call. A rejected key drops the local session view;
    /// transport failures and HTTP failures get their own messages
    pub(crate) fn report(&self, err: &ApiError, network_message: &str, failure_message: &str) {
        warn!("{}: {}", failure_message, err);
        if err.is_unauthorized() {
            self.state.reset();
            self.error(SESSION_EXPIRED);
        } else if err.is_network() {
            self.error(network_message);
        } else {
            self.error(failure_message);
        }
    }

    /// Surface a failed credential write. Returns whether it succeeded
    pub(crate) fn persisted(&self, result: StorageResult<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to persist session: {}", e);
                self.error(format!("Could not save your session: {e}"));
                false
            }
        }
    }
}
