use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::models::Credential;
use crate::storage::{KeyValueStore, StorageResult};

const TOKEN_KEY: &str = "api_key";
const DISPLAY_NAME_KEY: &str = "display_name";
const DOMAIN_KEY: &str = "domain";
const AVAILABLE_DOMAINS_KEY: &str = "available_domains";

/// Write-through session store.
///
/// Every setter writes the durable backend first and only then publishes the
/// new value in memory. A failed write leaves the in-memory value untouched.
pub struct CredentialStore {
    backend: Arc<dyn KeyValueStore>,
    state: watch::Sender<Credential>,
    available_domains: watch::Sender<Vec<String>>,
}

impl CredentialStore {
    /// Load the persisted credential from `backend`
    pub fn load(backend: Arc<dyn KeyValueStore>) -> StorageResult<Self> {
        let credential = Credential {
            token: backend.get(TOKEN_KEY)?.unwrap_or_default(),
            display_name: backend.get(DISPLAY_NAME_KEY)?.unwrap_or_default(),
            domain: backend.get(DOMAIN_KEY)?.unwrap_or_default(),
        };
        let available_domains = backend
            .get(AVAILABLE_DOMAINS_KEY)?
            .map(|joined| split_domains(&joined))
            .unwrap_or_default();

        if credential.is_authenticated() {
            debug!("Loaded stored credential for '{}'", credential.display_name);
        }

        let (state, _) = watch::channel(credential);
        let (available_domains, _) = watch::channel(available_domains);

        Ok(Self {
            backend,
            state,
            available_domains,
        })
    }

    pub fn credential(&self) -> Credential {
        self.state.borrow().clone()
    }

    pub fn token(&self) -> String {
        self.state.borrow().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Observe in-memory credential changes
    pub fn subscribe(&self) -> watch::Receiver<Credential> {
        self.state.subscribe()
    }

    pub fn set_token(&self, token: &str) -> StorageResult<()> {
        self.backend.set(TOKEN_KEY, token)?;
        self.state.send_modify(|c| c.token = token.to_string());
        Ok(())
    }

    pub fn set_display_name(&self, name: &str) -> StorageResult<()> {
        self.backend.set(DISPLAY_NAME_KEY, name)?;
        self.state.send_modify(|c| c.display_name = name.to_string());
        Ok(())
    }

    pub fn set_domain(&self, domain: &str) -> StorageResult<()> {
        self.backend.set(DOMAIN_KEY, domain)?;
        self.state.send_modify(|c| c.domain = domain.to_string());
        Ok(())
    }

    pub fn available_domains(&self) -> Vec<String> {
        self.available_domains.borrow().clone()
    }

    pub fn set_available_domains(&self, domains: &[String]) -> StorageResult<()> {
        self.backend.set(AVAILABLE_DOMAINS_KEY, &domains.join(","))?;
        self.available_domains.send_replace(domains.to_vec());
        Ok(())
    }

    /// Forget the session locally. Server-side account state is untouched.
    ///
    /// Keys are removed one at a time, token first, and memory follows each
    /// successful removal. If a removal fails, the keys already removed stay
    /// cleared in memory too, so a partial failure still signs out.
    pub fn clear(&self) -> StorageResult<()> {
        self.backend.remove(TOKEN_KEY)?;
        self.state.send_modify(|credential| credential.token.clear());

        self.backend.remove(DISPLAY_NAME_KEY)?;
        self.state
            .send_modify(|credential| credential.display_name.clear());

        self.backend.remove(DOMAIN_KEY)?;
        self.state.send_modify(|credential| credential.domain.clear());

        self.backend.remove(AVAILABLE_DOMAINS_KEY)?;
        self.available_domains.send_replace(Vec::new());

        info!("Cleared stored credential");
        Ok(())
    }
}

fn split_domains(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}
