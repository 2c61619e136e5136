use tokio::sync::watch;

use crate::models::DomainSettings;

/// Active domain plus the eligible set
pub struct DomainStore {
    state: watch::Sender<DomainSettings>,
}

impl Default for DomainStore {
    fn default() -> Self {
        Self::new(DomainSettings::default())
    }
}

impl DomainStore {
    pub fn new(settings: DomainSettings) -> Self {
        let (state, _) = watch::channel(settings);
        Self { state }
    }

    pub fn settings(&self) -> DomainSettings {
        self.state.borrow().clone()
    }

    pub fn active(&self) -> String {
        self.state.borrow().active.clone()
    }

    pub fn eligible(&self) -> Vec<String> {
        self.state.borrow().eligible.clone()
    }

    pub fn can_select(&self, domain: &str) -> bool {
        self.state.borrow().is_eligible(domain)
    }

    pub fn subscribe(&self) -> watch::Receiver<DomainSettings> {
        self.state.subscribe()
    }

    pub fn set_eligible(&self, eligible: Vec<String>) {
        self.state.send_modify(|s| s.eligible = eligible);
    }

    /// Append a domain to the eligible set. Returns false if it was already there
    pub fn add_eligible(&self, domain: &str) -> bool {
        self.state.send_if_modified(|s| {
            if s.is_eligible(domain) {
                return false;
            }
            s.eligible.push(domain.to_string());
            true
        })
    }

    /// Record the active domain. Callers check eligibility first
    pub fn set_active(&self, domain: &str) {
        self.state.send_modify(|s| s.active = domain.to_string());
    }

    pub fn clear(&self) {
        self.state.send_replace(DomainSettings::default());
    }
}
