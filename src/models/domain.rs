use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DomainList {
    #[serde(default)]
    pub domains: Vec<String>,
}

/// Active domain plus the domains the account may select
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSettings {
    pub active: String,
    pub eligible: Vec<String>,
}

impl DomainSettings {
    pub fn is_eligible(&self, domain: &str) -> bool {
        self.eligible.iter().any(|d| d == domain)
    }
}
