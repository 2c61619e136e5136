use super::ViewContext;

/// Active domain selection and custom domains
pub struct DomainsView {
    ctx: ViewContext,
}

impl DomainsView {
    pub fn new(ctx: ViewContext) -> Self {
        Self { ctx }
    }

    pub fn active(&self) -> String {
        self.ctx.state.domains.active()
    }

    pub fn eligible(&self) -> Vec<String> {
        self.ctx.state.domains.eligible()
    }

    /// Reload the eligible set from the server
    pub async fn refresh(&self) -> Option<Vec<String>> {
        match self.ctx.client.domains().await {
            Ok(domains) => {
                self.ctx
                    .persisted(self.ctx.state.credentials.set_available_domains(&domains));
                self.ctx.state.domains.set_eligible(domains.clone());
                Some(domains)
            }
            Err(e) => {
                self.ctx
                    .report(&e, "Error fetching domains", "Failed to fetch domains");
                None
            }
        }
    }

    /// Switch the active domain. Only eligible domains are sent to the server
    pub async fn select(&self, domain: &str) -> bool {
        if !self.ctx.state.domains.can_select(domain) {
            self.ctx
                .error(format!("{domain} is not available for this account."));
            return false;
        }

        match self.ctx.client.set_domain(domain).await {
            Ok(()) => {
                self.ctx
                    .persisted(self.ctx.state.credentials.set_domain(domain));
                self.ctx.state.domains.set_active(domain);
                self.ctx.success("Domain updated successfully");
                true
            }
            Err(e) => {
                self.ctx
                    .report(&e, "Error updating domain", "Failed to update domain");
                false
            }
        }
    }

    /// Register a custom domain; it joins the eligible set once acknowledged
    pub async fn add(&self, identifier: &str, public: bool) -> bool {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            self.ctx.error("Domain cannot be empty.");
            return false;
        }

        match self.ctx.client.add_domain(identifier, public).await {
            Ok(()) => {
                self.ctx.state.domains.add_eligible(identifier);
                let eligible = self.ctx.state.domains.eligible();
                self.ctx
                    .persisted(self.ctx.state.credentials.set_available_domains(&eligible));
                self.ctx.success("Domain added successfully");
                true
            }
            Err(e) => {
                self.ctx
                    .report(&e, "Error adding domain", "Failed to add domain");
                false
            }
        }
    }
}
