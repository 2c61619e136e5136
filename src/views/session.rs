use tracing::info;

use crate::models::{Account, Credential};

use super::ViewContext;

/// Sign in, sign up and sign out
pub struct SessionView {
    ctx: ViewContext,
}

impl SessionView {
    pub fn new(ctx: ViewContext) -> Self {
        Self { ctx }
    }

    pub fn credential(&self) -> Credential {
        self.ctx.state.credentials.credential()
    }

    pub fn is_authenticated(&self) -> bool {
        self.ctx.state.is_authenticated()
    }

    /// Store `token` and confirm it with the backend. A rejected key is
    /// forgotten again
    pub async fn login(&self, token: &str) -> Option<Account> {
        let token = token.trim();
        if token.is_empty() {
            self.ctx.error("API key is required.");
            return None;
        }
        if !self.ctx.persisted(self.ctx.state.credentials.set_token(token)) {
            return None;
        }

        match self.ctx.client.account().await {
            Ok(account) => {
                self.remember(&account);
                info!("Signed in as '{}'", account.display_name);
                self.ctx
                    .success(format!("Signed in as {}", account.display_name));
                Some(account)
            }
            Err(e) => {
                self.forget();
                if e.is_unauthorized() {
                    self.ctx.error("Invalid API key.");
                } else if e.is_network() {
                    self.ctx
                        .error("Could not reach the server to verify your API key.");
                } else {
                    self.ctx.error("Failed to sign in.");
                }
                None
            }
        }
    }

    /// Create an account and sign in with its new key
    pub async fn create_account(&self, display_name: &str) -> Option<Account> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            self.ctx.error("Display name is required.");
            return None;
        }

        match self.ctx.client.create_account(display_name).await {
            Ok(account) => {
                if !self
                    .ctx
                    .persisted(self.ctx.state.credentials.set_token(&account.key))
                {
                    return None;
                }
                self.remember(&account);
                self.ctx.success(format!(
                    "Your API key is {}. Please save it somewhere safe.",
                    account.key
                ));
                Some(account)
            }
            Err(e) => {
                self.ctx.report(
                    &e,
                    "Error creating account.",
                    "Failed to create API key.",
                );
                None
            }
        }
    }

    pub fn logout(&self) {
        self.forget();
        self.ctx.success("Signed out.");
    }

    fn remember(&self, account: &Account) {
        let credentials = &self.ctx.state.credentials;
        let display_name = if account.display_name.is_empty() {
            credentials.credential().display_name
        } else {
            account.display_name.clone()
        };
        self.ctx
            .persisted(credentials.set_display_name(&display_name));
        if !account.domain.is_empty() {
            self.ctx.persisted(credentials.set_domain(&account.domain));
            self.ctx.state.domains.set_active(&account.domain);
        }
    }

    fn forget(&self) {
        self.ctx.persisted(self.ctx.state.credentials.clear());
        self.ctx.state.reset();
    }
}
