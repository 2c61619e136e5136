use super::ViewContext;

/// Account settings
pub struct AccountView {
    ctx: ViewContext,
}

impl AccountView {
    pub fn new(ctx: ViewContext) -> Self {
        Self { ctx }
    }

    pub async fn update_display_name(&self, display_name: &str) -> bool {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            self.ctx.error("Display name cannot be empty.");
            return false;
        }

        match self.ctx.client.update_display_name(display_name).await {
            Ok(()) => {
                self.ctx
                    .persisted(self.ctx.state.credentials.set_display_name(display_name));
                self.ctx.success("Display name updated successfully");
                true
            }
            Err(e) => {
                self.ctx.report(
                    &e,
                    "Failed to update display name",
                    "Failed to update display name",
                );
                false
            }
        }
    }

    /// Replace the API key; the stored credential follows
    pub async fn regenerate_token(&self) -> Option<String> {
        match self.ctx.client.regenerate_token().await {
            Ok(token) => {
                if !self.ctx.persisted(self.ctx.state.credentials.set_token(&token)) {
                    return None;
                }
                self.ctx.success("Token regenerated successfully.");
                Some(token)
            }
            Err(e) => {
                self.ctx.report(
                    &e,
                    "Failed to regenerate token",
                    "Failed to regenerate token",
                );
                None
            }
        }
    }

    /// Delete the account server-side, then drop all local state
    pub async fn delete_account(&self) -> bool {
        match self.ctx.client.delete_account().await {
            Ok(()) => {
                self.ctx.persisted(self.ctx.state.credentials.clear());
                self.ctx.state.reset();
                self.ctx.success("Account deleted successfully.");
                true
            }
            Err(e) => {
                self.ctx
                    .report(&e, "Failed to delete account", "Failed to delete account");
                false
            }
        }
    }
}
