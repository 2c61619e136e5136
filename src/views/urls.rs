use chrono::Utc;
use std::sync::Arc;

use crate::api::ApiError;
use crate::models::{validate_target, ShortUrl};
use crate::sync::{PollPolicy, Poller};

use super::ViewContext;

pub const SLUG_TAKEN: &str = "Slug is already taken. Please enter a new slug.";

/// Shortened URL management
pub struct UrlsView {
    ctx: ViewContext,
}

impl UrlsView {
    pub fn new(ctx: ViewContext) -> Self {
        Self { ctx }
    }

    pub fn urls(&self) -> Vec<ShortUrl> {
        self.ctx.state.urls.snapshot()
    }

    pub fn start_polling(&self) -> Poller {
        Poller::spawn(
            Arc::new(self.ctx.client.clone()),
            Arc::clone(&self.ctx.state.urls),
            Arc::clone(&self.ctx.notifier),
            PollPolicy::from_config("URLs", &self.ctx.polling),
        )
    }

    /// Link to share for `slug` on the account's active domain
    pub fn public_link(&self, slug: &str) -> Option<String> {
        let domain = self.ctx.state.credentials.credential().domain;
        self.ctx
            .state
            .urls
            .get(slug)
            .map(|url| url.public_link(&domain))
    }

    /// Shorten `target`. Targets without an http(s) scheme never reach the backend
    pub async fn create(&self, target: &str) -> Option<ShortUrl> {
        let target = target.trim();
        if let Err(e) = validate_target(target) {
            self.ctx.error(e.to_string());
            return None;
        }

        match self.ctx.client.create_url(target).await {
            Ok(created) => {
                let url = ShortUrl {
                    key: self.ctx.state.credentials.token(),
                    url: created.url,
                    created_at: Utc::now().to_rfc3339(),
                    ip: String::new(),
                    slug: created.slug,
                    clicks: 0,
                };
                self.ctx.state.urls.add(url.clone());
                self.ctx.success("URL created successfully!");
                Some(url)
            }
            Err(e) => {
                self.ctx
                    .report(&e, "Error creating URL.", "Failed to create URL.");
                None
            }
        }
    }

    /// Rename a slug. Empty or unchanged slugs are ignored
    pub async fn rename(&self, slug: &str, new_slug: &str) -> bool {
        let new_slug = new_slug.trim();
        if new_slug.is_empty() || new_slug == slug {
            return false;
        }

        match self.ctx.client.rename_slug(slug, new_slug).await {
            Ok(()) => {
                self.ctx.state.urls.update_slug(slug, new_slug);
                self.ctx.success("Slug updated successfully!");
                true
            }
            Err(ApiError::Conflict { .. }) => {
                self.ctx.error(SLUG_TAKEN);
                false
            }
            Err(e) => {
                self.ctx
                    .report(&e, "Error updating slug.", "Error updating slug.");
                false
            }
        }
    }

    pub async fn delete(&self, slug: &str) -> bool {
        match self.ctx.client.delete_url(slug).await {
            Ok(()) => {
                self.ctx.state.urls.remove(slug);
                self.ctx.success("URL deleted successfully!");
                true
            }
            Err(e) => {
                let failure = format!(
                    "Failed to delete URL: {}",
                    e.server_message().unwrap_or("Unknown error")
                );
                self.ctx.report(&e, "Error deleting URL", &failure);
                false
            }
        }
    }
}
