use reqwest::Method;
use tracing::info;

use crate::api::{ApiClient, ApiResult};
use crate::models::{Account, DisplayNameRequest, TokenResponse};

impl ApiClient {
    /// Fetch the account behind the stored key. Doubles as key validation
    pub async fn account(&self) -> ApiResult<Account> {
        let url = self.endpoint(&["api", "account"]);
        self.dispatch_json(self.authed(Method::GET, url)?).await
    }

    /// Create a new account. The returned record carries the new API key
    pub async fn create_account(&self, display_name: &str) -> ApiResult<Account> {
        let url = self.endpoint(&["api", "account"]);
        let request = self
            .public(Method::POST, url)
            .json(&DisplayNameRequest { display_name });
        let account: Account = self.dispatch_json(request).await?;
        info!("Created account '{}'", account.display_name);
        Ok(account)
    }

    pub async fn update_display_name(&self, display_name: &str) -> ApiResult<()> {
        let url = self.endpoint(&["api", "account", "name"]);
        let request = self
            .authed(Method::PUT, url)?
            .json(&DisplayNameRequest { display_name });
        self.dispatch(request).await?;
        Ok(())
    }

    /// Issue a new API key. The old one stops working immediately
    pub async fn regenerate_token(&self) -> ApiResult<String> {
        let url = self.endpoint(&["api", "account", "token"]);
        let response: TokenResponse = self.dispatch_json(self.authed(Method::PUT, url)?).await?;
        Ok(response.key)
    }

    pub async fn set_domain(&self, domain: &str) -> ApiResult<()> {
        let mut url = self.endpoint(&["api", "account", "domain"]);
        url.query_pairs_mut().append_pair("value", domain);
        self.dispatch(self.authed(Method::PUT, url)?).await?;
        Ok(())
    }

    pub async fn delete_account(&self) -> ApiResult<()> {
        let url = self.endpoint(&["api", "account", "delete"]);
        self.dispatch(self.authed(Method::PUT, url)?).await?;
        Ok(())
    }
}
