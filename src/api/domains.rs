use reqwest::Method;

use crate::api::{ApiClient, ApiResult};
use crate::models::DomainList;

impl ApiClient {
    /// Public domains plus the account's private ones
    pub async fn domains(&self) -> ApiResult<Vec<String>> {
        let url = self.endpoint(&["api", "domains"]);
        let list: DomainList = self.dispatch_json(self.authed(Method::GET, url)?).await?;
        Ok(list.domains)
    }

    /// Register a custom domain, optionally offering it to every account
    pub async fn add_domain(&self, identifier: &str, public: bool) -> ApiResult<()> {
        let mut url = self.endpoint(&["api", "domains"]);
        url.query_pairs_mut()
            .append_pair("i", identifier)
            .append_pair("p", if public { "true" } else { "false" });
        self.dispatch(self.authed(Method::PUT, url)?).await?;
        Ok(())
    }
}
