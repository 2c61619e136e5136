use reqwest::Method;

use crate::api::{ApiClient, ApiResult};
use crate::models::{CreateUrlRequest, CreatedUrl, RenameSlugRequest, ShortUrl, UrlList};

impl ApiClient {
    pub async fn urls(&self) -> ApiResult<Vec<ShortUrl>> {
        let url = self.endpoint(&["api", "urls"]);
        let list: UrlList = self.dispatch_json(self.authed(Method::GET, url)?).await?;
        Ok(list.urls)
    }

    pub async fn create_url(&self, target: &str) -> ApiResult<CreatedUrl> {
        let url = self.endpoint(&["api", "url"]);
        let request = self
            .authed(Method::POST, url)?
            .json(&CreateUrlRequest { url: target });
        self.dispatch_json(request).await
    }

    /// Rename a slug. A taken slug fails with `ApiError::Conflict`
    pub async fn rename_slug(&self, slug: &str, new_slug: &str) -> ApiResult<()> {
        let url = self.endpoint(&["api", "url", slug]);
        let request = self
            .authed(Method::PUT, url)?
            .json(&RenameSlugRequest { new_slug });
        self.dispatch(request).await?;
        Ok(())
    }

    pub async fn delete_url(&self, slug: &str) -> ApiResult<()> {
        let url = self.endpoint(&["api", "delete-url", slug]);
        self.dispatch(self.authed(Method::DELETE, url)?).await?;
        Ok(())
    }
}
