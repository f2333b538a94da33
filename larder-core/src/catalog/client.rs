//! HTTP implementation of the catalog boundary.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use super::record::{MealPreview, MealRecord, MealsEnvelope};
use super::Catalog;
use crate::error::CatalogError;

pub const DEFAULT_CATALOG_URL: &str = "https://www.themealdb.com/api/json/v1/1";

/// Configuration for HttpCatalog.
#[derive(Clone, Debug)]
pub struct CatalogClientBuilder {
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl Default for CatalogClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Environment variables:
    /// - `LARDER_CATALOG_URL`: catalog API base URL
    /// - `LARDER_HTTP_TIMEOUT_SECS`: per-request timeout (default 15)
    pub fn new() -> Self {
        let base_url =
            std::env::var("LARDER_CATALOG_URL").unwrap_or_else(|_| DEFAULT_CATALOG_URL.to_string());

        let timeout_secs = std::env::var("LARDER_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(15);

        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            user_agent: concat!("larder/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Set the catalog base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Build the HttpCatalog.
    pub fn build(self) -> Result<HttpCatalog, CatalogError> {
        let base_url = Url::parse(self.base_url.trim_end_matches('/'))
            .map_err(|e| CatalogError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()?;

        Ok(HttpCatalog { client, base_url })
    }
}

/// Catalog client speaking the `{"meals": [...]}` JSON API.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpCatalog {
    /// Create a client with default configuration.
    pub fn new() -> Result<Self, CatalogError> {
        CatalogClientBuilder::new().build()
    }

    /// Get a builder for custom configuration.
    pub fn builder() -> CatalogClientBuilder {
        CatalogClientBuilder::new()
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, CatalogError> {
        let raw = format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse_with_params(&raw, query).map_err(|e| CatalogError::InvalidUrl(e.to_string()))
    }

    async fn get_meals<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, CatalogError> {
        tracing::debug!(url = %url, "catalog: fetching");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(CatalogError::from_send)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            tracing::debug!(url = %url, ?retry_after_secs, "catalog: rate limited");
            return Err(CatalogError::RateLimited { retry_after_secs });
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(url = %url, status = %status, "catalog: request failed");
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        // Some endpoints answer an unknown id with an empty body
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let envelope: MealsEnvelope<T> = serde_json::from_str(&body)
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
        Ok(envelope.into_meals())
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn search(&self, query: &str) -> Result<Vec<MealRecord>, CatalogError> {
        let url = self.endpoint("search.php", &[("s", query)])?;
        self.get_meals(url).await
    }

    async fn list_category(&self, category: &str) -> Result<Vec<MealPreview>, CatalogError> {
        let url = self.endpoint("filter.php", &[("c", category)])?;
        self.get_meals(url).await
    }

    async fn lookup(&self, id: &str) -> Result<Option<MealRecord>, CatalogError> {
        let url = self.endpoint("lookup.php", &[("i", id)])?;
        Ok(self.get_meals(url).await?.into_iter().next())
    }

    async fn random(&self) -> Result<Option<MealRecord>, CatalogError> {
        let url = self.endpoint("random.php", &[])?;
        Ok(self.get_meals(url).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_query() {
        let catalog = HttpCatalog::builder()
            .base_url("https://catalog.example/api/")
            .build()
            .unwrap();
        let url = catalog.endpoint("search.php", &[("s", "mac & cheese")]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://catalog.example/api/search.php?s=mac+%26+cheese"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpCatalog::builder().base_url("not a url").build();
        assert!(matches!(result, Err(CatalogError::InvalidUrl(_))));
    }
}
