use std::time::Duration;

use aip_core::{CatalogQuery, Product, ProductPage};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::CatalogError;
use crate::source::PageSource;

/// Success envelope returned by the storefront API.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Page source backed by the storefront HTTP API (`/api/v1/products`).
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: Client,
    base_url: String,
}

impl HttpCatalogSource {
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute http(s) URL, or [`CatalogError::Http`] if the client cannot
    /// be built.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, CatalogError> {
        let parsed = reqwest::Url::parse(base_url).map_err(|e| CatalogError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CatalogError::InvalidBaseUrl {
                base_url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("aip-catalog/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches one catalog page with its `has_more` flag as reported by the
    /// server.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on transport failure, a non-2xx status or a
    /// body that does not match the envelope.
    pub async fn fetch_product_page(
        &self,
        query: &CatalogQuery,
        page: u32,
    ) -> Result<ProductPage, CatalogError> {
        let url = format!("{}/api/v1/products", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&query_params(query, page))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }
        let body = response.text().await?;
        decode_envelope(&body, "product page")
    }

    /// Fetches the detail record for `name`, or `None` on 404.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on transport failure, any other non-2xx
    /// status or a body that does not match the envelope.
    pub async fn fetch_product(&self, name: &str) -> Result<Option<Product>, CatalogError> {
        let url = product_url(&self.base_url, name);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }
        let body = response.text().await?;
        decode_envelope(&body, "product detail").map(Some)
    }
}

impl PageSource for HttpCatalogSource {
    type Error = CatalogError;

    async fn fetch_page(&self, query: &CatalogQuery, page: u32) -> Result<Vec<Product>, CatalogError> {
        self.fetch_product_page(query, page).await.map(|p| p.items)
    }
}

fn decode_envelope<T: DeserializeOwned>(body: &str, context: &str) -> Result<T, CatalogError> {
    serde_json::from_str::<Envelope<T>>(body)
        .map(|envelope| envelope.data)
        .map_err(|source| CatalogError::Deserialize {
            context: context.to_string(),
            source,
        })
}

/// Only the constraining predicates are sent, so the server sees exactly
/// the query the feed evaluated.
fn query_params(query: &CatalogQuery, page: u32) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(6);
    if let Some(search) = &query.search {
        params.push(("search", search.clone()));
    }
    if let Some(min) = query.min_price {
        params.push(("min_price", min.to_string()));
    }
    if let Some(max) = query.max_price {
        params.push(("max_price", max.to_string()));
    }
    if let Some(size) = &query.size {
        params.push(("size", size.clone()));
    }
    if let Some(color) = &query.color {
        params.push(("color", color.clone()));
    }
    params.push(("page", page.to_string()));
    params
}

/// Product names are free text, so the path segment is fully encoded.
fn product_url(base_url: &str, name: &str) -> String {
    format!(
        "{base_url}/api/v1/products/{}",
        utf8_percent_encode(name, NON_ALPHANUMERIC)
    )
}
