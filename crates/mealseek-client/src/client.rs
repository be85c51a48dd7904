//! HTTP client for the restaurant search backend.
//!
//! Wraps `reqwest` with backend-specific error handling and typed response
//! deserialization. There is no retry here: a failed request
//! surfaces once and the user decides whether to try again.

use std::time::Duration;

use mealseek_core::pagination::start_index;
use mealseek_core::{AppConfig, SearchCriteria, Shop, PAGE_SIZE};
use reqwest::{Client, StatusCode, Url};

use crate::error::ClientError;
use crate::types::{SearchPage, SearchRequest, SearchResponse, ShopResponse};

/// Client for the search backend's `/hp` endpoints.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    base_url: Url,
}

impl SearchClient {
    /// Creates a client rooted at `base_url` (e.g. `http://localhost:5174/api`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute hierarchical URL.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise: exactly one trailing slash so endpoint paths are appended
        // below the base path instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "URL cannot carry a path".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Creates a client from the loaded application configuration.
    ///
    /// # Errors
    ///
    /// Same as [`SearchClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::new(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// Fetches one page of restaurants matching `criteria`.
    ///
    /// Sends `start = (page - 1) * PAGE_SIZE + 1` and `count = PAGE_SIZE`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Api`] on a non-2xx status.
    /// - [`ClientError::Deserialize`] if the body is not the expected JSON.
    /// - [`ClientError::MissingShops`] if the body has no `shops` array.
    pub async fn search(
        &self,
        criteria: &SearchCriteria,
        page: u32,
    ) -> Result<SearchPage, ClientError> {
        let url = self.endpoint(&["hp", "search"])?;
        let body = SearchRequest {
            criteria,
            start: start_index(page, PAGE_SIZE),
            count: PAGE_SIZE,
        };
        tracing::debug!(%url, page, start = body.start, count = body.count, "search request");

        let response = self.client.post(url.clone()).json(&body).send().await?;
        let text = Self::success_body(&url, response).await?;

        let parsed: SearchResponse =
            serde_json::from_str(&text).map_err(|e| ClientError::Deserialize {
                context: format!("search(page={page})"),
                source: e,
            })?;
        let shops = parsed.shops.ok_or_else(|| ClientError::MissingShops {
            url: url.to_string(),
        })?;

        Ok(SearchPage {
            shops,
            total_results: parsed.results_available,
            results_returned: parsed.results_returned,
            results_start: parsed.results_start,
        })
    }

    /// Fetches a single restaurant by id.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotFound`] on HTTP 404 or when the backend returns a
    ///   different shop than the one asked for.
    /// - [`ClientError::Http`], [`ClientError::Api`], [`ClientError::Deserialize`]
    ///   as for [`SearchClient::search`].
    pub async fn get_shop(&self, shop_id: &str) -> Result<Shop, ClientError> {
        let url = self.endpoint(&["hp", "shops", shop_id])?;
        tracing::debug!(%url, shop_id, "shop detail request");

        let response = self.client.get(url.clone()).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                shop_id: shop_id.to_owned(),
            });
        }
        let text = Self::success_body(&url, response).await?;

        let parsed: ShopResponse =
            serde_json::from_str(&text).map_err(|e| ClientError::Deserialize {
                context: format!("shop(id={shop_id})"),
                source: e,
            })?;
        if parsed.shop.id != shop_id {
            tracing::warn!(
                requested = shop_id,
                returned = %parsed.shop.id,
                "shop detail id mismatch"
            );
            return Err(ClientError::NotFound {
                shop_id: shop_id.to_owned(),
            });
        }
        Ok(parsed.shop)
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: "URL cannot carry a path".to_owned(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Returns the body text of a 2xx response, or [`ClientError::Api`] with
    /// the backend's `error`/`message` field when the status is not 2xx.
    async fn success_body(url: &Url, response: reqwest::Response) -> Result<String, ClientError> {
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            return Ok(text);
        }

        let message = extract_error_message(&text);
        tracing::warn!(%url, status = status.as_u16(), message = ?message, "backend returned error status");
        Err(ClientError::Api {
            status: status.as_u16(),
            url: url.to_string(),
            message,
        })
    }
}

/// Pulls a human-readable message out of an error body such as
/// `{"error": "..."}` or `{"message": "..."}`.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .filter(|msg| !msg.trim().is_empty())
        .map(str::to_owned)
}
