//! Generic REST adapter.
//!
//! Any external database integration can plug in by serving:
//!
//! ```text
//! GET {base_url}/api/orders/{order_id}        -> OrderDetails
//! GET {base_url}/api/products/{product_id}    -> ProductDetails
//! GET {base_url}/api/refunds/order/{order_id} -> RefundDetails
//! ```
//!
//! All requests carry `Authorization: Bearer <api_key>`. A 404 or an empty
//! body means "not found". In fail-soft mode (the default) every other
//! failure is logged and reported as "not found" too, so a lookup never
//! breaks the conversation; with fail-soft off it propagates as an
//! [`AdapterError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::errors::AdapterError;
use super::types::{OrderDetails, ProductDetails, RefundDetails};
use super::DataAdapter;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct RestAdapter {
    http: HttpClient,
    base_url: Url,
    api_key: String,
    fail_soft: bool,
}

impl RestAdapter {
    /// Create an adapter for `base_url`. A trailing `/` is ignored.
    ///
    /// Fail-soft is on; see [`with_fail_soft`](Self::with_fail_soft).
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, AdapterError> {
        let parsed = Url::parse(base_url.trim()).map_err(|e| AdapterError::ConnectionFailed {
            target: base_url.to_string(),
            reason: format!("invalid base URL: {e}"),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(AdapterError::ConnectionFailed {
                target: base_url.to_string(),
                reason: "base URL cannot carry a path".to_string(),
            });
        }

        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AdapterError::ConnectionFailed {
                target: base_url.to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base_url: parsed,
            api_key: api_key.to_string(),
            fail_soft: true,
        })
    }

    pub fn with_fail_soft(mut self, fail_soft: bool) -> Self {
        self.fail_soft = fail_soft;
        self
    }

    /// `{base_url}/api/{segments...}`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    /// GET one record. `Ok(None)` for 404 or an empty/`null` body.
    async fn try_fetch<T: DeserializeOwned>(&self, url: &Url) -> Result<Option<T>, AdapterError> {
        let response = self
            .http
            .get(url.clone())
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| AdapterError::ConnectionFailed {
                target: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AdapterError::Unauthorized {
                reason: format!("{status} from {url}"),
            });
        }
        if !status.is_success() {
            return Err(AdapterError::HttpError {
                status: status.as_u16(),
                endpoint: url.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| AdapterError::ConnectionFailed {
            target: url.to_string(),
            reason: format!("failed to read body: {e}"),
        })?;
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(trimmed)?))
    }

    /// Apply the fail-soft policy to a lookup.
    async fn fetch<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<Option<T>, AdapterError> {
        let url = self.endpoint(segments);
        match self.try_fetch(&url).await {
            Ok(found) => Ok(found),
            Err(e) if self.fail_soft => {
                tracing::warn!(
                    url = %url,
                    error = %e,
                    "REST lookup failed, reporting record as not found"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl DataAdapter for RestAdapter {
    async fn fetch_order_info(&self, order_id: &str) -> Result<Option<OrderDetails>, AdapterError> {
        self.fetch(&["orders", order_id]).await
    }

    async fn fetch_product_info(
        &self,
        product_id: &str,
    ) -> Result<Option<ProductDetails>, AdapterError> {
        self.fetch(&["products", product_id]).await
    }

    async fn fetch_refund_info(
        &self,
        order_id: &str,
    ) -> Result<Option<RefundDetails>, AdapterError> {
        self.fetch(&["refunds", "order", order_id]).await
    }
}
