//! Data adapters: uniform read access to order, product and refund records.
//!
//! Submodules:
//! - `sqlite`: managed store queried directly (orders joined with items and
//!   product metadata)
//! - `rest`: any service implementing the `/api/...` contract over HTTP
//! - `types`: the records both backends return
//! - `errors`: connectivity/auth failures
//!
//! Which backend runs is a deployment choice (`adapter.backend` in the
//! config); the orchestrator only ever sees `Arc<dyn DataAdapter>`.

pub mod errors;
pub mod rest;
pub mod sqlite;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::AdapterConfig;

pub use errors::AdapterError;
pub use rest::RestAdapter;
pub use sqlite::SqliteAdapter;
pub use types::{OrderDetails, OrderItem, ProductDetails, RefundDetails};

/// Read-only lookups the model can ask for.
///
/// `Ok(None)` means the record does not exist. `Err` is reserved for a
/// backend that could not be reached or refused the credential.
#[async_trait]
pub trait DataAdapter: Send + Sync {
    async fn fetch_order_info(&self, order_id: &str) -> Result<Option<OrderDetails>, AdapterError>;

    async fn fetch_product_info(
        &self,
        product_id: &str,
    ) -> Result<Option<ProductDetails>, AdapterError>;

    /// Refund attached to an order.
    async fn fetch_refund_info(&self, order_id: &str)
        -> Result<Option<RefundDetails>, AdapterError>;
}

/// Build the adapter the deployment config selects.
pub fn build_adapter(config: &AdapterConfig) -> Result<Arc<dyn DataAdapter>, AdapterError> {
    match config {
        AdapterConfig::Sqlite { path } => {
            tracing::info!(path = %path, "using managed-store adapter");
            Ok(Arc::new(SqliteAdapter::open(path)?))
        }
        AdapterConfig::Rest {
            base_url,
            api_key,
            fail_soft,
        } => {
            tracing::info!(base_url = %base_url, fail_soft, "using REST adapter");
            Ok(Arc::new(
                RestAdapter::new(base_url, api_key)?.with_fail_soft(*fail_soft),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_sqlite_adapter_from_default_config() {
        let adapter = build_adapter(&AdapterConfig::default()).unwrap();
        assert!(adapter.fetch_order_info("missing").await.unwrap().is_none());
    }

    #[test]
    fn test_build_rest_adapter() {
        let config = AdapterConfig::Rest {
            base_url: "http://127.0.0.1:9".into(),
            api_key: "k".into(),
            fail_soft: false,
        };
        assert!(build_adapter(&config).is_ok());
    }
}
