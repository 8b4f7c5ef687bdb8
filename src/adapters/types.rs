//! Records the data adapters return.
//!
//! Field names match the REST contract's JSON exactly, so a record fetched
//! over HTTP serializes back to the same payload.

use serde::{Deserialize, Serialize};

/// One line of an order.
///
/// `name` and `description` are filled when the backend joins product
/// metadata (the managed store does; REST services may not).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub quantity: i64,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub order_id: String,
    pub status: String,
    pub total: f64,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderItem>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundDetails {
    pub order_id: String,
    pub amount: f64,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
