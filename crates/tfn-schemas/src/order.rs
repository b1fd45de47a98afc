//! Order wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::OrderStatus;

/// The two session roles the backend recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Store,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Store => "store",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of an order. Unit price is integer paise internally; the wire
/// carries rupees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item_name: String,
    pub quantity: u32,
    #[serde(with = "crate::money::paise_as_rupees")]
    pub price: i64,
}

/// A single customer purchase from one store.
///
/// `order_otp` is the one-time pickup code; the backend stops returning it
/// once the order is terminal, and the cache redacts it on terminal patches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i64,
    pub customer_id: i64,
    pub store_id: i64,
    #[serde(with = "crate::money::paise_as_rupees")]
    pub total_price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    pub order_status: OrderStatus,
    pub order_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_otp: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Sum of quantity × unit price over the line items, in paise.
    ///
    /// Equals `total_price` at creation time; the backend owns that
    /// invariant afterwards.
    pub fn items_total(&self) -> i64 {
        self.items
            .iter()
            .map(|i| i64::from(i.quantity) * i.price)
            .sum()
    }

    /// Kitchen-ticket one-liner: `"2x Masala Dosa, 1x Chai"`.
    pub fn items_summary(&self) -> String {
        self.items
            .iter()
            .map(|i| format!("{}x {}", i.quantity, i.item_name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Body for `POST /orders`. Items reference menu entries by id; the backend
/// prices them and returns the created order with its generated OTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderDraft {
    pub store_id: i64,
    pub payment_id: String,
    pub items: Vec<DraftItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftItem {
    pub menu_item_id: i64,
    pub quantity: u32,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
