//! Push-event payloads for the watch endpoints.

use serde::{Deserialize, Serialize};

use crate::order::Order;
use crate::status::OrderStatus;

/// Payload pushed on `GET /orders/{id}/watch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEvent {
    pub status: OrderStatus,
}

/// Payload pushed on `GET /stores/orders/watch`, discriminated by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    #[serde(rename = "NEW_ORDER")]
    NewOrder { order: Order },
    #[serde(rename = "ORDER_UPDATE")]
    OrderUpdate {
        order_id: i64,
        order_status: OrderStatus,
    },
}
