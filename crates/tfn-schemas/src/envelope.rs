//! Response envelope convention.
//!
//! Every JSON response carries `success: bool`; on failure a human-readable
//! `UImessage` (preferred) or `message` is meant for display. Non-2xx HTTP
//! status is failure regardless of the body, which is why `success` defaults
//! to `false` when absent.

use serde::Deserialize;

use crate::order::Order;

/// The bare envelope, also used to pull a display message out of error
/// bodies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "UImessage")]
    pub ui_message: Option<String>,
}

impl Envelope {
    /// Backend-provided display text: `UImessage` first, then `message`.
    pub fn display_message(&self) -> Option<&str> {
        self.ui_message.as_deref().or(self.message.as_deref())
    }
}

/// `GET /users/orders` and `GET /stores/orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrdersEnvelope {
    #[serde(flatten)]
    pub meta: Envelope,
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// `GET /orders/{id}` and `POST /orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderEnvelope {
    #[serde(flatten)]
    pub meta: Envelope,
    pub order: Option<Order>,
}
