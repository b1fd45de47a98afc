//! The backend seam.
//!
//! `OrderBackend` is the only surface the dispatcher talks to; scenario
//! tests substitute an in-memory implementation, production wires in
//! [`RestBackend`].

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use tfn_lifecycle::OrderAction;
use tfn_schemas::{CreateOrderDraft, Envelope, Order, OrderEnvelope, OrdersEnvelope, Role};

use crate::client::ApiClient;
use crate::endpoints;
use crate::error::ApiError;

/// Async transport to the ordering backend.
#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// Fetch the full order list for the session's role.
    async fn fetch_orders(&self, role: Role) -> Result<Vec<Order>, ApiError>;

    /// Fetch one order with full detail.
    async fn fetch_order(&self, order_id: i64) -> Result<Order, ApiError>;

    /// Place a new order; the response carries the generated pickup code.
    async fn create_order(&self, draft: &CreateOrderDraft) -> Result<Order, ApiError>;

    /// Execute a status transition. `code` is the one-time pickup code and
    /// is consulted only for [`OrderAction::Verify`]; the dispatcher
    /// validates its shape before this is called.
    async fn transition(
        &self,
        order_id: i64,
        action: OrderAction,
        code: Option<&str>,
    ) -> Result<(), ApiError>;
}

/// reqwest-backed [`OrderBackend`].
pub struct RestBackend {
    client: ApiClient,
}

impl RestBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl OrderBackend for RestBackend {
    async fn fetch_orders(&self, role: Role) -> Result<Vec<Order>, ApiError> {
        let path = match role {
            Role::Customer => endpoints::user_orders(),
            Role::Store => endpoints::store_orders(),
        };
        let resp: OrdersEnvelope = self.client.send_json(Method::GET, path, None).await?;
        Ok(resp.orders)
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Order, ApiError> {
        let resp: OrderEnvelope = self
            .client
            .send_json(Method::GET, &endpoints::order_detail(order_id), None)
            .await?;
        resp.order
            .ok_or_else(|| ApiError::Decode("order detail response without order".to_string()))
    }

    async fn create_order(&self, draft: &CreateOrderDraft) -> Result<Order, ApiError> {
        let body = serde_json::to_value(draft).map_err(|e| ApiError::Decode(e.to_string()))?;
        let resp: OrderEnvelope = self
            .client
            .send_json(Method::POST, endpoints::create_order(), Some(&body))
            .await?;
        resp.order
            .ok_or_else(|| ApiError::Decode("create response without order".to_string()))
    }

    async fn transition(
        &self,
        order_id: i64,
        action: OrderAction,
        code: Option<&str>,
    ) -> Result<(), ApiError> {
        let empty = json!({});
        let (method, path, body) = match action {
            OrderAction::Confirm => (Method::PATCH, endpoints::confirm(order_id), empty),
            OrderAction::Prepare => (Method::PATCH, endpoints::prepare(order_id), empty),
            OrderAction::Ready => (Method::PATCH, endpoints::ready(order_id), empty),
            OrderAction::Verify => (
                Method::POST,
                endpoints::verify(order_id),
                json!({ "order_otp": code.unwrap_or_default() }),
            ),
            OrderAction::Complete => (Method::PATCH, endpoints::complete(order_id), empty),
            OrderAction::Cancel => (Method::PATCH, endpoints::cancel(order_id), empty),
        };
        let _resp: Envelope = self.client.send_json(method, &path, Some(&body)).await?;
        Ok(())
    }
}
