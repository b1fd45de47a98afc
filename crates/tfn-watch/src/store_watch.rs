//! Per-store inbound-order subscription.

use std::ops::ControlFlow;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use tfn_api::{endpoints, ApiClient};
use tfn_schemas::{Order, OrderStatus, StoreEvent};

use crate::connection::ConnectionStatus;
use crate::reader::{FeedState, Reader};

/// Receives the store feed's pushes. Callbacks run serially on the reader
/// task: one at a time, in delivery order, never after teardown.
pub trait OrderFeedHandler: Send + Sync + 'static {
    /// A brand-new order landed for this store.
    fn on_new_order(&self, order: Order);
    /// An existing order changed status (possibly from another device).
    fn on_order_update(&self, order_id: i64, status: OrderStatus);
}

/// Live feed of a store's inbound orders, fed by `GET /stores/orders/watch`.
///
/// Unlike [`OrderWatch`][`crate::OrderWatch`] this stream has no terminal
/// event; it runs until `close()` or handle drop.
pub struct StoreWatch {
    subscription_id: Uuid,
    feed_rx: watch::Receiver<FeedState>,
    shutdown_tx: watch::Sender<bool>,
}

impl StoreWatch {
    pub fn open<H: OrderFeedHandler>(client: &ApiClient, handler: H) -> Self {
        let subscription_id = Uuid::new_v4();
        let (feed_tx, feed_rx) = watch::channel(FeedState::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let reader = Reader {
            http: client.http().clone(),
            url: client.config().url(endpoints::store_watch()),
            subscription_id,
            kind: "store",
        };

        tokio::spawn(async move {
            reader
                .run(feed_tx, shutdown_rx, move |payload| {
                    match serde_json::from_str::<StoreEvent>(payload) {
                        Ok(StoreEvent::NewOrder { order }) => {
                            debug!(order_id = order.order_id, "new order pushed");
                            handler.on_new_order(order);
                        }
                        Ok(StoreEvent::OrderUpdate {
                            order_id,
                            order_status,
                        }) => {
                            debug!(order_id, status = %order_status, "order update pushed");
                            handler.on_order_update(order_id, order_status);
                        }
                        Err(err) => {
                            warn!(error = %err, "malformed store event dropped");
                        }
                    }
                    ControlFlow::Continue(())
                })
                .await;
        });

        Self {
            subscription_id,
            feed_rx,
            shutdown_tx,
        }
    }

    pub fn subscription_id(&self) -> Uuid {
        self.subscription_id
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.feed_rx.borrow().connection
    }

    pub fn is_connected(&self) -> bool {
        self.connection().is_connected()
    }

    pub fn last_event_at(&self) -> Option<DateTime<Utc>> {
        self.feed_rx.borrow().last_event_at
    }

    /// True once the reader task has ended.
    pub fn is_closed(&self) -> bool {
        self.feed_rx.borrow().closed
    }

    /// Tear the subscription down. Idempotent; dropping the handle has the
    /// same effect.
    pub fn close(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}
