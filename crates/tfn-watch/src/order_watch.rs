//! Per-order status subscription.

use std::ops::ControlFlow;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use tfn_api::{endpoints, ApiClient};
use tfn_schemas::{OrderStatus, StatusEvent};

use crate::connection::ConnectionStatus;
use crate::reader::{FeedState, Reader};

/// Live view of one order's status, fed by `GET /orders/{id}/watch`.
///
/// Holds `initial_status` until the first push arrives. Once a terminal
/// status is processed the connection is closed for good; no further
/// events are expected for a finished order. `close()` or dropping the
/// handle tears the subscription down at any time.
pub struct OrderWatch {
    subscription_id: Uuid,
    order_id: i64,
    status_rx: watch::Receiver<OrderStatus>,
    feed_rx: watch::Receiver<FeedState>,
    shutdown_tx: watch::Sender<bool>,
}

impl OrderWatch {
    pub fn open(client: &ApiClient, order_id: i64, initial_status: OrderStatus) -> Self {
        let subscription_id = Uuid::new_v4();
        let (status_tx, status_rx) = watch::channel(initial_status);
        let (feed_tx, feed_rx) = watch::channel(FeedState::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let reader = Reader {
            http: client.http().clone(),
            url: client.config().url(&endpoints::order_watch(order_id)),
            subscription_id,
            kind: "order",
        };

        tokio::spawn(async move {
            reader
                .run(feed_tx, shutdown_rx, move |payload| {
                    match serde_json::from_str::<StatusEvent>(payload) {
                        Ok(ev) => {
                            let terminal = ev.status.is_terminal();
                            if terminal {
                                info!(order_id, status = %ev.status, "terminal status, closing order watch");
                            }
                            let _ = status_tx.send(ev.status);
                            if terminal {
                                ControlFlow::Break(())
                            } else {
                                ControlFlow::Continue(())
                            }
                        }
                        Err(err) => {
                            warn!(order_id, error = %err, "malformed status event dropped");
                            ControlFlow::Continue(())
                        }
                    }
                })
                .await;
        });

        Self {
            subscription_id,
            order_id,
            status_rx,
            feed_rx,
            shutdown_tx,
        }
    }

    pub fn subscription_id(&self) -> Uuid {
        self.subscription_id
    }

    pub fn order_id(&self) -> i64 {
        self.order_id
    }

    /// Latest known status (initial until the first push).
    pub fn status(&self) -> OrderStatus {
        self.status_rx.borrow().clone()
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

    /// True once the reader task has ended (terminal status or teardown).
    pub fn is_closed(&self) -> bool {
        self.feed_rx.borrow().closed
    }

    /// Wait for the next status update. Returns `false` once the
    /// subscription has closed and no further updates can arrive.
    pub async fn status_changed(&mut self) -> bool {
        self.status_rx.changed().await.is_ok()
    }

    /// Tear the subscription down. Idempotent; dropping the handle has the
    /// same effect.
    pub fn close(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}
