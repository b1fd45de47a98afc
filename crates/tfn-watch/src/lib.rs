//! tfn-watch
//!
//! Event stream client for the backend's watch endpoints: long-lived,
//! read-only SSE connections pushing order status changes (per order) and
//! inbound-order notifications (per store).
//!
//! # Design
//!
//! Each subscription is a spawned reader task plus a cheap handle:
//!
//! - the task is the **only writer** of the exposed state; consumers observe
//!   through `tokio::sync::watch` receivers, so there is never a concurrent
//!   mutation race on what the UI reads
//! - `close()` (or dropping the handle) signals the task; no state update or
//!   callback happens after teardown
//! - a transport-level failure flips the health to `Reconnecting` and the
//!   reader retries with a fixed short delay; that loop is the transport's
//!   auto-retry, and no additional backoff policy sits on top
//! - a per-order subscription that sees a terminal status processes it,
//!   then closes the connection for good: nothing further is expected
//!
//! Malformed payloads are logged and dropped without disturbing the
//! connection.

mod connection;
mod order_watch;
mod reader;
mod sse;
mod store_watch;

pub use connection::ConnectionStatus;
pub use order_watch::OrderWatch;
pub use reader::FeedState;
pub use store_watch::{OrderFeedHandler, StoreWatch};
