//! The reconnecting reader loop shared by both subscription kinds.
//!
//! One spawned task per subscription. The task is the sole writer of the
//! [`FeedState`] watch channel; handles only ever read. Shutdown is a watch
//! channel too: `close()` sends `true`, dropping the handle drops the sender,
//! and either way every `select!` below falls through and the task ends
//! without another state write or payload callback.

use std::ops::ControlFlow;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::connection::ConnectionStatus;
use crate::sse::{parse_line, Frame, LineBuffer};

/// Transport-level snapshot of one subscription.
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    pub connection: ConnectionStatus,
    /// When the last frame (heartbeat or payload) arrived.
    pub last_event_at: Option<DateTime<Utc>>,
    /// Set once the reader task has ended; nothing will update again.
    pub closed: bool,
}

/// Delay between reconnect attempts. The reader owns the transport here, so
/// this fixed delay is the whole retry policy.
pub(crate) const RETRY_DELAY: Duration = Duration::from_secs(2);

pub(crate) struct Reader {
    pub http: reqwest::Client,
    pub url: String,
    pub subscription_id: Uuid,
    pub kind: &'static str,
}

impl Reader {
    /// Run until the consumer breaks (terminal status), the subscription is
    /// closed, or the handle is dropped.
    pub(crate) async fn run<F>(
        self,
        feed_tx: watch::Sender<FeedState>,
        mut shutdown_rx: watch::Receiver<bool>,
        mut on_payload: F,
    ) where
        F: FnMut(&str) -> ControlFlow<()> + Send,
    {
        let sub = self.subscription_id;
        let mut first_attempt = true;

        'outer: loop {
            if *shutdown_rx.borrow() {
                break;
            }
            feed_tx.send_modify(|s| {
                s.connection = if first_attempt {
                    ConnectionStatus::Connecting
                } else {
                    ConnectionStatus::Reconnecting
                };
            });

            let request = self
                .http
                .get(&self.url)
                .header("Accept", "text/event-stream")
                .send();
            let resp = tokio::select! {
                _ = shutdown_rx.changed() => break 'outer,
                r = request => r.and_then(|r| r.error_for_status()),
            };

            match resp {
                Ok(resp) => {
                    info!(subscription = %sub, kind = self.kind, url = %self.url, "watch stream open");
                    feed_tx.send_modify(|s| s.connection = ConnectionStatus::Connected);

                    let mut stream = Box::pin(resp.bytes_stream());
                    let mut lines = LineBuffer::default();
                    loop {
                        let chunk = tokio::select! {
                            _ = shutdown_rx.changed() => break 'outer,
                            c = stream.next() => c,
                        };
                        match chunk {
                            Some(Ok(bytes)) => {
                                for line in lines.push(&bytes) {
                                    if *shutdown_rx.borrow() {
                                        break 'outer;
                                    }
                                    match parse_line(&line) {
                                        Frame::Heartbeat => {
                                            feed_tx.send_modify(|s| {
                                                s.last_event_at = Some(Utc::now());
                                            });
                                        }
                                        Frame::Data(payload) => {
                                            feed_tx.send_modify(|s| {
                                                s.last_event_at = Some(Utc::now());
                                            });
                                            if on_payload(payload).is_break() {
                                                debug!(subscription = %sub, "reader finished by consumer");
                                                break 'outer;
                                            }
                                        }
                                        Frame::Skip => {}
                                    }
                                }
                            }
                            Some(Err(err)) => {
                                warn!(subscription = %sub, error = %err, "watch stream error");
                                break;
                            }
                            None => {
                                debug!(subscription = %sub, "watch stream ended by server");
                                break;
                            }
                        }
                    }
                }
                Err(err) => {
                    warn!(subscription = %sub, error = %err, "watch connect failed");
                }
            }

            first_attempt = false;
            feed_tx.send_modify(|s| s.connection = ConnectionStatus::Reconnecting);
            tokio::select! {
                _ = shutdown_rx.changed() => break 'outer,
                _ = tokio::time::sleep(RETRY_DELAY) => {}
            }
        }

        feed_tx.send_modify(|s| {
            s.connection = ConnectionStatus::Disconnected;
            s.closed = true;
        });
        debug!(subscription = %sub, kind = self.kind, "watch subscription closed");
    }
}
