//! Order cache and merge rules.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use tfn_schemas::{Order, OrderStatus, StoreEvent};

// ---------------------------------------------------------------------------
// HistoryRange
// ---------------------------------------------------------------------------

/// Date scope for the history view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRange {
    Today,
    All,
}

// ---------------------------------------------------------------------------
// OrderCache
// ---------------------------------------------------------------------------

/// In-memory `order_id → Order` map owned by one screen/session.
///
/// Patches applied after a successful local mutation are **provisional**
/// until the next [`replace_all`][`OrderCache::replace_all`]; push-delivered
/// patches are authoritative (server state wins) and clear the mark.
#[derive(Debug, Default)]
pub struct OrderCache {
    orders: HashMap<i64, Order>,
    provisional: HashSet<i64>,
}

impl OrderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn get(&self, order_id: i64) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    /// True while a local action result is awaiting refetch confirmation.
    pub fn is_provisional(&self, order_id: i64) -> bool {
        self.provisional.contains(&order_id)
    }

    // -----------------------------------------------------------------------
    // Merge sources
    // -----------------------------------------------------------------------

    /// Insert a pushed new order. Idempotent: an id already present is left
    /// untouched (guards the duplicate push-vs-refetch race). Returns whether
    /// the order was inserted.
    pub fn merge_new_order(&mut self, order: Order) -> bool {
        match self.orders.entry(order.order_id) {
            std::collections::hash_map::Entry::Occupied(_) => {
                debug!(order_id = order.order_id, "duplicate new-order push ignored");
                false
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(order);
                true
            }
        }
    }

    /// Apply a push-delivered status patch. Unknown id is a no-op; the
    /// order will arrive with the next full refetch. Returns whether a patch
    /// was applied.
    pub fn patch_status(&mut self, order_id: i64, new_status: OrderStatus) -> bool {
        let Some(order) = self.orders.get_mut(&order_id) else {
            debug!(order_id, "status patch for unknown order dropped");
            return false;
        };
        Self::set_status(order, new_status);
        // Push state is authoritative; it supersedes any provisional patch.
        self.provisional.remove(&order_id);
        true
    }

    /// Apply the result of a successful local mutation, marked provisional
    /// until the next authoritative refetch. Unknown id is a no-op (the
    /// screen may already have discarded the order).
    pub fn apply_action_result(&mut self, order_id: i64, new_status: OrderStatus) -> bool {
        let Some(order) = self.orders.get_mut(&order_id) else {
            debug!(order_id, "action result for unknown order discarded");
            return false;
        };
        Self::set_status(order, new_status);
        self.provisional.insert(order_id);
        true
    }

    /// Full-refetch conflict resolution: the server's list replaces the
    /// cache wholesale and clears every provisional mark. Terminal orders
    /// are stripped of any OTP here too: the code must never outlive the
    /// order, whatever the wire carried.
    pub fn replace_all(&mut self, orders: Vec<Order>) {
        self.provisional.clear();
        self.orders = orders
            .into_iter()
            .map(|mut o| {
                if o.order_status.is_terminal() {
                    o.order_otp = None;
                }
                (o.order_id, o)
            })
            .collect();
    }

    /// Route a store-watch push into the cache.
    pub fn apply_store_event(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::NewOrder { order } => {
                self.merge_new_order(order);
            }
            StoreEvent::OrderUpdate {
                order_id,
                order_status,
            } => {
                self.patch_status(order_id, order_status);
            }
        }
    }

    // One write path for status changes: the OTP must disappear the moment
    // an order is terminal.
    fn set_status(order: &mut Order, new_status: OrderStatus) {
        if let OrderStatus::Unknown(raw) = &new_status {
            warn!(order_id = order.order_id, status = raw.as_str(), "patching to unrecognized status");
        }
        order.order_status = new_status;
        if order.order_status.is_terminal() {
            order.order_otp = None;
        }
    }

    // -----------------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------------

    /// The kitchen queue: non-terminal orders, oldest first.
    pub fn active(&self) -> Vec<&Order> {
        let mut v: Vec<&Order> = self
            .orders
            .values()
            .filter(|o| !o.order_status.is_terminal())
            .collect();
        v.sort_by_key(|o| (o.order_date, o.order_id));
        v
    }

    /// Finished orders, newest first, optionally scoped to today.
    pub fn history(&self, range: HistoryRange) -> Vec<&Order> {
        self.history_as_of(range, Utc::now())
    }

    /// [`history`][`OrderCache::history`] with an explicit clock.
    pub fn history_as_of(&self, range: HistoryRange, now: DateTime<Utc>) -> Vec<&Order> {
        let mut v: Vec<&Order> = self
            .orders
            .values()
            .filter(|o| o.order_status.is_terminal())
            .filter(|o| match range {
                HistoryRange::All => true,
                HistoryRange::Today => o.order_date.date_naive() == now.date_naive(),
            })
            .collect();
        v.sort_by_key(|o| (std::cmp::Reverse(o.order_date), std::cmp::Reverse(o.order_id)));
        v
    }

    /// Revenue in paise over delivered/completed orders in `range`.
    /// Cancelled orders never count.
    pub fn delivered_total(&self, range: HistoryRange) -> i64 {
        self.delivered_total_as_of(range, Utc::now())
    }

    /// [`delivered_total`][`OrderCache::delivered_total`] with an explicit clock.
    pub fn delivered_total_as_of(&self, range: HistoryRange, now: DateTime<Utc>) -> i64 {
        self.history_as_of(range, now)
            .into_iter()
            .filter(|o| {
                matches!(
                    o.order_status,
                    OrderStatus::Delivered | OrderStatus::Completed
                )
            })
            .map(|o| o.total_price)
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
