//! Order action dispatcher.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use tfn_api::OrderBackend;
use tfn_cache::OrderCache;
use tfn_lifecycle::{plan, Advance, OrderAction};
use tfn_schemas::{OrderStatus, Role};

use crate::error::DispatchError;

/// Result of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The backend accepted the transition. When `terminal` is set the
    /// caller should close any live subscription for this order; no
    /// further events are coming.
    Applied {
        new_status: OrderStatus,
        terminal: bool,
    },
    /// The order was already in the requested status; no call was made.
    AlreadyApplied,
}

/// Executes order mutations with at-most-one-in-flight per order.
///
/// Owns the session's [`OrderCache`]; screens read views through
/// [`cache()`][`Dispatcher::cache`] and derive their disabled states from
/// [`is_processing`][`Dispatcher::is_processing`].
pub struct Dispatcher {
    backend: Arc<dyn OrderBackend>,
    cache: Arc<Mutex<OrderCache>>,
    role: Role,
    in_flight: Arc<Mutex<HashSet<i64>>>,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn OrderBackend>, role: Role) -> Self {
        Self {
            backend,
            cache: Arc::new(Mutex::new(OrderCache::new())),
            role,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// The session's order cache. Lock scope stays short, never across an
    /// await point.
    pub fn cache(&self) -> Arc<Mutex<OrderCache>> {
        Arc::clone(&self.cache)
    }

    /// Whether a mutation for this order is currently in flight; feeds the
    /// UI's disabled state.
    pub fn is_processing(&self, order_id: i64) -> bool {
        self.in_flight.lock().expect("in-flight set poisoned").contains(&order_id)
    }

    /// Authoritative refetch: pull the role's order list and replace the
    /// cache wholesale. Also used for pull-to-refresh.
    pub async fn refresh(&self) -> Result<(), tfn_api::ApiError> {
        let orders = self.backend.fetch_orders(self.role).await?;
        self.cache.lock().expect("cache poisoned").replace_all(orders);
        Ok(())
    }

    /// Execute `action` against `order_id`.
    ///
    /// # Errors
    /// See [`DispatchError`]; everything except `Backend` is decided before
    /// any network call, and a failed call leaves the cache untouched.
    pub async fn dispatch(
        &self,
        order_id: i64,
        action: OrderAction,
        code: Option<&str>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let current = {
            let cache = self.cache.lock().expect("cache poisoned");
            cache
                .get(order_id)
                .map(|o| o.order_status.clone())
                .ok_or(DispatchError::UnknownOrder(order_id))?
        };

        let target = match plan(&current, action).map_err(DispatchError::Illegal)? {
            Advance::Noop => return Ok(DispatchOutcome::AlreadyApplied),
            Advance::Move(target) => target,
        };

        if action.requires_code() {
            validate_code(code)?;
        }

        let _guard = InFlightGuard::acquire(&self.in_flight, order_id)
            .ok_or(DispatchError::Busy(order_id))?;

        info!(order_id, %action, from = %current, to = %target, "dispatching order action");
        match self.backend.transition(order_id, action, code).await {
            Ok(()) => {
                self.cache
                    .lock()
                    .expect("cache poisoned")
                    .apply_action_result(order_id, target.clone());
                // Reconcile server-side effects (OTP rotation etc.) off the
                // caller's critical path.
                self.spawn_refetch();
                Ok(DispatchOutcome::Applied {
                    terminal: target.is_terminal(),
                    new_status: target,
                })
            }
            Err(err) => {
                warn!(order_id, %action, error = %err, "order action failed");
                Err(DispatchError::Backend(err))
            }
        }
    }

    fn spawn_refetch(&self) {
        let backend = Arc::clone(&self.backend);
        let cache = Arc::clone(&self.cache);
        let role = self.role;
        tokio::spawn(async move {
            match backend.fetch_orders(role).await {
                Ok(orders) => cache.lock().expect("cache poisoned").replace_all(orders),
                Err(err) => warn!(error = %err, "background refetch failed"),
            }
        });
    }
}

fn validate_code(code: Option<&str>) -> Result<(), DispatchError> {
    match code {
        Some(c) if c.len() == 4 && c.bytes().all(|b| b.is_ascii_digit()) => Ok(()),
        _ => Err(DispatchError::InvalidCode),
    }
}

/// Marks an order as processing for the duration of one mutation; released
/// on drop so failures can never leave an order stuck busy.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<i64>>,
    order_id: i64,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(set: &'a Arc<Mutex<HashSet<i64>>>, order_id: i64) -> Option<Self> {
        let mut in_flight = set.lock().expect("in-flight set poisoned");
        if !in_flight.insert(order_id) {
            return None;
        }
        Some(Self { set, order_id })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .expect("in-flight set poisoned")
            .remove(&self.order_id);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_validation_accepts_exactly_four_ascii_digits() {
        assert!(validate_code(Some("4821")).is_ok());
        assert!(validate_code(Some("0000")).is_ok());
        assert!(validate_code(Some("482")).is_err());
        assert!(validate_code(Some("48211")).is_err());
        assert!(validate_code(Some("48a1")).is_err());
        assert!(validate_code(Some("４８２１")).is_err()); // full-width digits
        assert!(validate_code(None).is_err());
    }

    #[test]
    fn in_flight_guard_is_exclusive_and_releases_on_drop() {
        let set = Arc::new(Mutex::new(HashSet::new()));
        let guard = InFlightGuard::acquire(&set, 7).expect("first acquire");
        assert!(InFlightGuard::acquire(&set, 7).is_none(), "second acquire");
        assert!(InFlightGuard::acquire(&set, 8).is_some(), "other order unaffected");
        drop(guard);
        assert!(InFlightGuard::acquire(&set, 7).is_some(), "released on drop");
    }
}
