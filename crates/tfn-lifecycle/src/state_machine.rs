//! Order status state machine.
//!
//! # Design
//!
//! Non-terminal statuses form a strictly forward path:
//!
//! ```text
//!   PENDING → CONFIRMED → PREPARING → READY → DELIVERED
//!      │           │           │        │  └─ Verify (needs OTP)
//!      │           │           │        └──── Complete (alternate terminal)
//!      └───────────┴───────────┴──── Cancel ──► CANCELLED
//! ```
//!
//! Every legal client-side move is a single forward step, a cancel from any
//! non-terminal status, or an idempotent no-op (requested status already
//! current). Backward moves and skips (`PENDING` straight to `READY`) are
//! rejected here so the UI never offers them; a pushed event reporting such
//! a jump is a cache concern (server state wins there), and this machine is
//! not consulted for pushed patches.

use serde::{Deserialize, Serialize};
use tfn_schemas::OrderStatus;

// ---------------------------------------------------------------------------
// OrderAction
// ---------------------------------------------------------------------------

/// Mutations a caller can request against an order.
///
/// `Verify` is the odd one out: it carries the customer's one-time pickup
/// code and only succeeds server-side when the code matches. All other
/// actions have an empty payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderAction {
    Confirm,
    Prepare,
    Ready,
    Verify,
    Complete,
    Cancel,
}

impl OrderAction {
    /// The status a successful call leaves the order in.
    pub fn target_status(&self) -> OrderStatus {
        match self {
            OrderAction::Confirm => OrderStatus::Confirmed,
            OrderAction::Prepare => OrderStatus::Preparing,
            OrderAction::Ready => OrderStatus::Ready,
            OrderAction::Verify => OrderStatus::Delivered,
            OrderAction::Complete => OrderStatus::Completed,
            OrderAction::Cancel => OrderStatus::Cancelled,
        }
    }

    /// `Verify` requires the one-time pickup code; nothing else does.
    pub fn requires_code(&self) -> bool {
        matches!(self, OrderAction::Verify)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderAction::Confirm => "CONFIRM",
            OrderAction::Prepare => "PREPARE",
            OrderAction::Ready => "READY",
            OrderAction::Verify => "VERIFY",
            OrderAction::Complete => "COMPLETE",
            OrderAction::Cancel => "CANCEL",
        }
    }
}

impl std::fmt::Display for OrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by [`OrderAction::from_str`] for strings that name no action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl std::fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unsupported order action: {}", self.0)
    }
}

impl std::error::Error for UnknownAction {}

impl std::str::FromStr for OrderAction {
    type Err = UnknownAction;

    /// Accepts both action spellings and target-status spellings
    /// (`"PREPARE"` and `"PREPARING"` both mean [`OrderAction::Prepare`]),
    /// case-insensitively; callers pass through whatever the UI layer had.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CONFIRM" | "CONFIRMED" => Ok(OrderAction::Confirm),
            "PREPARE" | "PREPARING" => Ok(OrderAction::Prepare),
            "READY" => Ok(OrderAction::Ready),
            "VERIFY" | "DELIVERED" => Ok(OrderAction::Verify),
            "COMPLETE" | "COMPLETED" => Ok(OrderAction::Complete),
            "CANCEL" | "CANCELLED" => Ok(OrderAction::Cancel),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Transition predicates
// ---------------------------------------------------------------------------

/// Whether moving from `current` to `requested` is legal for a client-side
/// update attempt.
///
/// Legal moves: the single next forward step, `CANCELLED` from any
/// non-terminal status, or `requested == current` (idempotent no-op).
/// Everything else (backward moves, skips, anything out of a terminal
/// status, `Unknown` on either side) is rejected.
pub fn is_legal_transition(current: &OrderStatus, requested: &OrderStatus) -> bool {
    if requested == current {
        return true; // idempotent no-op
    }
    if current.is_terminal() {
        return false;
    }
    if *requested == OrderStatus::Cancelled {
        return true;
    }
    match (current.forward_index(), requested.forward_index()) {
        (Some(cur), Some(req)) => req == cur + 1,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// next_action
// ---------------------------------------------------------------------------

/// The single forward action to offer for an order in `current` status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextAction {
    /// Display label for the action affordance.
    pub label: &'static str,
    pub action: OrderAction,
    pub target: OrderStatus,
}

/// Maps each non-terminal status to its one next forward action.
/// Terminal and `Unknown` statuses have none.
pub fn next_action(current: &OrderStatus) -> Option<NextAction> {
    let (label, action) = match current {
        OrderStatus::Pending => ("Accept order", OrderAction::Confirm),
        OrderStatus::Confirmed => ("Start preparing", OrderAction::Prepare),
        OrderStatus::Preparing => ("Mark ready", OrderAction::Ready),
        OrderStatus::Ready => ("Verify & hand over", OrderAction::Verify),
        _ => return None,
    };
    Some(NextAction {
        label,
        action,
        target: action.target_status(),
    })
}

// ---------------------------------------------------------------------------
// plan
// ---------------------------------------------------------------------------

/// Outcome of a legal [`plan`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The action moves the order to this status.
    Move(OrderStatus),
    /// The order is already in the action's target status; nothing to do.
    Noop,
}

/// Returned when an action cannot legally be applied in the current status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub from: OrderStatus,
    pub action: OrderAction,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "illegal order transition: {} + {}", self.from, self.action)
    }
}

impl std::error::Error for TransitionError {}

/// Decide what `action` does to an order currently in `current` status,
/// without touching the network.
///
/// # Errors
/// [`TransitionError`] when the move is illegal; callers surface this to the
/// UI and must not issue the backend call.
pub fn plan(current: &OrderStatus, action: OrderAction) -> Result<Advance, TransitionError> {
    let target = action.target_status();
    if target == *current {
        return Ok(Advance::Noop);
    }
    if is_legal_transition(current, &target) {
        Ok(Advance::Move(target))
    } else {
        Err(TransitionError {
            from: current.clone(),
            action,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
