//! Dispatcher error taxonomy.

use tfn_api::ApiError;
use tfn_lifecycle::TransitionError;

/// Why a dispatch was refused or failed.
///
/// Everything except `Backend` is caught before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The order is not in the cache; nothing to act on.
    UnknownOrder(i64),
    /// Another mutation for this order is still in flight.
    Busy(i64),
    /// The state machine rejected the move.
    Illegal(TransitionError),
    /// `Verify` without a well-formed 4-digit code.
    InvalidCode,
    /// The call went out and failed; carries the full API error.
    Backend(ApiError),
}

impl DispatchError {
    /// Text suitable for direct display to the user.
    pub fn display_message(&self) -> String {
        match self {
            DispatchError::UnknownOrder(id) => format!("Order #{id} is no longer available"),
            DispatchError::Busy(_) => "Hold on, the previous update is still running".to_string(),
            DispatchError::Illegal(e) => {
                format!("Can't {} an order that is {}", e.action, e.from)
            }
            DispatchError::InvalidCode => "Enter the 4-digit pickup code".to_string(),
            DispatchError::Backend(e) => e.display_message(),
        }
    }
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::UnknownOrder(id) => write!(f, "unknown order {id}"),
            DispatchError::Busy(id) => write!(f, "order {id} already has a mutation in flight"),
            DispatchError::Illegal(e) => write!(f, "{e}"),
            DispatchError::InvalidCode => write!(f, "pickup code must be exactly 4 digits"),
            DispatchError::Backend(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DispatchError {}
