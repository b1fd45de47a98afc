//! tfn-dispatch
//!
//! The single choke point for order mutations. Every requested transition
//! passes three gates before any network traffic:
//!
//! 1. the order must exist in the cache,
//! 2. the move must be legal per the state machine (an idempotent target
//!    short-circuits to success without a call),
//! 3. `Verify` must carry a well-formed 4-digit code.
//!
//! Past the gates, an in-flight guard serializes mutations per order: a
//! second action for the same order is refused as `Busy` until the first
//! resolves. Success applies a provisional cache patch and kicks off a
//! background refetch; failure changes nothing locally and surfaces the
//! backend's message.

mod dispatcher;
mod error;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::DispatchError;
