//! tfn-lifecycle
//!
//! Order status state machine. Single source of truth for which move is
//! valid from where: the dispatcher refuses to touch the network for a
//! transition this crate rejects, and the UI derives its one offered action
//! per order from [`next_action`].
//!
//! Pure logic, no IO.

mod state_machine;

pub use state_machine::{
    is_legal_transition, next_action, plan, Advance, NextAction, OrderAction, TransitionError,
    UnknownAction,
};
