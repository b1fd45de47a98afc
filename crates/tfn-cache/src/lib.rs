//! tfn-cache
//!
//! Local order cache and reconciler: the authoritative-for-the-UI set of
//! orders, merged from three sources without loss or duplication:
//!
//! - full refetch responses: authoritative, wholesale replace
//! - live push events: best-effort patches between refreshes
//! - local action results: provisional patches, tagged until the next
//!   authoritative refetch confirms or overwrites them
//!
//! Deterministic, pure logic. No IO.

mod cache;

pub use cache::{HistoryRange, OrderCache};
