//! Dispatch domain services.
//!
//! Pure decision logic (replacement classification, release transitions,
//! resource aggregation, view projection) lives in plain functions; the
//! async entry points only add the repository round trip on top.

pub mod aggregate;
pub mod error;
pub mod projection;
pub mod release;
pub mod repair_watch;
pub mod replacement;

pub use aggregate::{aggregate, count_buses_on_line, depot_summaries, summarize_convoy, ResourceTotals};
pub use error::{DispatchError, DispatchResult};
pub use projection::{project, search_reserve, ViewFilter};
pub use release::{toggle_transition, ReleaseBoard};
pub use repair_watch::{RepairWatch, REPAIR_POLL_INTERVAL};
pub use replacement::{apply_decision, decide, submit_replacement};

#[cfg(test)]
#[path = "replacement_tests.rs"]
mod replacement_tests;
