//! Release-status synchronization for dispatch lines.
//!
//! A dispatcher marks a line as physically released with a checkbox; the
//! status enumeration, the release mark and the checked map must stay
//! consistent through optimistic updates and failed commits.
//!
//! The transition rules live in [`toggle_transition`], a pure function over
//! the current state and the wall clock. [`ReleaseBoard`] holds the shared
//! checked map and drives the commit protocol: optimistic board update,
//! backend call, rollback of the board on failure. Callers apply the
//! returned [`ReleaseUpdate`] to their view model only on `Ok`.

use chrono::NaiveTime;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::{
    AssignmentStatus, DispatchBusLineId, LineAssignment, ReleaseMark, ReleaseUpdate,
};
use crate::db::DispatchRepository;

use super::error::DispatchResult;

/// Apply one checkbox toggle to a line's `(status, release)` state.
///
/// Checking marks the line released now and promotes `Undefined` to
/// `Released`; substitution statuses are never downgraded by a checkbox.
/// Unchecking clears the mark and reverts `Released` back to `Undefined`,
/// leaving any other status untouched.
pub fn toggle_transition(
    status: AssignmentStatus,
    checked: bool,
    now: NaiveTime,
) -> (AssignmentStatus, Option<ReleaseMark>) {
    if checked {
        let new_status = match status {
            AssignmentStatus::Undefined => AssignmentStatus::Released,
            other => other,
        };
        (new_status, Some(ReleaseMark::at(now)))
    } else {
        let new_status = match status {
            AssignmentStatus::Released => AssignmentStatus::Undefined,
            other => other,
        };
        (new_status, None)
    }
}

/// Shared checked map for the release checkboxes of a dispatcher view.
///
/// # Caller obligation
/// The backend exchanges no concurrency token, so the caller must not issue
/// a second toggle for the same line while one is in flight (the UI disables
/// the control during the pending request).
#[derive(Clone, Default)]
pub struct ReleaseBoard {
    checked: Arc<RwLock<HashMap<DispatchBusLineId, bool>>>,
}

impl ReleaseBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize the board from a loaded day plan.
    pub fn seed_from<'a>(&self, assignments: impl IntoIterator<Item = &'a LineAssignment>) {
        let mut map = self.checked.write();
        for assignment in assignments {
            map.insert(assignment.id, assignment.is_released());
        }
    }

    /// Current checked state for a line; falls back to the assignment's own
    /// release mark when the line was never toggled in this view.
    pub fn is_checked(&self, assignment: &LineAssignment) -> bool {
        self.checked
            .read()
            .get(&assignment.id)
            .copied()
            .unwrap_or_else(|| assignment.is_released())
    }

    /// Snapshot of the checked map for projection and display.
    pub fn snapshot(&self) -> HashMap<DispatchBusLineId, bool> {
        self.checked.read().clone()
    }

    /// Toggle a line's release checkbox and commit the change.
    ///
    /// The board is updated optimistically for UI responsiveness; if the
    /// backend refuses or cannot be reached, the board is rolled back to the
    /// pre-toggle value and the error is surfaced.
    pub async fn toggle(
        &self,
        repo: &dyn DispatchRepository,
        assignment: &LineAssignment,
        checked: bool,
    ) -> DispatchResult<ReleaseUpdate> {
        let previous = self.is_checked(assignment);
        self.checked.write().insert(assignment.id, checked);

        let now = chrono::Local::now().time();
        let (new_status, release) = toggle_transition(assignment.status, checked, now);

        match repo
            .update_dispatch_status(assignment.id, new_status, checked)
            .await
        {
            Ok(()) => Ok(ReleaseUpdate {
                id: assignment.id,
                status: new_status,
                is_released: checked,
                released_time: release.map(|m| m.label()).unwrap_or_default(),
            }),
            Err(err) => {
                self.checked.write().insert(assignment.id, previous);
                Err(err.into())
            }
        }
    }
}
