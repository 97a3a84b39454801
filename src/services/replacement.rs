//! Classification and commit of driver/bus substitutions.
//!
//! `decide` is pure: given the current assignment, the dispatcher's candidate
//! driver and/or bus, and the reserve pool, it either reports a validation
//! error (nothing actually changes) or classifies the edit as reserve-sourced
//! (`Replaced`) or an in-pool `Permutation`. The classified decision is then
//! committed through the repository; local state is only updated from the
//! assignment returned on success.

use crate::api::{
    BusRef, DriverRef, LineAssignment, ReplacementDecision, ReplacementKind, ReplacementRequest,
    ReserveAssignment,
};
use crate::db::DispatchRepository;

use super::error::{DispatchError, DispatchResult};

/// Classify a proposed driver/bus change for a line.
///
/// Driver and bus changes are detected independently; either alone triggers
/// classification and both may change at once. When neither differs from the
/// current assignment the edit is a validation error, not a backend call.
pub fn decide(
    current: &LineAssignment,
    candidate_driver: Option<&DriverRef>,
    candidate_bus: Option<&BusRef>,
    reserve: &[ReserveAssignment],
) -> DispatchResult<ReplacementDecision> {
    let current_driver_id = current.driver.as_ref().map(|d| d.id);
    let current_bus_id = current.bus.as_ref().map(|b| b.id);

    let driver_changed = match candidate_driver {
        Some(candidate) => Some(candidate.id) != current_driver_id,
        None => false,
    };
    let bus_changed = match candidate_bus {
        Some(candidate) => Some(candidate.id) != current_bus_id,
        None => false,
    };

    if !driver_changed && !bus_changed {
        return Err(DispatchError::validation("No replacement selected"));
    }

    // Normalize: the candidate when provided, otherwise the current resource.
    let driver_id = candidate_driver.map(|d| d.id).or(current_driver_id);
    let bus_id = candidate_bus.map(|b| b.id).or(current_bus_id);

    let from_reserve = match (driver_id, bus_id) {
        (Some(did), Some(bid)) => reserve.iter().any(|entry| {
            entry.driver.as_ref().map(|d| d.id) == Some(did)
                && entry.bus.as_ref().map(|b| b.id) == Some(bid)
        }),
        _ => false,
    };

    let kind = if from_reserve {
        ReplacementKind::Replaced
    } else {
        ReplacementKind::Permutation
    };

    Ok(ReplacementDecision {
        kind,
        driver_id,
        bus_id,
    })
}

/// Produce the post-commit view of an assignment for a decided change.
///
/// The status becomes the decided kind and the candidate resources replace
/// the current ones where provided.
pub fn apply_decision(
    current: &LineAssignment,
    decision: &ReplacementDecision,
    candidate_driver: Option<&DriverRef>,
    candidate_bus: Option<&BusRef>,
) -> LineAssignment {
    let mut updated = current.clone();
    updated.status = decision.kind.as_status();
    if let Some(driver) = candidate_driver {
        updated.driver = Some(driver.clone());
    }
    if let Some(bus) = candidate_bus {
        updated.bus = Some(bus.clone());
    }
    updated
}

/// Classify and commit a substitution for one line.
///
/// On success returns the updated assignment for the caller to merge into its
/// view model; on any error the caller must leave local state untouched.
/// Second-shift replacement is not modeled: the commit always carries
/// `is_first_shift = true`.
pub async fn submit_replacement(
    repo: &dyn DispatchRepository,
    current: &LineAssignment,
    candidate_driver: Option<&DriverRef>,
    candidate_bus: Option<&BusRef>,
    reserve: &[ReserveAssignment],
) -> DispatchResult<LineAssignment> {
    let decision = decide(current, candidate_driver, candidate_bus, reserve)?;

    let request = ReplacementRequest {
        dispatch_bus_line_id: current.id,
        is_first_shift: true,
        kind: decision.kind,
        driver_id: decision.driver_id,
        bus_id: decision.bus_id,
    };

    repo.replace_assignment(request).await?;

    Ok(apply_decision(
        current,
        &decision,
        candidate_driver,
        candidate_bus,
    ))
}
