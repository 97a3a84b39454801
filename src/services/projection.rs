//! Read-only filtered views over route groups and the reserve list.
//!
//! Projection never mutates the source day plan; the dispatcher's search
//! box, status filter and "only checked" switch compose with logical AND at
//! the assignment level, and routes left without matching lines disappear
//! from the view.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::api::{AssignmentStatus, DispatchBusLineId, ReserveAssignment, RouteGroup};

/// Dispatcher view filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewFilter {
    /// Case-insensitive substring over driver full name or service number.
    #[serde(default)]
    pub search: Option<String>,
    /// Retain only this status; `None` shows all.
    #[serde(default)]
    pub status: Option<AssignmentStatus>,
    /// Retain only lines checked on the release board.
    #[serde(default)]
    pub only_checked: bool,
}

impl ViewFilter {
    fn matches_search(&self, assignment: &crate::api::LineAssignment) -> bool {
        let Some(query) = self.search.as_deref() else {
            return true;
        };
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        match &assignment.driver {
            Some(driver) => {
                driver.full_name.to_lowercase().contains(&query)
                    || driver.service_number.to_lowercase().contains(&query)
            }
            None => false,
        }
    }

    fn matches_status(&self, assignment: &crate::api::LineAssignment) -> bool {
        match self.status {
            Some(status) => assignment.status == status,
            None => true,
        }
    }

    fn matches_checked(
        &self,
        assignment: &crate::api::LineAssignment,
        checked: &HashMap<DispatchBusLineId, bool>,
    ) -> bool {
        if !self.only_checked {
            return true;
        }
        checked.get(&assignment.id).copied().unwrap_or(false)
    }
}

/// Derive the filtered route-group view for display.
pub fn project(
    route_groups: &[RouteGroup],
    filter: &ViewFilter,
    checked: &HashMap<DispatchBusLineId, bool>,
) -> Vec<RouteGroup> {
    route_groups
        .iter()
        .filter_map(|group| {
            let assignments: Vec<_> = group
                .assignments
                .iter()
                .filter(|a| {
                    filter.matches_search(a)
                        && filter.matches_status(a)
                        && filter.matches_checked(a, checked)
                })
                .cloned()
                .collect();
            if assignments.is_empty() {
                None
            } else {
                Some(RouteGroup {
                    route_id: group.route_id,
                    route_number: group.route_number.clone(),
                    assignments,
                })
            }
        })
        .collect()
}

/// Apply the same name/service-number search to the reserve list.
pub fn search_reserve(reserve: &[ReserveAssignment], search: Option<&str>) -> Vec<ReserveAssignment> {
    let query = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();
    if query.is_empty() {
        return reserve.to_vec();
    }
    reserve
        .iter()
        .filter(|entry| match &entry.driver {
            Some(driver) => {
                driver.full_name.to_lowercase().contains(&query)
                    || driver.service_number.to_lowercase().contains(&query)
            }
            None => false,
        })
        .cloned()
        .collect()
}
