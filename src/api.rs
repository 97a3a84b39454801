//! Public API surface for the dispatch backend.
//!
//! This file consolidates the DTO types shared by the service layer, the
//! repository boundary and the HTTP API. All types derive
//! Serialize/Deserialize for JSON serialization.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(value: i64) -> Self {
                $name(value)
            }

            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

id_type!(
    /// Depot identifier.
    DepotId
);
id_type!(
    /// Convoy (fleet column) identifier.
    ConvoyId
);
id_type!(
    /// Route identifier.
    RouteId
);
id_type!(
    /// Dispatch bus-line identifier, stable per line per service day.
    DispatchBusLineId
);
id_type!(
    /// Driver identifier.
    DriverId
);
id_type!(
    /// Bus identifier.
    BusId
);
id_type!(
    /// Dispatch statement identifier.
    StatementId
);

// ============================================================================
// Day classification
// ============================================================================

/// Schedule variant for a service day.
///
/// Selects which route/line template the backend loads for the day, so every
/// caller must classify a given date identically (see [`crate::models::calendar`]).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    Workday,
    Saturday,
    Sunday,
    Holiday,
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DayType::Workday => "workday",
            DayType::Saturday => "saturday",
            DayType::Sunday => "sunday",
            DayType::Holiday => "holiday",
        };
        write!(f, "{}", s)
    }
}

// ============================================================================
// Resources
// ============================================================================

/// Driver reference as displayed on dispatch screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverRef {
    pub id: DriverId,
    pub full_name: String,
    pub service_number: String,
}

/// Bus reference as displayed on dispatch screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusRef {
    pub id: BusId,
    pub garage_number: String,
    pub gov_number: String,
}

// ============================================================================
// Assignment status and release mark
// ============================================================================

/// Status of a line assignment over the service day.
///
/// `Removed` is terminal for the day by convention; the type does not forbid
/// further transitions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentStatus {
    Undefined,
    Released,
    Replaced,
    Permutation,
    Removed,
}

impl AssignmentStatus {
    /// Numeric wire code used by the status-update call.
    pub fn code(&self) -> i32 {
        match self {
            AssignmentStatus::Undefined => 0,
            AssignmentStatus::Released => 1,
            AssignmentStatus::Replaced => 2,
            AssignmentStatus::Permutation => 3,
            AssignmentStatus::Removed => 4,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(AssignmentStatus::Undefined),
            1 => Some(AssignmentStatus::Released),
            2 => Some(AssignmentStatus::Replaced),
            3 => Some(AssignmentStatus::Permutation),
            4 => Some(AssignmentStatus::Removed),
            _ => None,
        }
    }
}

/// Wall-clock mark recorded when a line physically leaves the depot.
///
/// Replaces the legacy released flag + time-string pair: a line is released
/// iff the mark is present, so the two signals can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseMark {
    pub time: NaiveTime,
}

impl ReleaseMark {
    pub fn at(time: NaiveTime) -> Self {
        Self { time }
    }

    /// Release time formatted `HH:MM:SS`.
    pub fn label(&self) -> String {
        self.time.format("%H:%M:%S").to_string()
    }
}

// ============================================================================
// Line assignments and day plan
// ============================================================================

/// One route-line's driver/bus assignment for a service day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineAssignment {
    pub id: DispatchBusLineId,
    pub route_id: RouteId,
    pub route_number: String,
    pub bus_line_number: String,
    pub driver: Option<DriverRef>,
    pub bus: Option<BusRef>,
    pub status: AssignmentStatus,
    /// Present iff the line has physically left the depot.
    pub release: Option<ReleaseMark>,
}

impl LineAssignment {
    pub fn is_released(&self) -> bool {
        self.release.is_some()
    }

    /// Release time as displayed; empty string while the line is in the depot.
    pub fn released_time_label(&self) -> String {
        self.release.map(|m| m.label()).unwrap_or_default()
    }

    /// Whether the line counts as "on line" for summary purposes.
    ///
    /// Either signal suffices: the status reached `Released`, or a release
    /// mark was recorded while the status is a substitution state.
    pub fn is_on_line(&self) -> bool {
        self.status == AssignmentStatus::Released || self.release.is_some()
    }
}

/// All line assignments of one route for a service day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGroup {
    pub route_id: RouteId,
    pub route_number: String,
    pub assignments: Vec<LineAssignment>,
}

/// Reserve pool entry available to source a replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveAssignment {
    pub sequence_number: u32,
    pub driver: Option<DriverRef>,
    pub bus: Option<BusRef>,
    /// Set once the entry has been consumed by a replacement.
    pub is_replace: bool,
}

/// Order duty entry; walks through aggregation exactly like a reserve entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAssignment {
    pub sequence_number: u32,
    pub driver: Option<DriverRef>,
    pub bus: Option<BusRef>,
}

/// Scheduled repair entry, polled for display refresh only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledRepair {
    pub id: i64,
    pub bus: Option<BusRef>,
    pub description: String,
    pub reported_at: NaiveDate,
}

/// Full dispatch plan for a (date, convoy) pair, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchDay {
    pub date: NaiveDate,
    pub day_type: DayType,
    pub convoy_id: ConvoyId,
    pub route_groups: Vec<RouteGroup>,
    pub reserve_assignments: Vec<ReserveAssignment>,
    pub orders: Vec<OrderAssignment>,
    pub scheduled_repairs: Vec<ScheduledRepair>,
}

/// Organizational subdivision of a depot's fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Convoy {
    pub id: ConvoyId,
    pub number: String,
    pub depot_id: DepotId,
}

// ============================================================================
// Derived read models
// ============================================================================

/// Aggregate counts per convoy per day. Always recomputed, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvoySummary {
    pub convoy_id: ConvoyId,
    pub drivers_assigned: usize,
    pub buses_assigned: usize,
    pub routes_count: usize,
    pub buses_on_line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_statement_id: Option<StatementId>,
}

/// Kind of an assignment change.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplacementKind {
    /// Resource sourced from the reserve pool.
    Replaced,
    /// Resource permuted from elsewhere in the active duty pool.
    Permutation,
}

impl ReplacementKind {
    pub fn as_status(&self) -> AssignmentStatus {
        match self {
            ReplacementKind::Replaced => AssignmentStatus::Replaced,
            ReplacementKind::Permutation => AssignmentStatus::Permutation,
        }
    }
}

impl std::fmt::Display for ReplacementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplacementKind::Replaced => write!(f, "Replaced"),
            ReplacementKind::Permutation => write!(f, "Permutation"),
        }
    }
}

/// Outcome of classifying a proposed driver/bus change. Derived, not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementDecision {
    pub kind: ReplacementKind,
    /// Normalized driver id: the candidate when provided, else the current one.
    pub driver_id: Option<DriverId>,
    /// Normalized bus id: the candidate when provided, else the current one.
    pub bus_id: Option<BusId>,
}

/// Commit payload for the assignment-replacement call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementRequest {
    pub dispatch_bus_line_id: DispatchBusLineId,
    /// Always `true`: second-shift replacement is not modeled.
    pub is_first_shift: bool,
    pub kind: ReplacementKind,
    pub driver_id: Option<DriverId>,
    pub bus_id: Option<BusId>,
}

/// Result of a committed release toggle, for the caller to merge into its view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseUpdate {
    pub id: DispatchBusLineId,
    pub status: AssignmentStatus,
    pub is_released: bool,
    /// `HH:MM:SS`, empty when the line is not released.
    pub released_time: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_status_codes_roundtrip() {
        for status in [
            AssignmentStatus::Undefined,
            AssignmentStatus::Released,
            AssignmentStatus::Replaced,
            AssignmentStatus::Permutation,
            AssignmentStatus::Removed,
        ] {
            assert_eq!(AssignmentStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(AssignmentStatus::from_code(99), None);
    }

    #[test]
    fn test_release_mark_label() {
        let mark = ReleaseMark::at(NaiveTime::from_hms_opt(6, 45, 3).unwrap());
        assert_eq!(mark.label(), "06:45:03");
    }

    #[test]
    fn test_released_time_label_empty_without_mark() {
        let assignment = LineAssignment {
            id: DispatchBusLineId::new(1),
            route_id: RouteId::new(10),
            route_number: "23".to_string(),
            bus_line_number: "1".to_string(),
            driver: None,
            bus: None,
            status: AssignmentStatus::Undefined,
            release: None,
        };
        assert_eq!(assignment.released_time_label(), "");
        assert!(!assignment.is_released());
        assert!(!assignment.is_on_line());
    }

    #[test]
    fn test_on_line_from_either_signal() {
        let mut assignment = LineAssignment {
            id: DispatchBusLineId::new(1),
            route_id: RouteId::new(10),
            route_number: "23".to_string(),
            bus_line_number: "1".to_string(),
            driver: None,
            bus: None,
            status: AssignmentStatus::Released,
            release: None,
        };
        assert!(assignment.is_on_line());

        assignment.status = AssignmentStatus::Replaced;
        assignment.release = Some(ReleaseMark::at(NaiveTime::from_hms_opt(7, 0, 0).unwrap()));
        assert!(assignment.is_on_line());
    }

    #[test]
    fn test_id_display() {
        assert_eq!(DispatchBusLineId::new(42).to_string(), "42");
        assert_eq!(ConvoyId::new(3).value(), 3);
    }
}
