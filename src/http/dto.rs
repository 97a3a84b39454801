//! Data Transfer Objects for the HTTP API.
//!
//! Domain types from [`crate::api`] already derive Serialize/Deserialize and
//! are re-exported; this module adds the query/request/response wrappers the
//! endpoints need on top.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Re-export domain types that appear directly in responses.
pub use crate::api::{
    BusRef, Convoy, ConvoySummary, DayType, DispatchBusLineId, DriverRef, LineAssignment,
    OrderAssignment, ReleaseUpdate, ReserveAssignment, RouteGroup, ScheduledRepair,
};
pub use crate::services::ResourceTotals;

/// Query parameters for the convoy listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvoyQuery {
    pub depot_id: i64,
}

/// Response for the convoy listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvoyListResponse {
    pub convoys: Vec<Convoy>,
    pub total: usize,
}

/// Query parameters for the dispatch day view.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchQuery {
    /// Service date (ISO `YYYY-MM-DD`)
    pub date: NaiveDate,
    pub convoy_id: i64,
    /// Case-insensitive driver name / service number search
    #[serde(default)]
    pub search: Option<String>,
    /// Assignment status code filter (0..=4)
    #[serde(default)]
    pub status: Option<i32>,
    /// Show only lines checked on the release board
    #[serde(default)]
    pub only_checked: bool,
}

/// The dispatch day view after filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchViewResponse {
    pub date: NaiveDate,
    pub day_type: DayType,
    pub convoy_id: i64,
    pub route_groups: Vec<RouteGroup>,
    pub reserve_assignments: Vec<ReserveAssignment>,
    pub orders: Vec<OrderAssignment>,
    pub scheduled_repairs: Vec<ScheduledRepair>,
    pub totals: ResourceTotals,
    pub buses_on_line: usize,
    /// Release checkbox state per line, keyed by line id.
    pub checked: HashMap<DispatchBusLineId, bool>,
}

/// Query parameters for the depot summary listing.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryQuery {
    pub date: NaiveDate,
    pub depot_id: i64,
}

/// Response for the depot summary listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub date: NaiveDate,
    pub depot_id: i64,
    pub convoys: Vec<ConvoySummary>,
}

/// Request body for submitting a replacement on a bus line.
///
/// Omitted candidates mean "keep the current resource"; at least one
/// candidate must differ from what is currently installed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplacementRequestBody {
    pub date: NaiveDate,
    pub convoy_id: i64,
    #[serde(default)]
    pub driver: Option<DriverRef>,
    #[serde(default)]
    pub bus: Option<BusRef>,
}

/// Request body for toggling a line's release checkbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseRequestBody {
    pub date: NaiveDate,
    pub convoy_id: i64,
    pub checked: bool,
}

/// Query parameters for the scheduled repairs SSE stream.
#[derive(Debug, Clone, Deserialize)]
pub struct RepairStreamQuery {
    pub convoy_id: i64,
    pub date: NaiveDate,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Backend connectivity
    pub backend: String,
}
