//! Repository traits for the fleet backend boundary.
//!
//! The dispatch core never talks to storage directly; everything crosses an
//! RPC-style boundary with a `{is_success, error?, value?}` envelope. These
//! traits abstract that boundary so the in-memory backend can stand in for
//! the real one in tests and local development.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::api::{
    AssignmentStatus, Convoy, ConvoyId, DayType, DepotId, DispatchBusLineId, DispatchDay,
    ReplacementRequest, ScheduledRepair, StatementId,
};
use crate::models::HolidayTable;

/// Repository trait for per-day dispatch operations.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
///
/// # Caller obligation
/// The backend exchanges no concurrency token, so callers must not issue a
/// second write for the same `DispatchBusLineId` while one is in flight.
#[async_trait]
pub trait DispatchRepository: Send + Sync {
    /// Fetch the full dispatch plan for a (date, convoy) pair.
    ///
    /// `day_type` selects the schedule variant; callers derive it with
    /// [`crate::models::classify`] so all reads of the same date agree.
    async fn get_full_dispatch_by_date(
        &self,
        date: NaiveDate,
        convoy_id: ConvoyId,
        day_type: DayType,
    ) -> RepositoryResult<DispatchDay>;

    /// Commit a classified replacement or permutation for one line.
    ///
    /// # Returns
    /// * `Ok(())` - the backend accepted the change
    /// * `Err(RepositoryError::Rejected)` - the backend refused it
    async fn replace_assignment(&self, request: ReplacementRequest) -> RepositoryResult<()>;

    /// Commit a release-status change for one line.
    async fn update_dispatch_status(
        &self,
        line_id: DispatchBusLineId,
        status: AssignmentStatus,
        is_released: bool,
    ) -> RepositoryResult<()>;

    /// Current scheduled-repair list for a convoy's day; read-only, polled
    /// for display refresh.
    async fn fetch_scheduled_repairs(
        &self,
        convoy_id: ConvoyId,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<ScheduledRepair>>;
}

/// Repository trait for depot-level reference data.
#[async_trait]
pub trait FleetRepository: Send + Sync {
    /// Enumerate the convoys of a depot.
    async fn get_by_depot_id(&self, depot_id: DepotId) -> RepositoryResult<Vec<Convoy>>;

    /// Holiday calendar for a year, passed explicitly into classification.
    async fn fetch_holiday_table(&self, year: i32) -> RepositoryResult<HolidayTable>;

    /// Existing dispatch statement for a (convoy, date), if one was filed.
    async fn find_statement(
        &self,
        convoy_id: ConvoyId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<StatementId>>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}

/// Combined repository interface used by application state.
pub trait FullRepository: DispatchRepository + FleetRepository {}

impl<T: DispatchRepository + FleetRepository> FullRepository for T {}
