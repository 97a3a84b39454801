//! In-memory repository for unit testing and local development.
//!
//! Seedable maps behind `parking_lot` locks stand in for the fleet backend.
//! Write operations mutate the stored day plan the way the real backend
//! would, and failure injection switches let tests exercise the rejection
//! and rollback paths.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::api::{
    AssignmentStatus, BusId, BusRef, Convoy, ConvoyId, DayType, DepotId, DispatchBusLineId,
    DispatchDay, DriverId, DriverRef, ReleaseMark, ReplacementKind, ReplacementRequest,
    ScheduledRepair, StatementId,
};
use crate::db::error::{ErrorContext, RepositoryError, RepositoryResult};
use crate::db::repository::{DispatchRepository, FleetRepository};
use crate::models::HolidayTable;

/// In-memory fleet backend.
#[derive(Default)]
pub struct LocalRepository {
    days: RwLock<HashMap<(NaiveDate, ConvoyId), DispatchDay>>,
    convoys: RwLock<Vec<Convoy>>,
    holidays: RwLock<HashMap<i32, HolidayTable>>,
    statements: RwLock<HashMap<(ConvoyId, NaiveDate), StatementId>>,
    fail_next_replace: AtomicBool,
    fail_next_update: AtomicBool,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a full day plan for a (date, convoy) pair.
    pub fn seed_day(&self, day: DispatchDay) {
        self.days.write().insert((day.date, day.convoy_id), day);
    }

    pub fn seed_convoy(&self, convoy: Convoy) {
        self.convoys.write().push(convoy);
    }

    pub fn seed_holidays(&self, year: i32, table: HolidayTable) {
        self.holidays.write().insert(year, table);
    }

    pub fn seed_statement(&self, convoy_id: ConvoyId, date: NaiveDate, statement: StatementId) {
        self.statements.write().insert((convoy_id, date), statement);
    }

    /// Make the next `replace_assignment` answer `Rejected`.
    pub fn fail_next_replace(&self) {
        self.fail_next_replace.store(true, Ordering::SeqCst);
    }

    /// Make the next `update_dispatch_status` answer `Rejected`.
    pub fn fail_next_update(&self) {
        self.fail_next_update.store(true, Ordering::SeqCst);
    }

    /// Current stored copy of a line, for test assertions.
    pub fn stored_line(&self, line_id: DispatchBusLineId) -> Option<crate::api::LineAssignment> {
        let days = self.days.read();
        for day in days.values() {
            for group in &day.route_groups {
                if let Some(line) = group.assignments.iter().find(|a| a.id == line_id) {
                    return Some(line.clone());
                }
            }
        }
        None
    }

    fn find_driver_ref(day: &DispatchDay, driver_id: DriverId) -> Option<DriverRef> {
        let from_reserve = day
            .reserve_assignments
            .iter()
            .filter_map(|r| r.driver.as_ref())
            .find(|d| d.id == driver_id);
        if let Some(found) = from_reserve {
            return Some(found.clone());
        }
        day.route_groups
            .iter()
            .flat_map(|g| g.assignments.iter())
            .filter_map(|a| a.driver.as_ref())
            .chain(day.orders.iter().filter_map(|o| o.driver.as_ref()))
            .find(|d| d.id == driver_id)
            .cloned()
    }

    fn find_bus_ref(day: &DispatchDay, bus_id: BusId) -> Option<BusRef> {
        let from_reserve = day
            .reserve_assignments
            .iter()
            .filter_map(|r| r.bus.as_ref())
            .find(|b| b.id == bus_id);
        if let Some(found) = from_reserve {
            return Some(found.clone());
        }
        day.route_groups
            .iter()
            .flat_map(|g| g.assignments.iter())
            .filter_map(|a| a.bus.as_ref())
            .chain(day.orders.iter().filter_map(|o| o.bus.as_ref()))
            .find(|b| b.id == bus_id)
            .cloned()
    }
}

#[async_trait]
impl DispatchRepository for LocalRepository {
    async fn get_full_dispatch_by_date(
        &self,
        date: NaiveDate,
        convoy_id: ConvoyId,
        day_type: DayType,
    ) -> RepositoryResult<DispatchDay> {
        let days = self.days.read();
        let mut day = days.get(&(date, convoy_id)).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("No dispatch plan for convoy {} on {}", convoy_id, date),
                ErrorContext::new("get_full_dispatch_by_date")
                    .with_entity("dispatch_day")
                    .with_entity_id(convoy_id),
            )
        })?;
        day.day_type = day_type;
        Ok(day)
    }

    async fn replace_assignment(&self, request: ReplacementRequest) -> RepositoryResult<()> {
        if self.fail_next_replace.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::rejected_with_context(
                "Replacement refused by dispatcher on duty",
                ErrorContext::new("replace_assignment")
                    .with_entity("dispatch_bus_line")
                    .with_entity_id(request.dispatch_bus_line_id),
            ));
        }

        let mut days = self.days.write();
        for day in days.values_mut() {
            let new_driver = request
                .driver_id
                .and_then(|id| Self::find_driver_ref(day, id));
            let new_bus = request.bus_id.and_then(|id| Self::find_bus_ref(day, id));

            let Some(line) = day
                .route_groups
                .iter_mut()
                .flat_map(|g| g.assignments.iter_mut())
                .find(|a| a.id == request.dispatch_bus_line_id)
            else {
                continue;
            };

            line.status = request.kind.as_status();
            if let Some(driver) = new_driver {
                line.driver = Some(driver);
            }
            if let Some(bus) = new_bus {
                line.bus = Some(bus);
            }

            // A reserve-sourced replacement consumes the matching pool row.
            if request.kind == ReplacementKind::Replaced {
                if let (Some(driver_id), Some(bus_id)) = (request.driver_id, request.bus_id) {
                    if let Some(entry) = day.reserve_assignments.iter_mut().find(|r| {
                        r.driver.as_ref().map(|d| d.id) == Some(driver_id)
                            && r.bus.as_ref().map(|b| b.id) == Some(bus_id)
                    }) {
                        entry.is_replace = true;
                    }
                }
            }
            return Ok(());
        }

        Err(RepositoryError::not_found_with_context(
            format!("Line {} not found", request.dispatch_bus_line_id),
            ErrorContext::new("replace_assignment")
                .with_entity("dispatch_bus_line")
                .with_entity_id(request.dispatch_bus_line_id),
        ))
    }

    async fn update_dispatch_status(
        &self,
        line_id: DispatchBusLineId,
        status: AssignmentStatus,
        is_released: bool,
    ) -> RepositoryResult<()> {
        if self.fail_next_update.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::rejected_with_context(
                "Status update refused",
                ErrorContext::new("update_dispatch_status")
                    .with_entity("dispatch_bus_line")
                    .with_entity_id(line_id),
            ));
        }

        let mut days = self.days.write();
        for day in days.values_mut() {
            if let Some(line) = day
                .route_groups
                .iter_mut()
                .flat_map(|g| g.assignments.iter_mut())
                .find(|a| a.id == line_id)
            {
                line.status = status;
                line.release = if is_released {
                    Some(ReleaseMark::at(chrono::Local::now().time()))
                } else {
                    None
                };
                return Ok(());
            }
        }

        Err(RepositoryError::not_found_with_context(
            format!("Line {} not found", line_id),
            ErrorContext::new("update_dispatch_status")
                .with_entity("dispatch_bus_line")
                .with_entity_id(line_id),
        ))
    }

    async fn fetch_scheduled_repairs(
        &self,
        convoy_id: ConvoyId,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<ScheduledRepair>> {
        let days = self.days.read();
        Ok(days
            .get(&(date, convoy_id))
            .map(|day| day.scheduled_repairs.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl FleetRepository for LocalRepository {
    async fn get_by_depot_id(&self, depot_id: DepotId) -> RepositoryResult<Vec<Convoy>> {
        Ok(self
            .convoys
            .read()
            .iter()
            .filter(|c| c.depot_id == depot_id)
            .cloned()
            .collect())
    }

    async fn fetch_holiday_table(&self, year: i32) -> RepositoryResult<HolidayTable> {
        Ok(self
            .holidays
            .read()
            .get(&year)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_statement(
        &self,
        convoy_id: ConvoyId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<StatementId>> {
        Ok(self.statements.read().get(&(convoy_id, date)).copied())
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}
