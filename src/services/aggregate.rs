//! Convoy-level aggregation of assigned resources.
//!
//! The same physical driver or bus can legitimately appear in more than one
//! data structure (a route assignment plus a stale reserve row, or two
//! route groups after a permutation), so all counts de-duplicate by id
//! before counting. Set-based de-duplication keeps the result independent
//! of iteration order.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};

use crate::api::{
    BusId, ConvoySummary, DepotId, DispatchDay, DriverId, OrderAssignment, ReserveAssignment,
    RouteGroup, StatementId,
};
use crate::db::{FullRepository, RepositoryError};
use crate::models::classify;

use super::error::DispatchResult;

/// De-duplicated driver/bus counts across a day's data structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct ResourceTotals {
    pub drivers_assigned: usize,
    pub buses_assigned: usize,
}

/// Count unique drivers and buses across route groups, reserve and orders.
pub fn aggregate(
    route_groups: &[RouteGroup],
    reserve: &[ReserveAssignment],
    orders: &[OrderAssignment],
) -> ResourceTotals {
    let mut drivers: HashSet<DriverId> = HashSet::new();
    let mut buses: HashSet<BusId> = HashSet::new();

    for group in route_groups {
        for assignment in &group.assignments {
            if let Some(driver) = &assignment.driver {
                drivers.insert(driver.id);
            }
            if let Some(bus) = &assignment.bus {
                buses.insert(bus.id);
            }
        }
    }
    for entry in reserve {
        if let Some(driver) = &entry.driver {
            drivers.insert(driver.id);
        }
        if let Some(bus) = &entry.bus {
            buses.insert(bus.id);
        }
    }
    for order in orders {
        if let Some(driver) = &order.driver {
            drivers.insert(driver.id);
        }
        if let Some(bus) = &order.bus {
            buses.insert(bus.id);
        }
    }

    ResourceTotals {
        drivers_assigned: drivers.len(),
        buses_assigned: buses.len(),
    }
}

/// Count lines that have left the depot.
pub fn count_buses_on_line(route_groups: &[RouteGroup]) -> usize {
    route_groups
        .iter()
        .flat_map(|g| g.assignments.iter())
        .filter(|a| a.is_on_line())
        .count()
}

/// Build the per-convoy summary read model for a fetched day plan.
pub fn summarize_convoy(
    day: &DispatchDay,
    existing_statement_id: Option<StatementId>,
) -> ConvoySummary {
    let totals = aggregate(&day.route_groups, &day.reserve_assignments, &day.orders);
    ConvoySummary {
        convoy_id: day.convoy_id,
        drivers_assigned: totals.drivers_assigned,
        buses_assigned: totals.buses_assigned,
        routes_count: day.route_groups.len(),
        buses_on_line: count_buses_on_line(&day.route_groups),
        existing_statement_id,
    }
}

/// Compute summaries for every convoy of a depot on a given date.
///
/// Classifies the date once (so each convoy's plan is fetched with the same
/// schedule variant), then fetches and summarizes each convoy's plan.
/// Convoys without a plan for the day get a zeroed summary rather than
/// failing the whole listing.
pub async fn depot_summaries(
    repo: &dyn FullRepository,
    depot_id: DepotId,
    date: NaiveDate,
) -> DispatchResult<Vec<ConvoySummary>> {
    let holidays = repo.fetch_holiday_table(date.year()).await?;
    let day_type = classify(date, &holidays);

    let convoys = repo.get_by_depot_id(depot_id).await?;
    let mut summaries = Vec::with_capacity(convoys.len());
    for convoy in convoys {
        let statement = repo.find_statement(convoy.id, date).await?;
        match repo.get_full_dispatch_by_date(date, convoy.id, day_type).await {
            Ok(day) => summaries.push(summarize_convoy(&day, statement)),
            Err(RepositoryError::NotFound { .. }) => summaries.push(ConvoySummary {
                convoy_id: convoy.id,
                drivers_assigned: 0,
                buses_assigned: 0,
                routes_count: 0,
                buses_on_line: 0,
                existing_statement_id: statement,
            }),
            Err(other) => return Err(other.into()),
        }
    }
    Ok(summaries)
}
