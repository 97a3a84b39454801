//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for dispatch decisions.

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use chrono::{Datelike, NaiveDate};
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;

use super::dto::{
    ConvoyListResponse, ConvoyQuery, DispatchQuery, DispatchViewResponse, HealthResponse,
    ReleaseRequestBody, ReplacementRequestBody, RepairStreamQuery, SummaryQuery, SummaryResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{
    AssignmentStatus, ConvoyId, DepotId, DispatchBusLineId, DispatchDay, LineAssignment,
    ReleaseUpdate,
};
use crate::db::DispatchRepository;
use crate::models::classify;
use crate::services::{
    self, RepairWatch, ViewFilter, REPAIR_POLL_INTERVAL,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Fetch a convoy's day plan, classifying the date first.
async fn load_day(
    state: &AppState,
    date: NaiveDate,
    convoy_id: ConvoyId,
) -> Result<DispatchDay, AppError> {
    let holidays = state.repository.fetch_holiday_table(date.year()).await?;
    let day_type = classify(date, &holidays);
    let day = state
        .repository
        .get_full_dispatch_by_date(date, convoy_id, day_type)
        .await?;
    Ok(day)
}

fn find_line(day: &DispatchDay, line_id: DispatchBusLineId) -> Result<LineAssignment, AppError> {
    day.route_groups
        .iter()
        .flat_map(|group| group.assignments.iter())
        .find(|assignment| assignment.id == line_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Bus line {} not found in the day plan", line_id)))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Verify the service is running and the backend is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let backend = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        backend,
    }))
}

// =============================================================================
// Convoys
// =============================================================================

/// GET /v1/convoys?depot_id=
pub async fn list_convoys(
    State(state): State<AppState>,
    Query(query): Query<ConvoyQuery>,
) -> HandlerResult<ConvoyListResponse> {
    let convoys = state
        .repository
        .get_by_depot_id(DepotId::new(query.depot_id))
        .await?;
    let total = convoys.len();
    Ok(Json(ConvoyListResponse { convoys, total }))
}

// =============================================================================
// Dispatch Day View
// =============================================================================

/// GET /v1/dispatch?date=&convoy_id=&search=&status=&only_checked=
///
/// The filtered day plan for one convoy. Totals are computed over the full
/// plan, not the filtered view, so they stay stable while the dispatcher
/// types in the search box.
pub async fn get_dispatch(
    State(state): State<AppState>,
    Query(query): Query<DispatchQuery>,
) -> HandlerResult<DispatchViewResponse> {
    let status = match query.status {
        Some(code) => Some(
            AssignmentStatus::from_code(code)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown status code {}", code)))?,
        ),
        None => None,
    };

    let convoy_id = ConvoyId::new(query.convoy_id);
    let day = load_day(&state, query.date, convoy_id).await?;

    let checked: std::collections::HashMap<_, _> = day
        .route_groups
        .iter()
        .flat_map(|group| group.assignments.iter())
        .map(|a| (a.id, state.release_board.is_checked(a)))
        .collect();

    let filter = ViewFilter {
        search: query.search.clone(),
        status,
        only_checked: query.only_checked,
    };
    let route_groups = services::project(&day.route_groups, &filter, &checked);
    let reserve_assignments =
        services::search_reserve(&day.reserve_assignments, query.search.as_deref());

    let totals = services::aggregate(&day.route_groups, &day.reserve_assignments, &day.orders);
    let buses_on_line = services::count_buses_on_line(&day.route_groups);

    Ok(Json(DispatchViewResponse {
        date: day.date,
        day_type: day.day_type,
        convoy_id: query.convoy_id,
        route_groups,
        reserve_assignments,
        orders: day.orders,
        scheduled_repairs: day.scheduled_repairs,
        totals,
        buses_on_line,
        checked,
    }))
}

/// GET /v1/dispatch/summary?date=&depot_id=
pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> HandlerResult<SummaryResponse> {
    let convoys = services::depot_summaries(
        state.repository.as_ref(),
        DepotId::new(query.depot_id),
        query.date,
    )
    .await?;

    Ok(Json(SummaryResponse {
        date: query.date,
        depot_id: query.depot_id,
        convoys,
    }))
}

// =============================================================================
// Replacement and Release
// =============================================================================

/// POST /v1/dispatch/{line_id}/replacement
///
/// Classify and commit a driver/bus replacement on one line. Returns the
/// updated assignment on success.
pub async fn submit_replacement(
    State(state): State<AppState>,
    Path(line_id): Path<i64>,
    Json(body): Json<ReplacementRequestBody>,
) -> HandlerResult<LineAssignment> {
    let line_id = DispatchBusLineId::new(line_id);
    let day = load_day(&state, body.date, ConvoyId::new(body.convoy_id)).await?;
    let current = find_line(&day, line_id)?;

    let updated = services::submit_replacement(
        state.repository.as_ref(),
        &current,
        body.driver.as_ref(),
        body.bus.as_ref(),
        &day.reserve_assignments,
    )
    .await?;

    Ok(Json(updated))
}

/// POST /v1/dispatch/{line_id}/release
///
/// Toggle a line's release checkbox. The board is shared application state,
/// so concurrent dispatch views observe the same checked set.
pub async fn toggle_release(
    State(state): State<AppState>,
    Path(line_id): Path<i64>,
    Json(body): Json<ReleaseRequestBody>,
) -> HandlerResult<ReleaseUpdate> {
    let line_id = DispatchBusLineId::new(line_id);
    let day = load_day(&state, body.date, ConvoyId::new(body.convoy_id)).await?;
    let current = find_line(&day, line_id)?;

    let update = state
        .release_board
        .toggle(state.repository.as_ref(), &current, body.checked)
        .await?;

    Ok(Json(update))
}

// =============================================================================
// Scheduled Repairs Stream
// =============================================================================

/// GET /v1/repairs/stream?convoy_id=&date=
///
/// Server-sent events feed of the convoy's scheduled repairs, re-polled
/// every five seconds. The poller stops when the client disconnects.
pub async fn stream_repairs(
    State(state): State<AppState>,
    Query(query): Query<RepairStreamQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let repository: Arc<dyn DispatchRepository> = state.repository.clone();
    let watch = RepairWatch::start(repository, ConvoyId::new(query.convoy_id), query.date);

    let stream = async_stream::stream! {
        // Let the watcher's immediate first poll land before the first event.
        tokio::task::yield_now().await;
        loop {
            let payload = serde_json::to_string(&watch.current()).unwrap_or_default();
            yield Ok(Event::default().event("repairs").data(payload));
            tokio::time::sleep(REPAIR_POLL_INTERVAL).await;
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
