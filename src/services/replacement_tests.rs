use chrono::NaiveDate;

use crate::api::{
    AssignmentStatus, BusId, BusRef, ConvoyId, DayType, DispatchBusLineId, DispatchDay, DriverId,
    DriverRef, LineAssignment, ReplacementKind, ReserveAssignment, RouteGroup, RouteId,
};
use crate::db::LocalRepository;
use crate::services::error::DispatchError;
use crate::services::replacement::{decide, submit_replacement};

fn driver(id: i64, name: &str) -> DriverRef {
    DriverRef {
        id: DriverId::new(id),
        full_name: name.to_string(),
        service_number: format!("{:04}", id),
    }
}

fn bus(id: i64) -> BusRef {
    BusRef {
        id: BusId::new(id),
        garage_number: format!("G{}", id),
        gov_number: format!("AB {} 77", id),
    }
}

fn assignment() -> LineAssignment {
    LineAssignment {
        id: DispatchBusLineId::new(1),
        route_id: RouteId::new(1),
        route_number: "23".to_string(),
        bus_line_number: "1".to_string(),
        driver: Some(driver(10, "Ivanov I. I.")),
        bus: Some(bus(100)),
        status: AssignmentStatus::Undefined,
        release: None,
    }
}

fn reserve_entry(seq: u32, d: Option<DriverRef>, b: Option<BusRef>) -> ReserveAssignment {
    ReserveAssignment {
        sequence_number: seq,
        driver: d,
        bus: b,
        is_replace: false,
    }
}

#[test]
fn no_op_edit_is_a_validation_error() {
    let current = assignment();
    let same_driver = driver(10, "Ivanov I. I.");
    let same_bus = bus(100);

    let err = decide(&current, Some(&same_driver), Some(&same_bus), &[]).unwrap_err();
    assert!(matches!(err, DispatchError::Validation(_)));
    assert_eq!(err.user_message(), "No replacement selected");

    // No candidates at all is the same validation error.
    let err = decide(&current, None, None, &[]).unwrap_err();
    assert!(matches!(err, DispatchError::Validation(_)));
}

#[test]
fn reserve_pair_match_is_replaced() {
    // Current (driver A, bus B1); reserve holds (A, B2); candidate bus B2.
    let current = assignment();
    let reserve = vec![reserve_entry(
        1,
        Some(driver(10, "Ivanov I. I.")),
        Some(bus(200)),
    )];
    let candidate_bus = bus(200);

    let decision = decide(&current, None, Some(&candidate_bus), &reserve).unwrap();
    assert_eq!(decision.kind, ReplacementKind::Replaced);
    assert_eq!(decision.driver_id, Some(DriverId::new(10)));
    assert_eq!(decision.bus_id, Some(BusId::new(200)));
}

#[test]
fn non_reserve_change_is_permutation() {
    let current = assignment();
    let reserve = vec![reserve_entry(1, Some(driver(12, "Petrov P. P.")), Some(bus(300)))];
    let candidate_driver = driver(11, "Sidorov S. S.");

    let decision = decide(&current, Some(&candidate_driver), None, &reserve).unwrap();
    assert_eq!(decision.kind, ReplacementKind::Permutation);
    assert_eq!(decision.driver_id, Some(DriverId::new(11)));
    // Bus id falls back to the current one.
    assert_eq!(decision.bus_id, Some(BusId::new(100)));
}

#[test]
fn both_resources_may_change_at_once() {
    let current = assignment();
    let candidate_driver = driver(11, "Sidorov S. S.");
    let candidate_bus = bus(201);

    let decision = decide(&current, Some(&candidate_driver), Some(&candidate_bus), &[]).unwrap();
    assert_eq!(decision.kind, ReplacementKind::Permutation);
    assert_eq!(decision.driver_id, Some(DriverId::new(11)));
    assert_eq!(decision.bus_id, Some(BusId::new(201)));
}

#[test]
fn candidate_equal_to_current_does_not_count_as_change() {
    let current = assignment();
    let same_driver = driver(10, "Ivanov I. I.");
    let candidate_bus = bus(200);

    // Driver candidate equals current; only the bus differs.
    let decision = decide(&current, Some(&same_driver), Some(&candidate_bus), &[]).unwrap();
    assert_eq!(decision.kind, ReplacementKind::Permutation);
}

fn seed_day(repo: &LocalRepository) -> DispatchDay {
    let day = DispatchDay {
        date: NaiveDate::from_ymd_opt(2024, 3, 13).unwrap(),
        day_type: DayType::Workday,
        convoy_id: ConvoyId::new(5),
        route_groups: vec![RouteGroup {
            route_id: RouteId::new(1),
            route_number: "23".to_string(),
            assignments: vec![assignment()],
        }],
        reserve_assignments: vec![reserve_entry(
            1,
            Some(driver(10, "Ivanov I. I.")),
            Some(bus(200)),
        )],
        orders: vec![],
        scheduled_repairs: vec![],
    };
    repo.seed_day(day.clone());
    day
}

#[tokio::test]
async fn committed_replacement_returns_updated_assignment() {
    let repo = LocalRepository::new();
    let day = seed_day(&repo);
    let current = &day.route_groups[0].assignments[0];
    let candidate_bus = bus(200);

    let updated = submit_replacement(
        &repo,
        current,
        None,
        Some(&candidate_bus),
        &day.reserve_assignments,
    )
    .await
    .unwrap();

    assert_eq!(updated.status, AssignmentStatus::Replaced);
    assert_eq!(updated.bus.as_ref().unwrap().id, BusId::new(200));
    assert_eq!(updated.driver.as_ref().unwrap().id, DriverId::new(10));

    // The backend marked the consumed reserve row.
    let stored = repo.stored_line(current.id).unwrap();
    assert_eq!(stored.status, AssignmentStatus::Replaced);
}

#[tokio::test]
async fn rejected_commit_surfaces_error_and_leaves_state() {
    let repo = LocalRepository::new();
    let day = seed_day(&repo);
    let current = &day.route_groups[0].assignments[0];
    let candidate_bus = bus(200);

    repo.fail_next_replace();
    let err = submit_replacement(
        &repo,
        current,
        None,
        Some(&candidate_bus),
        &day.reserve_assignments,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DispatchError::Rejected { .. }));
    // Stored assignment is untouched.
    let stored = repo.stored_line(current.id).unwrap();
    assert_eq!(stored.status, AssignmentStatus::Undefined);
    assert_eq!(stored.bus.as_ref().unwrap().id, BusId::new(100));
}

#[tokio::test]
async fn validation_error_makes_no_backend_call() {
    let repo = LocalRepository::new();
    let day = seed_day(&repo);
    let current = &day.route_groups[0].assignments[0];

    // Arm the failure switch: if a call were made, it would be consumed.
    repo.fail_next_replace();
    let err = submit_replacement(&repo, current, None, None, &day.reserve_assignments)
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Validation(_)));

    // The armed rejection is still pending, proving no call happened.
    let candidate_bus = bus(200);
    let err = submit_replacement(
        &repo,
        current,
        None,
        Some(&candidate_bus),
        &day.reserve_assignments,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DispatchError::Rejected { .. }));
}
