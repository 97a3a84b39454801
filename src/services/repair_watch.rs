//! Background polling of scheduled repairs for a convoy.
//!
//! The watcher re-fetches the repair list every five seconds and keeps the
//! latest successful snapshot available to readers. A failed poll keeps the
//! previous snapshot and logs a warning instead of tearing the watcher down.

use chrono::NaiveDate;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::api::{ConvoyId, ScheduledRepair};
use crate::db::DispatchRepository;

/// Re-poll interval for the repairs feed.
pub const REPAIR_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Handle over a running repair poller.
///
/// Dropping the watcher aborts the background task.
pub struct RepairWatch {
    snapshot: Arc<RwLock<Vec<ScheduledRepair>>>,
    task: JoinHandle<()>,
}

impl RepairWatch {
    /// Spawn a poller for the given convoy and date.
    pub fn start(
        repository: Arc<dyn DispatchRepository>,
        convoy_id: ConvoyId,
        date: NaiveDate,
    ) -> Self {
        let snapshot = Arc::new(RwLock::new(Vec::new()));
        let shared = Arc::clone(&snapshot);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(REPAIR_POLL_INTERVAL);
            loop {
                ticker.tick().await;
                match repository.fetch_scheduled_repairs(convoy_id, date).await {
                    Ok(repairs) => {
                        *shared.write() = repairs;
                    }
                    Err(err) => {
                        log::warn!(
                            "Repair poll failed for convoy {} on {}: {}",
                            convoy_id,
                            date,
                            err
                        );
                    }
                }
            }
        });
        Self { snapshot, task }
    }

    /// Latest successfully fetched repair list.
    pub fn current(&self) -> Vec<ScheduledRepair> {
        self.snapshot.read().clone()
    }

    /// Stop polling.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for RepairWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BusId, BusRef, DispatchDay};
    use crate::db::LocalRepository;
    use crate::models::classify;
    use crate::models::HolidayTable;

    fn repair(id: i64) -> ScheduledRepair {
        ScheduledRepair {
            id,
            bus: Some(BusRef {
                id: BusId::new(id),
                garage_number: format!("G{}", id),
                gov_number: format!("XX {} 77", id),
            }),
            description: "Brake inspection".to_string(),
            reported_at: NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
        }
    }

    fn seeded_repo(repairs: Vec<ScheduledRepair>) -> Arc<LocalRepository> {
        let repo = Arc::new(LocalRepository::new());
        let date = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let convoy_id = ConvoyId::new(1);
        repo.seed_day(DispatchDay {
            date,
            day_type: classify(date, &HolidayTable::new()),
            convoy_id,
            route_groups: Vec::new(),
            reserve_assignments: Vec::new(),
            orders: Vec::new(),
            scheduled_repairs: repairs,
        });
        repo
    }

    #[tokio::test(start_paused = true)]
    async fn watcher_picks_up_the_repair_list() {
        let repo = seeded_repo(vec![repair(1), repair(2)]);
        let date = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let watch = RepairWatch::start(repo, ConvoyId::new(1), date);

        // First tick fires immediately; yield so the poll completes.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(watch.current().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn watcher_refreshes_on_the_poll_interval() {
        let repo = seeded_repo(vec![repair(1)]);
        let date = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let watch = RepairWatch::start(Arc::clone(&repo) as Arc<dyn DispatchRepository>, ConvoyId::new(1), date);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(watch.current().len(), 1);

        repo.seed_day(DispatchDay {
            date,
            day_type: classify(date, &HolidayTable::new()),
            convoy_id: ConvoyId::new(1),
            route_groups: Vec::new(),
            reserve_assignments: Vec::new(),
            orders: Vec::new(),
            scheduled_repairs: vec![repair(1), repair(2), repair(3)],
        });

        tokio::time::sleep(REPAIR_POLL_INTERVAL + Duration::from_millis(10)).await;
        assert_eq!(watch.current().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_polling() {
        let repo = seeded_repo(vec![repair(1)]);
        let date = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let watch = RepairWatch::start(repo, ConvoyId::new(1), date);

        tokio::time::sleep(Duration::from_millis(10)).await;
        watch.stop();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(watch.task.is_finished());
    }
}
