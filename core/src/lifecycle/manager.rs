use crate::lifecycle::archive::Archive;
use crate::lifecycle::pool::RecordPool;
use crate::math::Coordinate;
use crate::model::{Cluster, EarthquakeRecord, Hypocenter};
use std::sync::Arc;

/// Retention in minutes, two buckets per magnitude unit.
pub const RETENTION_MINUTES: [i64; 16] = [
    3, 3, // M0
    3, 3, // M1
    3, 3, // M2
    5, 6, // M3
    8, 16, // M4
    30, 30, // M5
    30, 30, // M6
    60, 60, // M7+
];

/// Anchor is moved to the hypocenter once they are this far apart.
pub const ANCHOR_DRIFT_KM: f64 = 400.0;

/// Outcome of accepting a hypocenter.
#[derive(Debug, Clone)]
pub enum Acceptance {
    Created(Arc<EarthquakeRecord>),
    Updated(Arc<EarthquakeRecord>),
}

/// Creates, updates and retires earthquake records.
pub struct RecordLifecycleManager {
    pool: Arc<RecordPool>,
    archive: Arc<dyn Archive>,
}

impl RecordLifecycleManager {
    pub fn new(pool: Arc<RecordPool>, archive: Arc<dyn Archive>) -> Self {
        Self { pool, archive }
    }

    pub fn pool(&self) -> &Arc<RecordPool> {
        &self.pool
    }

    /// Attaches a new record to the cluster or revises its existing one.
    pub fn accept(&self, cluster: &Arc<Cluster>, hypocenter: &Hypocenter, now_ms: i64) -> Acceptance {
        let acceptance = match cluster.earthquake() {
            Some(record) => {
                let revision = record.update(hypocenter, now_ms);
                log::debug!(
                    "cluster #{}: record #{} revision {}",
                    cluster.id(),
                    record.id(),
                    revision
                );
                self.pool.notify_updated(&record);
                Acceptance::Updated(record)
            }
            None => {
                let record = Arc::new(EarthquakeRecord::new(
                    self.pool.allocate_id(),
                    cluster,
                    hypocenter,
                    now_ms,
                ));
                log::info!(
                    "cluster #{}: new earthquake #{} at {:.3}, {:.3}, {:.1} km",
                    cluster.id(),
                    record.id(),
                    hypocenter.lat,
                    hypocenter.lon,
                    hypocenter.depth_km
                );
                cluster.set_earthquake(Some(record.clone()));
                self.pool.add(record.clone());
                Acceptance::Created(record)
            }
        };

        let solution = Coordinate::new(hypocenter.lat, hypocenter.lon);
        if cluster.anchor().distance_km(&solution) > ANCHOR_DRIFT_KM {
            cluster.update_anchor(solution);
        }
        acceptance
    }

    /// Detaches the cluster's record and drops it from the active set.
    pub fn demote(&self, cluster: &Cluster) -> bool {
        let Some(record) = cluster.earthquake() else {
            return false;
        };
        log::debug!("cluster #{}: demoting record #{}", cluster.id(), record.id());
        self.pool.remove(&record);
        cluster.set_earthquake(None);
        cluster.set_previous_hypocenter(None);
        true
    }

    pub fn retention_minutes(magnitude: f64) -> i64 {
        let bucket = (magnitude * 2.0) as i64;
        RETENTION_MINUTES[bucket.clamp(0, RETENTION_MINUTES.len() as i64 - 1) as usize]
    }

    /// True once the record is older than its retention window and has not
    /// been revised for a quarter of it.
    pub fn is_expired(record: &EarthquakeRecord, now_ms: i64) -> bool {
        let window_ms = Self::retention_minutes(record.magnitude()) * 60 * 1000;
        let state = record.state();
        now_ms - state.origin_ms > window_ms
            && (now_ms - state.last_update_ms) as f64 > 0.25 * window_ms as f64
    }

    /// Retires and archives every expired record, returning them.
    pub fn sweep(&self, now_ms: i64) -> Vec<Arc<EarthquakeRecord>> {
        let expired: Vec<Arc<EarthquakeRecord>> = self
            .pool
            .snapshot()
            .into_iter()
            .filter(|record| Self::is_expired(record, now_ms))
            .collect();

        let mut retired = Vec::with_capacity(expired.len());
        for record in expired {
            // A concurrent sweep may have retired it already.
            if !self.pool.remove(&record) {
                continue;
            }
            if let Err(err) = self.archive.archive(&record) {
                log::warn!("archiving earthquake #{} failed: {}", record.id(), err);
            }
            if let Some(cluster) = record.cluster() {
                if cluster
                    .earthquake()
                    .is_some_and(|current| Arc::ptr_eq(&current, &record))
                {
                    cluster.set_earthquake(None);
                }
            }
            retired.push(record);
        }
        retired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::archive::MemoryArchive;
    use crate::lifecycle::pool::RecordEvent;
    use crate::model::CandidateHypocenter;

    const MINUTE: i64 = 60_000;

    fn hypocenter(lat: f64, lon: f64, origin_ms: i64) -> Hypocenter {
        Hypocenter::from_candidate(
            &CandidateHypocenter {
                lat,
                lon,
                depth_km: 10.0,
                origin_ms,
                error_metric: 0.0,
                correct_stations: 8,
            },
            10,
        )
    }

    fn manager() -> (RecordLifecycleManager, Arc<MemoryArchive>) {
        let archive = Arc::new(MemoryArchive::new());
        let manager = RecordLifecycleManager::new(Arc::new(RecordPool::default()), archive.clone());
        (manager, archive)
    }

    #[test]
    fn retention_table_is_indexed_by_half_magnitudes() {
        assert_eq!(RecordLifecycleManager::retention_minutes(-1.0), 3);
        assert_eq!(RecordLifecycleManager::retention_minutes(2.0), 3);
        assert_eq!(RecordLifecycleManager::retention_minutes(3.6), 6);
        assert_eq!(RecordLifecycleManager::retention_minutes(4.5), 16);
        assert_eq!(RecordLifecycleManager::retention_minutes(9.0), 60);
    }

    #[test]
    fn first_acceptance_creates_then_updates_in_place() {
        let (manager, _) = manager();
        let mut events = manager.pool().subscribe();
        let cluster = Arc::new(Cluster::new(1, Coordinate::new(35.0, 139.0)));

        let created = match manager.accept(&cluster, &hypocenter(35.0, 139.0, 0), 10) {
            Acceptance::Created(record) => record,
            other => panic!("expected creation, got {:?}", other),
        };
        assert!(matches!(events.try_recv(), Ok(RecordEvent::Created(_))));
        assert_eq!(created.revision(), 1);

        match manager.accept(&cluster, &hypocenter(35.1, 139.1, 0), 20) {
            Acceptance::Updated(record) => assert!(Arc::ptr_eq(&record, &created)),
            other => panic!("expected update, got {:?}", other),
        }
        assert!(matches!(events.try_recv(), Ok(RecordEvent::Updated(_))));
        assert_eq!(created.revision(), 2);
        assert_eq!(created.state().lat, 35.1);
        assert_eq!(manager.pool().len(), 1);
    }

    #[test]
    fn anchor_follows_distant_solutions_only() {
        let (manager, _) = manager();
        let cluster = Arc::new(Cluster::new(1, Coordinate::new(0.0, 0.0)));
        manager.accept(&cluster, &hypocenter(1.0, 0.0, 0), 0);
        assert_eq!(cluster.anchor(), Coordinate::new(0.0, 0.0));
        manager.accept(&cluster, &hypocenter(5.0, 0.0, 0), 0);
        assert_eq!(cluster.anchor(), Coordinate::new(5.0, 0.0));
        assert_eq!(cluster.root(), Coordinate::new(0.0, 0.0));
    }

    #[test]
    fn demotion_detaches_and_unpools() {
        let (manager, _) = manager();
        let cluster = Arc::new(Cluster::new(1, Coordinate::new(0.0, 0.0)));
        assert!(!manager.demote(&cluster));
        manager.accept(&cluster, &hypocenter(0.0, 0.0, 0), 0);
        assert!(manager.demote(&cluster));
        assert!(cluster.earthquake().is_none());
        assert!(manager.pool().is_empty());
    }

    #[test]
    fn quiescent_small_quake_is_retired_exactly_once() {
        let (manager, archive) = manager();
        let cluster = Arc::new(Cluster::new(1, Coordinate::new(0.0, 0.0)));
        let record = match manager.accept(&cluster, &hypocenter(0.0, 0.0, 0), 0) {
            Acceptance::Created(record) => record,
            other => panic!("expected creation, got {:?}", other),
        };
        record.set_magnitude(vec![2.0], 2.0);

        assert!(manager.sweep(2 * MINUTE).is_empty());
        let retired = manager.sweep(3 * MINUTE + 1);
        assert_eq!(retired.len(), 1);
        assert!(manager.sweep(10 * MINUTE).is_empty());
        assert_eq!(archive.records().len(), 1);
        assert!(manager.pool().is_empty());
        assert!(cluster.earthquake().is_none());
    }

    #[test]
    fn recently_updated_quake_is_kept() {
        let (manager, archive) = manager();
        let cluster = Arc::new(Cluster::new(1, Coordinate::new(0.0, 0.0)));
        manager.accept(&cluster, &hypocenter(0.0, 0.0, 0), 0);
        manager.accept(&cluster, &hypocenter(0.0, 0.0, 0), 4 * MINUTE);
        assert!(manager.sweep(4 * MINUTE + 30_000).is_empty());
        assert_eq!(manager.sweep(5 * MINUTE).len(), 1);
        assert_eq!(archive.records().len(), 1);
    }
}
