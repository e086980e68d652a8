use crate::model::cluster::Cluster;
use crate::model::hypocenter::Hypocenter;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Location part of a record, replaced as a unit on every revision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordState {
    pub lat: f64,
    pub lon: f64,
    pub depth_km: f64,
    pub origin_ms: i64,
    pub confidence_pct: f64,
    pub last_update_ms: i64,
    /// Pick count the cluster must reach before the next search is run.
    pub next_report_event_count: usize,
}

#[derive(Debug, Default)]
struct MagnitudeState {
    value: f64,
    samples: Vec<f64>,
}

/// Long-lived earthquake record.
///
/// Updates mutate it in place and bump the revision, so holders of the
/// `Arc` always observe the latest solution.
#[derive(Debug)]
pub struct EarthquakeRecord {
    id: u64,
    cluster_id: u64,
    cluster: Weak<Cluster>,
    state: RwLock<RecordState>,
    magnitude: Mutex<MagnitudeState>,
    revision: AtomicU64,
}

impl EarthquakeRecord {
    pub fn new(id: u64, cluster: &Arc<Cluster>, hypocenter: &Hypocenter, now_ms: i64) -> Self {
        Self {
            id,
            cluster_id: cluster.id(),
            cluster: Arc::downgrade(cluster),
            state: RwLock::new(RecordState {
                lat: hypocenter.lat,
                lon: hypocenter.lon,
                depth_km: hypocenter.depth_km,
                origin_ms: hypocenter.origin_ms,
                confidence_pct: 100.0 * hypocenter.correctness(),
                last_update_ms: now_ms,
                next_report_event_count: 0,
            }),
            magnitude: Mutex::new(MagnitudeState::default()),
            revision: AtomicU64::new(1),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cluster_id(&self) -> u64 {
        self.cluster_id
    }

    /// Originating cluster, while it is still alive.
    pub fn cluster(&self) -> Option<Arc<Cluster>> {
        self.cluster.upgrade()
    }

    pub fn state(&self) -> RecordState {
        *self.state.read()
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Applies a newer solution and returns the new revision.
    pub fn update(&self, hypocenter: &Hypocenter, now_ms: i64) -> u64 {
        {
            let mut state = self.state.write();
            state.lat = hypocenter.lat;
            state.lon = hypocenter.lon;
            state.depth_km = hypocenter.depth_km;
            state.origin_ms = hypocenter.origin_ms;
            state.confidence_pct = 100.0 * hypocenter.correctness();
            state.last_update_ms = now_ms;
        }
        self.revision.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn next_report_event_count(&self) -> usize {
        self.state.read().next_report_event_count
    }

    pub fn set_next_report_event_count(&self, count: usize) {
        self.state.write().next_report_event_count = count;
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude.lock().value
    }

    pub fn magnitude_samples(&self) -> Vec<f64> {
        self.magnitude.lock().samples.clone()
    }

    /// Stores the per-station samples together with their aggregate.
    pub fn set_magnitude(&self, samples: Vec<f64>, value: f64) {
        let mut magnitude = self.magnitude.lock();
        magnitude.samples = samples;
        magnitude.value = value;
    }

    pub fn snapshot(&self) -> RecordSnapshot {
        let state = self.state();
        let (magnitude, magnitude_samples) = {
            let guard = self.magnitude.lock();
            (guard.value, guard.samples.clone())
        };
        RecordSnapshot {
            id: self.id,
            cluster_id: self.cluster_id,
            revision: self.revision(),
            lat: state.lat,
            lon: state.lon,
            depth_km: state.depth_km,
            origin_ms: state.origin_ms,
            confidence_pct: state.confidence_pct,
            last_update_ms: state.last_update_ms,
            magnitude,
            magnitude_samples,
        }
    }
}

/// Serializable point-in-time copy of a record for reporting and archival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSnapshot {
    pub id: u64,
    pub cluster_id: u64,
    pub revision: u64,
    pub lat: f64,
    pub lon: f64,
    pub depth_km: f64,
    pub origin_ms: i64,
    pub confidence_pct: f64,
    pub last_update_ms: i64,
    pub magnitude: f64,
    pub magnitude_samples: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Coordinate;
    use crate::model::hypocenter::CandidateHypocenter;

    fn hypocenter(lat: f64, correct: usize) -> Hypocenter {
        let candidate = CandidateHypocenter {
            lat,
            lon: 10.0,
            depth_km: 12.0,
            origin_ms: 5_000,
            error_metric: 0.0,
            correct_stations: correct,
        };
        Hypocenter::from_candidate(&candidate, 10)
    }

    #[test]
    fn update_mutates_in_place_and_bumps_revision() {
        let cluster = Arc::new(Cluster::new(3, Coordinate::new(0.0, 0.0)));
        let record = Arc::new(EarthquakeRecord::new(1, &cluster, &hypocenter(1.0, 5), 100));
        let held = record.clone();
        assert_eq!(record.revision(), 1);
        assert!((record.state().confidence_pct - 50.0).abs() < 1e-9);

        assert_eq!(record.update(&hypocenter(2.0, 9), 200), 2);
        assert_eq!(held.state().lat, 2.0);
        assert_eq!(held.state().last_update_ms, 200);
        assert_eq!(held.snapshot().revision, 2);
        assert_eq!(held.cluster().map(|c| c.id()), Some(3));
    }

    #[test]
    fn magnitude_samples_travel_with_the_value() {
        let cluster = Arc::new(Cluster::new(1, Coordinate::new(0.0, 0.0)));
        let record = EarthquakeRecord::new(1, &cluster, &hypocenter(0.0, 4), 0);
        record.set_magnitude(vec![3.0, 4.0], 3.0);
        assert_eq!(record.magnitude(), 3.0);
        assert_eq!(record.magnitude_samples(), vec![3.0, 4.0]);
        drop(cluster);
        assert!(record.cluster().is_none());
    }
}
