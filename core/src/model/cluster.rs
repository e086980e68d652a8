use crate::math::Coordinate;
use crate::model::hypocenter::Hypocenter;
use crate::model::pick::PickedEvent;
use crate::model::record::EarthquakeRecord;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Station observation assigned to a cluster by the clustering stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationObservation {
    pub station_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: f64,
    pub p_arrival_ms: i64,
    /// Peak signal-to-background ratio seen so far.
    pub max_ratio: f64,
    /// Time of the most recent waveform sample analysed for this station.
    pub latest_sample_ms: i64,
    pub valid: bool,
}

impl StationObservation {
    pub fn to_pick(&self) -> PickedEvent {
        PickedEvent::new(
            self.p_arrival_ms,
            self.latitude,
            self.longitude,
            self.elevation_m,
            self.max_ratio,
        )
    }
}

#[derive(Debug)]
struct Geometry {
    anchor: Coordinate,
    root: Coordinate,
}

/// Spatio-temporal group of station observations believed to share one source.
///
/// Every field that the search shares with readers sits behind its own lock.
#[derive(Debug)]
pub struct Cluster {
    id: u64,
    geometry: RwLock<Geometry>,
    observations: RwLock<Vec<StationObservation>>,
    update_count: AtomicU64,
    last_searched_update: Mutex<Option<u64>>,
    selected: Mutex<Vec<PickedEvent>>,
    previous_hypocenter: Mutex<Option<Hypocenter>>,
    earthquake: Mutex<Option<Arc<EarthquakeRecord>>>,
}

impl Cluster {
    /// Creates a cluster whose anchor starts at its formation root.
    pub fn new(id: u64, root: Coordinate) -> Self {
        Self {
            id,
            geometry: RwLock::new(Geometry { anchor: root, root }),
            observations: RwLock::new(Vec::new()),
            update_count: AtomicU64::new(0),
            last_searched_update: Mutex::new(None),
            selected: Mutex::new(Vec::new()),
            previous_hypocenter: Mutex::new(None),
            earthquake: Mutex::new(None),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn anchor(&self) -> Coordinate {
        self.geometry.read().anchor
    }

    pub fn root(&self) -> Coordinate {
        self.geometry.read().root
    }

    pub fn update_anchor(&self, anchor: Coordinate) {
        self.geometry.write().anchor = anchor;
    }

    pub fn update_count(&self) -> u64 {
        self.update_count.load(Ordering::Acquire)
    }

    /// Adds or replaces the observation of a station and bumps the update counter.
    pub fn assign(&self, observation: StationObservation) {
        let mut observations = self.observations.write();
        match observations
            .iter_mut()
            .find(|existing| existing.station_id == observation.station_id)
        {
            Some(existing) => *existing = observation,
            None => observations.push(observation),
        }
        self.update_count.fetch_add(1, Ordering::AcqRel);
    }

    pub fn observations(&self) -> Vec<StationObservation> {
        self.observations.read().clone()
    }

    /// Picks of every valid observation.
    pub fn picked_events(&self) -> Vec<PickedEvent> {
        self.observations
            .read()
            .iter()
            .filter(|observation| observation.valid)
            .map(StationObservation::to_pick)
            .collect()
    }

    /// Records the current update counter as searched; false if it already was.
    pub fn mark_searched(&self) -> bool {
        let current = self.update_count();
        let mut last = self.last_searched_update.lock();
        if *last == Some(current) {
            return false;
        }
        *last = Some(current);
        true
    }

    pub fn selected(&self) -> Vec<PickedEvent> {
        self.selected.lock().clone()
    }

    pub fn set_selected(&self, selected: Vec<PickedEvent>) {
        *self.selected.lock() = selected;
    }

    pub fn previous_hypocenter(&self) -> Option<Hypocenter> {
        *self.previous_hypocenter.lock()
    }

    pub fn set_previous_hypocenter(&self, hypocenter: Option<Hypocenter>) {
        *self.previous_hypocenter.lock() = hypocenter;
    }

    pub fn earthquake(&self) -> Option<Arc<EarthquakeRecord>> {
        self.earthquake.lock().clone()
    }

    pub fn set_earthquake(&self, record: Option<Arc<EarthquakeRecord>>) {
        *self.earthquake.lock() = record;
    }
}

/// Shared collection of active clusters with snapshot iteration.
#[derive(Debug, Default)]
pub struct ClusterRegistry {
    clusters: RwLock<Vec<Arc<Cluster>>>,
    next_id: AtomicU64,
}

impl ClusterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and registers a new cluster rooted at `root`.
    pub fn create(&self, root: Coordinate) -> Arc<Cluster> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let cluster = Arc::new(Cluster::new(id, root));
        self.clusters.write().push(cluster.clone());
        cluster
    }

    pub fn remove(&self, id: u64) -> Option<Arc<Cluster>> {
        let mut clusters = self.clusters.write();
        let index = clusters.iter().position(|cluster| cluster.id() == id)?;
        Some(clusters.remove(index))
    }

    pub fn snapshot(&self) -> Vec<Arc<Cluster>> {
        self.clusters.read().clone()
    }

    pub fn len(&self) -> usize {
        self.clusters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
