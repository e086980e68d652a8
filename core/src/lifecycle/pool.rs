use crate::model::EarthquakeRecord;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Change notification for rendering, alerting and reporting layers.
#[derive(Debug, Clone)]
pub enum RecordEvent {
    Created(Arc<EarthquakeRecord>),
    Updated(Arc<EarthquakeRecord>),
    Removed(Arc<EarthquakeRecord>),
}

/// Insertion-ordered set of active earthquake records.
///
/// Readers iterate over snapshots, so additions and removals never
/// invalidate an iteration in progress.
pub struct RecordPool {
    records: RwLock<Vec<Arc<EarthquakeRecord>>>,
    events: broadcast::Sender<RecordEvent>,
    next_id: AtomicU64,
}

impl RecordPool {
    pub fn new(event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            records: RwLock::new(Vec::new()),
            events,
            next_id: AtomicU64::new(0),
        }
    }

    pub fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RecordEvent> {
        self.events.subscribe()
    }

    pub fn add(&self, record: Arc<EarthquakeRecord>) {
        self.records.write().push(record.clone());
        self.publish(RecordEvent::Created(record));
    }

    pub fn notify_updated(&self, record: &Arc<EarthquakeRecord>) {
        self.publish(RecordEvent::Updated(record.clone()));
    }

    /// Removes `record` by identity; false if it was not pooled.
    pub fn remove(&self, record: &Arc<EarthquakeRecord>) -> bool {
        let removed = {
            let mut records = self.records.write();
            let before = records.len();
            records.retain(|pooled| !Arc::ptr_eq(pooled, record));
            records.len() != before
        };
        if removed {
            self.publish(RecordEvent::Removed(record.clone()));
        }
        removed
    }

    pub fn snapshot(&self) -> Vec<Arc<EarthquakeRecord>> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn publish(&self, event: RecordEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }
}

impl Default for RecordPool {
    fn default() -> Self {
        Self::new(256)
    }
}
