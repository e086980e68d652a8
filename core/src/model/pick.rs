use serde::{Deserialize, Serialize};

/// Validated P-wave arrival at one station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickedEvent {
    pub p_arrival_ms: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: f64,
    pub signal_ratio: f64,
}

impl PickedEvent {
    pub fn new(
        p_arrival_ms: i64,
        latitude: f64,
        longitude: f64,
        elevation_m: f64,
        signal_ratio: f64,
    ) -> Self {
        Self {
            p_arrival_ms,
            latitude,
            longitude,
            elevation_m,
            signal_ratio,
        }
    }
}

/// Pick annotated with its distance to the candidate under evaluation.
/// Owned by a single search worker.
#[derive(Debug, Clone, Copy)]
pub struct WorkingPick {
    pub pick: PickedEvent,
    pub distance_km: f64,
}

impl From<PickedEvent> for WorkingPick {
    fn from(pick: PickedEvent) -> Self {
        Self {
            pick,
            distance_km: 0.0,
        }
    }
}
