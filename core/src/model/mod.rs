pub mod cluster;
pub mod hypocenter;
pub mod pick;
pub mod record;

pub use cluster::{Cluster, ClusterRegistry, StationObservation};
pub use hypocenter::{CandidateHypocenter, Hypocenter};
pub use pick::{PickedEvent, WorkingPick};
pub use record::{EarthquakeRecord, RecordSnapshot, RecordState};
