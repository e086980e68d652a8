pub mod archive;
pub mod manager;
pub mod pool;

pub use archive::{Archive, JsonLinesArchive, MemoryArchive};
pub use manager::{Acceptance, RecordLifecycleManager, ANCHOR_DRIFT_KM, RETENTION_MINUTES};
pub use pool::{RecordEvent, RecordPool};
