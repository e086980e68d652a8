pub mod log;
pub mod metrics;

pub use log::PassLogger;
pub use metrics::{MetricsRecorder, MetricsSnapshot};
