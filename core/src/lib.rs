//! Hypocenter determination core for the Rust earthquake detection platform.
//!
//! Clustered P-wave picks go through pick selection, a five-phase grid search
//! and plausibility gating before they become long-lived earthquake records
//! with a magnitude and a retention lifecycle.

pub mod analysis;
pub mod lifecycle;
pub mod locate;
pub mod magnitude;
pub mod math;
pub mod model;
pub mod prelude;
pub mod telemetry;
pub mod traveltime;

#[cfg(test)]
pub(crate) mod testing;

pub use analysis::{AnalysisContext, ClusterOutcome, ClusterReport, EarthquakeAnalysis, PassReport};
pub use prelude::{AnalysisSettings, QuakeError, QuakeResult, SearchSettings};
