pub mod estimator;
pub mod intensity;

pub use estimator::MagnitudeEstimator;
pub use intensity::{IntensityTable, LocalMagnitudeTable};
