pub mod geo;
pub mod stats;

pub use geo::{Coordinate, GeoHelper, GlobeMove};
pub use stats::StatsHelper;
