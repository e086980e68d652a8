pub mod grid;
pub mod homogeneous;

pub use grid::GridTravelTimeTable;
pub use homogeneous::HomogeneousEarth;

use crate::math::GeoHelper;

/// Source of P/S travel times indexed by source depth and angular distance.
///
/// `None` means the phase has no arrival for that combination. Implementations
/// are pure and shared read-only between search workers.
pub trait TravelTimeTable: Send + Sync {
    fn p_time(&self, depth_km: f64, angle_deg: f64) -> Option<f64>;
    fn s_time(&self, depth_km: f64, angle_deg: f64) -> Option<f64>;

    /// P travel time for a surface distance in kilometers.
    fn p_time_at_km(&self, depth_km: f64, distance_km: f64) -> Option<f64> {
        self.p_time(depth_km, GeoHelper::km_to_degrees(distance_km))
    }

    fn s_time_at_km(&self, depth_km: f64, distance_km: f64) -> Option<f64> {
        self.s_time(depth_km, GeoHelper::km_to_degrees(distance_km))
    }
}
