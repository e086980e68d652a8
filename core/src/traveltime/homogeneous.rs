use crate::math::geo::EARTH_RADIUS_KM;
use crate::prelude::MAX_DEPTH_KM;
use crate::traveltime::TravelTimeTable;
use serde::{Deserialize, Serialize};

/// Straight-ray travel times through a constant-velocity Earth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomogeneousEarth {
    pub vp_km_s: f64,
    pub vs_km_s: f64,
    /// Angular distance past which neither phase is reported.
    pub max_angle_deg: f64,
    pub max_depth_km: f64,
}

impl Default for HomogeneousEarth {
    fn default() -> Self {
        Self {
            vp_km_s: 6.0,
            vs_km_s: 3.5,
            max_angle_deg: 100.0,
            max_depth_km: MAX_DEPTH_KM,
        }
    }
}

impl HomogeneousEarth {
    fn ray_length_km(&self, depth_km: f64, angle_deg: f64) -> Option<f64> {
        if !(0.0..=self.max_depth_km).contains(&depth_km)
            || !(0.0..=self.max_angle_deg).contains(&angle_deg)
        {
            return None;
        }
        let source_radius = EARTH_RADIUS_KM - depth_km;
        let chord_sq = source_radius.powi(2) + EARTH_RADIUS_KM.powi(2)
            - 2.0 * source_radius * EARTH_RADIUS_KM * angle_deg.to_radians().cos();
        Some(chord_sq.max(0.0).sqrt())
    }
}

impl TravelTimeTable for HomogeneousEarth {
    fn p_time(&self, depth_km: f64, angle_deg: f64) -> Option<f64> {
        self.ray_length_km(depth_km, angle_deg)
            .map(|length| length / self.vp_km_s)
    }

    fn s_time(&self, depth_km: f64, angle_deg: f64) -> Option<f64> {
        self.ray_length_km(depth_km, angle_deg)
            .map(|length| length / self.vs_km_s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_ray_takes_depth_over_velocity() {
        let earth = HomogeneousEarth::default();
        let p = earth.p_time(6.0, 0.0).unwrap();
        assert!((p - 1.0).abs() < 1e-9);
        assert!(earth.s_time(6.0, 0.0).unwrap() > p);
    }

    #[test]
    fn no_arrival_outside_coverage() {
        let earth = HomogeneousEarth::default();
        assert_eq!(earth.p_time(10.0, 120.0), None);
        assert_eq!(earth.p_time(800.0, 10.0), None);
        assert_eq!(earth.s_time(-1.0, 10.0), None);
    }
}
