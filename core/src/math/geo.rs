/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const EARTH_CIRCUMFERENCE_KM: f64 = 2.0 * std::f64::consts::PI * EARTH_RADIUS_KM;

/// Geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        GeoHelper::great_circle_distance_km(self.lat, self.lon, other.lat, other.lon)
    }
}

pub struct GeoHelper;

impl GeoHelper {
    /// Haversine surface distance in kilometers.
    pub fn great_circle_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        let phi1 = lat1.to_radians();
        let phi2 = lat2.to_radians();
        let dphi = (lat2 - lat1).to_radians();
        let dlambda = (lon2 - lon1).to_radians();
        let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).max(0.0).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// Converts a surface distance to the angular distance in degrees.
    pub fn km_to_degrees(distance_km: f64) -> f64 {
        distance_km * 360.0 / EARTH_CIRCUMFERENCE_KM
    }

    /// Initial bearing from the first point to the second, in `[0, 360)`.
    pub fn bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        let phi1 = lat1.to_radians();
        let phi2 = lat2.to_radians();
        let dlambda = (lon2 - lon1).to_radians();
        let y = dlambda.sin() * phi2.cos();
        let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();
        let bearing = y.atan2(x).to_degrees().rem_euclid(360.0);
        if bearing >= 360.0 {
            0.0
        } else {
            bearing
        }
    }

    /// Straight-line distance between two points given altitudes in kilometers
    /// (negative altitude is depth below the surface).
    pub fn geodetic_distance_km(
        lat1: f64,
        lon1: f64,
        alt1_km: f64,
        lat2: f64,
        lon2: f64,
        alt2_km: f64,
    ) -> f64 {
        let (x1, y1, z1) = Self::to_cartesian(lat1, lon1, alt1_km);
        let (x2, y2, z2) = Self::to_cartesian(lat2, lon2, alt2_km);
        ((x2 - x1).powi(2) + (y2 - y1).powi(2) + (z2 - z1).powi(2)).sqrt()
    }

    fn to_cartesian(lat: f64, lon: f64, alt_km: f64) -> (f64, f64, f64) {
        let r = EARTH_RADIUS_KM + alt_km;
        let phi = lat.to_radians();
        let lambda = lon.to_radians();
        (
            r * phi.cos() * lambda.cos(),
            r * phi.cos() * lambda.sin(),
            r * phi.sin(),
        )
    }
}

/// Destination-point calculation with the trigonometry of the origin and the
/// ring distance computed once, so a full angular sweep only pays per bearing.
#[derive(Debug, Clone, Copy)]
pub struct GlobeMove {
    lon: f64,
    sin_lat: f64,
    cos_lat: f64,
    sin_dist: f64,
    cos_dist: f64,
}

impl GlobeMove {
    pub fn new(lat: f64, lon: f64, distance_km: f64) -> Self {
        let phi = lat.to_radians();
        let delta = distance_km / EARTH_RADIUS_KM;
        Self {
            lon,
            sin_lat: phi.sin(),
            cos_lat: phi.cos(),
            sin_dist: delta.sin(),
            cos_dist: delta.cos(),
        }
    }

    /// Point reached by travelling the precomputed distance along `bearing_deg`.
    pub fn destination(&self, bearing_deg: f64) -> Coordinate {
        let theta = bearing_deg.to_radians();
        let sin_lat2 =
            (self.sin_lat * self.cos_dist + self.cos_lat * self.sin_dist * theta.cos()).clamp(-1.0, 1.0);
        let lat2 = sin_lat2.asin();
        let lambda = (theta.sin() * self.sin_dist * self.cos_lat)
            .atan2(self.cos_dist - self.sin_lat * sin_lat2);
        let lon2 = (self.lon + lambda.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;
        Coordinate::new(lat2.to_degrees(), lon2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = GeoHelper::great_circle_distance_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.195).abs() < 0.01);
        assert!((GeoHelper::km_to_degrees(d) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn bearing_points_east_along_equator() {
        let bearing = GeoHelper::bearing_deg(0.0, 0.0, 0.0, 1.0);
        assert!((bearing - 90.0).abs() < 1e-9);
        let west = GeoHelper::bearing_deg(0.0, 0.0, 0.0, -1.0);
        assert!((west - 270.0).abs() < 1e-9);
    }

    #[test]
    fn destination_lands_at_requested_distance_and_bearing() {
        let mv = GlobeMove::new(35.0, 139.0, 250.0);
        for bearing in [0.0, 45.0, 135.0, 300.0] {
            let point = mv.destination(bearing);
            let d = GeoHelper::great_circle_distance_km(35.0, 139.0, point.lat, point.lon);
            assert!((d - 250.0).abs() < 1e-6);
            let b = GeoHelper::bearing_deg(35.0, 139.0, point.lat, point.lon);
            let diff = ((b - bearing + 540.0) % 360.0 - 180.0).abs();
            assert!(diff < 1e-6);
        }
    }

    #[test]
    fn geodetic_distance_accounts_for_depth() {
        let d = GeoHelper::geodetic_distance_km(10.0, 20.0, -30.0, 10.0, 20.0, 0.0);
        assert!((d - 30.0).abs() < 1e-6);
    }
}
