use quakecore::math::{Coordinate, GlobeMove};
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

/// Seismic station of a synthetic network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: f64,
}

/// Scatters `count` stations around `center`, one per equal azimuth sector,
/// at random distances between `min_km` and `max_km`.
pub fn scatter_stations(
    rng: &mut StdRng,
    center: Coordinate,
    count: usize,
    min_km: f64,
    max_km: f64,
) -> Vec<Station> {
    let sector = 360.0 / count.max(1) as f64;
    (0..count)
        .map(|index| {
            let bearing = sector * index as f64 + rng.gen_range(0.0..sector);
            let distance = if max_km > min_km {
                rng.gen_range(min_km..max_km)
            } else {
                min_km
            };
            let point = GlobeMove::new(center.lat, center.lon, distance).destination(bearing);
            Station {
                id: format!("SIM{:03}", index),
                latitude: point.lat,
                longitude: point.lon,
                elevation_m: rng.gen_range(0.0..1500.0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn stations_stay_within_the_requested_annulus() {
        let mut rng = StdRng::seed_from_u64(7);
        let center = Coordinate::new(-20.0, 170.0);
        let stations = scatter_stations(&mut rng, center, 16, 30.0, 400.0);
        assert_eq!(stations.len(), 16);
        for station in &stations {
            let distance = center.distance_km(&Coordinate::new(station.latitude, station.longitude));
            assert!((29.0..401.0).contains(&distance), "{} km", distance);
        }
    }

    #[test]
    fn same_seed_reproduces_the_network() {
        let center = Coordinate::new(0.0, 0.0);
        let a = scatter_stations(&mut StdRng::seed_from_u64(1), center, 5, 10.0, 50.0);
        let b = scatter_stations(&mut StdRng::seed_from_u64(1), center, 5, 10.0, 50.0);
        assert_eq!(a, b);
    }
}
