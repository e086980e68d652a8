//! Synthetic fixtures shared by the unit tests.

use crate::locate::evaluator::elevation_correction;
use crate::math::{Coordinate, GeoHelper, GlobeMove};
use crate::model::{PickedEvent, StationObservation};
use crate::traveltime::TravelTimeTable;

pub const TRUE_LAT: f64 = 35.0;
pub const TRUE_LON: f64 = 139.0;
pub const TRUE_DEPTH_KM: f64 = 10.0;
pub const TRUE_ORIGIN_MS: i64 = 1_700_000_000_000;

/// (bearing, distance km, elevation m, signal ratio) around the true epicenter.
const STATIONS: [(f64, f64, f64, f64); 4] = [
    (0.0, 60.0, 0.0, 20.0),
    (90.0, 140.0, 300.0, 30.0),
    (180.0, 220.0, 600.0, 40.0),
    (270.0, 320.0, 150.0, 50.0),
];

/// Four stations surrounding the true hypocenter, one per side, with exact
/// P arrivals. Also returns the nearest station, used as anchor and root.
pub fn surrounding_observations(
    travel_times: &dyn TravelTimeTable,
) -> (Vec<StationObservation>, Coordinate) {
    let observations: Vec<StationObservation> = STATIONS
        .iter()
        .enumerate()
        .map(|(index, &(bearing, distance, elevation_m, ratio))| {
            let station = GlobeMove::new(TRUE_LAT, TRUE_LON, distance).destination(bearing);
            let surface_km =
                GeoHelper::great_circle_distance_km(station.lat, station.lon, TRUE_LAT, TRUE_LON);
            let travel = travel_times
                .p_time_at_km(TRUE_DEPTH_KM, surface_km)
                .unwrap_or_default();
            let arrival =
                TRUE_ORIGIN_MS + ((travel + elevation_correction(elevation_m)) * 1000.0) as i64;
            StationObservation {
                station_id: format!("SYN{}", index),
                latitude: station.lat,
                longitude: station.lon,
                elevation_m,
                p_arrival_ms: arrival,
                max_ratio: ratio,
                latest_sample_ms: arrival + 120_000,
                valid: true,
            }
        })
        .collect();
    let nearest = Coordinate::new(observations[0].latitude, observations[0].longitude);
    (observations, nearest)
}

pub fn surrounding_picks(travel_times: &dyn TravelTimeTable) -> (Vec<PickedEvent>, Coordinate) {
    let (observations, nearest) = surrounding_observations(travel_times);
    (
        observations.iter().map(StationObservation::to_pick).collect(),
        nearest,
    )
}
