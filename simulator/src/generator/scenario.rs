use crate::generator::network::{scatter_stations, Station};
use anyhow::Context;
use quakecore::locate::evaluator::elevation_correction;
use quakecore::magnitude::LocalMagnitudeTable;
use quakecore::math::{Coordinate, GeoHelper};
use quakecore::model::{Cluster, ClusterRegistry, StationObservation};
use quakecore::traveltime::TravelTimeTable;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Synthetic earthquake observed by a synthetic network.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub depth_km: f64,
    pub magnitude: f64,
    /// Origin time; the wall clock when unset.
    pub origin_ms: Option<i64>,
    pub stations: usize,
    pub min_distance_km: f64,
    pub max_distance_km: f64,
    /// Uniform pick timing jitter, plus or minus this many milliseconds.
    pub timing_noise_ms: i64,
    pub seed: u64,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            latitude: 35.0,
            longitude: 139.0,
            depth_km: 10.0,
            magnitude: 4.5,
            origin_ms: None,
            stations: 12,
            min_distance_km: 30.0,
            max_distance_km: 400.0,
            timing_noise_ms: 0,
            seed: 0,
            name: None,
            description: None,
        }
    }
}

/// Observations of one synthetic quake, ready to be clustered.
#[derive(Debug, Clone)]
pub struct SyntheticQuake {
    pub origin_ms: i64,
    pub observations: Vec<StationObservation>,
    /// Station with the earliest arrival, where the cluster formed.
    pub root: Coordinate,
}

impl SyntheticQuake {
    /// Time at which every station has been fully observed.
    pub fn settled_ms(&self) -> i64 {
        self.observations
            .iter()
            .map(|observation| observation.latest_sample_ms)
            .max()
            .unwrap_or(self.origin_ms)
    }

    /// Registers a cluster holding all observations.
    pub fn register(&self, registry: &ClusterRegistry) -> Arc<Cluster> {
        let cluster = registry.create(self.root);
        for observation in &self.observations {
            cluster.assign(observation.clone());
        }
        cluster
    }
}

pub fn wall_clock_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

pub fn build_scenario(
    config: &ScenarioConfig,
    travel_times: &dyn TravelTimeTable,
) -> anyhow::Result<SyntheticQuake> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let epicenter = Coordinate::new(config.latitude, config.longitude);
    let origin_ms = config.origin_ms.unwrap_or_else(wall_clock_ms);
    let stations = scatter_stations(
        &mut rng,
        epicenter,
        config.stations,
        config.min_distance_km,
        config.max_distance_km,
    );

    let intensity = LocalMagnitudeTable;
    let observations: Vec<StationObservation> = stations
        .iter()
        .filter_map(|station| observe(config, station, origin_ms, travel_times, &intensity, &mut rng))
        .collect();

    let first = observations
        .iter()
        .min_by_key(|observation| observation.p_arrival_ms)
        .with_context(|| format!("no station of {} hears the scenario", config.stations))?;
    let root = Coordinate::new(first.latitude, first.longitude);
    log::debug!(
        "scenario {}: {} observations, root {:.3}, {:.3}",
        config.name.as_deref().unwrap_or("unnamed"),
        observations.len(),
        root.lat,
        root.lon
    );

    Ok(SyntheticQuake {
        origin_ms,
        observations,
        root,
    })
}

fn observe(
    config: &ScenarioConfig,
    station: &Station,
    origin_ms: i64,
    travel_times: &dyn TravelTimeTable,
    intensity: &LocalMagnitudeTable,
    rng: &mut StdRng,
) -> Option<StationObservation> {
    let surface_km = GeoHelper::great_circle_distance_km(
        station.latitude,
        station.longitude,
        config.latitude,
        config.longitude,
    );
    let p_time = travel_times.p_time_at_km(config.depth_km, surface_km)?;
    let s_time = travel_times
        .s_time_at_km(config.depth_km, surface_km)
        .unwrap_or(p_time * 1.7);
    let noise = if config.timing_noise_ms > 0 {
        rng.gen_range(-config.timing_noise_ms..=config.timing_noise_ms)
    } else {
        0
    };
    let arrival_ms = origin_ms
        + ((p_time + elevation_correction(station.elevation_m)) * 1000.0) as i64
        + noise;

    let geodetic_km = GeoHelper::geodetic_distance_km(
        config.latitude,
        config.longitude,
        -config.depth_km,
        station.latitude,
        station.longitude,
        station.elevation_m / 1000.0,
    );
    Some(StationObservation {
        station_id: station.id.clone(),
        latitude: station.latitude,
        longitude: station.longitude,
        elevation_m: station.elevation_m,
        p_arrival_ms: arrival_ms,
        max_ratio: intensity.amplitude(config.magnitude, geodetic_km),
        // Recorded well past the S wave.
        latest_sample_ms: origin_ms + (s_time * 1000.0) as i64 + 30_000,
        valid: true,
    })
}
