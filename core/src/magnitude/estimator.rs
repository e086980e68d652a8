use crate::magnitude::intensity::IntensityTable;
use crate::math::{GeoHelper, StatsHelper};
use crate::model::{EarthquakeRecord, RecordState, StationObservation};
use crate::traveltime::TravelTimeTable;

/// Converts an accepted hypocenter and station amplitudes into a magnitude.
pub struct MagnitudeEstimator<'a> {
    travel_times: &'a dyn TravelTimeTable,
    intensity: &'a dyn IntensityTable,
}

impl<'a> MagnitudeEstimator<'a> {
    /// Samples observed this long after the expected S arrival carry its amplitude.
    pub const S_WAVE_SETTLE_MS: i64 = 8_000;

    pub fn new(travel_times: &'a dyn TravelTimeTable, intensity: &'a dyn IntensityTable) -> Self {
        Self {
            travel_times,
            intensity,
        }
    }

    /// Recomputes and stores the magnitude of `record` from its cluster's
    /// valid observations. Returns the aggregate when one could be formed.
    pub fn estimate(&self, record: &EarthquakeRecord) -> Option<f64> {
        let cluster = record.cluster()?;
        let state = record.state();
        let samples: Vec<f64> = cluster
            .observations()
            .iter()
            .filter(|observation| observation.valid)
            .map(|observation| self.station_magnitude(&state, observation))
            .collect();
        let (samples, value) = Self::aggregate(samples)?;
        record.set_magnitude(samples, value);
        Some(value)
    }

    pub fn station_magnitude(&self, state: &RecordState, observation: &StationObservation) -> f64 {
        let surface_km = GeoHelper::great_circle_distance_km(
            state.lat,
            state.lon,
            observation.latitude,
            observation.longitude,
        );
        let geodetic_km = GeoHelper::geodetic_distance_km(
            state.lat,
            state.lon,
            -state.depth_km,
            observation.latitude,
            observation.longitude,
            observation.elevation_m / 1000.0,
        );
        let multiplier = if self.s_wave_observed(state, observation, surface_km) {
            1.0
        } else {
            // P-only amplitude underestimates the event.
            (2.0 - surface_km / 400.0).max(1.0)
        };
        self.intensity
            .magnitude(geodetic_km, observation.max_ratio * multiplier)
    }

    fn s_wave_observed(
        &self,
        state: &RecordState,
        observation: &StationObservation,
        surface_km: f64,
    ) -> bool {
        match self.travel_times.s_time_at_km(state.depth_km, surface_km) {
            Some(s_time) => {
                let expected = state.origin_ms + (s_time * 1000.0) as i64;
                observation.latest_sample_ms >= expected + Self::S_WAVE_SETTLE_MS
            }
            None => false,
        }
    }

    /// Sorts the per-station samples and returns them with their lower median.
    pub fn aggregate(mut samples: Vec<f64>) -> Option<(Vec<f64>, f64)> {
        samples.sort_by(f64::total_cmp);
        let value = StatsHelper::lower_median(&samples)?;
        Some((samples, value))
    }
}
