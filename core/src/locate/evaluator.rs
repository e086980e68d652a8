use crate::math::{GeoHelper, StatsHelper};
use crate::model::{CandidateHypocenter, WorkingPick};
use crate::traveltime::TravelTimeTable;

/// Station elevation correction in seconds.
pub fn elevation_correction(elevation_m: f64) -> f64 {
    elevation_m / 6000.0
}

/// Scores one candidate hypocenter against a fixed pick set.
pub struct CandidateEvaluator<'a> {
    travel_times: &'a dyn TravelTimeTable,
    tolerance_ms: f64,
}

impl<'a> CandidateEvaluator<'a> {
    pub fn new(travel_times: &'a dyn TravelTimeTable, tolerance_ms: f64) -> Self {
        Self {
            travel_times,
            tolerance_ms,
        }
    }

    /// Annotates every working pick with its surface distance to `(lat, lon)`.
    pub fn annotate_distances(picks: &mut [WorkingPick], lat: f64, lon: f64) {
        for working in picks.iter_mut() {
            working.distance_km = GeoHelper::great_circle_distance_km(
                working.pick.latitude,
                working.pick.longitude,
                lat,
                lon,
            );
        }
    }

    /// Evaluates `(lat, lon, depth_km)` into `out`, using `origins` as buffer.
    ///
    /// Returns false, leaving `out` untouched, when any pick has no P arrival
    /// for this depth and distance.
    pub fn evaluate(
        &self,
        lat: f64,
        lon: f64,
        depth_km: f64,
        picks: &[WorkingPick],
        origins: &mut Vec<i64>,
        out: &mut CandidateHypocenter,
    ) -> bool {
        origins.clear();
        for working in picks {
            let Some(travel_time) = self.travel_times.p_time_at_km(depth_km, working.distance_km)
            else {
                return false;
            };
            let delay = travel_time + elevation_correction(working.pick.elevation_m);
            origins.push(working.pick.p_arrival_ms - (delay * 1000.0) as i64);
        }

        origins.sort_unstable();
        let Some(adopted) = StatsHelper::lower_median(origins) else {
            return false;
        };

        let mut err = 0.0;
        let mut correct = 0;
        for &origin in origins.iter() {
            let mut residual = (origin - adopted).abs() as f64;
            if residual < self.tolerance_ms {
                correct += 1;
            } else {
                residual = self.tolerance_ms;
            }
            err += residual * residual;
        }

        *out = CandidateHypocenter {
            lat,
            lon,
            depth_km,
            origin_ms: adopted,
            error_metric: err,
            correct_stations: correct,
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PickedEvent;
    use crate::traveltime::HomogeneousEarth;

    fn working(arrival: i64, lat: f64, lon: f64, elevation_m: f64) -> WorkingPick {
        WorkingPick::from(PickedEvent::new(arrival, lat, lon, elevation_m, 20.0))
    }

    #[test]
    fn consistent_picks_are_all_correct_with_zero_error() {
        let earth = HomogeneousEarth::default();
        let evaluator = CandidateEvaluator::new(&earth, 1000.0);
        let origin = 10_000_i64;
        let stations = [(0.5, 0.0, 0.0), (0.0, 1.0, 600.0), (-1.5, 0.0, 1200.0)];
        let mut picks: Vec<WorkingPick> = stations
            .iter()
            .map(|&(lat, lon, elevation)| {
                let distance = GeoHelper::great_circle_distance_km(lat, lon, 0.0, 0.0);
                let delay = earth.p_time_at_km(10.0, distance).unwrap() + elevation_correction(elevation);
                working(origin + (delay * 1000.0) as i64, lat, lon, elevation)
            })
            .collect();

        CandidateEvaluator::annotate_distances(&mut picks, 0.0, 0.0);
        let mut origins = Vec::new();
        let mut out = CandidateHypocenter::default();
        assert!(evaluator.evaluate(0.0, 0.0, 10.0, &picks, &mut origins, &mut out));
        assert_eq!(out.origin_ms, origin);
        assert_eq!(out.correct_stations, 3);
        assert_eq!(out.error_metric, 0.0);
    }

    #[test]
    fn adopted_origin_is_the_median_and_outliers_saturate() {
        let earth = HomogeneousEarth::default();
        let evaluator = CandidateEvaluator::new(&earth, 500.0);
        // Co-located picks share one travel time, so origins differ only by arrival.
        let mut picks = vec![
            working(1_000, 0.0, 0.0, 0.0),
            working(1_100, 0.0, 0.0, 0.0),
            working(90_000, 0.0, 0.0, 0.0),
        ];
        CandidateEvaluator::annotate_distances(&mut picks, 0.0, 0.0);
        let mut origins = Vec::new();
        let mut out = CandidateHypocenter::default();
        assert!(evaluator.evaluate(0.0, 0.0, 6.0, &picks, &mut origins, &mut out));
        assert_eq!(out.origin_ms, 1_100 - 1_000);
        assert_eq!(out.correct_stations, 2);
        assert_eq!(out.error_metric, 100.0 * 100.0 + 500.0 * 500.0);
        assert!(out.correct_stations <= picks.len());
        assert!(out.error_metric >= 0.0);
    }

    #[test]
    fn missing_arrival_discards_the_candidate() {
        let earth = HomogeneousEarth::default();
        let evaluator = CandidateEvaluator::new(&earth, 1000.0);
        let mut picks = vec![working(1_000, 0.0, 0.0, 0.0), working(2_000, 0.0, 170.0, 0.0)];
        CandidateEvaluator::annotate_distances(&mut picks, 0.0, 0.0);
        let mut origins = Vec::new();
        let mut out = CandidateHypocenter {
            correct_stations: 7,
            ..Default::default()
        };
        assert!(!evaluator.evaluate(0.0, 0.0, 10.0, &picks, &mut origins, &mut out));
        assert_eq!(out.correct_stations, 7);
    }
}
