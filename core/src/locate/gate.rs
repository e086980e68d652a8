use crate::locate::selector::HypocenterSelector;
use crate::math::{Coordinate, GeoHelper};
use crate::model::{Hypocenter, PickedEvent};
use serde::Serialize;

/// Azimuthal buckets used by the coverage check.
pub const QUADRANTS: usize = 16;

/// Reason a finished hypocenter was not accepted.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HypocenterCondition {
    #[error("search produced no valid candidate")]
    NoResult,
    #[error("distant event without enough correct stations")]
    DistantEventNotEnoughStations,
    #[error("not enough correct stations")]
    NotEnoughCorrectStations,
    #[error("stations cover too narrow an azimuth")]
    TooShallowAngle,
    #[error("previous hypocenter was better")]
    PreviousWasBetter,
}

/// Post-search acceptance checks, applied in order.
pub struct PlausibilityGate;

impl PlausibilityGate {
    const DISTANT_EVENT_KM: f64 = 2000.0;
    const DISTANT_EVENT_MIN_CORRECT: usize = 8;
    const MIN_CORRECT: usize = 4;

    pub fn check<'h>(
        hypocenter: Option<&'h Hypocenter>,
        selected: &[PickedEvent],
        previous: Option<&Hypocenter>,
        root: Coordinate,
    ) -> Result<&'h Hypocenter, HypocenterCondition> {
        let hypocenter = hypocenter.ok_or(HypocenterCondition::NoResult)?;
        let from_root =
            GeoHelper::great_circle_distance_km(hypocenter.lat, hypocenter.lon, root.lat, root.lon);

        if from_root > Self::DISTANT_EVENT_KM
            && hypocenter.correct_stations < Self::DISTANT_EVENT_MIN_CORRECT
        {
            return Err(HypocenterCondition::DistantEventNotEnoughStations);
        }
        if hypocenter.correct_stations < Self::MIN_CORRECT {
            return Err(HypocenterCondition::NotEnoughCorrectStations);
        }
        if Self::count_quadrants(hypocenter, selected) < Self::required_quadrants(from_root) {
            return Err(HypocenterCondition::TooShallowAngle);
        }

        if let Some(previous) = previous {
            let current = hypocenter.as_candidate();
            // The new solution must hold its own against the last accepted one.
            if HypocenterSelector::select(Some(previous.as_candidate()), Some(current))
                != Some(current)
            {
                return Err(HypocenterCondition::PreviousWasBetter);
            }
        }
        Ok(hypocenter)
    }

    pub fn required_quadrants(distance_from_root_km: f64) -> usize {
        if distance_from_root_km > 4000.0 {
            1
        } else if distance_from_root_km > 1000.0 {
            2
        } else {
            3
        }
    }

    /// Number of non-empty azimuthal buckets around the hypocenter.
    pub fn count_quadrants(hypocenter: &Hypocenter, picks: &[PickedEvent]) -> usize {
        let mut buckets = [false; QUADRANTS];
        for pick in picks {
            let azimuth =
                GeoHelper::bearing_deg(hypocenter.lat, hypocenter.lon, pick.latitude, pick.longitude);
            let bucket = ((azimuth * QUADRANTS as f64) / 360.0) as usize;
            buckets[bucket.min(QUADRANTS - 1)] = true;
        }
        buckets.iter().filter(|&&occupied| occupied).count()
    }
}
