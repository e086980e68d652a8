use crate::math::{GeoHelper, StatsHelper};
use crate::model::PickedEvent;
use crate::prelude::SearchSettings;

/// Largest pick subset handed to the search.
pub const TARGET_EVENTS: usize = 30;

/// A cluster without any pick at least this strong is not searched.
pub const MIN_SIGNAL_RATIO: f64 = 16.0;

/// Why a cluster was not searched this pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum SkipReason {
    NoPicks,
    /// Nothing new was assigned since the last search.
    Unchanged,
    /// The report throttle wants more picks before searching again.
    AwaitingMorePicks,
    WeakSignal,
    NotEnoughStations,
    /// Arrival times are too close together to constrain a location.
    NotEnoughDeltaP,
}

pub struct PickSelector;

impl PickSelector {
    /// Runs the pre-search checks and returns the spatially spread subset.
    pub fn prepare(
        picks: &[PickedEvent],
        settings: &SearchSettings,
    ) -> Result<Vec<PickedEvent>, SkipReason> {
        let strongest = picks
            .iter()
            .map(|pick| pick.signal_ratio)
            .fold(None, |best: Option<f64>, ratio| {
                Some(best.map_or(ratio, |b| b.max(ratio)))
            })
            .ok_or(SkipReason::NoPicks)?;
        if strongest < MIN_SIGNAL_RATIO {
            return Err(SkipReason::WeakSignal);
        }
        if picks.len() < settings.min_station_count {
            return Err(SkipReason::NotEnoughStations);
        }
        Ok(Self::select(picks))
    }

    /// Greedy farthest-point selection seeded with the strongest pick.
    ///
    /// Each step adds the remaining pick whose distance to the nearest
    /// already-selected pick is largest, until `TARGET_EVENTS` are chosen.
    pub fn select(picks: &[PickedEvent]) -> Vec<PickedEvent> {
        let Some(seed) = (0..picks.len()).reduce(|best, index| {
            if picks[index].signal_ratio > picks[best].signal_ratio {
                index
            } else {
                best
            }
        }) else {
            return Vec::new();
        };

        let budget = picks.len().min(TARGET_EVENTS);
        let mut selected = Vec::with_capacity(budget);
        let mut taken = vec![false; picks.len()];
        let mut nearest = vec![f64::MAX; picks.len()];

        let mut next = seed;
        loop {
            taken[next] = true;
            let chosen = picks[next];
            selected.push(chosen);
            if selected.len() == budget {
                break;
            }

            let mut farthest: Option<usize> = None;
            for (index, pick) in picks.iter().enumerate() {
                if taken[index] {
                    continue;
                }
                let d = GeoHelper::great_circle_distance_km(
                    pick.latitude,
                    pick.longitude,
                    chosen.latitude,
                    chosen.longitude,
                );
                if d < nearest[index] {
                    nearest[index] = d;
                }
                if farthest.map_or(true, |f| nearest[index] > nearest[f]) {
                    farthest = Some(index);
                }
            }

            match farthest {
                Some(index) => next = index,
                None => break,
            }
        }
        selected
    }

    /// Spread between the 10th and 90th percentile arrival must reach
    /// `max(2000 ms, 1.75 x tolerance)`.
    pub fn has_timing_spread(selected: &[PickedEvent], settings: &SearchSettings) -> bool {
        if selected.is_empty() {
            return false;
        }
        let mut arrivals: Vec<i64> = selected.iter().map(|pick| pick.p_arrival_ms).collect();
        arrivals.sort_unstable();
        let high = arrivals[StatsHelper::percentile_index(arrivals.len(), 0.9)];
        let low = arrivals[StatsHelper::percentile_index(arrivals.len(), 0.1)];
        (high - low) as f64 >= (2000.0_f64).max(settings.pick_timing_tolerance_ms * 1.75)
    }
}
