use crate::model::CandidateHypocenter;

/// Ranking shared by the depth bisection, the ring reduction, the phase
/// merge and the regression check.
///
/// A candidate whose correct-station count beats the other's by more than
/// 30% wins outright; otherwise `correct / (err^2 + 2)` decides and a tie goes
/// to the second argument. The override makes the relation non-associative
/// near the margin, so parallel reductions are best-effort stable.
pub struct HypocenterSelector;

impl HypocenterSelector {
    const DECISIVE_MARGIN: f64 = 1.3;

    /// True when `first` ranks strictly ahead of `second`.
    pub fn first_wins(first: &CandidateHypocenter, second: &CandidateHypocenter) -> bool {
        if first.correct_stations > Self::margin(second) {
            return true;
        }
        if second.correct_stations > Self::margin(first) {
            return false;
        }
        Self::score(first) > Self::score(second)
    }

    pub fn select(
        first: Option<CandidateHypocenter>,
        second: Option<CandidateHypocenter>,
    ) -> Option<CandidateHypocenter> {
        match (first, second) {
            (None, other) | (other, None) => other,
            (Some(a), Some(b)) => Some(if Self::first_wins(&a, &b) { a } else { b }),
        }
    }

    fn margin(candidate: &CandidateHypocenter) -> usize {
        (candidate.correct_stations as f64 * Self::DECISIVE_MARGIN) as usize
    }

    fn score(candidate: &CandidateHypocenter) -> f64 {
        candidate.correct_stations as f64 / (candidate.error_metric.powi(2) + 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(correct: usize, err: f64) -> CandidateHypocenter {
        CandidateHypocenter {
            correct_stations: correct,
            error_metric: err,
            ..Default::default()
        }
    }

    #[test]
    fn missing_candidates_lose() {
        let a = candidate(5, 1.0);
        assert_eq!(HypocenterSelector::select(Some(a), None), Some(a));
        assert_eq!(HypocenterSelector::select(None, Some(a)), Some(a));
        assert_eq!(HypocenterSelector::select(None, None), None);
    }

    #[test]
    fn decisive_station_margin_ignores_error() {
        let many = candidate(14, 1.0e6);
        let few = candidate(10, 0.0);
        assert!(HypocenterSelector::first_wins(&many, &few));
        assert!(!HypocenterSelector::first_wins(&few, &many));
        assert_eq!(HypocenterSelector::select(Some(few), Some(many)), Some(many));
    }

    #[test]
    fn close_counts_fall_back_to_fit_quality() {
        let tight = candidate(10, 100.0);
        let loose = candidate(11, 1000.0);
        assert_eq!(HypocenterSelector::select(Some(loose), Some(tight)), Some(tight));
        assert_eq!(HypocenterSelector::select(Some(tight), Some(loose)), Some(tight));
    }

    #[test]
    fn ties_go_to_the_second_candidate() {
        let a = CandidateHypocenter {
            lat: 1.0,
            ..candidate(8, 10.0)
        };
        let b = CandidateHypocenter {
            lat: 2.0,
            ..candidate(8, 10.0)
        };
        assert_eq!(HypocenterSelector::select(Some(a), Some(b)), Some(b));
    }
}
