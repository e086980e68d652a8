use serde::{Deserialize, Serialize};

/// Scratch candidate overwritten many times during a search.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CandidateHypocenter {
    pub lat: f64,
    pub lon: f64,
    pub depth_km: f64,
    pub origin_ms: i64,
    /// Sum of squared, tolerance-capped origin residuals.
    pub error_metric: f64,
    pub correct_stations: usize,
}

/// Finished search result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hypocenter {
    pub lat: f64,
    pub lon: f64,
    pub depth_km: f64,
    pub origin_ms: i64,
    pub error_metric: f64,
    pub correct_stations: usize,
    pub selected_count: usize,
    pub wrong_event_count: usize,
}

impl Hypocenter {
    pub fn from_candidate(candidate: &CandidateHypocenter, selected_count: usize) -> Self {
        Self {
            lat: candidate.lat,
            lon: candidate.lon,
            depth_km: candidate.depth_km,
            origin_ms: candidate.origin_ms,
            error_metric: candidate.error_metric,
            correct_stations: candidate.correct_stations,
            selected_count,
            wrong_event_count: selected_count.saturating_sub(candidate.correct_stations),
        }
    }

    /// Fraction of selected picks that agree with the adopted origin.
    pub fn correctness(&self) -> f64 {
        if self.selected_count == 0 {
            return 0.0;
        }
        self.correct_stations as f64 / self.selected_count as f64
    }

    pub fn as_candidate(&self) -> CandidateHypocenter {
        CandidateHypocenter {
            lat: self.lat,
            lon: self.lon,
            depth_km: self.depth_km,
            origin_ms: self.origin_ms,
            error_metric: self.error_metric,
            correct_stations: self.correct_stations,
        }
    }
}
