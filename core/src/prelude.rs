use serde::{Deserialize, Serialize};

/// Deepest hypocenter considered by the depth search, in kilometers.
pub const MAX_DEPTH_KM: f64 = 750.0;

/// Operator-facing configuration for the hypocenter analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Residual below which a pick agrees with the adopted origin time.
    pub pick_timing_tolerance_ms: f64,
    /// Minimum correctness (percent) a rejected hypocenter must keep for its record to survive.
    pub acceptance_threshold_pct: f64,
    /// Search quality knob, 0 (coarse) to 100 (dense).
    pub resolution: f64,
    pub min_station_count: usize,
    pub parallel: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            pick_timing_tolerance_ms: 1000.0,
            acceptance_threshold_pct: 40.0,
            resolution: 40.0,
            min_station_count: 5,
            parallel: true,
        }
    }
}

impl AnalysisSettings {
    pub fn validate(&self) -> QuakeResult<()> {
        if self.pick_timing_tolerance_ms.is_nan() || self.pick_timing_tolerance_ms <= 0.0 {
            return Err(QuakeError::InvalidSettings(format!(
                "pick timing tolerance must be positive, got {}",
                self.pick_timing_tolerance_ms
            )));
        }
        if !(0.0..=100.0).contains(&self.acceptance_threshold_pct) {
            return Err(QuakeError::InvalidSettings(format!(
                "acceptance threshold {} outside 0..=100",
                self.acceptance_threshold_pct
            )));
        }
        if !(0.0..=100.0).contains(&self.resolution) {
            return Err(QuakeError::InvalidSettings(format!(
                "resolution {} outside 0..=100",
                self.resolution
            )));
        }
        if self.min_station_count == 0 || self.min_station_count > crate::locate::TARGET_EVENTS {
            return Err(QuakeError::InvalidSettings(format!(
                "minimum station count {} outside 1..={}",
                self.min_station_count,
                crate::locate::TARGET_EVENTS
            )));
        }
        Ok(())
    }

    /// Captures the immutable snapshot used for one search pass.
    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            pick_timing_tolerance_ms: self.pick_timing_tolerance_ms,
            acceptance_threshold_pct: self.acceptance_threshold_pct,
            resolution: self.resolution,
            min_station_count: self.min_station_count,
        }
    }
}

/// Settings captured once at the start of a pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSettings {
    pub pick_timing_tolerance_ms: f64,
    pub acceptance_threshold_pct: f64,
    pub resolution: f64,
    pub min_station_count: usize,
}

impl SearchSettings {
    /// Scales ring, angle and depth density: ~0.27 at 0, 1.0 at 40, ~4.8 at 100.
    pub fn resolution_multiplier(&self) -> f64 {
        let r = self.resolution;
        (r * r + 600.0) / 2200.0
    }

    /// Extra depth bisection iterations relative to the default resolution.
    pub fn depth_iteration_offset(&self) -> i32 {
        // Half-up rounding keeps -2.5 at -2.
        ((self.resolution - 40.0) / 14.0 + 0.5).floor() as i32
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        AnalysisSettings::default().search_settings()
    }
}

/// Common error type for construction, configuration and archival.
#[derive(thiserror::Error, Debug)]
pub enum QuakeError {
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("travel-time table: {0}")]
    TravelTimeTable(String),
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type QuakeResult<T> = Result<T, QuakeError>;
