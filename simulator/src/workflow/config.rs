use crate::generator::scenario::ScenarioConfig;
use anyhow::Context;
use quakecore::prelude::AnalysisSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Travel-time grid sampled from the homogeneous Earth model.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelTimeConfig {
    pub depth_step_km: f64,
    pub angle_step_deg: f64,
    pub max_angle_deg: f64,
}

impl Default for TravelTimeConfig {
    fn default() -> Self {
        Self {
            depth_step_km: 2.0,
            angle_step_deg: 0.1,
            max_angle_deg: 100.0,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub analysis: AnalysisSettings,
    pub travel_times: TravelTimeConfig,
    pub scenario: ScenarioConfig,
    /// JSON-lines file receiving retired earthquakes; kept in memory when unset.
    pub archive_path: Option<PathBuf>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config
            .analysis
            .validate()
            .with_context(|| format!("validating workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        resolution: f64,
        pick_timing_tolerance_ms: f64,
        min_station_count: usize,
        parallel: bool,
    ) -> Self {
        Self {
            analysis: AnalysisSettings {
                resolution,
                pick_timing_tolerance_ms,
                min_station_count,
                parallel,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_carries_analysis_settings() {
        let cfg = WorkflowConfig::from_args(60.0, 800.0, 6, false);
        assert_eq!(cfg.analysis.resolution, 60.0);
        assert_eq!(cfg.analysis.min_station_count, 6);
        assert!(!cfg.analysis.parallel);
        assert_eq!(cfg.analysis.acceptance_threshold_pct, 40.0);
    }

    #[test]
    fn config_load_reads_yaml_with_defaults() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"analysis:\n  resolution: 25\nscenario:\n  magnitude: 5.5\n  stations: 20\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.analysis.resolution, 25.0);
        assert_eq!(cfg.analysis.pick_timing_tolerance_ms, 1000.0);
        assert_eq!(cfg.scenario.stations, 20);
        assert_eq!(cfg.travel_times.angle_step_deg, 0.1);
        assert!(cfg.archive_path.is_none());
    }

    #[test]
    fn config_load_rejects_invalid_settings() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"analysis:\n  resolution: 250\n").unwrap();
        let path = temp.into_temp_path();
        assert!(WorkflowConfig::load(&path).is_err());
    }
}
