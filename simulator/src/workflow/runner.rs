use crate::generator::scenario::{build_scenario, ScenarioConfig};
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use quakecore::analysis::{AnalysisContext, ClusterOutcome, EarthquakeAnalysis};
use quakecore::lifecycle::{Archive, JsonLinesArchive, MemoryArchive};
use quakecore::magnitude::LocalMagnitudeTable;
use quakecore::model::RecordSnapshot;
use quakecore::prelude::MAX_DEPTH_KM;
use quakecore::telemetry::MetricsSnapshot;
use quakecore::traveltime::{GridTravelTimeTable, HomogeneousEarth};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub scenario: Option<String>,
    /// One line per cluster describing its outcome.
    pub outcomes: Vec<String>,
    pub earthquakes: Vec<RecordSnapshot>,
    pub metrics: MetricsSnapshot,
    pub elapsed_ms: u128,
}

impl WorkflowResult {
    pub fn earthquake_count(&self) -> usize {
        self.earthquakes.len()
    }
}

#[derive(Clone)]
pub struct Runner {
    analysis: Arc<EarthquakeAnalysis>,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> anyhow::Result<Self> {
        let grid = &config.travel_times;
        let earth = HomogeneousEarth::default();
        let travel_times = GridTravelTimeTable::from_model(
            &earth,
            grid.depth_step_km,
            grid.angle_step_deg,
            MAX_DEPTH_KM,
            grid.max_angle_deg,
        )
        .context("building travel-time grid")?;

        let archive: Arc<dyn Archive> = match &config.archive_path {
            Some(path) => Arc::new(JsonLinesArchive::new(path)),
            None => Arc::new(MemoryArchive::new()),
        };
        let context = AnalysisContext::new(
            config.analysis.clone(),
            Arc::new(travel_times),
            Arc::new(LocalMagnitudeTable),
            archive,
        )
        .context("creating analysis context")?;

        Ok(Self {
            analysis: Arc::new(EarthquakeAnalysis::new(context)),
        })
    }

    /// Generates the scenario, clusters its picks and runs one analysis pass
    /// at the moment every station has been observed.
    pub fn execute(&self, scenario: &ScenarioConfig) -> anyhow::Result<WorkflowResult> {
        let context = self.analysis.context();
        let quake = build_scenario(scenario, context.travel_times.as_ref())
            .context("building scenario")?;
        let cluster = quake.register(&context.clusters);

        let report = self.analysis.run(quake.settled_ms());
        // No further picks arrive for a scenario, so a cluster left without
        // a record is done; clusters with one leave on retirement.
        if cluster.earthquake().is_none() {
            context.clusters.remove(cluster.id());
        }
        let outcomes = report
            .clusters
            .iter()
            .map(|cluster| format!("cluster #{}: {}", cluster.cluster_id, describe(&cluster.outcome)))
            .collect();
        log::info!(
            "pass finished in {} ms: {} new earthquake(s), {} magnitude(s)",
            report.elapsed.as_millis(),
            report.created(),
            report.magnitudes
        );

        Ok(WorkflowResult {
            scenario: scenario.name.clone(),
            outcomes,
            earthquakes: self.earthquakes(),
            metrics: self.metrics(),
            elapsed_ms: report.elapsed.as_millis(),
        })
    }

    /// Retires quiescent earthquakes; returns how many were archived.
    pub fn sweep(&self, now_ms: i64) -> usize {
        self.analysis.sweep(now_ms).len()
    }

    pub fn earthquakes(&self) -> Vec<RecordSnapshot> {
        self.analysis
            .context()
            .records
            .snapshot()
            .iter()
            .map(|record| record.snapshot())
            .collect()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.analysis.context().metrics.snapshot()
    }

    #[cfg(test)]
    pub fn cluster_count(&self) -> usize {
        self.analysis.context().clusters.len()
    }
}

fn describe(outcome: &ClusterOutcome) -> String {
    match outcome {
        ClusterOutcome::Skipped(reason) => format!("skipped ({:?})", reason),
        ClusterOutcome::Rejected { condition, demoted } => {
            format!("rejected: {}{}", condition, if *demoted { ", demoted" } else { "" })
        }
        ClusterOutcome::Created(record) => format!("created earthquake #{}", record.id()),
        ClusterOutcome::Updated(record) => {
            format!("updated earthquake #{} (rev {})", record.id(), record.revision())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> ScenarioConfig {
        ScenarioConfig {
            origin_ms: Some(1_000_000),
            seed: 11,
            name: Some("test".into()),
            ..Default::default()
        }
    }

    #[test]
    fn runner_locates_the_synthetic_quake() {
        let runner = Runner::new(WorkflowConfig::default()).unwrap();
        let scenario = scenario();
        let result = runner.execute(&scenario).unwrap();

        assert_eq!(result.earthquake_count(), 1, "{:?}", result.outcomes);
        let quake = &result.earthquakes[0];
        assert!((quake.lat - scenario.latitude).abs() < 0.5);
        assert!((quake.lon - scenario.longitude).abs() < 0.5);
        assert!((quake.magnitude - scenario.magnitude).abs() < 1.0);
        assert_eq!(result.metrics.created, 1);
        assert_eq!(result.scenario.as_deref(), Some("test"));
        assert_eq!(runner.cluster_count(), 1);
    }

    #[test]
    fn scenario_without_a_record_leaves_no_cluster_behind() {
        let runner = Runner::new(WorkflowConfig::default()).unwrap();
        let sparse = ScenarioConfig {
            stations: 3,
            ..scenario()
        };
        let result = runner.execute(&sparse).unwrap();
        assert_eq!(result.earthquake_count(), 0);
        assert!(result.outcomes[0].contains("NotEnoughStations"), "{:?}", result.outcomes);
        assert_eq!(runner.cluster_count(), 0);
    }

    #[test]
    fn sweep_archives_old_earthquakes() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkflowConfig {
            archive_path: Some(dir.path().join("archive.jsonl")),
            ..Default::default()
        };
        let runner = Runner::new(config).unwrap();
        runner.execute(&scenario()).unwrap();

        assert_eq!(runner.sweep(1_000_000 + 24 * 60 * 60 * 1000), 1);
        assert!(runner.earthquakes().is_empty());
        assert_eq!(runner.cluster_count(), 0);
        let archived = std::fs::read_to_string(dir.path().join("archive.jsonl")).unwrap();
        assert_eq!(archived.lines().count(), 1);
    }
}
