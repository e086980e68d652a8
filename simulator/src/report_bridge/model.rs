use crate::workflow::runner::WorkflowResult;
use quakecore::model::RecordSnapshot;
use quakecore::telemetry::MetricsSnapshot;
use serde::{Deserialize, Serialize};

/// Latest state published to report consumers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportModel {
    pub earthquakes: Vec<RecordSnapshot>,
    pub last_scenario: Option<String>,
    pub outcomes: Vec<String>,
    pub archived: usize,
}

impl ReportModel {
    pub fn from_result(result: &WorkflowResult, archived: usize) -> Self {
        Self {
            earthquakes: result.earthquakes.clone(),
            last_scenario: result.scenario.clone(),
            outcomes: result.outcomes.clone(),
            archived,
        }
    }
}

/// Body of `GET /metrics`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    #[serde(flatten)]
    pub counters: MetricsSnapshot,
    pub active_earthquakes: usize,
}
