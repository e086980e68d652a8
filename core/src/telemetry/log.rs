use crate::model::CandidateHypocenter;
use log::{debug, info};
use std::time::Duration;

/// Per-pass diagnostic lines. Informational only.
pub struct PassLogger {
    cluster_id: u64,
}

impl PassLogger {
    pub fn new(cluster_id: u64) -> Self {
        Self { cluster_id }
    }

    pub fn record_selection(&self, total: usize, selected: usize) {
        debug!(
            "cluster #{}: selected {} of {} picks",
            self.cluster_id, selected, total
        );
    }

    pub fn record_phase(
        &self,
        phase: &str,
        elapsed: Duration,
        best: Option<&CandidateHypocenter>,
    ) {
        match best {
            Some(best) => debug!(
                "cluster #{} {}: {} ms, {} correct / err {:.1}",
                self.cluster_id,
                phase,
                elapsed.as_millis(),
                best.correct_stations,
                best.error_metric
            ),
            None => debug!(
                "cluster #{} {}: {} ms, no valid candidate",
                self.cluster_id,
                phase,
                elapsed.as_millis()
            ),
        }
    }

    pub fn record(&self, message: &str) {
        debug!("cluster #{}: {}", self.cluster_id, message);
    }

    pub fn record_finished(&self, elapsed: Duration) {
        info!(
            "cluster #{}: hypocenter finding finished in {} ms",
            self.cluster_id,
            elapsed.as_millis()
        );
    }
}

impl Default for PassLogger {
    fn default() -> Self {
        Self::new(0)
    }
}
