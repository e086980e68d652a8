use crate::lifecycle::{Acceptance, Archive, RecordLifecycleManager, RecordPool};
use crate::locate::{GridSearchEngine, HypocenterCondition, PickSelector, PlausibilityGate, SkipReason};
use crate::magnitude::{IntensityTable, MagnitudeEstimator};
use crate::model::{Cluster, ClusterRegistry, EarthquakeRecord, Hypocenter};
use crate::prelude::{AnalysisSettings, QuakeResult};
use crate::telemetry::{MetricsRecorder, PassLogger};
use crate::traveltime::TravelTimeTable;
use parking_lot::RwLock;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Pick count from which searches are throttled to report-worthy growth.
pub const THROTTLE_MIN_PICKS: usize = 24;
const THROTTLE_GROWTH: f64 = 1.2;

/// Everything a pass needs, handed over explicitly.
#[derive(Clone)]
pub struct AnalysisContext {
    pub clusters: Arc<ClusterRegistry>,
    settings: Arc<RwLock<AnalysisSettings>>,
    pub records: Arc<RecordPool>,
    pub travel_times: Arc<dyn TravelTimeTable>,
    pub intensity: Arc<dyn IntensityTable>,
    pub archive: Arc<dyn Archive>,
    pub metrics: Arc<MetricsRecorder>,
}

impl AnalysisContext {
    pub fn new(
        settings: AnalysisSettings,
        travel_times: Arc<dyn TravelTimeTable>,
        intensity: Arc<dyn IntensityTable>,
        archive: Arc<dyn Archive>,
    ) -> QuakeResult<Self> {
        settings.validate()?;
        Ok(Self {
            clusters: Arc::new(ClusterRegistry::new()),
            settings: Arc::new(RwLock::new(settings)),
            records: Arc::new(RecordPool::default()),
            travel_times,
            intensity,
            archive,
            metrics: Arc::new(MetricsRecorder::new()),
        })
    }

    /// Settings a pass starting now would capture.
    pub fn settings(&self) -> AnalysisSettings {
        self.settings.read().clone()
    }

    /// Replaces the settings for subsequent passes; invalid ones are refused
    /// and the current settings kept.
    pub fn set_settings(&self, settings: AnalysisSettings) -> QuakeResult<()> {
        settings.validate()?;
        *self.settings.write() = settings;
        Ok(())
    }
}

/// Result of one cluster's turn in a pass.
#[derive(Debug, Clone)]
pub enum ClusterOutcome {
    Skipped(SkipReason),
    Rejected {
        condition: HypocenterCondition,
        demoted: bool,
    },
    Created(Arc<EarthquakeRecord>),
    Updated(Arc<EarthquakeRecord>),
}

#[derive(Debug, Clone)]
pub struct ClusterReport {
    pub cluster_id: u64,
    pub outcome: ClusterOutcome,
}

#[derive(Debug, Clone)]
pub struct PassReport {
    pub clusters: Vec<ClusterReport>,
    pub magnitudes: usize,
    pub elapsed: Duration,
}

impl PassReport {
    pub fn created(&self) -> usize {
        self.clusters
            .iter()
            .filter(|report| matches!(report.outcome, ClusterOutcome::Created(_)))
            .count()
    }
}

/// Hypocenter analysis over every registered cluster.
pub struct EarthquakeAnalysis {
    context: AnalysisContext,
    lifecycle: RecordLifecycleManager,
}

impl EarthquakeAnalysis {
    pub fn new(context: AnalysisContext) -> Self {
        let lifecycle = RecordLifecycleManager::new(context.records.clone(), context.archive.clone());
        Self { context, lifecycle }
    }

    pub fn context(&self) -> &AnalysisContext {
        &self.context
    }

    /// Searches every cluster, then re-estimates magnitudes of all active records.
    pub fn run(&self, now_ms: i64) -> PassReport {
        let started = Instant::now();
        let settings = self.context.settings();
        let clusters = self.context.clusters.snapshot();
        self.context.metrics.record_pass();

        let reports: Vec<ClusterReport> = if settings.parallel {
            clusters
                .par_iter()
                .map(|cluster| self.report(cluster, &settings, now_ms))
                .collect()
        } else {
            clusters
                .iter()
                .map(|cluster| self.report(cluster, &settings, now_ms))
                .collect()
        };

        let magnitudes = self.estimate_magnitudes();
        PassReport {
            clusters: reports,
            magnitudes,
            elapsed: started.elapsed(),
        }
    }

    fn report(&self, cluster: &Arc<Cluster>, settings: &AnalysisSettings, now_ms: i64) -> ClusterReport {
        ClusterReport {
            cluster_id: cluster.id(),
            outcome: self.process_cluster(cluster, settings, now_ms),
        }
    }

    pub fn process_cluster(
        &self,
        cluster: &Arc<Cluster>,
        settings: &AnalysisSettings,
        now_ms: i64,
    ) -> ClusterOutcome {
        let picks = cluster.picked_events();
        if let Some(record) = cluster.earthquake() {
            if Self::report_throttled(&record, picks.len()) {
                return ClusterOutcome::Skipped(SkipReason::AwaitingMorePicks);
            }
        }
        if !cluster.mark_searched() {
            return ClusterOutcome::Skipped(SkipReason::Unchanged);
        }

        let search = settings.search_settings();
        let selected = match PickSelector::prepare(&picks, &search) {
            Ok(selected) => selected,
            Err(reason) => return ClusterOutcome::Skipped(reason),
        };
        let logger = PassLogger::new(cluster.id());
        logger.record_selection(picks.len(), selected.len());
        cluster.set_selected(selected.clone());

        if !PickSelector::has_timing_spread(&selected, &search) {
            logger.record("not enough delta P");
            return ClusterOutcome::Skipped(SkipReason::NotEnoughDeltaP);
        }

        let started = Instant::now();
        self.context.metrics.record_search();
        let candidate = GridSearchEngine::new(self.context.travel_times.as_ref(), search, settings.parallel)
            .with_logger(PassLogger::new(cluster.id()))
            .locate(&selected, cluster.anchor(), cluster.root());
        logger.record_finished(started.elapsed());

        let hypocenter = candidate.map(|c| Hypocenter::from_candidate(&c, selected.len()));
        let previous = cluster.previous_hypocenter();
        match PlausibilityGate::check(hypocenter.as_ref(), &selected, previous.as_ref(), cluster.root()) {
            Ok(accepted) => {
                cluster.set_previous_hypocenter(Some(*accepted));
                match self.lifecycle.accept(cluster, accepted, now_ms) {
                    Acceptance::Created(record) => {
                        self.context.metrics.record_accepted(true);
                        ClusterOutcome::Created(record)
                    }
                    Acceptance::Updated(record) => {
                        self.context.metrics.record_accepted(false);
                        ClusterOutcome::Updated(record)
                    }
                }
            }
            Err(condition) => {
                let pct = hypocenter.map_or(0.0, |h| h.correctness() * 100.0);
                let demoted = Self::demotes(pct, settings.acceptance_threshold_pct)
                    && self.lifecycle.demote(cluster);
                logger.record(&format!("rejected: {} ({:.0}% correct)", condition, pct));
                self.context.metrics.record_rejected(demoted);
                ClusterOutcome::Rejected { condition, demoted }
            }
        }
    }

    /// A rejected solution detaches the record unless its correctness stays
    /// above the acceptance threshold.
    pub fn demotes(correct_pct: f64, threshold_pct: f64) -> bool {
        correct_pct <= threshold_pct
    }

    /// Once a record has many picks, only search again after the pick count
    /// has grown by a fifth. Updates the threshold when a search may proceed.
    pub fn report_throttled(record: &EarthquakeRecord, pick_count: usize) -> bool {
        if pick_count < THROTTLE_MIN_PICKS {
            return false;
        }
        if pick_count < record.next_report_event_count() {
            return true;
        }
        record.set_next_report_event_count((pick_count as f64 * THROTTLE_GROWTH) as usize);
        false
    }

    /// Recomputes the magnitude of every pooled record; returns how many got one.
    pub fn estimate_magnitudes(&self) -> usize {
        let estimator = MagnitudeEstimator::new(
            self.context.travel_times.as_ref(),
            self.context.intensity.as_ref(),
        );
        self.context
            .records
            .snapshot()
            .iter()
            .filter_map(|record| estimator.estimate(record))
            .count()
    }

    /// Retires quiescent records; meant to run on its own periodic tick.
    pub fn sweep(&self, now_ms: i64) -> Vec<Arc<EarthquakeRecord>> {
        let retired = self.lifecycle.sweep(now_ms);
        for record in &retired {
            // The cluster is finished once its record is gone.
            let finished = record
                .cluster()
                .is_some_and(|cluster| cluster.earthquake().is_none());
            if finished {
                self.context.clusters.remove(record.cluster_id());
            }
        }
        if !retired.is_empty() {
            log::info!("retired {} earthquake(s)", retired.len());
            self.context.metrics.record_retired(retired.len());
        }
        retired
    }
}
