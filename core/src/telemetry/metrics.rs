use serde::Serialize;
use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub passes: usize,
    pub searches: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub created: usize,
    pub demoted: usize,
    pub retired: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    fn bump(&self, field: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            field(&mut metrics);
        }
    }

    pub fn record_pass(&self) {
        self.bump(|m| m.passes += 1);
    }

    pub fn record_search(&self) {
        self.bump(|m| m.searches += 1);
    }

    pub fn record_accepted(&self, created: bool) {
        self.bump(|m| {
            m.accepted += 1;
            if created {
                m.created += 1;
            }
        });
    }

    pub fn record_rejected(&self, demoted: bool) {
        self.bump(|m| {
            m.rejected += 1;
            if demoted {
                m.demoted += 1;
            }
        });
    }

    pub fn record_retired(&self, count: usize) {
        self.bump(|m| m.retired += count);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
