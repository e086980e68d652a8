use crate::model::{CandidateHypocenter, PickedEvent, WorkingPick};

/// Per-worker search scratch: private pick copies, the two bisection slots,
/// the best-so-far slot and the predicted-origin buffer.
///
/// Allocated once per worker and reset between rings; never shared.
pub struct ScratchArena {
    pub picks: Vec<WorkingPick>,
    pub candidate_a: CandidateHypocenter,
    pub candidate_b: CandidateHypocenter,
    pub best: Option<CandidateHypocenter>,
    pub origins: Vec<i64>,
}

impl ScratchArena {
    pub fn new(picks: &[PickedEvent]) -> Self {
        Self {
            picks: picks.iter().copied().map(WorkingPick::from).collect(),
            candidate_a: CandidateHypocenter::default(),
            candidate_b: CandidateHypocenter::default(),
            best: None,
            origins: Vec::with_capacity(picks.len()),
        }
    }

    /// Clears the best slot before the arena serves another work item.
    pub fn reset(&mut self) {
        self.best = None;
        self.origins.clear();
    }

    pub fn take_best(&mut self) -> Option<CandidateHypocenter> {
        self.best.take()
    }
}
