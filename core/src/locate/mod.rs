pub mod evaluator;
pub mod gate;
pub mod pick_selector;
pub mod scratch;
pub mod search;
pub mod selector;

pub use evaluator::CandidateEvaluator;
pub use gate::{HypocenterCondition, PlausibilityGate};
pub use pick_selector::{PickSelector, SkipReason, MIN_SIGNAL_RATIO, TARGET_EVENTS};
pub use scratch::ScratchArena;
pub use search::{GridSearchEngine, PhaseSeed, SearchPhase};
pub use selector::HypocenterSelector;
