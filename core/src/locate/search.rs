use crate::locate::evaluator::CandidateEvaluator;
use crate::locate::scratch::ScratchArena;
use crate::locate::selector::HypocenterSelector;
use crate::math::{Coordinate, GlobeMove};
use crate::model::{CandidateHypocenter, PickedEvent};
use crate::prelude::{SearchSettings, MAX_DEPTH_KM};
use crate::telemetry::log::PassLogger;
use rayon::prelude::*;
use std::time::Instant;

/// Where a phase takes its seed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseSeed {
    Anchor,
    Root,
    Best,
}

/// Parameters of one coarse-to-fine search phase, already scaled by the
/// resolution multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchPhase {
    pub name: &'static str,
    pub seed: PhaseSeed,
    pub ring_step_km: f64,
    pub max_distance_km: f64,
    pub depth_iterations: usize,
    /// Horizontal spacing driving the angular step of each ring.
    pub horizontal_km: f64,
}

impl SearchPhase {
    /// The five phases: wide, near the wide winner, near the root, exact, depth.
    pub fn schedule(settings: &SearchSettings) -> [SearchPhase; 5] {
        let m = settings.resolution_multiplier();
        let offset = settings.depth_iteration_offset();
        let iterations = |base: i32| (base + offset).max(1) as usize;
        [
            SearchPhase {
                name: "far",
                seed: PhaseSeed::Anchor,
                ring_step_km: 100.0 / m,
                max_distance_km: 10_000.0,
                depth_iterations: iterations(5),
                horizontal_km: 100.0 / m,
            },
            SearchPhase {
                name: "close",
                seed: PhaseSeed::Best,
                ring_step_km: 10.0 / m,
                max_distance_km: 1_000.0,
                depth_iterations: iterations(6),
                horizontal_km: 16.0 / m,
            },
            SearchPhase {
                name: "close to root",
                seed: PhaseSeed::Root,
                ring_step_km: 10.0 / m,
                max_distance_km: 1_000.0,
                depth_iterations: iterations(6),
                horizontal_km: 16.0 / m,
            },
            SearchPhase {
                name: "exact",
                seed: PhaseSeed::Best,
                ring_step_km: 2.0 / m,
                max_distance_km: 100.0,
                depth_iterations: iterations(7),
                horizontal_km: 2.0,
            },
            SearchPhase {
                name: "depth",
                seed: PhaseSeed::Best,
                ring_step_km: 1.0 / m,
                max_distance_km: 10.0,
                depth_iterations: iterations(10),
                horizontal_km: 0.4 / m,
            },
        ]
    }

    fn rings(&self) -> Vec<f64> {
        let mut rings = Vec::new();
        let mut distance = 0.0;
        while distance < self.max_distance_km {
            rings.push(distance);
            distance += self.ring_step_km;
        }
        rings
    }
}

/// Five-phase coarse-to-fine hypocenter search over rings, angles and depth.
pub struct GridSearchEngine<'a> {
    evaluator: CandidateEvaluator<'a>,
    settings: SearchSettings,
    parallel: bool,
    max_depth_km: f64,
    logger: PassLogger,
}

impl<'a> GridSearchEngine<'a> {
    pub fn new(
        travel_times: &'a dyn crate::traveltime::TravelTimeTable,
        settings: SearchSettings,
        parallel: bool,
    ) -> Self {
        Self {
            evaluator: CandidateEvaluator::new(travel_times, settings.pick_timing_tolerance_ms),
            settings,
            parallel,
            max_depth_km: MAX_DEPTH_KM,
            logger: PassLogger::default(),
        }
    }

    pub fn with_logger(mut self, logger: PassLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Runs all phases and returns the overall best candidate, if any was valid.
    pub fn locate(
        &self,
        picks: &[PickedEvent],
        anchor: Coordinate,
        root: Coordinate,
    ) -> Option<CandidateHypocenter> {
        if picks.is_empty() {
            return None;
        }
        let mut best: Option<CandidateHypocenter> = None;
        for phase in SearchPhase::schedule(&self.settings) {
            let seed = match phase.seed {
                PhaseSeed::Anchor => anchor,
                PhaseSeed::Root => root,
                PhaseSeed::Best => best
                    .map(|b| Coordinate::new(b.lat, b.lon))
                    .unwrap_or(anchor),
            };
            let started = Instant::now();
            let found = self.scan_area(picks, &phase, seed);
            best = HypocenterSelector::select(found, best);
            self.logger
                .record_phase(phase.name, started.elapsed(), best.as_ref());
        }
        best
    }

    /// Best candidate over every ring of one phase around `seed`.
    pub fn scan_area(
        &self,
        picks: &[PickedEvent],
        phase: &SearchPhase,
        seed: Coordinate,
    ) -> Option<CandidateHypocenter> {
        let rings = phase.rings();
        if self.parallel {
            rings
                .par_iter()
                .map_init(
                    || ScratchArena::new(picks),
                    |arena, &distance| {
                        arena.reset();
                        self.best_at_distance(distance, phase, seed, arena);
                        arena.take_best()
                    },
                )
                .reduce_with(HypocenterSelector::select)
                .flatten()
        } else {
            let mut arena = ScratchArena::new(picks);
            rings.iter().fold(None, |best, &distance| {
                arena.reset();
                self.best_at_distance(distance, phase, seed, &mut arena);
                HypocenterSelector::select(best, arena.take_best())
            })
        }
    }

    fn best_at_distance(
        &self,
        distance_km: f64,
        phase: &SearchPhase,
        seed: Coordinate,
        arena: &mut ScratchArena,
    ) {
        // Dense near the seed, coarse far away.
        let angular_step = (phase.horizontal_km * 360.0) / (5.0 * distance_km + 10.0)
            / self.settings.resolution_multiplier();
        let mover = GlobeMove::new(seed.lat, seed.lon, distance_km);

        let mut angle = 0.0;
        while angle < 360.0 {
            let point = mover.destination(angle);
            CandidateEvaluator::annotate_distances(&mut arena.picks, point.lat, point.lon);
            self.best_at_depth(point, phase.depth_iterations, arena);
            angle += angular_step;
        }
    }

    fn best_at_depth(&self, point: Coordinate, iterations: usize, arena: &mut ScratchArena) {
        let ScratchArena {
            picks,
            candidate_a,
            candidate_b,
            best,
            origins,
        } = arena;

        let mut lower = 0.0;
        let mut upper = self.max_depth_km;
        for _ in 0..iterations {
            let depth_a = lower + (upper - lower) / 3.0;
            let depth_b = lower + (upper - lower) * (2.0 / 3.0);

            let a = self
                .evaluator
                .evaluate(point.lat, point.lon, depth_a, picks, origins, candidate_a)
                .then_some(*candidate_a);
            let b = self
                .evaluator
                .evaluate(point.lat, point.lon, depth_b, picks, origins, candidate_b)
                .then_some(*candidate_b);

            // With neither depth valid the bracket moves toward the surface.
            let shallower_wins = match (&a, &b) {
                (Some(a), Some(b)) => HypocenterSelector::first_wins(a, b),
                (_, None) => true,
                (None, Some(_)) => false,
            };
            let better = if shallower_wins { a } else { b };
            *best = HypocenterSelector::select(*best, better);

            let middle = (upper + lower) / 2.0;
            if shallower_wins {
                upper = middle;
            } else {
                lower = middle;
            }
        }

        // Shallow events are common and easy for the bisection to miss.
        for depth in [0.0, 10.0] {
            if self
                .evaluator
                .evaluate(point.lat, point.lon, depth, picks, origins, candidate_a)
            {
                *best = HypocenterSelector::select(*best, Some(*candidate_a));
            }
        }
    }
}
