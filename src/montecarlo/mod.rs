//! Monte-Carlo rollout policy (single-threaded and parallel) for Threes!.
//!
//! For each decision the evaluator spends a fixed budget of trials. A trial
//! clones the live game, plays a uniformly chosen legal first move, then plays
//! uniformly random legal moves until the game ends. The number of moves the
//! clone survived is credited to the first move. The move with the highest
//! smoothed mean survival wins; ties are broken uniformly at random.
//!
//! - [`MonteCarlo`]: sequential trials on the caller's RNG.
//! - [`MonteCarloParallel`]: rayon-based, one independent RNG stream per chunk.
//!
//! Quick start
//! ```
//! use threes_ai::game::{GameConfig, GameState};
//! use threes_ai::montecarlo::{evaluate_best_move, MonteCarlo, MonteCarloConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(123);
//! let game = GameState::new(GameConfig::default(), &mut rng).unwrap();
//!
//! let dir = evaluate_best_move(&game, 50, &mut rng);
//! assert!(game.legal_moves().contains(&dir));
//!
//! let mut mc = MonteCarlo::with_config(MonteCarloConfig { trials: 50, ..Default::default() });
//! let branches = mc.branch_evals(&game, &mut rng);
//! assert_eq!(branches.iter().map(|b| b.trials).sum::<u64>(), 50);
//! ```

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::Move;
use crate::game::GameState;

mod search_par;
mod search_seq;

pub use search_par::MonteCarloParallel;
pub use search_seq::MonteCarlo;

/// Default number of rollouts per decision.
pub const DEFAULT_TRIALS: u64 = 1000;

/// Configurable knobs for the rollout evaluator.
///
/// - `trials`: rollouts per decision, shared across all candidate moves.
/// - `par_chunks`: number of independent work units the parallel variant
///   splits `trials` into. Fixed so results do not depend on thread count.
#[derive(Debug, Clone, Copy)]
pub struct MonteCarloConfig {
    pub trials: u64,
    pub par_chunks: usize,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self { trials: DEFAULT_TRIALS, par_chunks: 16 }
    }
}

/// Per-direction rollout summary at the root.
///
/// `mean` is `survival_sum / (trials + 1)`; the extra count keeps unsampled
/// directions at zero instead of dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchEval {
    pub dir: Move,
    pub survival_sum: u64,
    pub trials: u64,
    pub mean: f64,
    pub legal: bool,
}

/// Basic stats for a single evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub trials: u64,
    pub rollout_moves: u64,
}

/// Evaluate `state` with `trial_count` rollouts and return the chosen move.
///
/// # Panics
/// If `state` is already over. Check [`GameState::is_over`] first.
pub fn evaluate_best_move<R: Rng + ?Sized>(state: &GameState, trial_count: u64, rng: &mut R) -> Move {
    let legal = state.legal_moves();
    assert!(!legal.is_empty(), "evaluate_best_move called on a finished game");
    let mut tally = Tally::default();
    for _ in 0..trial_count {
        let (dir, survived) = run_trial(state, &legal, rng);
        tally.record(dir, survived);
    }
    select_move(&tally.branch_evals(&legal), &legal, rng)
}

/// Survival sums and trial counts per direction, indexed by [`Move::index`].
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Tally {
    sums: [u64; 4],
    counts: [u64; 4],
    rollout_moves: u64,
}

impl Tally {
    #[inline]
    pub(crate) fn record(&mut self, dir: Move, survived: u64) {
        self.sums[dir.index()] += survived;
        self.counts[dir.index()] += 1;
        self.rollout_moves += survived;
    }

    pub(crate) fn merge(mut self, other: Tally) -> Tally {
        for i in 0..4 {
            self.sums[i] += other.sums[i];
            self.counts[i] += other.counts[i];
        }
        self.rollout_moves += other.rollout_moves;
        self
    }

    pub(crate) fn stats(&self) -> SearchStats {
        SearchStats { trials: self.counts.iter().sum(), rollout_moves: self.rollout_moves }
    }

    pub(crate) fn branch_evals(&self, legal: &[Move]) -> [BranchEval; 4] {
        Move::ALL.map(|dir| {
            let i = dir.index();
            BranchEval {
                dir,
                survival_sum: self.sums[i],
                trials: self.counts[i],
                mean: self.sums[i] as f64 / (self.counts[i] + 1) as f64,
                legal: legal.contains(&dir),
            }
        })
    }
}

/// Play one rollout from `state`. Returns the first move and how many moves the clone made.
pub(crate) fn run_trial<R: Rng + ?Sized>(state: &GameState, legal: &[Move], rng: &mut R) -> (Move, u64) {
    let first = *legal.choose(rng).unwrap_or(&Move::Left);
    let mut sim = state.clone();
    sim.apply_move(first, rng);
    while let Some(&dir) = sim.legal_moves().choose(rng) {
        sim.apply_move(dir, rng);
    }
    (first, (sim.moves_played() - state.moves_played()) as u64)
}

/// Pick the best direction from `evals`, breaking ties uniformly.
///
/// Falls back to a uniformly random legal move when every mean is zero.
pub(crate) fn select_move<R: Rng + ?Sized>(evals: &[BranchEval; 4], legal: &[Move], rng: &mut R) -> Move {
    let best = evals.iter().map(|b| b.mean).fold(0.0, f64::max);
    let candidates: Vec<Move> = if best == 0.0 {
        legal.to_vec()
    } else {
        evals.iter().filter(|b| b.mean == best).map(|b| b.dir).collect()
    };
    let dir = *candidates.choose(rng).unwrap_or(&legal[0]);
    debug!(
        "means [{}] -> {} ({} tied)",
        evals.iter().map(|b| format!("{}={:.2}", b.dir, b.mean)).collect::<Vec<_>>().join(", "),
        dir,
        candidates.len()
    );
    dir
}
