use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::engine::Move;
use crate::game::GameState;

use super::{run_trial, select_move, BranchEval, MonteCarloConfig, SearchStats, Tally};

/// Parallel rollout evaluator using rayon.
///
/// The trial budget is cut into `par_chunks` pieces. Each piece gets its own
/// `StdRng` seeded from the caller's RNG, runs its trials on private clones and
/// returns a [`Tally`]; tallies are summed once every piece has finished. For
/// a fixed seed the result does not depend on how many threads rayon uses.
pub struct MonteCarloParallel {
    cfg: MonteCarloConfig,
    stats: SearchStats,
}

impl MonteCarloParallel {
    pub fn new() -> Self { Self::with_config(MonteCarloConfig::default()) }

    pub fn with_config(cfg: MonteCarloConfig) -> Self {
        Self { cfg, stats: SearchStats::default() }
    }

    #[inline]
    pub fn config(&self) -> &MonteCarloConfig { &self.cfg }

    /// Choose a move for `state`, or `None` if the game is over.
    ///
    /// ```
    /// use threes_ai::game::{GameConfig, GameState};
    /// use threes_ai::montecarlo::{MonteCarloConfig, MonteCarloParallel};
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(21);
    /// let game = GameState::new(GameConfig::default(), &mut rng).unwrap();
    /// let mut mc = MonteCarloParallel::with_config(MonteCarloConfig { trials: 64, par_chunks: 8 });
    /// assert!(mc.best_move(&game, &mut rng).is_some());
    /// ```
    pub fn best_move<R: Rng + ?Sized>(&mut self, state: &GameState, rng: &mut R) -> Option<Move> {
        let legal = state.legal_moves();
        if legal.is_empty() {
            return None;
        }
        let evals = self.evaluate(state, &legal, rng);
        Some(select_move(&evals, &legal, rng))
    }

    /// Convenience for runners: best move plus the evaluations it was picked from.
    pub fn best_move_with_branches<R: Rng + ?Sized>(
        &mut self,
        state: &GameState,
        rng: &mut R,
    ) -> (Option<Move>, [BranchEval; 4]) {
        let legal = state.legal_moves();
        let evals = self.evaluate(state, &legal, rng);
        let best = if legal.is_empty() { None } else { Some(select_move(&evals, &legal, rng)) };
        (best, evals)
    }

    /// Per-direction results in [`Move::ALL`] order.
    pub fn branch_evals<R: Rng + ?Sized>(&mut self, state: &GameState, rng: &mut R) -> [BranchEval; 4] {
        let legal = state.legal_moves();
        self.evaluate(state, &legal, rng)
    }

    #[inline]
    pub fn last_stats(&self) -> SearchStats { self.stats }

    #[inline]
    pub fn reset_stats(&mut self) { self.stats = SearchStats::default(); }

    fn evaluate<R: Rng + ?Sized>(&mut self, state: &GameState, legal: &[Move], rng: &mut R) -> [BranchEval; 4] {
        let tally = if legal.is_empty() {
            Tally::default()
        } else {
            let chunks = self.cfg.par_chunks.max(1) as u64;
            let trials = self.cfg.trials;
            let seeds: Vec<u64> = (0..chunks).map(|_| rng.gen()).collect();
            seeds
                .par_iter()
                .enumerate()
                .map(|(i, &seed)| {
                    // Spread the remainder over the first chunks.
                    let i = i as u64;
                    let n = trials / chunks + u64::from(i < trials % chunks);
                    let mut worker_rng = StdRng::seed_from_u64(seed);
                    let mut tally = Tally::default();
                    for _ in 0..n {
                        let (dir, survived) = run_trial(state, legal, &mut worker_rng);
                        tally.record(dir, survived);
                    }
                    tally
                })
                .reduce(Tally::default, Tally::merge)
        };
        self.stats = tally.stats();
        tally.branch_evals(legal)
    }
}

impl Default for MonteCarloParallel { fn default() -> Self { Self::new() } }
