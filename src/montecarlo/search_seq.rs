use rand::Rng;

use crate::engine::Move;
use crate::game::GameState;

use super::{run_trial, select_move, BranchEval, MonteCarloConfig, SearchStats, Tally};

/// Single-threaded rollout evaluator.
///
/// All randomness (first-move sampling, rollout moves, tile placement and
/// tie-breaks) comes from the RNG passed to each call.
pub struct MonteCarlo {
    cfg: MonteCarloConfig,
    stats: SearchStats,
}

impl MonteCarlo {
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
    /// use threes_ai::montecarlo::{MonteCarlo, MonteCarloConfig};
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(9);
    /// let game = GameState::new(GameConfig::default(), &mut rng).unwrap();
    /// let mut mc = MonteCarlo::with_config(MonteCarloConfig { trials: 40, ..Default::default() });
    /// let dir = mc.best_move(&game, &mut rng).unwrap();
    /// assert!(game.legal_moves().contains(&dir));
    /// assert_eq!(mc.last_stats().trials, 40);
    /// ```
    pub fn best_move<R: Rng + ?Sized>(&mut self, state: &GameState, rng: &mut R) -> Option<Move> {
        let legal = state.legal_moves();
        if legal.is_empty() {
            return None;
        }
        let evals = self.evaluate(state, &legal, rng);
        Some(select_move(&evals, &legal, rng))
    }

    /// Run the trial budget and report per-direction results in [`Move::ALL`] order.
    ///
    /// Illegal directions are marked `legal = false` and never sampled.
    pub fn branch_evals<R: Rng + ?Sized>(&mut self, state: &GameState, rng: &mut R) -> [BranchEval; 4] {
        let legal = state.legal_moves();
        self.evaluate(state, &legal, rng)
    }

    /// Statistics from the last call to [`Self::best_move`] or [`Self::branch_evals`].
    #[inline]
    pub fn last_stats(&self) -> SearchStats { self.stats }

    #[inline]
    pub fn reset_stats(&mut self) { self.stats = SearchStats::default(); }

    fn evaluate<R: Rng + ?Sized>(&mut self, state: &GameState, legal: &[Move], rng: &mut R) -> [BranchEval; 4] {
        let mut tally = Tally::default();
        if !legal.is_empty() {
            for _ in 0..self.cfg.trials {
                let (dir, survived) = run_trial(state, legal, rng);
                tally.record(dir, survived);
            }
        }
        self.stats = tally.stats();
        tally.branch_evals(legal)
    }
}

impl Default for MonteCarlo { fn default() -> Self { Self::new() } }
