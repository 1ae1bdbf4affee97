//! Move-selection strategies behind one interface.
//!
//! - [`RandomPolicy`]: uniformly random legal move.
//! - [`MonteCarlo`] / [`MonteCarloParallel`]: rollout evaluators.

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::engine::Move;
use crate::game::GameState;
use crate::montecarlo::{MonteCarlo, MonteCarloParallel};

/// A player: given a game, return a legal move, or `None` once the game is over.
pub trait Policy {
    fn name(&self) -> &'static str;
    fn next_move(&mut self, state: &GameState, rng: &mut dyn RngCore) -> Option<Move>;
}

/// Picks uniformly among the legal moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPolicy;

impl Policy for RandomPolicy {
    fn name(&self) -> &'static str { "random" }

    fn next_move(&mut self, state: &GameState, rng: &mut dyn RngCore) -> Option<Move> {
        state.legal_moves().choose(rng).copied()
    }
}

impl Policy for MonteCarlo {
    fn name(&self) -> &'static str { "monte-carlo" }

    fn next_move(&mut self, state: &GameState, rng: &mut dyn RngCore) -> Option<Move> {
        self.best_move(state, rng)
    }
}

impl Policy for MonteCarloParallel {
    fn name(&self) -> &'static str { "monte-carlo-parallel" }

    fn next_move(&mut self, state: &GameState, rng: &mut dyn RngCore) -> Option<Move> {
        self.best_move(state, rng)
    }
}

/// Drive `state` with `policy` until the game ends or `max_moves` is reached.
///
/// Returns the number of moves applied.
///
/// ```
/// use threes_ai::game::{GameConfig, GameState};
/// use threes_ai::policy::{play_out, RandomPolicy};
/// use rand::{rngs::StdRng, SeedableRng};
/// let mut rng = StdRng::seed_from_u64(4);
/// let mut game = GameState::new(GameConfig::default(), &mut rng).unwrap();
/// let played = play_out(&mut game, &mut RandomPolicy, None, &mut rng);
/// assert!(game.is_over());
/// assert_eq!(played, game.moves_played());
/// ```
pub fn play_out(
    state: &mut GameState,
    policy: &mut dyn Policy,
    max_moves: Option<usize>,
    rng: &mut dyn RngCore,
) -> usize {
    let mut played = 0;
    while !state.is_over() && max_moves.map_or(true, |cap| played < cap) {
        let Some(dir) = policy.next_move(state, rng) else { break };
        if state.apply_move(dir, rng) {
            played += 1;
        }
    }
    played
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameConfig;
    use crate::montecarlo::MonteCarloConfig;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn random_policy_only_returns_legal_moves() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut game = GameState::new(GameConfig::default(), &mut rng).unwrap();
        let mut policy = RandomPolicy;
        while let Some(dir) = policy.next_move(&game, &mut rng) {
            assert!(game.legal_moves().contains(&dir));
            assert!(game.apply_move(dir, &mut rng));
        }
        assert!(game.is_over());
    }

    #[test]
    fn play_out_respects_cap() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut game = GameState::new(GameConfig::default(), &mut rng).unwrap();
        let mut policy = MonteCarlo::with_config(MonteCarloConfig { trials: 8, ..Default::default() });
        let played = play_out(&mut game, &mut policy, Some(3), &mut rng);
        assert_eq!(played, 3);
        assert_eq!(game.moves_played(), 3);
    }

    #[test]
    fn policies_are_object_safe() {
        let policies: Vec<Box<dyn Policy>> = vec![
            Box::new(RandomPolicy),
            Box::new(MonteCarlo::with_config(MonteCarloConfig { trials: 4, ..Default::default() })),
            Box::new(MonteCarloParallel::with_config(MonteCarloConfig { trials: 4, par_chunks: 2 })),
        ];
        let names: Vec<&str> = policies.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["random", "monte-carlo", "monte-carlo-parallel"]);
    }
}
