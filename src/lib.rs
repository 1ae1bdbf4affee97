//! threes-ai: a Threes! game engine + Monte-Carlo rollout policy
//!
//! This crate provides:
//! - A square `Board` with pure swipe/merge operations (`engine` module)
//! - The Threes! tile deck with bonus tiles (`deck` module)
//! - `GameState`, the move-by-move state machine with history (`game` module)
//! - A rollout evaluator, single-threaded and rayon-parallel (`montecarlo` module)
//! - A `Policy` trait tying players together, and JSON-lines game records
//!
//! All randomness is injected: every operation that needs it takes `&mut impl Rng`.
//!
//! Quick start:
//! ```
//! use threes_ai::engine::{Board, Move};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let b0 = Board::from_rows(vec![vec![1, 2, 0, 0], vec![0, 3, 3, 0], vec![0; 4], vec![0; 4]]).unwrap();
//! let b1 = b0.swipe(Move::Left, 1, &mut rng);
//! assert_eq!(b1.count_tiles(), 4);
//! assert_eq!(b1.rows()[0][0], 3);
//! ```
//!
//! Full loop (simplest possible)
//! ```
//! use threes_ai::game::{GameConfig, GameState};
//! use threes_ai::montecarlo::{MonteCarlo, MonteCarloConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // 1) Deal a game and set up the policy
//! let mut rng = StdRng::seed_from_u64(123);
//! let mut game = GameState::new(GameConfig::default(), &mut rng).unwrap();
//! let mut policy = MonteCarlo::with_config(MonteCarloConfig { trials: 20, ..Default::default() });
//!
//! // 2) Play a few moves (keep doctests fast)
//! let mut moves = 0;
//! while !game.is_over() && moves < 4 {
//!     match policy.best_move(&game, &mut rng) {
//!         Some(dir) => { game.apply_move(dir, &mut rng); moves += 1; }
//!         None => break,
//!     }
//! }
//!
//! // 3) Inspect the result
//! assert_eq!(game.moves_played(), 4);
//! assert_eq!(game.history()[0].label, "start");
//! ```
//!
pub mod engine;
pub mod deck;
pub mod game;
pub mod montecarlo;
pub mod policy;
pub mod record;
