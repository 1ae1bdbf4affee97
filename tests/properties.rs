//! Property-based tests for the board, deck, game and rollout evaluator.

use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use threes_ai::deck::{bonus_candidates, TileDeck, BASE_TILES, BONUS_THRESHOLD};
use threes_ai::engine::{shift_line_left, Board, Move, Tile};
use threes_ai::game::{GameConfig, GameState};
use threes_ai::montecarlo::evaluate_best_move;

const TILE_VALUES: [Tile; 10] = [0, 0, 0, 1, 2, 3, 6, 12, 24, 48];

// =============================================================================
// Strategies
// =============================================================================

fn arb_tile() -> impl Strategy<Value = Tile> {
    prop::sample::select(TILE_VALUES.to_vec())
}

fn arb_board() -> impl Strategy<Value = Board> {
    (2usize..=5).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec(arb_tile(), n), n)
            .prop_map(|rows| Board::from_rows(rows).unwrap())
    })
}

fn arb_move() -> impl Strategy<Value = Move> {
    prop::sample::select(Move::ALL.to_vec())
}

/// A game reached from a fresh deal by a few random moves.
fn arb_reachable_game() -> impl Strategy<Value = GameState> {
    (any::<u64>(), 0usize..40).prop_map(|(seed, steps)| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = GameState::new(GameConfig::default(), &mut rng).unwrap();
        for _ in 0..steps {
            let Some(&dir) = game.legal_moves().choose(&mut rng) else { break };
            game.apply_move(dir, &mut rng);
        }
        game
    })
}

// =============================================================================
// Board
// =============================================================================

proptest! {
    #[test]
    fn legality_matches_swipe(board in arb_board(), incoming in arb_tile(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let legal = board.legal_moves();
        for dir in Move::ALL {
            let changed = board.swipe(dir, incoming, &mut rng) != board;
            prop_assert_eq!(legal.contains(&dir), changed, "dir {}", dir);
            prop_assert_eq!(board.is_legal(dir), changed);
            prop_assert_eq!(board.shift(dir) != board, changed);
        }
    }

    #[test]
    fn terminal_iff_no_legal_moves(board in arb_board()) {
        prop_assert_eq!(board.is_terminal(), board.legal_moves().is_empty());
    }

    #[test]
    fn mergeable_neighbours_are_never_terminal(n in 2usize..=5, r in 0usize..5, c in 0usize..4, pair in prop::sample::select(vec![(1, 2), (2, 1), (3, 3), (12, 12)])) {
        let (r, c) = (r % n, c % (n - 1));
        // Checkerboard of 1s and 3s has no merges; plant one mergeable pair.
        let mut rows: Vec<Vec<Tile>> = (0..n).map(|i| (0..n).map(|j| if (i + j) % 2 == 0 { 1 } else { 3 }).collect()).collect();
        rows[r][c] = pair.0;
        rows[r][c + 1] = pair.1;
        let board = Board::from_rows(rows).unwrap();
        prop_assert!(!board.is_terminal());
        prop_assert!(board.is_legal(Move::Left));
    }

    #[test]
    fn swipe_conserves_tile_sum(board in arb_board(), dir in arb_move(), incoming in prop::sample::select(vec![1u32, 2, 3, 6]), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let after = board.swipe(dir, incoming, &mut rng);
        if after != board {
            // Merges preserve value; only the inserted tile adds to the total.
            prop_assert_eq!(after.tile_sum(), board.tile_sum() + incoming as u64);
            prop_assert!(after.count_tiles() <= board.count_tiles() + 1);
        }
    }

    #[test]
    fn slide_only_swipe_adds_exactly_one_tile(n in 2usize..=5, seed in any::<u64>()) {
        // A single column of 3s on the right edge can only slide left.
        let rows: Vec<Vec<Tile>> = (0..n).map(|_| { let mut row = vec![0; n]; row[n - 1] = 3; row }).collect();
        let board = Board::from_rows(rows).unwrap();
        let after = board.swipe(Move::Left, 1, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(after.count_tiles(), board.count_tiles() + 1);
        prop_assert_eq!(after.cells().iter().filter(|&&t| t == 3).count(), n);
    }

    #[test]
    fn packed_line_is_a_fixed_point(len in 2usize..8, seed in any::<u64>()) {
        // Alternating 1s and 3s cannot merge and leave no gaps.
        let offset = (seed % 2) as usize;
        let line: Vec<Tile> = (0..len).map(|i| if (i + offset) % 2 == 0 { 1 } else { 3 }).collect();
        let mut once = line.clone();
        prop_assert!(!shift_line_left(&mut once));
        let mut twice = once.clone();
        prop_assert!(!shift_line_left(&mut twice));
        prop_assert_eq!(&once, &line);
        prop_assert_eq!(&twice, &line);
    }
}

// =============================================================================
// Deck
// =============================================================================

proptest! {
    #[test]
    fn no_bonus_below_threshold(h in 0u32..BONUS_THRESHOLD) {
        prop_assert!(bonus_candidates(h).is_empty());
    }

    #[test]
    fn bonus_candidates_shape(k in 0u32..12) {
        let h = 48 << k;
        let bonus = bonus_candidates(h);
        prop_assert!(!bonus.is_empty() && bonus.len() <= 3);
        prop_assert_eq!(bonus[0], h / 8);
        prop_assert!(bonus.windows(2).all(|w| w[1] * 2 == w[0]));
        prop_assert!(bonus.iter().all(|&b| b >= 6 && b % 3 == 0));
    }

    #[test]
    fn deck_never_exhausts(draws in 1usize..400, hint in prop::sample::select(vec![3u32, 48, 96, 192, 768]), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut deck = TileDeck::new(&mut rng);
        let bonus = bonus_candidates(hint);
        let refill_len = BASE_TILES.len() * 2 + usize::from(!bonus.is_empty());
        let mut regenerations = 0usize;
        for _ in 0..draws {
            let was_empty = deck.is_empty();
            let tile = deck.draw_next(hint, &mut rng);
            if was_empty {
                regenerations += 1;
                // 24 base tiles plus at most one bonus, minus the one just drawn.
                prop_assert_eq!(deck.len() + 1, refill_len);
            }
            prop_assert!((1..=3).contains(&tile) || bonus.contains(&tile));
        }
        // The opening deck holds 24; every later one holds `refill_len`.
        let expected = if draws > 24 { (draws - 25) / refill_len + 1 } else { 0 };
        prop_assert_eq!(regenerations, expected);
    }
}

// =============================================================================
// Game and evaluator
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn history_tracks_successful_moves(game in arb_reachable_game(), dir in arb_move(), seed in any::<u64>()) {
        let mut game = game;
        let before_len = game.history().len();
        let before = game.clone();
        let ok = game.apply_move(dir, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(ok, before.legal_moves().contains(&dir));
        if ok {
            prop_assert_eq!(game.history().len(), before_len + 1);
            let last = game.history().last().unwrap();
            prop_assert_eq!(last.mv(), Some(dir));
            prop_assert_eq!(&last.board, game.board());
            prop_assert_eq!(last.next_tile, game.next_tile());
        } else {
            prop_assert_eq!(&game, &before);
            prop_assert_eq!(game.history().len(), before_len);
        }
    }

    #[test]
    fn evaluator_returns_legal_move(game in arb_reachable_game(), seed in any::<u64>(), trials in 0u64..30) {
        prop_assume!(!game.is_over());
        let snapshot = game.clone();
        let dir = evaluate_best_move(&game, trials, &mut StdRng::seed_from_u64(seed));
        prop_assert!(game.legal_moves().contains(&dir));
        prop_assert_eq!(&game, &snapshot);
        prop_assert_eq!(game.history(), snapshot.history());
    }
}
