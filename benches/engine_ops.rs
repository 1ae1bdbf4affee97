use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;
use threes_ai::deck::TileDeck;
use threes_ai::engine::{shift_line_left, Board, Move};
use threes_ai::game::{GameConfig, GameState};

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut boards = Vec::new();
    let mut game = GameState::new(GameConfig::default(), &mut rng).unwrap();
    boards.push(game.board().clone());
    // Derive a variety of densities deterministically
    while boards.len() < 64 && !game.is_over() {
        let moves = game.legal_moves();
        let dir = *moves.choose(&mut rng).unwrap();
        game.apply_move(dir, &mut rng);
        boards.push(game.board().clone());
    }
    boards
}

fn bench_shift(c: &mut Criterion) {
    c.bench_function("line/shift_line_left", |bch| {
        let lines: Vec<[u32; 4]> = corpus().iter().flat_map(|b| b.rows()).map(|r| [r[0], r[1], r[2], r[3]]).collect();
        bch.iter(|| {
            let mut acc = 0u32;
            for line in &lines {
                let mut l = *line;
                shift_line_left(&mut l);
                acc ^= l[0];
            }
            black_box(acc)
        })
    });
    for dir in Move::ALL {
        c.bench_function(&format!("shift/{}", dir), |bch| {
            let boards = corpus();
            bch.iter(|| {
                let mut acc = 0u64;
                for bd in &boards { acc ^= bd.shift(dir).tile_sum(); }
                black_box(acc)
            })
        });
    }
}

fn bench_queries(c: &mut Criterion) {
    c.bench_function("query/legal_moves", |bch| {
        let boards = corpus();
        bch.iter(|| {
            let mut acc = 0usize;
            for bd in &boards { acc += bd.legal_moves().len(); }
            black_box(acc)
        })
    });
    c.bench_function("query/is_terminal", |bch| {
        let boards = corpus();
        bch.iter(|| {
            let mut acc = 0usize;
            for bd in &boards { acc += bd.is_terminal() as usize; }
            black_box(acc)
        })
    });
}

fn bench_game(c: &mut Criterion) {
    c.bench_function("deck/draw_240", |bch| {
        bch.iter_batched(
            || StdRng::seed_from_u64(7),
            |mut rng| {
                let mut deck = TileDeck::new(&mut rng);
                let mut acc = 0u32;
                for _ in 0..240 { acc = acc.wrapping_add(deck.draw_next(96, &mut rng)); }
                black_box(acc)
            },
            BatchSize::SmallInput,
        )
    });
    c.bench_function("game/random_playout", |bch| {
        bch.iter_batched(
            || {
                let mut rng = StdRng::seed_from_u64(9);
                let game = GameState::new(GameConfig::default(), &mut rng).unwrap();
                (game, rng)
            },
            |(mut game, mut rng)| {
                while let Some(&dir) = game.legal_moves().choose(&mut rng) {
                    game.apply_move(dir, &mut rng);
                }
                black_box(game.moves_played())
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(engine_ops, bench_shift, bench_queries, bench_game);
criterion_main!(engine_ops);
