use threes_ai::game::{GameConfig, GameState};
use threes_ai::montecarlo::MonteCarlo;

fn main() -> anyhow::Result<()> {
    let mut rng = rand::thread_rng();
    let mut policy = MonteCarlo::new();
    let mut game = GameState::new(GameConfig::default(), &mut rng)?;
    println!("{}", game.board());
    let mut rollout_moves: u64 = 0;
    while !game.is_over() {
        let Some(direction) = policy.best_move(&game, &mut rng) else { break };
        game.apply_move(direction, &mut rng);
        rollout_moves += policy.last_stats().rollout_moves;
        println!("{} | next: {}", direction, game.next_tile());
        println!("{}", game.board());
    }
    println!(
        "Moves made: {}, Highest tile: {}, Rollout moves simulated: {}",
        game.moves_played(),
        game.highest_tile(),
        rollout_moves
    );
    Ok(())
}
