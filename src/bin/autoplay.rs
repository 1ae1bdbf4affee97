use std::collections::BTreeMap;
use std::fs;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, LevelFilter, Log, Metadata, Record};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use threes_ai::engine::Tile;
use threes_ai::game::{GameConfig, GameState};
use threes_ai::montecarlo::{MonteCarlo, MonteCarloConfig, MonteCarloParallel, DEFAULT_TRIALS};
use threes_ai::policy::{Policy, RandomPolicy};
use threes_ai::record::{self, GameRecord};

#[derive(Debug, Parser)]
#[command(name = "autoplay", version, about = "Play batches of Threes! games with a chosen policy")]
struct Args {
    /// Number of games to play
    #[arg(short = 'n', long, default_value_t = 1)]
    games: u64,

    /// Move-selection policy
    #[arg(long, value_enum, default_value_t = PolicyKind::MonteCarlo)]
    policy: PolicyKind,

    /// Rollouts per decision (Monte-Carlo only)
    #[arg(short, long, default_value_t = DEFAULT_TRIALS)]
    trials: u64,

    /// Work units the parallel evaluator splits each decision into
    #[arg(long, default_value_t = 16)]
    par_chunks: usize,

    /// Evaluate rollouts on the calling thread only
    #[arg(long)]
    sequential: bool,

    /// Board edge length
    #[arg(long, default_value_t = 4)]
    size: usize,

    /// Tiles dealt before the first move
    #[arg(long, default_value_t = 9)]
    starting_tiles: usize,

    /// Seed for reproducible runs (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Stop each game after this many moves
    #[arg(long)]
    max_moves: Option<usize>,

    /// Write every finished game as one JSON line to this path
    #[arg(long)]
    history_out: Option<PathBuf>,

    /// Suppress the status line and summary
    #[arg(long)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyKind {
    MonteCarlo,
    Random,
}

struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool { metadata.level() <= self.level }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log::set_boxed_logger(Box::new(StderrLogger { level })).is_ok() {
        log::set_max_level(level);
    }
}

fn build_policy(args: &Args) -> Box<dyn Policy> {
    let cfg = MonteCarloConfig { trials: args.trials, par_chunks: args.par_chunks };
    match (args.policy, args.sequential) {
        (PolicyKind::Random, _) => Box::new(RandomPolicy),
        (PolicyKind::MonteCarlo, true) => Box::new(MonteCarlo::with_config(cfg)),
        (PolicyKind::MonteCarlo, false) => Box::new(MonteCarloParallel::with_config(cfg)),
    }
}

#[derive(Default)]
struct Summary {
    games: u64,
    total_moves: u64,
    best_moves: usize,
    highest_tiles: BTreeMap<Tile, u64>,
}

impl Summary {
    fn add(&mut self, game: &GameState) {
        self.games += 1;
        self.total_moves += game.moves_played() as u64;
        self.best_moves = self.best_moves.max(game.moves_played());
        *self.highest_tiles.entry(game.highest_tile()).or_default() += 1;
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let cfg = GameConfig { size: args.size, starting_tiles: args.starting_tiles };
    cfg.validate().context("invalid board configuration")?;

    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!("seed {seed}, policy {:?}, trials {}", args.policy, args.trials);
    let mut master = StdRng::seed_from_u64(seed);
    let mut policy = build_policy(&args);

    let pb = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new(args.games);
        pb.set_style(
            ProgressStyle::with_template("{spinner} {elapsed_precise} [{bar:30}] {pos}/{len} games | {msg}")?
                .progress_chars("=> ")
                .tick_chars("⠁⠃⠇⠧⠷⠿⠻⠟⠯⠷⠧⠇⠃"),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    };

    let mut writer = match &args.history_out {
        Some(path) => {
            let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
            Some(BufWriter::new(file))
        }
        None => None,
    };

    let start = Instant::now();
    let mut summary = Summary::default();
    for game_index in 0..args.games {
        let mut rng = StdRng::seed_from_u64(master.gen());
        let game_start = Instant::now();
        let start_wall = record::now_unix_seconds();
        let mut game = GameState::new(cfg, &mut rng)?;

        while !game.is_over() && args.max_moves.map_or(true, |cap| game.moves_played() < cap) {
            let Some(dir) = policy.next_move(&game, &mut rng) else { break };
            game.apply_move(dir, &mut rng);
            if let Some(pb) = &pb {
                let elapsed = start.elapsed().as_secs_f64().max(1e-6);
                let moves = summary.total_moves + game.moves_played() as u64;
                pb.set_message(format!(
                    "moves: {} | moves/sec: {:.1} | highest: {}",
                    game.moves_played(),
                    moves as f64 / elapsed,
                    game.highest_tile()
                ));
            }
        }

        info!(
            "game {game_index}: {} moves, highest tile {}",
            game.moves_played(),
            game.highest_tile()
        );
        if let Some(w) = writer.as_mut() {
            let rec = GameRecord::from_game(
                game_index,
                policy.name(),
                &game,
                start_wall,
                game_start.elapsed().as_secs_f32(),
            );
            record::write_record(w, &rec)?;
        }
        summary.add(&game);
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    if let Some(mut w) = writer {
        use std::io::Write;
        w.flush()?;
    }

    if !args.quiet {
        let elapsed = start.elapsed().as_secs_f64().max(1e-6);
        println!(
            "Games: {} | policy: {} | mean moves: {:.1} | best: {} | moves/sec: {:.1}",
            summary.games,
            policy.name(),
            summary.total_moves as f64 / summary.games.max(1) as f64,
            summary.best_moves,
            summary.total_moves as f64 / elapsed
        );
        for (tile, count) in summary.highest_tiles.iter().rev() {
            println!("  highest {:>5}: {}", tile, count);
        }
    }
    Ok(())
}
