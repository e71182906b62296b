use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::time::{Duration, Instant};
use uttt::diagnostics::init_tracing;
use uttt::self_play::{play_match, MatchRecord};
use uttt::{Budget, EngineConfig, GameResult, GameState, Move, Player, SearchStatistics, MCTS};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Search duration in milliseconds for the timed benchmark (default: 5000)
    #[arg(long, default_value_t = 5_000)]
    duration_ms: u64,

    /// Length of one search batch in milliseconds, as in a real turn (default: 95)
    #[arg(long, default_value_t = 95)]
    batch_ms: u64,

    /// Number of self-play games to run after the timed benchmark (default: 0)
    #[arg(long, default_value_t = 0)]
    games: usize,

    /// Worker threads for self-play; defaults to the number of CPUs
    #[arg(long)]
    threads: Option<usize>,

    /// Iterations per move in self-play games (default: 2000)
    #[arg(long, default_value_t = 2_000)]
    iterations_per_move: u64,

    /// Arena capacity per engine (default: 20,000,000)
    #[arg(long, default_value_t = 20_000_000)]
    arena_capacity: usize,

    /// Base seed; game `i` seeds its engines from `seed + 2i` and `seed + 2i + 1`
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level).context("failed to install the log subscriber")?;

    let config = EngineConfig::default()
        .with_arena_capacity(args.arena_capacity)
        .with_seed(Some(args.seed));
    config.validate().context("invalid engine configuration")?;

    println!("Ultimate Tic-Tac-Toe MCTS - Benchmark Tool");
    println!("==========================================");
    println!("Duration: {} ms in {} ms batches", args.duration_ms, args.batch_ms);
    println!("Arena Capacity: {}", args.arena_capacity);
    println!("------------------------------------------");

    #[cfg(debug_assertions)]
    println!("WARNING: Running in debug mode. Performance will be significantly lower.\nUse --release for accurate benchmarks.\n");

    println!("\nRunning timed search from the opening...");
    let (stats, batches) = timed_search(
        config.clone(),
        Duration::from_millis(args.duration_ms),
        Duration::from_millis(args.batch_ms),
    );
    print_stats("Search", &stats, batches);

    if args.games > 0 {
        let threads = args.threads.unwrap_or_else(num_cpus::get).max(1);
        println!(
            "\nRunning {} self-play games on {} threads ({} iterations per move)...",
            args.games, threads, args.iterations_per_move
        );
        let start = Instant::now();
        let records = self_play(&args, config, threads)?;
        print_tally(&records, start.elapsed());
    }
    Ok(())
}

/// Repeated turn-sized batches from the position after the centre opening.
///
/// The tree is kept across batches, so arena resets show up exactly as they
/// would over a long first turn.
fn timed_search(config: EngineConfig, total: Duration, batch: Duration) -> (SearchStatistics, u32) {
    let mut engine = MCTS::new(config);
    let mut state = GameState::new();
    state.make_move(Move::CENTER);
    engine.commit(Move::CENTER);

    let mut total_stats = SearchStatistics::default();
    let mut batches = 0;
    let start = Instant::now();
    while start.elapsed() < total {
        let stats = engine.search(&state, Budget::Time(batch));
        total_stats.iterations += stats.iterations;
        total_stats.discarded += stats.discarded;
        total_stats.arena_resets += stats.arena_resets;
        total_stats.total_nodes = stats.total_nodes;
        total_stats.root_visits = stats.root_visits;
        batches += 1;
    }
    total_stats.elapsed = start.elapsed();
    (total_stats, batches)
}

fn self_play(args: &Args, config: EngineConfig, threads: usize) -> Result<Vec<MatchRecord>> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("failed to build the self-play thread pool")?;
    let budget = Budget::Iterations(args.iterations_per_move);

    let records = pool.install(|| {
        (0..args.games)
            .into_par_iter()
            .map(|game| {
                let seed = args.seed.wrapping_add(2 * game as u64);
                play_match(
                    config.clone().with_seed(Some(seed)),
                    config.clone().with_seed(Some(seed.wrapping_add(1))),
                    budget,
                )
            })
            .collect::<Result<Vec<_>, _>>()
    })?;
    Ok(records)
}

fn print_stats(name: &str, stats: &SearchStatistics, batches: u32) {
    let secs = stats.elapsed.as_secs_f64();

    println!("{} Results:", name);
    println!("  Batches: {}", batches);
    println!("  Iterations: {}", stats.iterations);
    println!("  Discarded: {}", stats.discarded);
    println!("  Time: {:.3}s", secs);
    println!("  IPS: {:.0} iterations/sec", stats.iterations_per_second());
    println!("  Nodes In Use: {}", stats.total_nodes);
    println!("  Root Visits: {}", stats.root_visits);
    println!("  Arena Resets: {}", stats.arena_resets);
}

fn print_tally(records: &[MatchRecord], elapsed: Duration) {
    let count = |result: GameResult| records.iter().filter(|r| r.result == result).count();
    let plies: usize = records.iter().map(|r| r.moves.len()).sum();

    println!("Self-Play Results:");
    println!("  Games: {}", records.len());
    println!("  X Wins: {}", count(GameResult::Won(Player::X)));
    println!("  O Wins: {}", count(GameResult::Won(Player::O)));
    println!("  Draws: {}", count(GameResult::Drawn));
    println!(
        "  Average Length: {:.1} plies",
        plies as f64 / records.len().max(1) as f64
    );
    println!("  Time: {:.3}s", elapsed.as_secs_f64());
}
