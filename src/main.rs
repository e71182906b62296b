//! # Ultimate Tic-Tac-Toe Bot
//!
//! Reads the opponent's moves from stdin and answers on stdout, one
//! `row col` line per turn, until the input ends. `-1 -1` means we move
//! first. Logs and board dumps go to stderr.
//!
//! ## Usage
//! Run with `cargo run --release --bin play` for best performance.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, info};
use uttt::diagnostics::{init_tracing, render_board, render_root_stats};
use uttt::protocol::{format_move, ProtocolReader, Turn};
use uttt::{EngineConfig, GameController};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Time budget for the first decision, in milliseconds
    #[clap(long, default_value_t = 950)]
    first_budget_ms: u64,

    /// Time budget for every later decision, in milliseconds
    #[clap(short, long, default_value_t = 95)]
    turn_budget_ms: u64,

    /// Hard node capacity of the search arena
    #[clap(short = 'm', long, default_value_t = 20_000_000)]
    arena_capacity: usize,

    /// RNG seed; a random seed is drawn when omitted
    #[clap(short, long)]
    seed: Option<u64>,

    /// Default log level, overridden by RUST_LOG
    #[clap(long, default_value = "info")]
    log_level: String,

    /// Read and ignore the valid-action list the referee sends after each move
    #[clap(long, action = clap::ArgAction::SetTrue)]
    skip_valid_actions: bool,

    /// Dump the board and the root statistics behind each decision to stderr
    #[clap(long, action = clap::ArgAction::SetTrue)]
    dump_boards: bool,
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_arena_capacity(self.arena_capacity)
            .with_budgets(
                Duration::from_millis(self.first_budget_ms),
                Duration::from_millis(self.turn_budget_ms),
            )
            .with_seed(self.seed)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level).context("failed to install the log subscriber")?;

    let config = args.engine_config();
    config.validate().context("invalid engine configuration")?;
    info!(
        arena_capacity = config.arena_capacity,
        first_budget_ms = args.first_budget_ms,
        turn_budget_ms = args.turn_budget_ms,
        "Starting bot"
    );

    let mut controller = GameController::new(config);
    let stdin = io::stdin();
    let mut reader = ProtocolReader::new(stdin.lock(), args.skip_valid_actions);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    while let Some(turn) = reader.next_turn().context("failed to read referee input")? {
        let decision = match turn {
            Turn::First => controller.play_opening(),
            Turn::Opponent(mv) => controller
                .respond(mv)
                .with_context(|| format!("opponent move {} rejected", mv))?,
        };

        let Some(mv) = decision.mv else {
            info!(result = ?controller.status(), "No move left to play");
            break;
        };
        writeln!(out, "{}", format_move(mv)).context("failed to write move")?;
        out.flush().context("failed to flush stdout")?;

        debug!(
            %mv,
            iterations = decision.stats.iterations,
            nodes = decision.stats.total_nodes,
            elapsed_ms = decision.stats.elapsed.as_millis() as u64,
            "Played move"
        );
        if args.dump_boards {
            eprint!("{}", render_board(controller.state(), true));
            eprint!(
                "{}",
                render_root_stats(&decision.root_children, &decision.stats, 5)
            );
        }
        if controller.is_game_over() {
            break;
        }
    }

    if args.dump_boards {
        eprint!("{}", controller.format_history());
    }
    Ok(())
}
