//! Logging setup and human-readable dumps for stderr.
//!
//! stdout belongs to the referee protocol, so everything here writes to, or
//! is meant for, stderr.

use crate::arena::ChildStats;
use crate::games::{GameState, Player};
use crate::mcts::SearchStatistics;
use colored::Colorize;
use std::fmt::Write;
use tracing_subscriber::util::TryInitError;
use uttt_shared::from_absolute;

/// Installs a stderr `fmt` subscriber. `RUST_LOG` overrides `level`.
pub fn init_tracing(level: &str) -> Result<(), TryInitError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init()
}

fn paint(symbol: char, owner: Option<Player>, color: bool) -> String {
    let text = symbol.to_string();
    if !color {
        return text;
    }
    match owner {
        Some(Player::X) => text.red().bold().to_string(),
        Some(Player::O) => text.blue().bold().to_string(),
        None if symbol == '#' => text.yellow().to_string(),
        None => text.dimmed().to_string(),
    }
}

/// The 9×9 grid with sub-board separators, and the meta-board beside it.
///
/// Cells of decided sub-boards are drawn in the owner's colour.
pub fn render_board(state: &GameState, color: bool) -> String {
    let meta = state.meta();
    let mut out = String::new();
    for row in 0..9u8 {
        if row % 3 == 0 && row > 0 {
            out.push_str("------+-------+------\n");
        }
        for col in 0..9u8 {
            if col % 3 == 0 && col > 0 {
                out.push_str("| ");
            }
            let (sub, cell) = from_absolute(row, col);
            let owner = state.sub_board(sub).cell(cell);
            let symbol = owner.map_or('.', Player::symbol);
            let tint = meta.winner_of(sub).or(owner);
            let _ = write!(out, "{} ", paint(symbol, tint, color));
        }
        if row < 3 {
            out.push_str("   ");
            for col in 0..3u8 {
                let sub = row * 3 + col;
                let owner = meta.winner_of(sub);
                let symbol = match owner {
                    Some(player) => player.symbol(),
                    None if meta.is_decided(sub) => '#',
                    None => '.',
                };
                let _ = write!(out, "{} ", paint(symbol, owner, color));
            }
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "to move: {}, forced: {}, result: {:?}",
        state.to_move(),
        match state.forced_sub() {
            sub if sub < 9 => sub.to_string(),
            _ => "any".to_string(),
        },
        state.result()
    );
    out
}

/// Root children of a decision sorted by visits, most visited first, at most
/// `limit` rows.
pub fn render_root_stats(
    children: &[ChildStats],
    stats: &SearchStatistics,
    limit: usize,
) -> String {
    let mut children = children.to_vec();
    children.sort_by(|a, b| b.visits.cmp(&a.visits));

    let mut out = format!(
        "root visits: {}, nodes: {}, iterations: {}\n",
        stats.root_visits, stats.total_nodes, stats.iterations
    );
    for child in children.iter().take(limit) {
        let _ = writeln!(
            out,
            "  {}  visits {:>8}  win rate {:.3}",
            child.mv,
            child.visits,
            child.win_rate()
        );
    }
    out
}
