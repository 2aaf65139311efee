//! Output formatting utilities for CLI.

use nuggets::game::{Game, Identity, SummaryEntry};
use serde::Serialize;
use std::fmt::Write;

/// JSON-serializable match result.
#[derive(Debug, Serialize)]
pub(super) struct JsonMatchResult {
    /// Random seed used.
    pub(super) seed: u64,
    /// Keystrokes handled.
    pub(super) moves: u32,
    /// Whether all gold was collected.
    pub(super) finished: bool,
    /// Gold left on the map.
    pub(super) remaining_gold: u32,
    /// Per-player results, in join order.
    pub(super) players: Vec<SummaryEntry>,
}

impl JsonMatchResult {
    /// Build from a game.
    pub(super) fn from_game<K: Identity>(seed: u64, moves: u32, game: &Game<K>) -> Self {
        Self {
            seed,
            moves,
            finished: game.is_over(),
            remaining_gold: game.remaining_gold(),
            players: game.summary().entries,
        }
    }
}

/// Format a match result as human-readable text.
pub(super) fn format_text<K: Identity>(seed: u64, moves: u32, game: &Game<K>) -> String {
    let mut output = String::new();
    let summary = game.summary();

    let _ = writeln!(output, "Match Result (seed: {seed})");
    let _ = writeln!(output, "  Moves: {moves}");
    if game.is_over() {
        if let Some(leader) = summary.leader() {
            let _ = writeln!(output, "  Winner: {} ({})", leader.alias, leader.name);
        }
    } else {
        let _ = writeln!(output, "  Unfinished: {} gold left", game.remaining_gold());
    }
    output.push('\n');
    output.push_str(&summary.to_string());
    output
}
