//! Simulate command implementation.

use super::output::{format_text, JsonMatchResult};
use super::{resolve_seed, CliError, OutputFormat, Tuning};
use nuggets::server::Session;
use nuggets::{ClientMessage, Game};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;
use tracing::info;

/// Keys the bots press: every step and run direction.
const BOT_KEYS: &[char] = &[
    'h', 'l', 'j', 'k', 'y', 'u', 'b', 'n', 'H', 'L', 'J', 'K', 'Y', 'U', 'B', 'N',
];

/// Execute the simulate command.
///
/// Bots join through the same message session a network server uses, then
/// press random movement keys in turn until the gold runs out or the move
/// budget is spent.
///
/// # Errors
///
/// Returns an error if the map or config cannot be loaded, or the game fails.
pub(crate) fn execute(
    map: &Path,
    seed: Option<u64>,
    players: usize,
    max_moves: u32,
    format: OutputFormat,
    tuning: &Tuning,
) -> Result<(), CliError> {
    let config = tuning.resolve()?;
    if players == 0 || players > config.max_players {
        return Err(CliError::new(format!(
            "players must be in 1..={}, got {players}",
            config.max_players
        )));
    }

    let seed = resolve_seed(seed);
    let game: Game<usize> = Game::load(map, &config, seed)
        .map_err(|e| CliError::new(format!("Failed to start game on {}: {e}", map.display())))?;
    let mut session = Session::new(game);
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));

    for bot in 0..players {
        session.handle(bot, ClientMessage::Play { name: format!("bot-{bot}") })?;
    }
    let joined = session.game().roster_len();

    let mut moves = 0u32;
    while !session.is_over() && moves < max_moves && joined > 0 {
        let bot = moves as usize % joined;
        if let Some(&key) = BOT_KEYS.choose(&mut rng) {
            session.handle(bot, ClientMessage::Key(key))?;
        }
        moves += 1;
    }
    info!(moves, finished = session.is_over(), "simulation done");

    let game = session.game();
    match format {
        OutputFormat::Text => print!("{}", format_text(seed, moves, game)),
        OutputFormat::Json => {
            let result = JsonMatchResult::from_game(seed, moves, game);
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}
