//! Game invariants - consistency checks that detect bugs.
//!
//! None of these should ever trigger in a correctly implemented game. They
//! hold between events, not in the middle of a move.

use std::collections::HashSet;

use crate::game::{Cell, Game, Identity};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

fn violation(message: String) -> InvariantViolation {
    InvariantViolation { message }
}

/// Check all game invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants<K: Identity>(game: &Game<K>) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let gold = game.gold();
    let master = game.map().master();
    let working = game.map().working();

    // Gold conservation
    let purses: u64 = game.players().iter().map(|p| u64::from(p.score())).sum();
    if purses != u64::from(gold.collected()) {
        violations.push(violation(format!(
            "purses {purses} != collected {} (total {}, remaining {})",
            gold.collected(),
            gold.total(),
            gold.remaining()
        )));
    }
    if gold.remaining() < gold.piles() {
        violations.push(violation(format!(
            "remaining gold {} is less than {} piles",
            gold.remaining(),
            gold.piles()
        )));
    }

    let on_map = master.count(|c| c == Cell::Gold);
    if on_map != gold.piles() as usize {
        violations.push(violation(format!(
            "{on_map} gold cells on the master grid but {} piles",
            gold.piles()
        )));
    }

    if let Some((coord, cell)) = master
        .iter()
        .find(|&(_, c)| matches!(c, Cell::Player(_) | Cell::Viewer))
    {
        violations.push(violation(format!(
            "master grid holds occupant {} at {coord}",
            cell.to_char()
        )));
    }

    // Occupancy
    let mut occupied = HashSet::new();
    for player in game.alive_players() {
        let position = player.position();
        let alias = player.alias();
        match master.get(position) {
            Ok(Cell::Floor | Cell::Passage) => {}
            Ok(cell) => violations.push(violation(format!(
                "player {alias} stands on {:?} at {position}",
                cell.to_char()
            ))),
            Err(e) => violations.push(violation(format!("player {alias}: {e}"))),
        }
        if !occupied.insert(position) {
            violations.push(violation(format!(
                "player {alias} shares {position} with another player"
            )));
        }
        if working.get(position).ok() != Some(Cell::Player(player.id())) {
            violations.push(violation(format!(
                "working grid does not show player {alias} at {position}"
            )));
        }
    }

    if game.is_over() != gold.is_exhausted() {
        violations.push(violation(format!(
            "game over is {} with {} gold remaining",
            game.is_over(),
            gold.remaining()
        )));
    }

    violations
}

/// Assert all game invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants<K: Identity>(game: &Game<K>) {
    let violations = check_invariants(game);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants<K: Identity>(_game: &Game<K>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::{Direction, Grid};

    const MAP: &str = "\
+------+
|......|
|......|
+------+";

    fn create_valid_game() -> Game<u32> {
        let config = GameConfig {
            gold_total: 40,
            gold_min_piles: 3,
            gold_max_piles: 3,
            ..GameConfig::default()
        };
        let mut game = Game::new(Grid::parse(MAP).unwrap(), &config, 11).unwrap();
        game.join(1, "alice").unwrap();
        game.join(2, "bob").unwrap();
        game
    }

    #[test]
    fn test_valid_game_passes() {
        let game = create_valid_game();
        let violations = check_invariants(&game);
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn test_holds_through_moves() {
        let mut game = create_valid_game();
        for (i, direction) in Direction::ALL.iter().cycle().take(40).enumerate() {
            if game.is_over() {
                break;
            }
            let who = if i % 2 == 0 { 1 } else { 2 };
            game.move_in(&who, *direction, i % 3 == 0).unwrap();
            assert_invariants(&game);
        }
    }

    #[test]
    fn test_stray_gold_detected() {
        let mut game = create_valid_game();
        let free = game
            .map()
            .master()
            .iter()
            .find(|&(c, cell)| {
                cell == Cell::Floor && game.map().working().get(c).unwrap() == Cell::Floor
            })
            .map(|(c, _)| c)
            .unwrap();
        game.map_mut().master_mut().set(free, Cell::Gold).unwrap();

        let violations = check_invariants(&game);
        assert!(violations.iter().any(|v| v.message.contains("gold cells")));
    }

    #[test]
    fn test_occupant_in_master_detected() {
        let mut game = create_valid_game();
        let position = game.player(&1).unwrap().position();
        game.map_mut()
            .master_mut()
            .set(position, Cell::Player(0))
            .unwrap();

        let violations = check_invariants(&game);
        assert!(violations.iter().any(|v| v.message.contains("occupant")));
    }

    #[test]
    fn test_stale_working_overlay_detected() {
        let mut game = create_valid_game();
        let position = game.player(&2).unwrap().position();
        game.map_mut()
            .working_mut()
            .set(position, Cell::Floor)
            .unwrap();

        let violations = check_invariants(&game);
        assert!(violations.iter().any(|v| v.message.contains("player B")));
    }

    #[test]
    fn test_walled_player_detected() {
        let mut game = create_valid_game();
        let position = game.player(&1).unwrap().position();
        game.map_mut()
            .master_mut()
            .set(position, Cell::Wall(b'|'))
            .unwrap();

        let violations = check_invariants(&game);
        assert!(violations.iter().any(|v| v.message.contains("stands on")));
    }

    #[test]
    fn test_quit_player_ignored() {
        let mut game = create_valid_game();
        game.remove_player(&1).unwrap();
        assert!(check_invariants(&game).is_empty());
        assert!(!game.player(&1).unwrap().is_alive());
    }
}
