//! Player and spectator state.

use std::fmt;
use std::hash::Hash;

use crate::game::{Coord, Grid};

/// Unique identifier for a player, assigned in join order from 0.
pub type PlayerId = u8;

/// Anything that can identify a connected client.
///
/// Typically a socket address; tests use plain strings or integers.
pub trait Identity: Eq + Hash + Clone + fmt::Debug + Send + Sync {}

impl<T> Identity for T where T: Eq + Hash + Clone + fmt::Debug + Send + Sync {}

/// The display letter for a player id.
#[must_use]
pub const fn alias_for(id: PlayerId) -> char {
    (b'A' + id) as char
}

/// Clean up a requested player name.
///
/// Returns `None` for a name that is empty or only whitespace. Otherwise the
/// name is cut to `max_len` characters and every character that is neither
/// graphic nor a blank becomes `'_'`.
#[must_use]
pub fn sanitize_name(raw: &str, max_len: usize) -> Option<String> {
    if raw.chars().all(char::is_whitespace) {
        return None;
    }

    Some(
        raw.chars()
            .take(max_len)
            .map(|c| if c.is_ascii_graphic() || c == ' ' || c == '\t' { c } else { '_' })
            .collect(),
    )
}

/// State for a single player.
#[derive(Debug, Clone)]
pub struct Player<K> {
    /// Roster slot, also the source of the alias.
    id: PlayerId,
    /// Network identity of the client.
    identity: K,
    /// Display name.
    name: String,
    /// Current cell.
    position: Coord,
    /// Gold collected so far.
    score: u32,
    /// False once the player has quit.
    alive: bool,
    /// What this player currently sees and remembers.
    sight: Grid,
}

impl<K: Identity> Player<K> {
    /// Create a new live player with an empty purse.
    #[must_use]
    pub fn new(id: PlayerId, identity: K, name: String, position: Coord, sight: Grid) -> Self {
        Self {
            id,
            identity,
            name,
            position,
            score: 0,
            alive: true,
            sight,
        }
    }

    /// Roster id.
    #[must_use]
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    /// Display letter, `'A'` for id 0.
    #[must_use]
    pub const fn alias(&self) -> char {
        alias_for(self.id)
    }

    /// Network identity.
    #[must_use]
    pub fn identity(&self) -> &K {
        &self.identity
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current cell.
    #[must_use]
    pub const fn position(&self) -> Coord {
        self.position
    }

    /// Gold collected so far.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Whether the player is still in the game.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// The player's sight grid.
    #[must_use]
    pub fn sight(&self) -> &Grid {
        &self.sight
    }

    /// Replace the player's sight grid.
    pub fn set_sight(&mut self, sight: Grid) {
        self.sight = sight;
    }

    /// Add gold to the purse.
    pub fn earn(&mut self, amount: u32) {
        self.score = self.score.saturating_add(amount);
    }

    /// Shift the position by an offset.
    ///
    /// Legality is the caller's business; the only refusal is an offset that
    /// leaves the coordinate range, which leaves the position unchanged.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        if let Some(next) = self.position.offset(dx, dy) {
            self.position = next;
        }
    }

    /// Put the player on a specific cell.
    pub fn relocate(&mut self, position: Coord) {
        self.position = position;
    }

    /// Mark the player as having quit.
    pub(crate) fn eliminate(&mut self) {
        self.alive = false;
    }
}

/// The single observer slot: sees the whole working grid, never moves or scores.
#[derive(Debug, Clone)]
pub struct Spectator<K> {
    identity: K,
}

impl<K: Identity> Spectator<K> {
    /// Create a spectator for a client.
    #[must_use]
    pub fn new(identity: K) -> Self {
        Self { identity }
    }

    /// Network identity.
    #[must_use]
    pub fn identity(&self) -> &K {
        &self.identity
    }

    /// Consume the spectator, returning its identity.
    #[must_use]
    pub fn into_identity(self) -> K {
        self.identity
    }
}
