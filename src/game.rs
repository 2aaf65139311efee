//! Game layer for Nuggets.
//!
//! Implements the rules of a match on top of character grids:
//! - Grids and cells, with a master grid (terrain and gold) and a working
//!   grid (terrain, gold and players)
//! - Line-of-sight visibility with per-player memory
//! - Gold placement and the per-pile award model
//! - Players, the spectator slot and the end-of-match summary

mod coord;
mod gold;
mod grid;
mod invariants;
mod map;
mod player;
mod state;
mod summary;
mod visibility;

pub use coord::{Coord, Direction};
pub use gold::{award, place_piles, GoldLedger};
pub use grid::{Cell, Grid};
pub use invariants::{assert_invariants, check_invariants, InvariantViolation};
pub use map::Map;
pub use player::{alias_for, sanitize_name, Identity, Player, PlayerId, Spectator};
pub use state::{Game, GamePhase, MoveOutcome};
pub use summary::{Summary, SummaryEntry};
pub use visibility::is_visible;
