//! Error types for the game core.

use std::io;

use thiserror::Error;

use crate::game::Coord;

/// Failures raised by grid construction and cell access.
#[derive(Debug, Error)]
pub enum GridError {
    /// A coordinate lies outside the grid.
    #[error("point {coord} is outside the {width}x{height} grid")]
    OutOfBounds {
        /// The offending coordinate.
        coord: Coord,
        /// Grid width.
        width: u16,
        /// Grid height.
        height: u16,
    },
    /// A grid was requested with a zero width or height.
    #[error("grid dimensions must be non-zero (got {width}x{height})")]
    ZeroDimension {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },
    /// Map text did not contain any cells.
    #[error("map text is empty")]
    EmptyMap,
    /// Map text is wider or taller than a grid can address.
    #[error("map of {width}x{height} cells exceeds the addressable size")]
    TooLarge {
        /// Width of the text.
        width: usize,
        /// Height of the text.
        height: usize,
    },
    /// Two grids that must share dimensions do not.
    #[error("grid is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    DimensionMismatch {
        /// Width the caller required.
        expected_width: u16,
        /// Height the caller required.
        expected_height: u16,
        /// Width actually supplied.
        actual_width: u16,
        /// Height actually supplied.
        actual_height: u16,
    },
    /// Map text draws something that only exists during play.
    #[error("map holds '{symbol}' at {coord}; only terrain may be drawn")]
    NotTerrain {
        /// Where the symbol was found.
        coord: Coord,
        /// The offending symbol.
        symbol: char,
    },
    /// The map file could not be read.
    #[error("failed to read map: {0}")]
    Io(#[from] io::Error),
}

/// Failures raised by game operations.
///
/// Every variant is local to the event that produced it; none of them ends
/// the match.
#[derive(Debug, Error)]
pub enum GameError {
    /// Underlying grid failure.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// No roster entry is registered for the identity.
    #[error("identity is not a player in this game")]
    UnknownIdentity,
    /// No roster entry has the given numeric id.
    #[error("no player with id {0}")]
    UnknownActor(u8),
    /// The identity already holds a roster slot or the spectator slot.
    #[error("identity has already joined")]
    AlreadyJoined,
    /// Every roster slot has been handed out.
    #[error("game is full ({capacity} players)")]
    RosterFull {
        /// Roster capacity.
        capacity: usize,
    },
    /// The requested player name is empty or whitespace.
    #[error("player name must not be empty")]
    EmptyName,
    /// A player cannot be placed at the coordinate.
    #[error("cannot place a player at {0}")]
    InvalidPosition(Coord),
    /// There is no open floor left for a new player.
    #[error("no open floor cell is available")]
    NoOpenCell,
    /// Gold piles could not all be placed within the attempt budget.
    #[error("placed {placed} of {requested} gold piles after {attempts} attempts")]
    GoldPlacement {
        /// Piles requested.
        requested: u32,
        /// Piles actually placed.
        placed: u32,
        /// Attempts spent.
        attempts: u32,
    },
    /// A move offset is not one of the eight compass steps.
    #[error("({dx}, {dy}) is not a single compass step")]
    InvalidOffset {
        /// Horizontal offset.
        dx: i32,
        /// Vertical offset.
        dy: i32,
    },
    /// The player has quit and can no longer act.
    #[error("player {0} has quit")]
    NotAlive(char),
    /// All gold has been collected.
    #[error("game is over")]
    GameOver,
    /// Game parameters were rejected.
    #[error("invalid game configuration: {0}")]
    InvalidConfig(String),
}
