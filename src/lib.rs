// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Nuggets: an authoritative server core for a multiplayer gold-hunting game.
//!
//! Players roam a character-grid map, see only what lies in their line of
//! sight, and race to collect randomly sized gold piles. One spectator may
//! watch the whole map.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │     UDP transport (server::serve)   │
//! ├─────────────────────────────────────┤
//! │  Message session (server::Session)  │
//! ├─────────────────────────────────────┤
//! │   Game rules (game::Game, gold)     │
//! ├─────────────────────────────────────┤
//! │  Grids and visibility (game::Grid)  │
//! └─────────────────────────────────────┘
//! ```
//!
//! Every layer below the transport is synchronous and driven through
//! `&mut` access, so one owner serializes all events.

pub mod config;
pub mod error;
pub mod game;
pub mod protocol;
pub mod server;

pub use config::{ConfigError, GameConfig};
pub use error::{GameError, GridError};

// Re-export key game types at crate root for convenience
pub use game::{Cell, Coord, Direction, Game, GamePhase, Grid, Map, MoveOutcome, Player, PlayerId, Summary};
pub use protocol::{ClientMessage, KeyCommand, ProtocolError, ServerMessage};
pub use server::{Dispatch, Outbound, ServerError, Session};
