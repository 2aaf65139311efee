//! Server layer: turns client messages into game calls and replies.
//!
//! [`Session`] is transport-agnostic and fully synchronous; [`serve`] drives
//! it from a UDP socket.

mod session;
mod udp;

use std::io;

use thiserror::Error;

use crate::error::GameError;

pub use session::{Dispatch, Outbound, Session};
pub use udp::{serve, MAX_DATAGRAM};

/// Failures that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The socket failed.
    #[error("network error: {0}")]
    Io(#[from] io::Error),
    /// The game reached an inconsistent state.
    #[error(transparent)]
    Game(#[from] GameError),
}
