//! Wire messages exchanged with clients.
//!
//! Every datagram carries one message: a verb, a space, and a payload.
//! Inbound text is decoded once at the transport boundary into
//! [`ClientMessage`]; outbound [`ServerMessage`]s format themselves with
//! `Display`.

use std::fmt;

use thiserror::Error;

use crate::game::Direction;

/// A malformed inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Nothing but whitespace.
    #[error("empty message")]
    Empty,
    /// The first word is not a known verb.
    #[error("unknown message type {0:?}")]
    UnknownVerb(String),
    /// `KEY` without a keystroke.
    #[error("KEY message without a keystroke")]
    MissingKey,
    /// `PLAY` without a name separator.
    #[error("PLAY message without a name")]
    MissingName,
}

/// A message from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Join as a player. The name may still be blank; the game decides.
    Play {
        /// Requested name, unsanitized.
        name: String,
    },
    /// Join as the spectator.
    Spectate,
    /// A single keystroke.
    Key(char),
}

impl ClientMessage {
    /// Decode one inbound datagram.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] for an empty message, an unknown verb, or
    /// a verb missing its payload.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let text = text.trim_end_matches(['\n', '\r', '\0']);
        if text.trim().is_empty() {
            return Err(ProtocolError::Empty);
        }

        let (verb, rest) = match text.split_once(' ') {
            Some((verb, rest)) => (verb, Some(rest)),
            None => (text, None),
        };

        match verb {
            "PLAY" => rest
                .map(|name| Self::Play {
                    name: name.to_string(),
                })
                .ok_or(ProtocolError::MissingName),
            "SPECTATE" => Ok(Self::Spectate),
            "KEY" => rest
                .and_then(|k| k.chars().next())
                .map(Self::Key)
                .ok_or(ProtocolError::MissingKey),
            other => Err(ProtocolError::UnknownVerb(other.to_string())),
        }
    }
}

/// What a keystroke asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Leave the game.
    Quit,
    /// Move one cell.
    Step(Direction),
    /// Move until blocked.
    Run(Direction),
}

impl KeyCommand {
    /// Map a keystroke to a command.
    ///
    /// Lowercase `h l j k y u b n` step west, east, south, north, north-west,
    /// north-east, south-west and south-east; their uppercase forms run.
    /// Returns `None` for any other key.
    #[must_use]
    pub const fn from_key(key: char) -> Option<Self> {
        if key == 'Q' {
            return Some(Self::Quit);
        }
        let direction = match key.to_ascii_lowercase() {
            'h' => Direction::West,
            'l' => Direction::East,
            'j' => Direction::South,
            'k' => Direction::North,
            'y' => Direction::NorthWest,
            'u' => Direction::NorthEast,
            'b' => Direction::SouthWest,
            'n' => Direction::SouthEast,
            _ => return None,
        };
        if key.is_ascii_uppercase() {
            Some(Self::Run(direction))
        } else {
            Some(Self::Step(direction))
        }
    }
}

/// A message to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Join accepted; carries the player's letter.
    Ok(char),
    /// Map dimensions.
    Grid {
        /// Row count.
        rows: u16,
        /// Column count.
        cols: u16,
    },
    /// Gold update.
    Gold {
        /// Gold just collected by the recipient.
        collected: u32,
        /// The recipient's purse.
        purse: u32,
        /// Gold left on the map.
        remaining: u32,
    },
    /// A grid to draw, in wire form.
    Display(String),
    /// Disconnect with an explanation.
    Quit(String),
    /// A recoverable problem.
    Error(String),
}

impl ServerMessage {
    /// `QUIT` with a fixed explanation.
    #[must_use]
    pub fn quit(reason: impl Into<String>) -> Self {
        Self::Quit(reason.into())
    }

    /// `ERROR` with a fixed explanation.
    #[must_use]
    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error(reason.into())
    }

    /// Whether the recipient should disconnect after this message.
    #[must_use]
    pub const fn is_quit(&self) -> bool {
        matches!(self, Self::Quit(_))
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok(alias) => write!(f, "OK {alias}"),
            Self::Grid { rows, cols } => write!(f, "GRID {rows} {cols}"),
            Self::Gold {
                collected,
                purse,
                remaining,
            } => write!(f, "GOLD {collected} {purse} {remaining}"),
            Self::Display(grid) => write!(f, "DISPLAY\n{grid}"),
            Self::Quit(reason) => write!(f, "QUIT {reason}"),
            Self::Error(reason) => write!(f, "ERROR {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_play() {
        assert_eq!(
            ClientMessage::parse("PLAY Alice Smith"),
            Ok(ClientMessage::Play {
                name: "Alice Smith".to_string()
            })
        );
        // The game rejects blank names; the parser keeps them.
        assert_eq!(
            ClientMessage::parse("PLAY  "),
            Ok(ClientMessage::Play {
                name: " ".to_string()
            })
        );
        assert_eq!(ClientMessage::parse("PLAY"), Err(ProtocolError::MissingName));
    }

    #[test]
    fn test_parse_spectate_and_key() {
        assert_eq!(ClientMessage::parse("SPECTATE"), Ok(ClientMessage::Spectate));
        assert_eq!(ClientMessage::parse("SPECTATE\n"), Ok(ClientMessage::Spectate));
        assert_eq!(ClientMessage::parse("KEY L"), Ok(ClientMessage::Key('L')));
        assert_eq!(ClientMessage::parse("KEY"), Err(ProtocolError::MissingKey));
        assert_eq!(ClientMessage::parse("KEY "), Err(ProtocolError::MissingKey));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(ClientMessage::parse(""), Err(ProtocolError::Empty));
        assert_eq!(ClientMessage::parse("   "), Err(ProtocolError::Empty));
        assert_eq!(
            ClientMessage::parse("play bob"),
            Err(ProtocolError::UnknownVerb("play".to_string()))
        );
    }

    #[test]
    fn test_key_map() {
        assert_eq!(KeyCommand::from_key('Q'), Some(KeyCommand::Quit));
        assert_eq!(KeyCommand::from_key('h'), Some(KeyCommand::Step(Direction::West)));
        assert_eq!(KeyCommand::from_key('L'), Some(KeyCommand::Run(Direction::East)));
        assert_eq!(KeyCommand::from_key('j'), Some(KeyCommand::Step(Direction::South)));
        assert_eq!(KeyCommand::from_key('K'), Some(KeyCommand::Run(Direction::North)));
        assert_eq!(
            KeyCommand::from_key('y'),
            Some(KeyCommand::Step(Direction::NorthWest))
        );
        assert_eq!(
            KeyCommand::from_key('U'),
            Some(KeyCommand::Run(Direction::NorthEast))
        );
        assert_eq!(
            KeyCommand::from_key('b'),
            Some(KeyCommand::Step(Direction::SouthWest))
        );
        assert_eq!(
            KeyCommand::from_key('N'),
            Some(KeyCommand::Run(Direction::SouthEast))
        );
        assert_eq!(KeyCommand::from_key('q'), None);
        assert_eq!(KeyCommand::from_key('x'), None);
        assert_eq!(KeyCommand::from_key('7'), None);
    }

    #[test]
    fn test_server_message_format() {
        assert_eq!(ServerMessage::Ok('C').to_string(), "OK C");
        assert_eq!(ServerMessage::Grid { rows: 21, cols: 79 }.to_string(), "GRID 21 79");
        assert_eq!(
            ServerMessage::Gold {
                collected: 12,
                purse: 40,
                remaining: 198
            }
            .to_string(),
            "GOLD 12 40 198"
        );
        assert_eq!(ServerMessage::Display("..*".into()).to_string(), "DISPLAY\n..*");
        assert_eq!(ServerMessage::quit("Thanks for playing!").to_string(), "QUIT Thanks for playing!");
        assert_eq!(ServerMessage::error("Unknown keystroke.").to_string(), "ERROR Unknown keystroke.");
        assert!(ServerMessage::quit("bye").is_quit());
        assert!(!ServerMessage::Ok('A').is_quit());
    }
}
