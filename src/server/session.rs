//! Message session: one inbound message in, a batch of replies out.

use tracing::{debug, info, warn};

use crate::error::GameError;
use crate::game::{assert_invariants, Game, Identity, Player};
use crate::protocol::{ClientMessage, KeyCommand, ProtocolError, ServerMessage};
use crate::server::ServerError;

const GAME_FULL: &str = "Game is full: no more players are being accepted at this time.";
const NAME_REQUIRED: &str = "Sorry - you must provide player's name.";
const NO_ROOM: &str = "Sorry - there is no room left on the map.";
const SPECTATOR_REPLACED: &str = "You have been replaced by a new spectator.";
const THANKS_WATCHING: &str = "Thanks for watching!";
const THANKS_PLAYING: &str = "Thanks for playing!";
const GAME_IS_OVER: &str = "Game is over.";
const UNKNOWN_KEY: &str = "Unknown keystroke.";
const NOT_IN_GAME: &str = "You are not in the game.";
const ALREADY_JOINED: &str = "You are already in the game.";
const MALFORMED: &str = "Malformed message.";

/// A message addressed to one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound<K> {
    /// Recipient.
    pub to: K,
    /// Message to send.
    pub message: ServerMessage,
}

/// Everything one inbound message produced, in send order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch<K> {
    /// Replies and broadcasts.
    pub messages: Vec<Outbound<K>>,
    /// Set once the last gold pile was collected.
    pub game_over: bool,
}

impl<K> Default for Dispatch<K> {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            game_over: false,
        }
    }
}

impl<K: Identity> Dispatch<K> {
    fn reply(to: K, message: ServerMessage) -> Self {
        let mut dispatch = Self::default();
        dispatch.push(to, message);
        dispatch
    }

    fn push(&mut self, to: K, message: ServerMessage) {
        self.messages.push(Outbound { to, message });
    }

    /// Messages addressed to `to`, in send order.
    pub fn to<'a>(&'a self, to: &'a K) -> impl Iterator<Item = &'a ServerMessage> + 'a {
        self.messages
            .iter()
            .filter(move |out| out.to == *to)
            .map(|out| &out.message)
    }
}

/// Owns a [`Game`] and answers client messages.
#[derive(Debug)]
pub struct Session<K> {
    game: Game<K>,
    over: bool,
}

impl<K: Identity> Session<K> {
    /// Wrap a freshly created game.
    #[must_use]
    pub fn new(game: Game<K>) -> Self {
        Self { game, over: false }
    }

    /// The game being served.
    #[must_use]
    pub fn game(&self) -> &Game<K> {
        &self.game
    }

    /// Whether the final summary has been sent.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.over
    }

    /// Consume the session, returning the game.
    #[must_use]
    pub fn into_game(self) -> Game<K> {
        self.game
    }

    /// Decode and handle one raw datagram.
    ///
    /// Malformed text is answered with an `ERROR` to the sender.
    ///
    /// # Errors
    ///
    /// See [`Session::handle`].
    pub fn handle_text(&mut self, from: K, text: &str) -> Result<Dispatch<K>, ServerError> {
        match ClientMessage::parse(text) {
            Ok(message) => self.handle(from, message),
            Err(e) => Ok(malformed(from, &e)),
        }
    }

    /// Handle one decoded message.
    ///
    /// Client mistakes (full roster, unknown keys, strangers) become `QUIT`
    /// or `ERROR` replies.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Game`] only if the game itself fails.
    pub fn handle(&mut self, from: K, message: ClientMessage) -> Result<Dispatch<K>, ServerError> {
        if self.over {
            return Ok(Dispatch::reply(from, ServerMessage::quit(GAME_IS_OVER)));
        }
        let dispatch = match message {
            ClientMessage::Play { name } => self.play(from, &name),
            ClientMessage::Spectate => self.spectate(from),
            ClientMessage::Key(key) => self.key(from, key),
        }?;
        assert_invariants(&self.game);
        Ok(dispatch)
    }

    fn play(&mut self, from: K, name: &str) -> Result<Dispatch<K>, ServerError> {
        let alias = match self.game.join(from.clone(), name) {
            Ok(player) => player.alias(),
            Err(GameError::RosterFull { .. }) => {
                return Ok(Dispatch::reply(from, ServerMessage::quit(GAME_FULL)));
            }
            Err(GameError::EmptyName) => {
                return Ok(Dispatch::reply(from, ServerMessage::quit(NAME_REQUIRED)));
            }
            Err(GameError::NoOpenCell) => {
                return Ok(Dispatch::reply(from, ServerMessage::quit(NO_ROOM)));
            }
            Err(GameError::AlreadyJoined) => {
                return Ok(Dispatch::reply(from, ServerMessage::error(ALREADY_JOINED)));
            }
            Err(e) => return Err(e.into()),
        };

        let mut dispatch = Dispatch::reply(from.clone(), ServerMessage::Ok(alias));
        dispatch.push(
            from.clone(),
            ServerMessage::Grid {
                rows: self.game.map().height(),
                cols: self.game.map().width(),
            },
        );
        dispatch.push(
            from,
            ServerMessage::Gold {
                collected: 0,
                purse: 0,
                remaining: self.game.remaining_gold(),
            },
        );

        self.game.refresh_views()?;
        self.push_displays(&mut dispatch);
        Ok(dispatch)
    }

    fn spectate(&mut self, from: K) -> Result<Dispatch<K>, ServerError> {
        let evicted = match self.game.add_spectator(from.clone()) {
            Ok(evicted) => evicted,
            Err(GameError::AlreadyJoined) => {
                return Ok(Dispatch::reply(from, ServerMessage::error(ALREADY_JOINED)));
            }
            Err(e) => return Err(e.into()),
        };

        let mut dispatch = Dispatch::default();
        if let Some(old) = evicted {
            dispatch.push(old, ServerMessage::quit(SPECTATOR_REPLACED));
        }
        dispatch.push(
            from.clone(),
            ServerMessage::Grid {
                rows: self.game.map().height(),
                cols: self.game.map().width(),
            },
        );
        dispatch.push(from.clone(), ServerMessage::Display(self.game.working_text()));
        dispatch.push(
            from,
            ServerMessage::Gold {
                collected: 0,
                purse: 0,
                remaining: self.game.remaining_gold(),
            },
        );
        Ok(dispatch)
    }

    fn key(&mut self, from: K, key: char) -> Result<Dispatch<K>, ServerError> {
        if self.game.is_spectator(&from) {
            if key == 'Q' {
                self.game.remove_spectator();
                return Ok(Dispatch::reply(from, ServerMessage::quit(THANKS_WATCHING)));
            }
            debug!(key = %key, "spectator keystroke ignored");
            return Ok(Dispatch::default());
        }

        let live = self.game.player(&from).is_ok_and(Player::is_alive);
        if !live {
            warn!(?from, "keystroke from a client not in the game");
            return Ok(Dispatch::reply(from, ServerMessage::error(NOT_IN_GAME)));
        }

        let (direction, run) = match KeyCommand::from_key(key) {
            Some(KeyCommand::Quit) => {
                self.game.remove_player(&from)?;
                let mut dispatch = Dispatch::reply(from, ServerMessage::quit(THANKS_PLAYING));
                self.game.refresh_views()?;
                self.push_displays(&mut dispatch);
                return Ok(dispatch);
            }
            Some(KeyCommand::Step(direction)) => (direction, false),
            Some(KeyCommand::Run(direction)) => (direction, true),
            None => return Ok(Dispatch::reply(from, ServerMessage::error(UNKNOWN_KEY))),
        };

        let outcome = self.game.move_in(&from, direction, run)?;
        self.game.refresh_views()?;

        let mut dispatch = Dispatch::default();
        if outcome.gold > 0 {
            self.push_gold(&mut dispatch, &from, outcome.gold);
        }
        if self.game.is_over() {
            self.finish(&mut dispatch);
        } else {
            self.push_displays(&mut dispatch);
        }
        Ok(dispatch)
    }

    /// `GOLD` to every live player and the spectator after a pickup.
    fn push_gold(&self, dispatch: &mut Dispatch<K>, collector: &K, amount: u32) {
        let remaining = self.game.remaining_gold();
        for player in self.game.alive_players() {
            let collected = if player.identity() == collector { amount } else { 0 };
            dispatch.push(
                player.identity().clone(),
                ServerMessage::Gold {
                    collected,
                    purse: player.score(),
                    remaining,
                },
            );
        }
        if let Some(spectator) = self.game.spectator() {
            dispatch.push(
                spectator.identity().clone(),
                ServerMessage::Gold {
                    collected: 0,
                    purse: 0,
                    remaining,
                },
            );
        }
    }

    /// A fresh `DISPLAY` for every live player and the spectator.
    fn push_displays(&self, dispatch: &mut Dispatch<K>) {
        for player in self.game.alive_players() {
            dispatch.push(
                player.identity().clone(),
                ServerMessage::Display(player.sight().to_text()),
            );
        }
        if let Some(spectator) = self.game.spectator() {
            dispatch.push(
                spectator.identity().clone(),
                ServerMessage::Display(self.game.working_text()),
            );
        }
    }

    /// Send the summary to everyone still connected.
    fn finish(&mut self, dispatch: &mut Dispatch<K>) {
        let summary = self.game.summary();
        let text = summary.to_string();
        for player in self.game.alive_players() {
            dispatch.push(player.identity().clone(), ServerMessage::quit(text.clone()));
        }
        if let Some(spectator) = self.game.spectator() {
            dispatch.push(spectator.identity().clone(), ServerMessage::quit(text.clone()));
        }
        if let Some(leader) = summary.leader() {
            info!(alias = %leader.alias, score = leader.score, "match finished");
        }
        self.over = true;
        dispatch.game_over = true;
    }
}

fn malformed<K: Identity>(from: K, error: &ProtocolError) -> Dispatch<K> {
    warn!(?from, %error, "malformed message");
    Dispatch::reply(from, ServerMessage::error(MALFORMED))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::Grid;

    const MAP: &str = "\
+-----+
|.....|
|.....|
+-----+";

    fn session(max_players: usize) -> Session<&'static str> {
        let config = GameConfig {
            max_players,
            gold_total: 30,
            gold_min_piles: 2,
            gold_max_piles: 2,
            ..GameConfig::default()
        };
        Session::new(Game::new(Grid::parse(MAP).unwrap(), &config, 4).unwrap())
    }

    fn play(name: &str) -> ClientMessage {
        ClientMessage::Play {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_play_handshake() {
        let mut session = session(26);
        let dispatch = session.handle("a", play("alice")).unwrap();
        let to_a: Vec<_> = dispatch.to(&"a").cloned().collect();
        assert_eq!(to_a[0], ServerMessage::Ok('A'));
        assert_eq!(to_a[1], ServerMessage::Grid { rows: 4, cols: 7 });
        assert_eq!(
            to_a[2],
            ServerMessage::Gold {
                collected: 0,
                purse: 0,
                remaining: 30
            }
        );
        assert!(matches!(to_a[3], ServerMessage::Display(_)));
        assert!(!dispatch.game_over);
    }

    #[test]
    fn test_play_rejections() {
        let mut session = session(1);
        let dispatch = session.handle("x", play("  ")).unwrap();
        assert_eq!(dispatch.messages[0].message, ServerMessage::quit(NAME_REQUIRED));

        session.handle("a", play("alice")).unwrap();
        let dispatch = session.handle("b", play("bob")).unwrap();
        assert_eq!(dispatch.messages[0].message, ServerMessage::quit(GAME_FULL));

        let dispatch = session.handle("a", play("again")).unwrap();
        assert_eq!(dispatch.messages[0].message, ServerMessage::error(ALREADY_JOINED));
    }

    #[test]
    fn test_spectator_replaced() {
        let mut session = session(26);
        session.handle("s1", ClientMessage::Spectate).unwrap();
        let dispatch = session.handle("s2", ClientMessage::Spectate).unwrap();

        assert_eq!(
            dispatch.to(&"s1").collect::<Vec<_>>(),
            vec![&ServerMessage::quit(SPECTATOR_REPLACED)]
        );
        let to_s2: Vec<_> = dispatch.to(&"s2").collect();
        assert_eq!(to_s2.len(), 3);
        assert_eq!(*to_s2[0], ServerMessage::Grid { rows: 4, cols: 7 });
    }

    #[test]
    fn test_spectator_keys() {
        let mut session = session(26);
        session.handle("s", ClientMessage::Spectate).unwrap();
        assert!(session.handle("s", ClientMessage::Key('h')).unwrap().messages.is_empty());

        let dispatch = session.handle("s", ClientMessage::Key('Q')).unwrap();
        assert_eq!(dispatch.messages[0].message, ServerMessage::quit(THANKS_WATCHING));
        assert!(session.game().spectator().is_none());
    }

    #[test]
    fn test_player_keys() {
        let mut session = session(26);
        session.handle("a", play("alice")).unwrap();

        let dispatch = session.handle("a", ClientMessage::Key('x')).unwrap();
        assert_eq!(dispatch.messages, vec![Outbound {
            to: "a",
            message: ServerMessage::error(UNKNOWN_KEY)
        }]);

        let dispatch = session.handle("a", ClientMessage::Key('Q')).unwrap();
        assert_eq!(dispatch.messages[0].message, ServerMessage::quit(THANKS_PLAYING));
        assert!(!session.game().player(&"a").unwrap().is_alive());

        let dispatch = session.handle("a", ClientMessage::Key('l')).unwrap();
        assert_eq!(dispatch.messages[0].message, ServerMessage::error(NOT_IN_GAME));
    }

    #[test]
    fn test_stranger_key() {
        let mut session = session(26);
        let dispatch = session.handle("nobody", ClientMessage::Key('l')).unwrap();
        assert_eq!(dispatch.messages[0].message, ServerMessage::error(NOT_IN_GAME));
    }

    #[test]
    fn test_malformed_text() {
        let mut session = session(26);
        let dispatch = session.handle_text("a", "HELLO there").unwrap();
        assert_eq!(dispatch.messages[0].message, ServerMessage::error(MALFORMED));
    }

    #[test]
    fn test_move_broadcasts_display() {
        let mut session = session(26);
        session.handle("a", play("alice")).unwrap();
        session.handle("b", play("bob")).unwrap();
        session.handle("s", ClientMessage::Spectate).unwrap();

        let dispatch = session.handle("a", ClientMessage::Key('k')).unwrap();
        for who in ["a", "b", "s"] {
            assert!(
                dispatch
                    .to(&who)
                    .any(|m| matches!(m, ServerMessage::Display(_)) || m.is_quit()),
                "{who} got no update"
            );
        }
    }
}
