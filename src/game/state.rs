//! Game state management.

// Roster ids are bounded by MAX_ROSTER (26), so id casts are lossless.
#![allow(clippy::cast_possible_truncation)]

use std::collections::HashMap;
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::error::GameError;
use crate::game::{
    place_piles, sanitize_name, Cell, Coord, Direction, GoldLedger, Grid, Identity, Map, Player,
    PlayerId, Spectator, Summary, SummaryEntry,
};

/// Where a match is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Gold placed, nobody has connected yet.
    Setup,
    /// Accepting joins, spectators and moves.
    Active,
    /// All gold collected; no further moves.
    Ended,
}

/// Result of one move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    /// Gold collected by the mover during this request.
    pub gold: u32,
    /// Cells the mover advanced.
    pub steps: u32,
    /// Player the mover traded places with, if any.
    pub swapped_with: Option<PlayerId>,
}

impl MoveOutcome {
    /// Whether the mover ended up somewhere else.
    #[must_use]
    pub const fn moved(&self) -> bool {
        self.steps > 0
    }
}

/// What a single step did.
enum Step {
    Moved { gold: u32 },
    Swapped { with: PlayerId, gold: u32 },
    Blocked,
}

/// Complete game state.
///
/// All mutation goes through `&mut self`, so a single owner (or a single
/// lock around the game) serializes every event.
#[derive(Debug)]
pub struct Game<K> {
    /// Master and working grids.
    map: Map,
    /// Every player who ever joined, indexed by id.
    players: Vec<Player<K>>,
    /// Identity lookup into `players`.
    index: HashMap<K, PlayerId>,
    /// The observer slot.
    spectator: Option<Spectator<K>>,
    /// Gold still in play.
    gold: GoldLedger,
    /// Lifecycle state.
    phase: GamePhase,
    /// Match constants.
    config: GameConfig,
    /// Source of all randomness in the match.
    rng: StdRng,
}

impl<K: Identity> Game<K> {
    /// Create a match on `grid`, seeding all randomness from `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or gold cannot be placed.
    pub fn new(grid: Grid, config: &GameConfig, seed: u64) -> Result<Self, GameError> {
        Self::with_rng(grid, config, StdRng::seed_from_u64(seed))
    }

    /// Create a match on the map file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the map cannot be loaded, the config is invalid,
    /// or gold cannot be placed.
    pub fn load(path: impl AsRef<Path>, config: &GameConfig, seed: u64) -> Result<Self, GameError> {
        Self::new(Grid::load(path)?, config, seed)
    }

    /// Create a match with an explicit random generator.
    ///
    /// The number of gold piles is drawn from the configured range, then
    /// every pile is placed on open floor of both grids.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid, the map draws gold or
    /// players ([`GridError::NotTerrain`](crate::GridError::NotTerrain)), or
    /// gold cannot be placed.
    pub fn with_rng(grid: Grid, config: &GameConfig, mut rng: StdRng) -> Result<Self, GameError> {
        config
            .validate()
            .map_err(|e| GameError::InvalidConfig(e.to_string()))?;

        grid.ensure_terrain()?;

        let piles = rng.gen_range(config.gold_min_piles..=config.gold_max_piles);
        let mut map = Map::from_grid(grid);
        place_piles(&mut map, piles, config.placement_attempts, &mut rng)?;

        info!(
            width = map.width(),
            height = map.height(),
            piles,
            gold = config.gold_total,
            "game created"
        );

        Ok(Self {
            map,
            players: Vec::with_capacity(config.max_players),
            index: HashMap::new(),
            spectator: None,
            gold: GoldLedger::new(config.gold_total, piles),
            phase: GamePhase::Setup,
            config: *config,
            rng,
        })
    }

    /// The map.
    #[must_use]
    pub fn map(&self) -> &Map {
        &self.map
    }

    #[cfg(test)]
    pub(crate) fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    /// Match constants.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Gold counters.
    #[must_use]
    pub const fn gold(&self) -> GoldLedger {
        self.gold
    }

    /// Gold not yet collected.
    #[must_use]
    pub const fn remaining_gold(&self) -> u32 {
        self.gold.remaining()
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Check if all gold has been collected.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Ended
    }

    /// Number of roster slots handed out, including players who quit.
    #[must_use]
    pub fn roster_len(&self) -> usize {
        self.players.len()
    }

    /// Every player who ever joined, in id order.
    #[must_use]
    pub fn players(&self) -> &[Player<K>] {
        &self.players
    }

    /// Players still in the game.
    pub fn alive_players(&self) -> impl Iterator<Item = &Player<K>> {
        self.players.iter().filter(|p| p.is_alive())
    }

    /// Look up a player by identity.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownIdentity`] if the identity never joined.
    pub fn player(&self, identity: &K) -> Result<&Player<K>, GameError> {
        let id = self.player_id(identity)?;
        Ok(&self.players[usize::from(id)])
    }

    /// Look up a player by roster id.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownActor`] if no player has that id.
    pub fn player_by_id(&self, id: PlayerId) -> Result<&Player<K>, GameError> {
        self.players
            .get(usize::from(id))
            .ok_or(GameError::UnknownActor(id))
    }

    /// The current spectator, if any.
    #[must_use]
    pub fn spectator(&self) -> Option<&Spectator<K>> {
        self.spectator.as_ref()
    }

    /// Check if `identity` holds the spectator slot.
    #[must_use]
    pub fn is_spectator(&self, identity: &K) -> bool {
        self.spectator
            .as_ref()
            .is_some_and(|s| s.identity() == identity)
    }

    /// The master grid in wire form.
    #[must_use]
    pub fn master_text(&self) -> String {
        self.map.master().to_text()
    }

    /// The working grid in wire form.
    #[must_use]
    pub fn working_text(&self) -> String {
        self.map.working().to_text()
    }

    /// A player's sight grid in wire form.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownIdentity`] if the identity never joined.
    pub fn sight_text(&self, identity: &K) -> Result<String, GameError> {
        Ok(self.player(identity)?.sight().to_text())
    }

    fn player_id(&self, identity: &K) -> Result<PlayerId, GameError> {
        self.index
            .get(identity)
            .copied()
            .ok_or(GameError::UnknownIdentity)
    }

    fn activate(&mut self) {
        if self.phase == GamePhase::Setup {
            self.phase = GamePhase::Active;
        }
    }

    /// Validate a join request and return the cleaned-up name.
    fn admit(&self, identity: &K, name: &str) -> Result<String, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        if self.index.contains_key(identity) || self.is_spectator(identity) {
            return Err(GameError::AlreadyJoined);
        }
        if self.players.len() >= self.config.max_players {
            return Err(GameError::RosterFull {
                capacity: self.config.max_players,
            });
        }
        sanitize_name(name, self.config.max_name_len).ok_or(GameError::EmptyName)
    }

    /// Pick a uniformly random empty floor cell for a new player.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoOpenCell`] if there is none.
    pub fn random_spawn(&mut self) -> Result<Coord, GameError> {
        let open: Vec<Coord> = self
            .map
            .working()
            .iter()
            .filter(|&(_, cell)| cell == Cell::Floor)
            .map(|(coord, _)| coord)
            .collect();
        open.choose(&mut self.rng).copied().ok_or(GameError::NoOpenCell)
    }

    /// Add a player at a random empty floor cell.
    ///
    /// # Errors
    ///
    /// See [`Game::add_player`]; also [`GameError::NoOpenCell`].
    pub fn join(&mut self, identity: K, name: &str) -> Result<&Player<K>, GameError> {
        self.admit(&identity, name)?;
        let position = self.random_spawn()?;
        self.add_player(identity, position, name)
    }

    /// Add a player at `position`.
    ///
    /// The player gets the next roster id, is stamped into the working grid,
    /// and starts with a sight grid computed from `position`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::RosterFull`] when every slot is taken,
    /// [`GameError::EmptyName`] for a blank name, [`GameError::AlreadyJoined`]
    /// for a known identity, [`GameError::InvalidPosition`] unless `position`
    /// is unoccupied floor or passage, and [`GameError::GameOver`] after the
    /// match ended.
    pub fn add_player(
        &mut self,
        identity: K,
        position: Coord,
        name: &str,
    ) -> Result<&Player<K>, GameError> {
        let name = self.admit(&identity, name)?;
        if !matches!(self.map.working().get(position)?, Cell::Floor | Cell::Passage) {
            return Err(GameError::InvalidPosition(position));
        }

        let id = self.players.len() as PlayerId;
        self.map.working_mut().set(position, Cell::Player(id))?;

        let blank = Grid::blank(self.map.width(), self.map.height())?;
        let mut player = Player::new(id, identity.clone(), name, position, blank);
        let (master, working) = self.map.grids();
        player.set_sight(compute_sight(master, working, &player)?);

        info!(alias = %player.alias(), name = player.name(), %position, "player joined");
        self.players.push(player);
        self.index.insert(identity, id);
        self.activate();

        Ok(&self.players[usize::from(id)])
    }

    /// Install a spectator, evicting any previous one.
    ///
    /// Returns the evicted identity so the caller can tell them.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::AlreadyJoined`] if `identity` is a player.
    pub fn add_spectator(&mut self, identity: K) -> Result<Option<K>, GameError> {
        if self.index.contains_key(&identity) {
            return Err(GameError::AlreadyJoined);
        }

        let evicted = self
            .spectator
            .replace(Spectator::new(identity.clone()))
            .map(Spectator::into_identity)
            .filter(|old| *old != identity);
        if let Some(old) = &evicted {
            info!(?old, "spectator replaced");
        }
        info!(?identity, "spectator joined");
        self.activate();
        Ok(evicted)
    }

    /// Mark a player as having quit.
    ///
    /// The player keeps their roster slot and score but leaves the map.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownIdentity`] for an unknown identity, or
    /// [`GameError::NotAlive`] if the player already quit.
    pub fn remove_player(&mut self, identity: &K) -> Result<(), GameError> {
        let id = self.player_id(identity)?;
        let player = &mut self.players[usize::from(id)];
        if !player.is_alive() {
            return Err(GameError::NotAlive(player.alias()));
        }
        player.eliminate();

        let position = player.position();
        let terrain = self.map.master().get(position)?;
        self.map.working_mut().set(position, terrain)?;
        info!(alias = %player.alias(), score = player.score(), "player quit");
        Ok(())
    }

    /// Clear the spectator slot, returning whoever held it.
    pub fn remove_spectator(&mut self) -> Option<K> {
        let identity = self.spectator.take().map(Spectator::into_identity);
        if let Some(identity) = &identity {
            info!(?identity, "spectator left");
        }
        identity
    }

    /// Move a player by a compass direction.
    ///
    /// A step onto floor, passage or gold moves the player; a step onto
    /// another player swaps the two; anything else is blocked and leaves the
    /// player where they are. Gold under the player's new cell is picked up.
    ///
    /// With `run`, steps repeat in the same direction until one is blocked.
    /// A swap always ends the run.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownIdentity`], [`GameError::NotAlive`] for a
    /// player who quit, or [`GameError::GameOver`] once gold is exhausted.
    pub fn move_in(
        &mut self,
        identity: &K,
        direction: Direction,
        run: bool,
    ) -> Result<MoveOutcome, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        let id = self.player_id(identity)?;
        let player = &self.players[usize::from(id)];
        if !player.is_alive() {
            return Err(GameError::NotAlive(player.alias()));
        }

        let mut outcome = MoveOutcome::default();
        loop {
            match self.step(id, direction)? {
                Step::Blocked => break,
                Step::Moved { gold } => {
                    outcome.steps += 1;
                    outcome.gold += gold;
                    if !run || self.is_over() {
                        break;
                    }
                }
                Step::Swapped { with, gold } => {
                    outcome.steps += 1;
                    outcome.gold += gold;
                    outcome.swapped_with = Some(with);
                    break;
                }
            }
        }

        debug!(
            alias = %self.players[usize::from(id)].alias(),
            ?direction,
            run,
            steps = outcome.steps,
            gold = outcome.gold,
            "move"
        );
        Ok(outcome)
    }

    /// Move a player by a raw `(dx, dy)` offset.
    ///
    /// Both components must lie in `-1..=1` and not both be zero; see
    /// [`Game::move_in`] for the movement rules.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidOffset`] for any other offset, otherwise
    /// the errors of [`Game::move_in`].
    pub fn move_player(
        &mut self,
        identity: &K,
        dx: i32,
        dy: i32,
        run: bool,
    ) -> Result<MoveOutcome, GameError> {
        let direction = Direction::from_delta(dx, dy).ok_or(GameError::InvalidOffset { dx, dy })?;
        self.move_in(identity, direction, run)
    }

    /// Take one step, keeping the working grid's overlay current.
    fn step(&mut self, id: PlayerId, direction: Direction) -> Result<Step, GameError> {
        let (dx, dy) = direction.delta();
        let from = self.players[usize::from(id)].position();
        let Some(dest) = from
            .offset(dx, dy)
            .filter(|&c| c != from && self.map.working().in_bounds(c))
        else {
            return Ok(Step::Blocked);
        };

        match self.map.working().get(dest)? {
            Cell::Player(other) if self.is_live_id(other) && other != id => {
                let (back_x, back_y) = direction.reverse().delta();
                self.players[usize::from(other)].translate(back_x, back_y);
                self.players[usize::from(id)].relocate(dest);
                let working = self.map.working_mut();
                working.set(from, Cell::Player(other))?;
                working.set(dest, Cell::Player(id))?;
                let gold = self.collect_at(id)?;
                Ok(Step::Swapped { with: other, gold })
            }
            cell if cell.is_walkable() => {
                self.players[usize::from(id)].relocate(dest);
                let terrain = self.map.master().get(from)?;
                let working = self.map.working_mut();
                working.set(from, terrain)?;
                working.set(dest, Cell::Player(id))?;
                let gold = self.collect_at(id)?;
                Ok(Step::Moved { gold })
            }
            _ => Ok(Step::Blocked),
        }
    }

    fn is_live_id(&self, id: PlayerId) -> bool {
        self.players
            .get(usize::from(id))
            .is_some_and(Player::is_alive)
    }

    fn collect_at(&mut self, id: PlayerId) -> Result<u32, GameError> {
        let position = self.players[usize::from(id)].position();
        if self.map.master().get(position)? == Cell::Gold {
            self.claim_pile(id)
        } else {
            Ok(0)
        }
    }

    /// Pick up the gold pile under a player, if there is one.
    ///
    /// Returns the amount added to the player's purse (0 when there is no
    /// gold under them).
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownIdentity`] for an unknown identity.
    pub fn pickup_gold(&mut self, identity: &K) -> Result<u32, GameError> {
        let id = self.player_id(identity)?;
        self.collect_at(id)
    }

    fn claim_pile(&mut self, id: PlayerId) -> Result<u32, GameError> {
        let amount = self.gold.claim(&mut self.rng);
        let player = &mut self.players[usize::from(id)];
        player.earn(amount);
        self.map.master_mut().set(player.position(), Cell::Floor)?;

        info!(
            alias = %player.alias(),
            amount,
            purse = player.score(),
            remaining = self.gold.remaining(),
            "gold collected"
        );
        if self.gold.is_exhausted() {
            self.phase = GamePhase::Ended;
            info!("all gold collected, game over");
        }
        Ok(amount)
    }

    /// Recompute one player's sight grid from the current working grid.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownIdentity`] for an unknown identity.
    pub fn refresh_sight(&mut self, identity: &K) -> Result<(), GameError> {
        let id = self.player_id(identity)?;
        let (master, working) = self.map.grids();
        let player = &self.players[usize::from(id)];
        let sight = compute_sight(master, working, player)?;
        self.players[usize::from(id)].set_sight(sight);
        Ok(())
    }

    /// Recompute every live player's sight grid, in parallel.
    ///
    /// # Errors
    ///
    /// Propagates any grid failure from the visibility computation.
    pub fn refresh_all_sights(&mut self) -> Result<(), GameError> {
        let (master, working) = self.map.grids();
        self.players
            .par_iter_mut()
            .filter(|p| p.is_alive())
            .try_for_each(|player| {
                let sight = compute_sight(master, working, player)?;
                player.set_sight(sight);
                Ok(())
            })
    }

    /// Rebuild the working grid from the master grid and live players.
    ///
    /// # Errors
    ///
    /// Propagates any grid failure while stamping players.
    pub fn redraw_working_grid(&mut self) -> Result<(), GameError> {
        let mut working = self.map.master().clone();
        for player in self.players.iter().filter(|p| p.is_alive()) {
            working.set(player.position(), Cell::Player(player.id()))?;
        }
        self.map.set_working(working)?;
        Ok(())
    }

    /// Redraw the working grid, then refresh every live player's sight.
    ///
    /// # Errors
    ///
    /// Propagates any grid failure.
    pub fn refresh_views(&mut self) -> Result<(), GameError> {
        self.redraw_working_grid()?;
        self.refresh_all_sights()
    }

    /// The final score report.
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary {
            entries: self
                .players
                .iter()
                .map(|p| SummaryEntry {
                    alias: p.alias(),
                    score: p.score(),
                    name: p.name().to_string(),
                })
                .collect(),
        }
    }
}

/// Sight grid for `player`: visibility from their position, with their own
/// cell marked `'@'`.
fn compute_sight<K: Identity>(
    master: &Grid,
    working: &Grid,
    player: &Player<K>,
) -> Result<Grid, GameError> {
    let mut sight = master.visibility(working, player.sight(), player.position())?;
    sight.set(player.position(), Cell::Viewer)?;
    Ok(sight)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = "\
+--------+
|........|
|........|
|........|
+--------+";

    fn config(piles: u32, gold: u32) -> GameConfig {
        GameConfig {
            gold_total: gold,
            gold_min_piles: piles,
            gold_max_piles: piles,
            ..GameConfig::default()
        }
    }

    fn create_test_game() -> Game<&'static str> {
        Game::new(Grid::parse(MAP).unwrap(), &config(1, 100), 42).unwrap()
    }

    /// Move the single gold pile to a known cell.
    fn put_gold_at(game: &mut Game<&'static str>, coord: Coord) {
        let map = &mut game.map;
        let old: Vec<Coord> = map
            .master()
            .iter()
            .filter(|&(_, c)| c == Cell::Gold)
            .map(|(c, _)| c)
            .collect();
        for c in old {
            map.master_mut().set(c, Cell::Floor).unwrap();
        }
        map.master_mut().set(coord, Cell::Gold).unwrap();
        game.redraw_working_grid().unwrap();
    }

    #[test]
    fn test_game_creation() {
        let game = create_test_game();
        assert_eq!(game.phase(), GamePhase::Setup);
        assert_eq!(game.remaining_gold(), 100);
        assert_eq!(game.gold().piles(), 1);
        assert_eq!(game.map().master().count(|c| c == Cell::Gold), 1);
        assert_eq!(game.master_text(), game.working_text());
        assert_eq!(game.roster_len(), 0);
    }

    #[test]
    fn test_same_seed_same_gold() {
        let a: Game<u32> = Game::new(Grid::parse(MAP).unwrap(), &config(5, 100), 9).unwrap();
        let b: Game<u32> = Game::new(Grid::parse(MAP).unwrap(), &config(5, 100), 9).unwrap();
        assert_eq!(a.master_text(), b.master_text());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = GameConfig {
            max_players: 0,
            ..GameConfig::default()
        };
        let result: Result<Game<u32>, _> = Game::new(Grid::parse(MAP).unwrap(), &bad, 1);
        assert!(matches!(result, Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_map_with_play_symbols_rejected() {
        use crate::error::GridError;

        for (text, symbol) in [("|.*..A...|", '*'), ("|....A...|", 'A'), ("|..Z.....|", 'Z'), ("|...@....|", '@')] {
            let result: Result<Game<u32>, _> = Game::new(Grid::parse(text).unwrap(), &config(1, 10), 1);
            match result {
                Err(GameError::Grid(GridError::NotTerrain { symbol: found, .. })) => {
                    assert_eq!(found, symbol, "{text}");
                }
                other => panic!("{text}: expected NotTerrain, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_add_player_stamps_and_sees() {
        let mut game = create_test_game();
        put_gold_at(&mut game, Coord::new(8, 3));
        let player = game.add_player("a", Coord::new(1, 1), "alice").unwrap();
        assert_eq!(player.alias(), 'A');
        assert_eq!(player.sight().get(Coord::new(1, 1)).unwrap(), Cell::Viewer);
        assert_eq!(player.sight().get(Coord::new(8, 3)).unwrap(), Cell::Gold);

        assert_eq!(game.phase(), GamePhase::Active);
        assert_eq!(
            game.map().working().get(Coord::new(1, 1)).unwrap(),
            Cell::Player(0)
        );
    }

    #[test]
    fn test_add_player_rejections() {
        let mut game = create_test_game();
        put_gold_at(&mut game, Coord::new(8, 3));
        assert!(matches!(
            game.add_player("a", Coord::new(1, 1), "   "),
            Err(GameError::EmptyName)
        ));
        assert!(matches!(
            game.add_player("a", Coord::new(0, 0), "alice"),
            Err(GameError::InvalidPosition(_))
        ));
        assert!(matches!(
            game.add_player("a", Coord::new(40, 0), "alice"),
            Err(GameError::Grid(_))
        ));
        assert_eq!(game.roster_len(), 0);

        game.add_player("a", Coord::new(1, 1), "alice").unwrap();
        assert!(matches!(
            game.add_player("a", Coord::new(2, 1), "again"),
            Err(GameError::AlreadyJoined)
        ));
        assert!(matches!(
            game.add_player("b", Coord::new(1, 1), "bob"),
            Err(GameError::InvalidPosition(_))
        ));
    }

    #[test]
    fn test_roster_capacity() {
        let small = GameConfig {
            max_players: 2,
            ..config(1, 100)
        };
        let mut game: Game<u32> = Game::new(Grid::parse(MAP).unwrap(), &small, 3).unwrap();
        game.join(1, "one").unwrap();
        game.join(2, "two").unwrap();
        assert!(matches!(
            game.join(3, "three"),
            Err(GameError::RosterFull { capacity: 2 })
        ));
        assert_eq!(game.roster_len(), 2);
    }

    #[test]
    fn test_single_step_and_block() {
        let mut game = create_test_game();
        put_gold_at(&mut game, Coord::new(8, 3));
        game.add_player("a", Coord::new(1, 1), "alice").unwrap();

        let outcome = game.move_in(&"a", Direction::East, false).unwrap();
        assert_eq!(outcome.steps, 1);
        assert_eq!(game.player(&"a").unwrap().position(), Coord::new(2, 1));

        // Back to the wall, then into it.
        game.move_in(&"a", Direction::West, false).unwrap();
        let outcome = game.move_in(&"a", Direction::West, false).unwrap();
        assert!(!outcome.moved());
        assert_eq!(game.player(&"a").unwrap().position(), Coord::new(1, 1));
        assert_eq!(
            game.map().working().get(Coord::new(2, 1)).unwrap(),
            Cell::Floor
        );
    }

    #[test]
    fn test_run_until_wall() {
        let mut game = create_test_game();
        put_gold_at(&mut game, Coord::new(8, 3));
        game.add_player("a", Coord::new(1, 1), "alice").unwrap();

        let outcome = game.move_in(&"a", Direction::East, true).unwrap();
        assert_eq!(outcome.steps, 7);
        assert_eq!(game.player(&"a").unwrap().position(), Coord::new(8, 1));
    }

    #[test]
    fn test_swap_positions() {
        let mut game = create_test_game();
        put_gold_at(&mut game, Coord::new(8, 3));
        game.add_player("a", Coord::new(2, 2), "alice").unwrap();
        game.add_player("b", Coord::new(3, 2), "bob").unwrap();

        let outcome = game.move_in(&"a", Direction::East, true).unwrap();
        assert_eq!(outcome.swapped_with, Some(1));
        assert_eq!(outcome.steps, 1);
        assert_eq!(outcome.gold, 0);
        assert_eq!(game.player(&"a").unwrap().position(), Coord::new(3, 2));
        assert_eq!(game.player(&"b").unwrap().position(), Coord::new(2, 2));
        assert_eq!(
            game.map().working().get(Coord::new(2, 2)).unwrap(),
            Cell::Player(1)
        );
    }

    #[test]
    fn test_final_pile_ends_game() {
        let mut game = create_test_game();
        put_gold_at(&mut game, Coord::new(3, 1));
        game.add_player("a", Coord::new(1, 1), "alice").unwrap();

        let outcome = game.move_in(&"a", Direction::East, true).unwrap();
        assert_eq!(outcome.gold, 100);
        assert_eq!(game.player(&"a").unwrap().score(), 100);
        assert_eq!(game.remaining_gold(), 0);
        assert!(game.is_over());
        assert_eq!(
            game.map().master().get(Coord::new(3, 1)).unwrap(),
            Cell::Floor
        );
        assert!(matches!(
            game.move_in(&"a", Direction::West, false),
            Err(GameError::GameOver)
        ));
    }

    #[test]
    fn test_move_rejects_non_compass_offsets() {
        let mut game = create_test_game();
        put_gold_at(&mut game, Coord::new(8, 3));
        game.add_player("a", Coord::new(1, 1), "alice").unwrap();

        for (dx, dy) in [(i32::MAX, 0), (0, i32::MIN), (2, 0), (-1, -2), (0, 0)] {
            let result = game.move_player(&"a", dx, dy, true);
            assert!(
                matches!(result, Err(GameError::InvalidOffset { dx: x, dy: y }) if (x, y) == (dx, dy)),
                "({dx}, {dy})"
            );
        }
        assert_eq!(game.player(&"a").unwrap().position(), Coord::new(1, 1));

        let outcome = game.move_player(&"a", 1, 1, false).unwrap();
        assert_eq!(outcome.steps, 1);
        assert_eq!(game.player(&"a").unwrap().position(), Coord::new(2, 2));
    }

    #[test]
    fn test_pickup_gold() {
        let mut game = create_test_game();
        put_gold_at(&mut game, Coord::new(8, 3));
        game.add_player("a", Coord::new(1, 1), "alice").unwrap();

        assert_eq!(game.pickup_gold(&"a").unwrap(), 0);
        assert_eq!(game.remaining_gold(), 100);
        assert!(!game.is_over());
        assert!(matches!(game.pickup_gold(&"zz"), Err(GameError::UnknownIdentity)));

        put_gold_at(&mut game, Coord::new(1, 1));
        assert_eq!(game.pickup_gold(&"a").unwrap(), 100);
        assert_eq!(game.remaining_gold(), 0);
        assert_eq!(game.player(&"a").unwrap().score(), 100);
        assert_eq!(game.map().master().get(Coord::new(1, 1)).unwrap(), Cell::Floor);
        assert_eq!(game.phase(), GamePhase::Ended);
        assert!(crate::game::check_invariants(&game).is_empty());
    }

    #[test]
    fn test_remove_player() {
        let mut game = create_test_game();
        put_gold_at(&mut game, Coord::new(8, 3));
        game.add_player("a", Coord::new(1, 1), "alice").unwrap();
        game.remove_player(&"a").unwrap();

        let player = game.player(&"a").unwrap();
        assert!(!player.is_alive());
        assert_eq!(game.roster_len(), 1);
        assert_eq!(
            game.map().working().get(Coord::new(1, 1)).unwrap(),
            Cell::Floor
        );
        assert!(matches!(
            game.move_in(&"a", Direction::East, false),
            Err(GameError::NotAlive('A'))
        ));
        assert!(matches!(game.remove_player(&"a"), Err(GameError::NotAlive(_))));
        assert!(matches!(
            game.remove_player(&"zz"),
            Err(GameError::UnknownIdentity)
        ));
    }

    #[test]
    fn test_spectator_eviction() {
        let mut game = create_test_game();
        assert_eq!(game.add_spectator("s1").unwrap(), None);
        assert_eq!(game.add_spectator("s2").unwrap(), Some("s1"));
        assert!(game.is_spectator(&"s2"));
        assert!(!game.is_spectator(&"s1"));
        assert_eq!(game.add_spectator("s2").unwrap(), None);
        assert_eq!(game.remove_spectator(), Some("s2"));
        assert!(game.spectator().is_none());
    }

    #[test]
    fn test_player_cannot_spectate() {
        let mut game = create_test_game();
        game.join("a", "alice").unwrap();
        assert!(matches!(
            game.add_spectator("a"),
            Err(GameError::AlreadyJoined)
        ));
    }

    #[test]
    fn test_redraw_skips_dead_players() {
        let mut game = create_test_game();
        game.join("a", "alice").unwrap();
        game.join("b", "bob").unwrap();
        game.remove_player(&"a").unwrap();
        game.redraw_working_grid().unwrap();

        let a = game.player(&"a").unwrap().position();
        let b = game.player(&"b").unwrap().position();
        assert_ne!(game.map().working().get(a).unwrap(), Cell::Player(0));
        assert_eq!(game.map().working().get(b).unwrap(), Cell::Player(1));
    }

    #[test]
    fn test_refresh_marks_viewer() {
        let mut game = create_test_game();
        game.join("a", "alice").unwrap();
        game.move_in(&"a", Direction::South, false).unwrap();
        game.refresh_views().unwrap();

        let player = game.player(&"a").unwrap();
        assert_eq!(player.sight().get(player.position()).unwrap(), Cell::Viewer);
        assert_eq!(player.sight().count(|c| c == Cell::Viewer), 1);
    }

    #[test]
    fn test_summary_lists_all_joined() {
        let mut game = create_test_game();
        game.join("a", "alice").unwrap();
        game.join("b", "bob").unwrap();
        game.remove_player(&"b").unwrap();

        let summary = game.summary();
        assert_eq!(summary.entries.len(), 2);
        assert_eq!(summary.entries[1].alias, 'B');
        assert_eq!(summary.entries[1].name, "bob");
    }

    #[test]
    fn test_player_by_id() {
        let mut game = create_test_game();
        game.join("a", "alice").unwrap();
        assert_eq!(game.player_by_id(0).unwrap().name(), "alice");
        assert!(matches!(game.player_by_id(1), Err(GameError::UnknownActor(1))));
    }
}
