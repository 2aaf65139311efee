#![no_main]

//! Movement fuzzer.
//!
//! Joins a few players on a random map, then applies arbitrary moves, quits
//! and view refreshes, checking every game invariant after each event.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nuggets::game::{check_invariants, Direction, Game, Grid};
use nuggets::GameConfig;

/// A fuzzer-generated event.
#[derive(Arbitrary, Debug, Clone, Copy)]
enum FuzzEvent {
    /// Step or run in one of the eight directions.
    Move { player: u8, direction: u8, run: bool },
    /// A player quits.
    Quit { player: u8 },
    /// Redraw and refresh every sight.
    Refresh,
}

#[derive(Arbitrary, Debug)]
struct MovesInput {
    seed: u64,
    /// Map cells, row-major, drawn from a small alphabet.
    cells: Vec<u8>,
    width: u8,
    players: u8,
    events: Vec<FuzzEvent>,
}

const ALPHABET: &[u8] = b"....##| -+";

fuzz_target!(|input: MovesInput| {
    let width = usize::from(input.width % 24) + 2;
    let cells: Vec<u8> = input
        .cells
        .iter()
        .take(width * 16)
        .map(|b| ALPHABET[usize::from(*b) % ALPHABET.len()])
        .collect();
    if cells.is_empty() {
        return;
    }
    let text: String = cells
        .chunks(width)
        .map(|row| String::from_utf8_lossy(row).into_owned())
        .collect::<Vec<_>>()
        .join("\n");

    let Ok(grid) = Grid::parse(&text) else {
        return;
    };
    let config = GameConfig {
        max_players: 6,
        gold_total: 30,
        gold_min_piles: 1,
        gold_max_piles: 3,
        placement_attempts: 10_000,
        ..GameConfig::default()
    };
    let Ok(mut game) = Game::<u8>::new(grid, &config, input.seed) else {
        return;
    };

    for id in 0..input.players % 6 {
        if game.join(id, "fuzz").is_err() {
            break;
        }
    }
    let joined = game.roster_len();
    if joined == 0 {
        return;
    }

    for event in input.events.into_iter().take(300) {
        if game.is_over() {
            break;
        }
        match event {
            FuzzEvent::Move {
                player,
                direction,
                run,
            } => {
                let id = player % joined as u8;
                let direction = Direction::ALL[usize::from(direction) % 8];
                let _ = game.move_in(&id, direction, run);
            }
            FuzzEvent::Quit { player } => {
                let _ = game.remove_player(&(player % joined as u8));
            }
            FuzzEvent::Refresh => {
                game.refresh_views().expect("refresh must succeed");
            }
        }

        let violations = check_invariants(&game);
        assert!(violations.is_empty(), "{violations:?}");
    }
});
