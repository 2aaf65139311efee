#![no_main]

//! Inbound message fuzzer.
//!
//! Feeds arbitrary datagrams from a handful of clients through the message
//! session. Nothing a client sends may crash the server or break the game.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nuggets::game::{check_invariants, Game, Grid};
use nuggets::server::Session;
use nuggets::{ClientMessage, GameConfig};

const MAP: &str = "\
+--------+
|........|
|........######
|........|    #
+--------+    #
              #
         +----#--+
         |.......|
         +-------+";

/// One datagram from one of a few clients.
#[derive(Arbitrary, Debug)]
struct Datagram {
    client: u8,
    text: String,
}

#[derive(Arbitrary, Debug)]
struct ProtocolInput {
    seed: u64,
    datagrams: Vec<Datagram>,
}

fuzz_target!(|input: ProtocolInput| {
    // Parsing alone must never panic.
    for datagram in &input.datagrams {
        let _ = ClientMessage::parse(&datagram.text);
    }

    let Ok(grid) = Grid::parse(MAP) else {
        return;
    };
    let config = GameConfig {
        max_players: 4,
        gold_total: 50,
        gold_min_piles: 2,
        gold_max_piles: 5,
        ..GameConfig::default()
    };
    let Ok(game) = Game::new(grid, &config, input.seed) else {
        return;
    };
    let mut session = Session::new(game);

    for datagram in input.datagrams.into_iter().take(200) {
        let client = datagram.client % 6;
        session
            .handle_text(client, &datagram.text)
            .expect("client text must not fail the game");

        let violations = check_invariants(session.game());
        assert!(violations.is_empty(), "{violations:?}");
    }
});
