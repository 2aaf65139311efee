//! Serve command implementation.

use super::{resolve_seed, CliError, Tuning};
use nuggets::server::{serve, Session};
use nuggets::Game;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::path::Path;

/// Execute the serve command.
///
/// Prints the bound port on stdout so clients know where to connect, then
/// blocks until the match ends and prints the summary.
///
/// # Errors
///
/// Returns an error if the map or config cannot be loaded, the socket
/// cannot be bound, or the server fails.
pub(crate) fn execute(map: &Path, seed: Option<u64>, port: u16, tuning: &Tuning) -> Result<(), CliError> {
    let config = tuning.resolve()?;
    let seed = resolve_seed(seed);
    let game: Game<SocketAddr> = Game::load(map, &config, seed)
        .map_err(|e| CliError::new(format!("Failed to start game on {}: {e}", map.display())))?;

    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port))?;
    let addr = socket.local_addr()?;
    println!("Ready to play, waiting at port {}", addr.port());

    let mut session = Session::new(game);
    let summary = serve(&socket, &mut session)?;
    print!("{summary}");
    Ok(())
}
