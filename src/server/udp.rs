//! UDP transport.

use std::net::{SocketAddr, UdpSocket};

use tracing::{debug, info, warn};

use crate::game::Summary;
use crate::server::{ServerError, Session};

/// Largest datagram the server reads or writes.
pub const MAX_DATAGRAM: usize = 65_507;

/// Run `session` on `socket` until the last gold pile is collected.
///
/// Datagrams are handled one at a time, in arrival order. Returns the final
/// summary once it has been sent to every connected client.
///
/// # Errors
///
/// Returns [`ServerError::Io`] if receiving fails, or [`ServerError::Game`]
/// if the game fails while handling a message.
pub fn serve(
    socket: &UdpSocket,
    session: &mut Session<SocketAddr>,
) -> Result<Summary, ServerError> {
    if let Ok(addr) = socket.local_addr() {
        info!(%addr, "waiting for clients");
    }
    let mut buf = vec![0u8; MAX_DATAGRAM];

    loop {
        let (len, from) = socket.recv_from(&mut buf)?;
        let text = String::from_utf8_lossy(&buf[..len]);
        debug!(%from, message = %text, "received");

        let dispatch = session.handle_text(from, &text)?;
        for out in &dispatch.messages {
            let wire = out.message.to_string();
            if let Err(e) = socket.send_to(wire.as_bytes(), out.to) {
                warn!(to = %out.to, error = %e, "send failed");
            }
        }

        if dispatch.game_over {
            return Ok(session.game().summary());
        }
    }
}
