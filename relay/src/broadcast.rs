//! Payload fan-out: SPEC_FULL §4.E. Invoked whenever the codec classifies a
//! datagram as a payload rather than a command.

use std::net::SocketAddr;
use std::time::Instant;

use relay_core::{ClientAddr, Registry, RelayError, MAX_DATAGRAM_BYTES};
use tracing::trace;

use crate::endpoint::Endpoint;

/// Relay `payload` verbatim to every other member of the sender's active group.
/// Returns the error reply to send back to `sender`, if any — broadcast never
/// replies to the sender on success (§4.E: "Sender is NOT echoed to self ... Server
/// sends no reply").
pub async fn fan_out(
    endpoint: &Endpoint,
    registry: &Registry,
    sender: ClientAddr,
    payload: &[u8],
    now: Instant,
) -> Option<RelayError> {
    if payload.len() > MAX_DATAGRAM_BYTES {
        return Some(RelayError::too_large());
    }

    registry.touch(sender, now);

    let group = match registry.active_group_for_broadcast(sender) {
        Ok(g) => g,
        Err(e) => return Some(e),
    };

    let members: Vec<SocketAddr> = registry.members_of_excluding(&group, sender);
    trace!(%group, fanout = members.len(), bytes = payload.len(), "broadcasting payload");
    for member in members {
        endpoint.send(payload, member).await;
    }

    None
}
