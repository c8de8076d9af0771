use crate::domain::{ConnectionState, Delivery, PeerId};
use crate::infrastructure::error::Result;
use std::collections::BTreeMap;

/// Operations a delegate may call back into while handling a notification
pub trait SessionControl {
    fn is_host(&self) -> bool;

    fn local_name(&self) -> &str;

    /// Invite a discovered peer (host only)
    fn invite_node(&mut self, peer: &PeerId, context: &[u8]) -> Result<()>;

    /// Answer a pending invitation (guest only)
    fn handle_invite(&mut self, peer: &PeerId, accept: bool) -> Result<()>;

    /// Send to every connected peer, reliably
    fn broadcast(&mut self, data: &[u8]) -> Result<()>;

    /// Send to one connected peer with the configured direct delivery
    fn send_to_node(&mut self, data: &[u8], peer: &PeerId) -> Result<()>;

    fn send_to_node_with(&mut self, data: &[u8], peer: &PeerId, delivery: Delivery)
        -> Result<()>;

    fn connected_peers(&self) -> Vec<PeerId>;

    fn connection_state(&self, peer: &PeerId) -> Option<ConnectionState>;

    fn has_pending_invitation(&self, peer: &PeerId) -> bool;
}

/// Receiver of session notifications.
///
/// The session manager updates its tables before every call, so the control
/// handle already reflects the change being reported.
pub trait SessionDelegate {
    fn found_peer(
        &mut self,
        session: &mut dyn SessionControl,
        peer: &PeerId,
        info: &BTreeMap<String, String>,
    );

    fn lost_peer(&mut self, session: &mut dyn SessionControl, peer: &PeerId) {
        let _ = (session, peer);
    }

    fn received_invitation(&mut self, session: &mut dyn SessionControl, peer: &PeerId, context: &[u8]);

    fn peer_did_connect(&mut self, session: &mut dyn SessionControl, peer: &PeerId);

    fn peer_did_disconnect(&mut self, session: &mut dyn SessionControl, peer: &PeerId);

    fn did_receive_data(&mut self, session: &mut dyn SessionControl, peer: &PeerId, data: &[u8]);
}
