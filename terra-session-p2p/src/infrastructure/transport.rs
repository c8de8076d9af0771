use crate::domain::{ConnectionState, Delivery, InvitationResponder, PeerId};
use crate::infrastructure::error::Result;
use instant::Duration;
use std::collections::BTreeMap;
use std::fmt;

/// Which half of discovery a node runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMode {
    /// Look for advertising peers (host)
    Browse,
    /// Make ourselves visible to browsers (guest)
    Advertise,
}

/// Events emitted by a transport, drained by the session manager
#[derive(Debug)]
pub enum TransportEvent<H> {
    /// An advertising peer became visible
    PeerFound {
        peer: PeerId,
        handle: H,
        info: BTreeMap<String, String>,
    },

    /// A previously found peer is no longer visible
    PeerLost { peer: PeerId },

    /// A peer invited us into its session
    InvitationReceived {
        peer: PeerId,
        handle: H,
        context: Vec<u8>,
        responder: InvitationResponder,
    },

    /// Connection state towards a peer changed
    StateChanged {
        peer: PeerId,
        handle: H,
        state: ConnectionState,
    },

    /// Data arrived from a peer
    DataReceived { peer: PeerId, data: Vec<u8> },
}

/// Discovery and delivery backend (allows an in-memory network in tests)
pub trait Transport {
    /// How the transport addresses a peer
    type Handle: Clone + fmt::Debug;

    /// Start browsing or advertising
    fn start(&mut self, mode: DiscoveryMode) -> Result<()>;

    /// Ask a found peer to join; the outcome arrives as `StateChanged`
    fn invite(&mut self, peer: &Self::Handle, context: Vec<u8>, timeout: Duration) -> Result<()>;

    /// Send data to connected peers
    fn send(&mut self, data: &[u8], peers: &[Self::Handle], delivery: Delivery) -> Result<()>;

    /// Drain pending events in arrival order
    fn poll_events(&mut self) -> Vec<TransportEvent<Self::Handle>>;
}
