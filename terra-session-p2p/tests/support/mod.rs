#![allow(dead_code)]

use instant::Duration;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use terra_session_core::RecordingRenderer;
use terra_session_p2p::domain::{ConnectionState, Delivery, InvitationResponder, PeerId};
use terra_session_p2p::infrastructure::error::Result;
use terra_session_p2p::{
    DiscoveryMode, MatchLoop, MemoryNetwork, MemoryTransport, SessionConfig, SessionControl,
    SessionDelegate, Transport, TransportEvent,
};

pub const SERVICE: &str = "terra-test";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("terra_session_p2p=debug")
        .with_test_writer()
        .try_init();
}

pub type MemoryMatch = MatchLoop<MemoryTransport, RecordingRenderer>;

/// Two peers on one in-memory network, host "Alice" and guest "Bob"
pub struct MatchFixture {
    pub network: MemoryNetwork,
    pub host: MemoryMatch,
    pub guest: MemoryMatch,
}

impl MatchFixture {
    pub fn new() -> Self {
        init_tracing();
        let network = MemoryNetwork::new();
        let guest = Self::join(&network, SessionConfig::guest("Bob"));
        let host = Self::join(&network, SessionConfig::host("Alice"));

        Self {
            network,
            host,
            guest,
        }
    }

    pub fn join(network: &MemoryNetwork, config: SessionConfig) -> MemoryMatch {
        let config = config.with_service_type(SERVICE);
        let transport = network.join(SERVICE, &config.display_name);
        MatchLoop::new(config, transport, RecordingRenderer::new()).expect("join network")
    }

    /// A fixture whose peers are already paired
    pub fn paired() -> Self {
        let mut fixture = Self::new();
        fixture.pump();
        assert!(fixture.host.is_paired(), "host should be paired");
        assert!(fixture.guest.is_paired(), "guest should be paired");
        fixture
    }

    /// Poll both peers until neither has anything left to process
    pub fn pump(&mut self) {
        for _ in 0..32 {
            let processed = self.host.poll() + self.guest.poll();
            if processed == 0 {
                return;
            }
        }
        panic!("network did not settle");
    }
}

/// Transport driven by the test: records calls, replays injected events
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    pub started: Option<DiscoveryMode>,
    pub invites: Vec<(u32, Vec<u8>, Duration)>,
    pub sent: Vec<(Vec<u8>, Vec<u32>, Delivery)>,
    pub pending: Vec<TransportEvent<u32>>,
}

impl ScriptedTransport {
    pub fn push(&mut self, event: TransportEvent<u32>) {
        self.pending.push(event);
    }
}

impl Transport for ScriptedTransport {
    type Handle = u32;

    fn start(&mut self, mode: DiscoveryMode) -> Result<()> {
        self.started = Some(mode);
        Ok(())
    }

    fn invite(&mut self, peer: &u32, context: Vec<u8>, timeout: Duration) -> Result<()> {
        self.invites.push((*peer, context, timeout));
        Ok(())
    }

    fn send(&mut self, data: &[u8], peers: &[u32], delivery: Delivery) -> Result<()> {
        self.sent.push((data.to_vec(), peers.to_vec(), delivery));
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<TransportEvent<u32>> {
        std::mem::take(&mut self.pending)
    }
}

pub fn found(name: &str, handle: u32) -> TransportEvent<u32> {
    TransportEvent::PeerFound {
        peer: PeerId::new(name),
        handle,
        info: BTreeMap::new(),
    }
}

pub fn state(name: &str, handle: u32, state: ConnectionState) -> TransportEvent<u32> {
    TransportEvent::StateChanged {
        peer: PeerId::new(name),
        handle,
        state,
    }
}

pub fn data(name: &str, bytes: &[u8]) -> TransportEvent<u32> {
    TransportEvent::DataReceived {
        peer: PeerId::new(name),
        data: bytes.to_vec(),
    }
}

/// Records every answer given through its responders
#[derive(Clone, Default)]
pub struct Answers {
    calls: Arc<AtomicUsize>,
    values: Arc<Mutex<Vec<bool>>>,
}

impl Answers {
    pub fn invitation(&self, name: &str, handle: u32, context: &[u8]) -> TransportEvent<u32> {
        let calls = self.calls.clone();
        let values = self.values.clone();
        TransportEvent::InvitationReceived {
            peer: PeerId::new(name),
            handle,
            context: context.to_vec(),
            responder: InvitationResponder::new(move |accept| {
                calls.fetch_add(1, Ordering::SeqCst);
                values.lock().unwrap().push(accept);
            }),
        }
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn values(&self) -> Vec<bool> {
        self.values.lock().unwrap().clone()
    }
}

/// Delegate that records notifications and the state seen at that moment
#[derive(Debug, Default)]
pub struct RecordingDelegate {
    pub calls: Vec<String>,
    pub states_seen: Vec<Option<ConnectionState>>,
    pub received: Vec<(PeerId, Vec<u8>)>,
}

impl SessionDelegate for RecordingDelegate {
    fn found_peer(
        &mut self,
        session: &mut dyn SessionControl,
        peer: &PeerId,
        _info: &BTreeMap<String, String>,
    ) {
        self.calls.push(format!("found:{}", peer));
        self.states_seen.push(session.connection_state(peer));
    }

    fn lost_peer(&mut self, _session: &mut dyn SessionControl, peer: &PeerId) {
        self.calls.push(format!("lost:{}", peer));
    }

    fn received_invitation(
        &mut self,
        session: &mut dyn SessionControl,
        peer: &PeerId,
        _context: &[u8],
    ) {
        self.calls.push(format!("invited:{}", peer));
        self.states_seen.push(session.connection_state(peer));
    }

    fn peer_did_connect(&mut self, session: &mut dyn SessionControl, peer: &PeerId) {
        self.calls.push(format!("connected:{}", peer));
        self.states_seen.push(session.connection_state(peer));
    }

    fn peer_did_disconnect(&mut self, session: &mut dyn SessionControl, peer: &PeerId) {
        self.calls.push(format!("disconnected:{}", peer));
        self.states_seen.push(session.connection_state(peer));
    }

    fn did_receive_data(&mut self, _session: &mut dyn SessionControl, peer: &PeerId, data: &[u8]) {
        self.calls.push(format!("data:{}", peer));
        self.received.push((peer.clone(), data.to_vec()));
    }
}
