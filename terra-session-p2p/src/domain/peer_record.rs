use crate::domain::PeerId;
use instant::Instant;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Connection state of a remote peer as reported by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionState {
    NotConnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::NotConnected => write!(f, "not connected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}

/// What the session knows about one remote peer
#[derive(Debug, Clone)]
pub struct PeerRecord<H> {
    pub peer_id: PeerId,
    /// Transport handle used to address the peer
    pub handle: H,
    pub state: ConnectionState,
    /// Key/value info announced at discovery time
    pub discovery_info: BTreeMap<String, String>,
    /// When `state` last changed
    pub last_changed: Instant,
}

impl<H> PeerRecord<H> {
    pub fn new(peer_id: PeerId, handle: H) -> Self {
        Self {
            peer_id,
            handle,
            state: ConnectionState::NotConnected,
            discovery_info: BTreeMap::new(),
            last_changed: Instant::now(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    fn set_state(&mut self, state: ConnectionState) -> ConnectionState {
        let previous = self.state;
        if previous != state {
            self.state = state;
            self.last_changed = Instant::now();
        }
        previous
    }
}

/// Registry of every peer seen during the session.
///
/// Records are never evicted; a disconnected peer keeps its record with
/// `NotConnected` so that a later reconnect reuses the same entry.
#[derive(Debug)]
pub struct PeerTable<H> {
    peers: HashMap<PeerId, PeerRecord<H>>,
}

impl<H: Clone> PeerTable<H> {
    pub fn new() -> Self {
        Self {
            peers: HashMap::new(),
        }
    }

    /// Record a discovered peer, refreshing its handle and announced info
    pub fn upsert_discovered(
        &mut self,
        peer_id: PeerId,
        handle: H,
        info: BTreeMap<String, String>,
    ) -> &PeerRecord<H> {
        let record = self
            .peers
            .entry(peer_id.clone())
            .or_insert_with(|| PeerRecord::new(peer_id, handle.clone()));
        record.handle = handle;
        record.discovery_info = info;
        record
    }

    /// Make sure a record exists for a peer that contacted us first
    pub fn upsert_handle(&mut self, peer_id: PeerId, handle: H) -> &PeerRecord<H> {
        let record = self
            .peers
            .entry(peer_id.clone())
            .or_insert_with(|| PeerRecord::new(peer_id, handle.clone()));
        record.handle = handle;
        record
    }

    /// Apply a state transition and return the previous state
    /// (`None` if the peer was unknown until now)
    pub fn upsert_state(
        &mut self,
        peer_id: PeerId,
        handle: H,
        state: ConnectionState,
    ) -> Option<ConnectionState> {
        match self.peers.get_mut(&peer_id) {
            Some(record) => {
                record.handle = handle;
                Some(record.set_state(state))
            }
            None => {
                let mut record = PeerRecord::new(peer_id.clone(), handle);
                record.set_state(state);
                self.peers.insert(peer_id, record);
                None
            }
        }
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<&PeerRecord<H>> {
        self.peers.get(peer_id)
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.peers.contains_key(peer_id)
    }

    pub fn state(&self, peer_id: &PeerId) -> Option<ConnectionState> {
        self.peers.get(peer_id).map(|record| record.state)
    }

    pub fn is_connected(&self, peer_id: &PeerId) -> bool {
        self.state(peer_id) == Some(ConnectionState::Connected)
    }

    /// Ids of all connected peers, sorted for stable output
    pub fn connected_ids(&self) -> Vec<PeerId> {
        let mut ids: Vec<PeerId> = self
            .peers
            .values()
            .filter(|record| record.is_connected())
            .map(|record| record.peer_id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn connected_handles(&self) -> Vec<H> {
        self.peers
            .values()
            .filter(|record| record.is_connected())
            .map(|record| record.handle.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PeerRecord<H>> {
        self.peers.values()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl<H: Clone> Default for PeerTable<H> {
    fn default() -> Self {
        Self::new()
    }
}
