use cucumber::World;
use std::collections::HashMap;
use std::fmt;
use terra_session_core::{ProjectileId, RecordingRenderer};
use terra_session_p2p::{MatchLoop, MemoryNetwork, MemoryTransport, SessionConfig};

pub const SERVICE: &str = "terra-bdd";

pub type Peer = MatchLoop<MemoryTransport, RecordingRenderer>;

#[derive(World, Default)]
pub struct MatchWorld {
    /// In-memory network every peer of a scenario joins
    pub network: MemoryNetwork,

    /// Peers by display name
    pub peers: HashMap<String, Peer>,

    /// Last projectile fired by each peer
    pub last_projectile: HashMap<String, ProjectileId>,
}

impl fmt::Debug for MatchWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.peers.keys().collect();
        names.sort();
        f.debug_struct("MatchWorld")
            .field("peers", &names)
            .field("last_projectile", &self.last_projectile)
            .finish()
    }
}

impl MatchWorld {
    /// Add a peer to the network
    pub fn join(&mut self, config: SessionConfig) {
        let config = config.with_service_type(SERVICE);
        let name = config.display_name.clone();
        let transport = self.network.join(SERVICE, &name);
        let peer = MatchLoop::new(config, transport, RecordingRenderer::new())
            .unwrap_or_else(|e| panic!("Peer '{}' failed to start: {}", name, e));
        self.peers.insert(name, peer);
    }

    pub fn peer(&self, name: &str) -> &Peer {
        self.peers
            .get(name)
            .unwrap_or_else(|| panic!("Peer '{}' not found", name))
    }

    pub fn peer_mut(&mut self, name: &str) -> &mut Peer {
        self.peers
            .get_mut(name)
            .unwrap_or_else(|| panic!("Peer '{}' not found", name))
    }

    /// Poll every peer until the network is quiet
    pub fn settle(&mut self) {
        for _ in 0..32 {
            let processed: usize = self.peers.values_mut().map(|peer| peer.poll()).sum();
            if processed == 0 {
                return;
            }
        }
        panic!("Network did not settle");
    }

    pub fn last_projectile(&self, name: &str) -> ProjectileId {
        self.last_projectile
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("'{}' has not fired yet", name))
    }
}
