use crate::application::config::SessionConfig;
use crate::application::delegate::{SessionControl, SessionDelegate};
use crate::domain::{ConnectionState, PeerId};
use std::collections::{BTreeMap, HashSet};
use terra_session_core::{GameMessage, GameRenderer, ProjectileId, ProjectileMirror, Side, Vector2};

/// Bridge between the session and the game.
///
/// Encodes local game events and broadcasts them, decodes remote ones into
/// renderer calls, and pairs peers automatically: the host invites whatever
/// it discovers and the guest accepts whatever invites it, up to `max_peers`.
pub struct ReplicationController<R: GameRenderer> {
    renderer: R,
    mirror: ProjectileMirror,
    max_peers: usize,
    /// Peers we invited, accepted or are connected to
    claimed: HashSet<PeerId>,
}

impl<R: GameRenderer> ReplicationController<R> {
    pub fn new(renderer: R, local_side: Side, max_peers: usize) -> Self {
        Self {
            renderer,
            mirror: ProjectileMirror::new(local_side),
            max_peers,
            claimed: HashSet::new(),
        }
    }

    pub fn for_config(renderer: R, config: &SessionConfig) -> Self {
        Self::new(renderer, Side::for_role(config.is_host), config.max_peers)
    }

    pub fn local_side(&self) -> Side {
        self.mirror.local_side()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn mirror(&self) -> &ProjectileMirror {
        &self.mirror
    }

    pub fn is_game_over(&self) -> bool {
        self.mirror.is_game_over()
    }

    /// Peers currently held by the pairing policy, sorted
    pub fn paired_peers(&self) -> Vec<PeerId> {
        let mut peers: Vec<PeerId> = self.claimed.iter().cloned().collect();
        peers.sort();
        peers
    }

    /// A projectile was fired locally; returns the id the opponent will mirror
    pub fn notify_local_spawn(
        &mut self,
        session: &mut dyn SessionControl,
        position: Vector2,
        velocity: Vector2,
        owner: Side,
    ) -> ProjectileId {
        let id = ProjectileId::new();
        tracing::debug!("🚀 Local {} projectile {} at {}", owner, id, position);
        self.mirror.track_local(id.clone());
        self.publish(session, &GameMessage::spawn(id.clone(), position, velocity));
        id
    }

    /// A projectile left play locally (ours, or the opponent's we hit)
    pub fn notify_local_despawn(&mut self, session: &mut dyn SessionControl, id: &ProjectileId) {
        self.mirror.retire(id);
        self.publish(session, &GameMessage::despawn(id.clone()));
    }

    /// Our base was destroyed: tell the opponent, then end the match locally
    pub fn notify_local_loss(&mut self, session: &mut dyn SessionControl) {
        if !self.mirror.mark_game_over() {
            tracing::debug!("Match already over, not reporting loss again");
            return;
        }
        self.publish(session, &GameMessage::Loss);
        self.renderer.game_over();
    }

    fn publish(&mut self, session: &mut dyn SessionControl, message: &GameMessage) {
        let bytes = match message.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to encode {}: {}", message.kind(), e);
                return;
            }
        };

        // Failures are logged by the session; the match goes on regardless
        let _ = session.broadcast(&bytes);
    }

    fn has_capacity_for(&self, peer: &PeerId) -> bool {
        self.claimed.contains(peer) || self.claimed.len() < self.max_peers
    }
}

impl<R: GameRenderer> SessionDelegate for ReplicationController<R> {
    fn found_peer(
        &mut self,
        session: &mut dyn SessionControl,
        peer: &PeerId,
        _info: &BTreeMap<String, String>,
    ) {
        if !session.is_host() || self.claimed.contains(peer) {
            return;
        }
        if !self.has_capacity_for(peer) {
            tracing::warn!("At capacity ({} peers), not inviting {}", self.max_peers, peer);
            return;
        }

        self.claimed.insert(peer.clone());
        if session.invite_node(peer, &[]).is_err() {
            self.claimed.remove(peer);
        }
    }

    fn lost_peer(&mut self, session: &mut dyn SessionControl, peer: &PeerId) {
        if session.connection_state(peer) != Some(ConnectionState::Connected) {
            self.claimed.remove(peer);
        }
    }

    fn received_invitation(&mut self, session: &mut dyn SessionControl, peer: &PeerId, _context: &[u8]) {
        if !self.has_capacity_for(peer) {
            tracing::warn!("At capacity ({} peers), declining {}", self.max_peers, peer);
            let _ = session.handle_invite(peer, false);
            return;
        }

        self.claimed.insert(peer.clone());
        if session.handle_invite(peer, true).is_err() {
            self.claimed.remove(peer);
        }
    }

    fn peer_did_connect(&mut self, _session: &mut dyn SessionControl, peer: &PeerId) {
        tracing::info!("🎮 Paired with {}", peer);
        self.claimed.insert(peer.clone());
    }

    fn peer_did_disconnect(&mut self, _session: &mut dyn SessionControl, peer: &PeerId) {
        if self.claimed.remove(peer) {
            tracing::info!("Released pairing with {}", peer);
        }
    }

    fn did_receive_data(&mut self, _session: &mut dyn SessionControl, peer: &PeerId, data: &[u8]) {
        let message = match GameMessage::decode(data) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Dropping malformed message from {}: {}", peer, e);
                return;
            }
        };

        tracing::debug!("📥 {} from {}", message.kind(), peer);
        for command in self.mirror.apply(message) {
            self.renderer.apply(command);
        }
    }
}
