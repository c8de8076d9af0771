use crate::application::config::SessionConfig;
use crate::application::delegate::{SessionControl, SessionDelegate};
use crate::domain::{
    ConnectionState, Delivery, InvitationTable, PeerId, PeerRecord, PeerTable, PendingInvitation,
};
use crate::infrastructure::error::{Result, SessionError};
use crate::infrastructure::transport::{DiscoveryMode, Transport, TransportEvent};

/// Peer discovery and messaging for one node.
///
/// Owns the peer table and the pending invitations; only [`dispatch`] mutates
/// them in response to transport events, and every change is applied before
/// the delegate hears about it.
///
/// [`dispatch`]: SessionManager::dispatch
pub struct SessionManager<T: Transport> {
    config: SessionConfig,
    transport: T,
    peers: PeerTable<T::Handle>,
    invitations: InvitationTable,
}

impl<T: Transport> SessionManager<T> {
    /// Create the manager and start browsing (host) or advertising (guest)
    pub fn new(config: SessionConfig, mut transport: T) -> Result<Self> {
        let mode = if config.is_host {
            DiscoveryMode::Browse
        } else {
            DiscoveryMode::Advertise
        };

        transport.start(mode)?;
        tracing::info!(
            "🚀 Session '{}' started as {} ({:?})",
            config.display_name,
            if config.is_host { "host" } else { "guest" },
            mode
        );

        Ok(Self {
            config,
            transport,
            peers: PeerTable::new(),
            invitations: InvitationTable::new(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn service_type(&self) -> &str {
        &self.config.service_type
    }

    pub fn peer(&self, peer: &PeerId) -> Option<&PeerRecord<T::Handle>> {
        self.peers.get(peer)
    }

    pub fn peers(&self) -> impl Iterator<Item = &PeerRecord<T::Handle>> {
        self.peers.iter()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Drain transport events in arrival order, applying each one and then
    /// notifying the delegate. Returns the number of events handled.
    pub fn dispatch<D: SessionDelegate + ?Sized>(&mut self, delegate: &mut D) -> usize {
        let events = self.transport.poll_events();
        let count = events.len();

        for event in events {
            self.handle_event(event, delegate);
        }

        count
    }

    fn handle_event<D: SessionDelegate + ?Sized>(
        &mut self,
        event: TransportEvent<T::Handle>,
        delegate: &mut D,
    ) {
        match event {
            TransportEvent::PeerFound { peer, handle, info } => {
                if !self.config.is_host {
                    tracing::warn!("Guest ignoring discovery of {}", peer);
                    return;
                }
                tracing::info!("🔍 Found peer {}", peer);
                self.peers.upsert_discovered(peer.clone(), handle, info.clone());
                delegate.found_peer(self, &peer, &info);
            }

            TransportEvent::PeerLost { peer } => {
                tracing::info!("👋 Lost peer {}", peer);
                delegate.lost_peer(self, &peer);
            }

            TransportEvent::InvitationReceived {
                peer,
                handle,
                context,
                responder,
            } => {
                if self.config.is_host {
                    tracing::warn!("Host declining invitation from {}", peer);
                    responder.respond(false);
                    return;
                }
                tracing::info!("📨 Invitation from {}", peer);
                self.peers.upsert_handle(peer.clone(), handle);

                let invitation = PendingInvitation::new(peer.clone(), context.clone(), responder);
                if let Some(superseded) = self.invitations.insert(invitation) {
                    tracing::debug!("Declining superseded invitation from {}", peer);
                    superseded.resolve(false);
                }
                delegate.received_invitation(self, &peer, &context);
            }

            TransportEvent::StateChanged {
                peer,
                handle,
                state,
            } => {
                let previous = self.peers.upsert_state(peer.clone(), handle, state);
                if previous == Some(state) {
                    return;
                }

                match state {
                    ConnectionState::Connected => {
                        tracing::info!("🟢 Connected to {}", peer);
                        delegate.peer_did_connect(self, &peer);
                    }
                    ConnectionState::NotConnected => {
                        if previous.is_none() {
                            return;
                        }
                        tracing::info!("🔴 Disconnected from {}", peer);
                        delegate.peer_did_disconnect(self, &peer);
                    }
                    ConnectionState::Connecting => {
                        tracing::debug!("Connecting to {}", peer);
                    }
                }
            }

            TransportEvent::DataReceived { peer, data } => {
                if !self.peers.contains(&peer) {
                    tracing::warn!("Dropping {} bytes from unknown peer {}", data.len(), peer);
                    return;
                }
                tracing::debug!("📥 {} bytes from {}", data.len(), peer);
                delegate.did_receive_data(self, &peer, &data);
            }
        }
    }
}

impl<T: Transport> SessionControl for SessionManager<T> {
    fn is_host(&self) -> bool {
        self.config.is_host
    }

    fn local_name(&self) -> &str {
        &self.config.display_name
    }

    fn invite_node(&mut self, peer: &PeerId, context: &[u8]) -> Result<()> {
        if !self.config.is_host {
            tracing::warn!("invite_node({}) called on a guest", peer);
            return Err(SessionError::RoleViolation {
                operation: "invite_node",
            });
        }

        let Some(record) = self.peers.get(peer) else {
            tracing::warn!("invite_node: unknown peer {}", peer);
            return Err(SessionError::UnknownPeer(peer.clone()));
        };
        let handle = record.handle.clone();

        self.transport
            .invite(&handle, context.to_vec(), self.config.invite_timeout)
            .inspect_err(|e| tracing::warn!("Failed to invite {}: {}", peer, e))?;

        tracing::info!(
            "📤 Invited {} (timeout {:?})",
            peer,
            self.config.invite_timeout
        );
        Ok(())
    }

    fn handle_invite(&mut self, peer: &PeerId, accept: bool) -> Result<()> {
        if self.config.is_host {
            tracing::warn!("handle_invite({}) called on a host", peer);
            return Err(SessionError::RoleViolation {
                operation: "handle_invite",
            });
        }

        let Some(invitation) = self.invitations.take(peer) else {
            tracing::warn!("No pending invitation from {}", peer);
            return Err(SessionError::NoPendingInvitation(peer.clone()));
        };

        tracing::info!(
            "{} invitation from {}",
            if accept { "✅ Accepting" } else { "❌ Declining" },
            peer
        );
        invitation.resolve(accept);
        Ok(())
    }

    fn broadcast(&mut self, data: &[u8]) -> Result<()> {
        let handles = self.peers.connected_handles();
        if handles.is_empty() {
            tracing::debug!("Broadcast with no connected peers");
            return Ok(());
        }

        self.transport
            .send(data, &handles, Delivery::Reliable)
            .inspect_err(|e| tracing::warn!("Broadcast failed: {}", e))?;

        tracing::debug!("📡 Broadcast {} bytes to {} peers", data.len(), handles.len());
        Ok(())
    }

    fn send_to_node(&mut self, data: &[u8], peer: &PeerId) -> Result<()> {
        let delivery = self.config.direct_delivery;
        self.send_to_node_with(data, peer, delivery)
    }

    fn send_to_node_with(&mut self, data: &[u8], peer: &PeerId, delivery: Delivery) -> Result<()> {
        let Some(record) = self.peers.get(peer) else {
            tracing::warn!("send_to_node: unknown peer {}", peer);
            return Err(SessionError::UnknownPeer(peer.clone()));
        };
        if !record.is_connected() {
            tracing::warn!("send_to_node: {} is {}", peer, record.state);
            return Err(SessionError::NotConnected(peer.clone()));
        }
        let handle = record.handle.clone();

        self.transport
            .send(data, &[handle], delivery)
            .inspect_err(|e| tracing::warn!("Send to {} failed: {}", peer, e))?;

        tracing::debug!("📤 {} bytes to {} ({:?})", data.len(), peer, delivery);
        Ok(())
    }

    fn connected_peers(&self) -> Vec<PeerId> {
        self.peers.connected_ids()
    }

    fn connection_state(&self, peer: &PeerId) -> Option<ConnectionState> {
        self.peers.state(peer)
    }

    fn has_pending_invitation(&self, peer: &PeerId) -> bool {
        self.invitations.contains(peer)
    }
}
