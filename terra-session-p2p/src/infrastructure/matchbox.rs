use crate::domain::{ConnectionState, Delivery, InvitationResponder, PeerId};
use crate::infrastructure::error::{Result, SessionError};
use crate::infrastructure::frame::{decode_context, encode_context, Frame};
use crate::infrastructure::transport::{DiscoveryMode, Transport, TransportEvent};
use instant::{Duration, Instant};
use matchbox_socket::{ChannelConfig, PeerState, WebRtcSocket, WebRtcSocketBuilder};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::Instrument;

pub use matchbox_socket::PeerId as MatchboxPeerId;

struct SocketState {
    socket: WebRtcSocket,
    local_name: String,
    service_type: String,
    mode: Option<DiscoveryMode>,
    /// Display names learned from hello / invite frames
    names: HashMap<MatchboxPeerId, PeerId>,
    connected: HashSet<MatchboxPeerId>,
    /// Invitations we sent, with their deadline
    outstanding: HashMap<MatchboxPeerId, Instant>,
    events: VecDeque<TransportEvent<MatchboxPeerId>>,
}

impl SocketState {
    fn send_frame(&mut self, frame: &Frame, peer: MatchboxPeerId, delivery: Delivery) -> Result<()> {
        let bytes = frame.to_bytes()?;
        self.socket
            .channel_mut(delivery.channel())
            .send(bytes.into_boxed_slice(), peer);
        Ok(())
    }

    fn handle_peer_state(&mut self, peer: MatchboxPeerId, state: PeerState) {
        match state {
            PeerState::Connected => {
                tracing::debug!("Socket link up: {}", peer);
                if self.mode == Some(DiscoveryMode::Advertise) {
                    self.announce(peer);
                }
            }
            PeerState::Disconnected => {
                tracing::debug!("Socket link down: {}", peer);
                self.outstanding.remove(&peer);
                let was_connected = self.connected.remove(&peer);

                let Some(name) = self.names.remove(&peer) else {
                    return;
                };
                if was_connected {
                    self.events.push_back(TransportEvent::StateChanged {
                        peer: name.clone(),
                        handle: peer,
                        state: ConnectionState::NotConnected,
                    });
                }
                if self.mode == Some(DiscoveryMode::Browse) {
                    self.events.push_back(TransportEvent::PeerLost { peer: name });
                }
            }
        }
    }

    fn announce(&mut self, peer: MatchboxPeerId) {
        let hello = Frame::Hello {
            name: self.local_name.clone(),
            service: self.service_type.clone(),
        };
        if let Err(e) = self.send_frame(&hello, peer, Delivery::Reliable) {
            tracing::warn!("Failed to announce to {}: {}", peer, e);
        }
    }

    fn handle_frame(&mut self, from: MatchboxPeerId, frame: Frame, shared: &Arc<Mutex<SocketState>>) {
        match frame {
            Frame::Hello { name, service } => {
                if self.mode != Some(DiscoveryMode::Browse) || service != self.service_type {
                    tracing::debug!("Ignoring hello from {} ({})", name, service);
                    return;
                }
                let peer = PeerId::new(name);
                self.names.insert(from, peer.clone());

                let mut info = BTreeMap::new();
                info.insert("service".to_string(), service);
                self.events.push_back(TransportEvent::PeerFound {
                    peer,
                    handle: from,
                    info,
                });
            }

            Frame::Invite { name, context } => {
                let context = match decode_context(&context) {
                    Ok(context) => context,
                    Err(e) => {
                        tracing::warn!("Malformed invitation context from {}: {}", name, e);
                        return;
                    }
                };
                let peer = PeerId::new(name);
                self.names.insert(from, peer.clone());

                let shared = Arc::downgrade(shared);
                let responder = InvitationResponder::new(move |accept| {
                    let Some(shared) = shared.upgrade() else {
                        return;
                    };
                    let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
                    state.reply_to_invitation(from, accept);
                });

                self.events.push_back(TransportEvent::InvitationReceived {
                    peer,
                    handle: from,
                    context,
                    responder,
                });
            }

            Frame::InviteReply { name, accept } => {
                if self.outstanding.remove(&from).is_none() {
                    tracing::debug!("Late invitation reply from {}, ignoring", name);
                    return;
                }
                let peer = PeerId::new(name);
                self.names.insert(from, peer.clone());

                let state = if accept {
                    self.connected.insert(from);
                    ConnectionState::Connected
                } else {
                    ConnectionState::NotConnected
                };
                self.events.push_back(TransportEvent::StateChanged {
                    peer,
                    handle: from,
                    state,
                });
            }

            payload @ (Frame::Text { .. } | Frame::Binary { .. }) => {
                let Some(peer) = self.names.get(&from).cloned() else {
                    tracing::debug!("Dropping data from anonymous socket {}", from);
                    return;
                };
                match payload.into_payload() {
                    Some(Ok(data)) => self
                        .events
                        .push_back(TransportEvent::DataReceived { peer, data }),
                    Some(Err(e)) => tracing::warn!("Malformed payload from {}: {}", peer, e),
                    None => {}
                }
            }
        }
    }

    fn reply_to_invitation(&mut self, inviter: MatchboxPeerId, accept: bool) {
        let reply = Frame::InviteReply {
            name: self.local_name.clone(),
            accept,
        };
        if let Err(e) = self.send_frame(&reply, inviter, Delivery::Reliable) {
            tracing::warn!("Failed to answer invitation from {}: {}", inviter, e);
            return;
        }

        if accept {
            self.connected.insert(inviter);
            if let Some(peer) = self.names.get(&inviter).cloned() {
                self.events.push_back(TransportEvent::StateChanged {
                    peer,
                    handle: inviter,
                    state: ConnectionState::Connected,
                });
            }
        }
    }

    fn expire_invitations(&mut self, now: Instant) {
        let expired: Vec<MatchboxPeerId> = self
            .outstanding
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(peer, _)| *peer)
            .collect();

        for handle in expired {
            self.outstanding.remove(&handle);
            if let Some(peer) = self.names.get(&handle).cloned() {
                tracing::info!("⏱️ Invitation to {} timed out", peer);
                self.events.push_back(TransportEvent::StateChanged {
                    peer,
                    handle,
                    state: ConnectionState::NotConnected,
                });
            }
        }
    }
}

/// Infrastructure adapter: WebRTC data channels via a Matchbox signalling room.
///
/// Channel 0 is reliable, channel 1 unreliable. The room is named after the
/// service type so only nodes of the same game meet.
pub struct MatchboxTransport {
    state: Arc<Mutex<SocketState>>,
    local_peer_id: MatchboxPeerId,
}

impl MatchboxTransport {
    /// Connect to the signalling server and join the room for `service_type`
    pub async fn connect(signalling_url: &str, service_type: &str, local_name: &str) -> Result<Self> {
        let room_url = format!("{}/{}", signalling_url.trim_end_matches('/'), service_type);
        tracing::info!("Connecting to signalling server: {}", room_url);

        let (mut socket, loop_fut) = WebRtcSocketBuilder::new(room_url)
            .add_channel(ChannelConfig::reliable())
            .add_channel(ChannelConfig::unreliable())
            .build();

        let matchbox_span = tracing::info_span!("matchbox::webrtc_loop");
        tokio::spawn(
            async move {
                if let Err(e) = loop_fut.await {
                    tracing::warn!("Matchbox socket loop ended: {:?}", e);
                }
            }
            .instrument(matchbox_span),
        );

        let local_peer_id = wait_for_peer_id(&mut socket).await?;
        tracing::info!("Connected with peer ID: {}", local_peer_id);

        Ok(Self {
            state: Arc::new(Mutex::new(SocketState {
                socket,
                local_name: local_name.to_string(),
                service_type: service_type.to_string(),
                mode: None,
                names: HashMap::new(),
                connected: HashSet::new(),
                outstanding: HashMap::new(),
                events: VecDeque::new(),
            })),
            local_peer_id,
        })
    }

    pub fn local_peer_id(&self) -> MatchboxPeerId {
        self.local_peer_id
    }

    fn lock(&self) -> MutexGuard<'_, SocketState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MatchboxTransport {
    type Handle = MatchboxPeerId;

    fn start(&mut self, mode: DiscoveryMode) -> Result<()> {
        let mut state = self.lock();
        state.mode = Some(mode);

        if mode == DiscoveryMode::Advertise {
            let peers: Vec<MatchboxPeerId> = state.socket.connected_peers().collect();
            for peer in peers {
                state.announce(peer);
            }
        }
        Ok(())
    }

    fn invite(&mut self, peer: &MatchboxPeerId, context: Vec<u8>, timeout: Duration) -> Result<()> {
        let mut state = self.lock();
        let Some(name) = state.names.get(peer).cloned() else {
            return Err(SessionError::SendFailed(format!(
                "Socket {} never announced itself",
                peer
            )));
        };

        let invite = Frame::Invite {
            name: state.local_name.clone(),
            context: encode_context(&context),
        };
        state.send_frame(&invite, *peer, Delivery::Reliable)?;
        state.outstanding.insert(*peer, Instant::now() + timeout);
        state.events.push_back(TransportEvent::StateChanged {
            peer: name,
            handle: *peer,
            state: ConnectionState::Connecting,
        });

        Ok(())
    }

    fn send(&mut self, data: &[u8], peers: &[MatchboxPeerId], delivery: Delivery) -> Result<()> {
        let mut state = self.lock();

        if let Some(peer) = peers.iter().find(|peer| !state.connected.contains(*peer)) {
            return Err(SessionError::SendFailed(format!(
                "Socket {} is not connected",
                peer
            )));
        }

        let frame = Frame::payload(data);
        for peer in peers {
            state.send_frame(&frame, *peer, delivery)?;
        }

        tracing::trace!("Sent {} bytes to {} peers", data.len(), peers.len());
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<TransportEvent<MatchboxPeerId>> {
        let mut state = self.lock();

        let updates = state.socket.update_peers();
        for (peer, peer_state) in updates {
            state.handle_peer_state(peer, peer_state);
        }

        for delivery in [Delivery::Reliable, Delivery::Unreliable] {
            let packets = state.socket.channel_mut(delivery.channel()).receive();
            for (from, packet) in packets {
                match Frame::from_bytes(&packet) {
                    Ok(frame) => state.handle_frame(from, frame, &self.state),
                    Err(e) => tracing::warn!("Malformed frame from {}: {}", from, e),
                }
            }
        }

        state.expire_invitations(Instant::now());
        state.events.drain(..).collect()
    }
}

/// Wait for the socket to receive a peer ID from the signalling server
async fn wait_for_peer_id(socket: &mut WebRtcSocket) -> Result<MatchboxPeerId> {
    let start = Instant::now();
    let timeout = Duration::from_secs(5);

    loop {
        socket.update_peers();

        if let Some(id) = socket.id() {
            return Ok(id);
        }

        if start.elapsed() > timeout {
            return Err(SessionError::ConnectionFailed(
                "Timeout waiting for peer ID".to_string(),
            ));
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
