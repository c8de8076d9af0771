use crate::domain::{ConnectionState, Delivery, InvitationResponder, PeerId};
use crate::infrastructure::error::{Result, SessionError};
use crate::infrastructure::transport::{DiscoveryMode, Transport, TransportEvent};
use instant::{Duration, Instant};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Address of an endpoint on a [`MemoryNetwork`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryHandle(u64);

struct Endpoint {
    name: String,
    service: String,
    mode: Option<DiscoveryMode>,
    events: VecDeque<TransportEvent<MemoryHandle>>,
    links: HashMap<u64, ConnectionState>,
    /// Invitations we sent, by target, with their deadline
    outstanding: HashMap<u64, Instant>,
}

#[derive(Default)]
struct NetworkState {
    next_id: u64,
    endpoints: HashMap<u64, Endpoint>,
    drop_unreliable: bool,
}

impl NetworkState {
    fn push(&mut self, target: u64, event: TransportEvent<MemoryHandle>) {
        if let Some(endpoint) = self.endpoints.get_mut(&target) {
            endpoint.events.push_back(event);
        }
    }

    fn peer_id(&self, id: u64) -> Option<PeerId> {
        self.endpoints.get(&id).map(|e| PeerId::new(e.name.clone()))
    }

    fn set_link(&mut self, from: u64, to: u64, state: ConnectionState) {
        let Some(peer) = self.peer_id(to) else {
            return;
        };
        if let Some(endpoint) = self.endpoints.get_mut(&from) {
            endpoint.links.insert(to, state);
            endpoint.events.push_back(TransportEvent::StateChanged {
                peer,
                handle: MemoryHandle(to),
                state,
            });
        }
    }

    fn resolve_invitation(&mut self, inviter: u64, invitee: u64, accept: bool) {
        let pending = self
            .endpoints
            .get_mut(&inviter)
            .and_then(|endpoint| endpoint.outstanding.remove(&invitee));

        if pending.is_none() {
            tracing::debug!("Invitation {} -> {} no longer pending", inviter, invitee);
            return;
        }

        if accept {
            self.set_link(inviter, invitee, ConnectionState::Connected);
            self.set_link(invitee, inviter, ConnectionState::Connected);
        } else {
            self.set_link(inviter, invitee, ConnectionState::NotConnected);
        }
    }

    fn expire_invitations(&mut self, id: u64, now: Instant) {
        let expired: Vec<u64> = match self.endpoints.get_mut(&id) {
            Some(endpoint) => {
                let expired: Vec<u64> = endpoint
                    .outstanding
                    .iter()
                    .filter(|(_, deadline)| **deadline <= now)
                    .map(|(target, _)| *target)
                    .collect();
                for target in &expired {
                    endpoint.outstanding.remove(target);
                }
                expired
            }
            None => return,
        };

        for target in expired {
            tracing::debug!("Invitation {} -> {} timed out", id, target);
            self.set_link(id, target, ConnectionState::NotConnected);
        }
    }
}

/// In-process network shared by every [`MemoryTransport`] joined to it.
///
/// Endpoints only see each other within the same service type. Delivery is
/// synchronous: a send lands in the receiver's queue before it returns.
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, NetworkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new endpoint under `service` with the given display name
    pub fn join(&self, service: &str, name: &str) -> MemoryTransport {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.endpoints.insert(
            id,
            Endpoint {
                name: name.to_string(),
                service: service.to_string(),
                mode: None,
                events: VecDeque::new(),
                links: HashMap::new(),
                outstanding: HashMap::new(),
            },
        );

        tracing::debug!("🔌 Memory endpoint {} joined '{}' as {}", id, service, name);

        MemoryTransport {
            network: self.clone(),
            id,
        }
    }

    /// Silently drop every unreliable send from now on
    pub fn set_drop_unreliable(&self, drop: bool) {
        self.lock().drop_unreliable = drop;
    }

    /// Cut the link between two endpoints (by display name)
    pub fn disconnect(&self, a: &str, b: &str) {
        let mut state = self.lock();
        let find = |state: &NetworkState, name: &str| {
            state
                .endpoints
                .iter()
                .find(|(_, endpoint)| endpoint.name == name)
                .map(|(id, _)| *id)
        };

        let (Some(a), Some(b)) = (find(&*state, a), find(&*state, b)) else {
            return;
        };

        state.set_link(a, b, ConnectionState::NotConnected);
        state.set_link(b, a, ConnectionState::NotConnected);
    }

    /// Number of endpoints currently joined
    pub fn endpoint_count(&self) -> usize {
        self.lock().endpoints.len()
    }
}

/// Transport endpoint on a [`MemoryNetwork`]
pub struct MemoryTransport {
    network: MemoryNetwork,
    id: u64,
}

impl MemoryTransport {
    pub fn handle(&self) -> MemoryHandle {
        MemoryHandle(self.id)
    }
}

impl Transport for MemoryTransport {
    type Handle = MemoryHandle;

    fn start(&mut self, mode: DiscoveryMode) -> Result<()> {
        let mut state = self.network.lock();

        let (name, service) = match state.endpoints.get_mut(&self.id) {
            Some(endpoint) => {
                endpoint.mode = Some(mode);
                (endpoint.name.clone(), endpoint.service.clone())
            }
            None => {
                return Err(SessionError::ConnectionFailed(
                    "Endpoint left the network".to_string(),
                ))
            }
        };

        let counterpart = match mode {
            DiscoveryMode::Browse => DiscoveryMode::Advertise,
            DiscoveryMode::Advertise => DiscoveryMode::Browse,
        };
        let others: Vec<(u64, String)> = state
            .endpoints
            .iter()
            .filter(|(id, e)| **id != self.id && e.service == service && e.mode == Some(counterpart))
            .map(|(id, e)| (*id, e.name.clone()))
            .collect();

        for (other, other_name) in others {
            let (browser, advertiser, advertiser_name) = match mode {
                DiscoveryMode::Browse => (self.id, other, other_name),
                DiscoveryMode::Advertise => (other, self.id, name.clone()),
            };

            let mut info = BTreeMap::new();
            info.insert("service".to_string(), service.clone());
            state.push(
                browser,
                TransportEvent::PeerFound {
                    peer: PeerId::new(advertiser_name),
                    handle: MemoryHandle(advertiser),
                    info,
                },
            );
        }

        Ok(())
    }

    fn invite(&mut self, peer: &MemoryHandle, context: Vec<u8>, timeout: Duration) -> Result<()> {
        let mut state = self.network.lock();

        let Some(inviter) = state.peer_id(self.id) else {
            return Err(SessionError::ConnectionFailed(
                "Endpoint left the network".to_string(),
            ));
        };
        if !state.endpoints.contains_key(&peer.0) {
            return Err(SessionError::SendFailed(format!(
                "No endpoint {:?} on the network",
                peer
            )));
        }

        if let Some(endpoint) = state.endpoints.get_mut(&self.id) {
            endpoint
                .outstanding
                .insert(peer.0, Instant::now() + timeout);
        }
        state.set_link(self.id, peer.0, ConnectionState::Connecting);

        // Weak: the responder may sit in a queue owned by the network itself
        let network: Weak<Mutex<NetworkState>> = Arc::downgrade(&self.network.state);
        let (inviter_id, invitee_id) = (self.id, peer.0);
        let responder = InvitationResponder::new(move |accept| {
            if let Some(state) = network.upgrade() {
                state
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .resolve_invitation(inviter_id, invitee_id, accept);
            }
        });

        state.push(
            peer.0,
            TransportEvent::InvitationReceived {
                peer: inviter,
                handle: MemoryHandle(self.id),
                context,
                responder,
            },
        );

        Ok(())
    }

    fn send(&mut self, data: &[u8], peers: &[MemoryHandle], delivery: Delivery) -> Result<()> {
        let mut state = self.network.lock();

        let Some(sender) = state.endpoints.get(&self.id) else {
            return Err(SessionError::ConnectionFailed(
                "Endpoint left the network".to_string(),
            ));
        };

        if let Some(target) = peers
            .iter()
            .find(|p| sender.links.get(&p.0) != Some(&ConnectionState::Connected))
        {
            return Err(SessionError::SendFailed(format!(
                "Endpoint {:?} is not connected",
                target
            )));
        }

        if delivery == Delivery::Unreliable && state.drop_unreliable {
            tracing::trace!("Dropping unreliable send of {} bytes", data.len());
            return Ok(());
        }

        let from = PeerId::new(sender.name.clone());
        for target in peers {
            state.push(
                target.0,
                TransportEvent::DataReceived {
                    peer: from.clone(),
                    data: data.to_vec(),
                },
            );
        }

        Ok(())
    }

    fn poll_events(&mut self) -> Vec<TransportEvent<MemoryHandle>> {
        let mut state = self.network.lock();
        state.expire_invitations(self.id, Instant::now());

        match state.endpoints.get_mut(&self.id) {
            Some(endpoint) => endpoint.events.drain(..).collect(),
            None => Vec::new(),
        }
    }
}

impl Drop for MemoryTransport {
    fn drop(&mut self) {
        let mut state = self.network.lock();
        let Some(endpoint) = state.endpoints.remove(&self.id) else {
            return;
        };
        let peer = PeerId::new(endpoint.name.clone());

        for (other_id, other) in state.endpoints.iter_mut() {
            if let Some(link) = other.links.remove(&self.id) {
                other.outstanding.remove(&self.id);
                if link != ConnectionState::NotConnected {
                    other.events.push_back(TransportEvent::StateChanged {
                        peer: peer.clone(),
                        handle: MemoryHandle(self.id),
                        state: ConnectionState::NotConnected,
                    });
                }
            }

            if endpoint.mode == Some(DiscoveryMode::Advertise)
                && other.mode == Some(DiscoveryMode::Browse)
                && other.service == endpoint.service
            {
                tracing::trace!("Endpoint {} lost {}", other_id, peer);
                other
                    .events
                    .push_back(TransportEvent::PeerLost { peer: peer.clone() });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(events: &[TransportEvent<MemoryHandle>]) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                TransportEvent::PeerFound { peer, .. } => Some(peer.to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_browser_finds_advertiser_in_same_service() {
        let network = MemoryNetwork::new();
        let mut host = network.join("terra", "Alice");
        let mut guest = network.join("terra", "Bob");
        let mut stranger = network.join("other", "Mallory");

        guest.start(DiscoveryMode::Advertise).unwrap();
        stranger.start(DiscoveryMode::Advertise).unwrap();
        host.start(DiscoveryMode::Browse).unwrap();

        assert_eq!(found(&host.poll_events()), vec!["Bob".to_string()]);
        assert!(guest.poll_events().is_empty());
    }

    #[test]
    fn test_advertiser_joining_later_is_found() {
        let network = MemoryNetwork::new();
        let mut host = network.join("terra", "Alice");
        host.start(DiscoveryMode::Browse).unwrap();

        let mut guest = network.join("terra", "Bob");
        guest.start(DiscoveryMode::Advertise).unwrap();

        assert_eq!(found(&host.poll_events()), vec!["Bob".to_string()]);
    }

    #[test]
    fn test_invitation_accept_connects_both_sides() {
        let network = MemoryNetwork::new();
        let mut host = network.join("terra", "Alice");
        let mut guest = network.join("terra", "Bob");

        host.invite(&guest.handle(), vec![], Duration::from_secs(10))
            .unwrap();

        let responder = guest
            .poll_events()
            .into_iter()
            .find_map(|event| match event {
                TransportEvent::InvitationReceived { responder, .. } => Some(responder),
                _ => None,
            })
            .unwrap();
        responder.respond(true);

        let host_states: Vec<ConnectionState> = host
            .poll_events()
            .into_iter()
            .filter_map(|event| match event {
                TransportEvent::StateChanged { state, .. } => Some(state),
                _ => None,
            })
            .collect();
        assert_eq!(
            host_states,
            vec![ConnectionState::Connecting, ConnectionState::Connected]
        );

        host.send(b"hi", &[guest.handle()], Delivery::Reliable)
            .unwrap();
        let received = guest.poll_events();
        assert!(received.iter().any(|event| matches!(
            event,
            TransportEvent::StateChanged { state: ConnectionState::Connected, .. }
        )));
        assert!(received
            .iter()
            .any(|event| matches!(event, TransportEvent::DataReceived { data, .. } if data == b"hi")));
    }

    #[test]
    fn test_invitation_times_out() {
        let network = MemoryNetwork::new();
        let mut host = network.join("terra", "Alice");
        let guest = network.join("terra", "Bob");

        host.invite(&guest.handle(), vec![], Duration::ZERO).unwrap();

        let states: Vec<ConnectionState> = host
            .poll_events()
            .into_iter()
            .filter_map(|event| match event {
                TransportEvent::StateChanged { state, .. } => Some(state),
                _ => None,
            })
            .collect();
        assert_eq!(
            states,
            vec![ConnectionState::Connecting, ConnectionState::NotConnected]
        );
    }

    #[test]
    fn test_send_requires_connection() {
        let network = MemoryNetwork::new();
        let mut host = network.join("terra", "Alice");
        let guest = network.join("terra", "Bob");

        let result = host.send(b"hi", &[guest.handle()], Delivery::Reliable);
        assert!(matches!(result, Err(SessionError::SendFailed(_))));
    }

    #[test]
    fn test_drop_notifies_browser() {
        let network = MemoryNetwork::new();
        let mut host = network.join("terra", "Alice");
        host.start(DiscoveryMode::Browse).unwrap();
        {
            let mut guest = network.join("terra", "Bob");
            guest.start(DiscoveryMode::Advertise).unwrap();
        }

        let events = host.poll_events();
        assert!(events
            .iter()
            .any(|event| matches!(event, TransportEvent::PeerLost { peer } if peer.as_str() == "Bob")));
        assert_eq!(network.endpoint_count(), 1);
    }
}
