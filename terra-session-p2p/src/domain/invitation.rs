use crate::domain::PeerId;
use instant::Instant;
use std::collections::HashMap;
use std::fmt;

/// One-shot callback that answers an incoming invitation.
///
/// Consumed by [`InvitationResponder::respond`], so it can fire at most once.
pub struct InvitationResponder(Box<dyn FnOnce(bool) + Send>);

impl InvitationResponder {
    pub fn new(respond: impl FnOnce(bool) + Send + 'static) -> Self {
        Self(Box::new(respond))
    }

    pub fn respond(self, accept: bool) {
        (self.0)(accept)
    }
}

impl fmt::Debug for InvitationResponder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InvitationResponder(..)")
    }
}

/// An invitation received from a peer and not answered yet
#[derive(Debug)]
pub struct PendingInvitation {
    pub peer_id: PeerId,
    /// Opaque bytes supplied by the inviter
    pub context: Vec<u8>,
    pub received_at: Instant,
    responder: InvitationResponder,
}

impl PendingInvitation {
    pub fn new(peer_id: PeerId, context: Vec<u8>, responder: InvitationResponder) -> Self {
        Self {
            peer_id,
            context,
            received_at: Instant::now(),
            responder,
        }
    }

    /// Answer the invitation, consuming it
    pub fn resolve(self, accept: bool) {
        self.responder.respond(accept)
    }
}

/// Pending invitations keyed by the inviting peer
#[derive(Debug, Default)]
pub struct InvitationTable {
    pending: HashMap<PeerId, PendingInvitation>,
}

impl InvitationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an invitation; returns the one it replaces, if any
    pub fn insert(&mut self, invitation: PendingInvitation) -> Option<PendingInvitation> {
        self.pending.insert(invitation.peer_id.clone(), invitation)
    }

    /// Remove the invitation from `peer_id` so it can be resolved
    pub fn take(&mut self, peer_id: &PeerId) -> Option<PendingInvitation> {
        self.pending.remove(peer_id)
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.pending.contains_key(peer_id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_responder(calls: Arc<AtomicUsize>) -> InvitationResponder {
        InvitationResponder::new(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_take_resolves_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut table = InvitationTable::new();
        let alice = PeerId::new("Alice");

        table.insert(PendingInvitation::new(
            alice.clone(),
            vec![1, 2],
            counting_responder(calls.clone()),
        ));
        assert!(table.contains(&alice));

        let invitation = table.take(&alice).unwrap();
        assert_eq!(invitation.context, vec![1, 2]);
        invitation.resolve(true);

        assert!(table.take(&alice).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_insert_returns_superseded() {
        let mut table = InvitationTable::new();
        let alice = PeerId::new("Alice");
        let noop = || InvitationResponder::new(|_| {});

        assert!(table
            .insert(PendingInvitation::new(alice.clone(), vec![1], noop()))
            .is_none());
        let old = table
            .insert(PendingInvitation::new(alice.clone(), vec![2], noop()))
            .unwrap();

        assert_eq!(old.context, vec![1]);
        assert_eq!(table.len(), 1);
    }
}
