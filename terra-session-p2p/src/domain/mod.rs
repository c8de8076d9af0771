mod delivery;
mod invitation;
mod peer;
mod peer_record;

pub use delivery::Delivery;
pub use invitation::{InvitationResponder, InvitationTable, PendingInvitation};
pub use peer::PeerId;
pub use peer_record::{ConnectionState, PeerRecord, PeerTable};
