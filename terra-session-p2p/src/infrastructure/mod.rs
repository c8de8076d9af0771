pub mod error;
pub mod frame;
#[cfg(feature = "native")]
pub mod matchbox;
pub mod memory;
pub mod transport;

#[cfg(feature = "native")]
pub use matchbox::{MatchboxPeerId, MatchboxTransport};
pub use memory::{MemoryHandle, MemoryNetwork, MemoryTransport};
pub use transport::{DiscoveryMode, Transport, TransportEvent};
