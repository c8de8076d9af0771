// Domain layer (core)
pub mod domain;

// Application layer (use cases)
pub mod application;

// Infrastructure layer (adapters)
pub mod infrastructure;

// Re-exports for convenience
pub use application::{
    MatchLoop, ReplicationController, SessionConfig, SessionControl, SessionDelegate,
    SessionManager,
};
pub use domain::{ConnectionState, Delivery, PeerId, PeerRecord};
pub use infrastructure::error::{Result, SessionError};
#[cfg(feature = "native")]
pub use infrastructure::MatchboxTransport;
pub use infrastructure::{
    DiscoveryMode, MemoryHandle, MemoryNetwork, MemoryTransport, Transport, TransportEvent,
};
