use crate::domain::PeerId;

/// Session layer errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{operation} is not allowed for this role")]
    RoleViolation { operation: &'static str },

    #[error("Unknown peer: {0}")]
    UnknownPeer(PeerId),

    #[error("Peer not connected: {0}")]
    NotConnected(PeerId),

    #[error("No pending invitation from {0}")]
    NoPendingInvitation(PeerId),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
