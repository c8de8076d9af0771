#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("P2P connection failed: {0}")]
    P2PConnection(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

impl From<terra_session_p2p::SessionError> for CliError {
    fn from(e: terra_session_p2p::SessionError) -> Self {
        CliError::P2PConnection(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
