mod config;
mod delegate;
mod match_loop;
mod replication;
mod session_manager;

pub use config::{SessionConfig, DEFAULT_SERVICE_TYPE};
pub use delegate::{SessionControl, SessionDelegate};
pub use match_loop::MatchLoop;
pub use replication::ReplicationController;
pub use session_manager::SessionManager;
