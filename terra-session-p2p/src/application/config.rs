use crate::domain::Delivery;
use instant::Duration;

/// Default service type both peers must share to find each other
pub const DEFAULT_SERVICE_TYPE: &str = "terra-games";

/// Configuration for a peer session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Discovery namespace; peers only see others with the same service type
    pub service_type: String,

    /// Name announced to other peers (becomes their `PeerId` for us)
    pub display_name: String,

    /// Host browses and invites; guest advertises and accepts
    pub is_host: bool,

    /// How long an outgoing invitation may stay unanswered
    pub invite_timeout: Duration,

    /// Delivery quality used by `send_to_node`
    pub direct_delivery: Delivery,

    /// Remote peers the auto-pairing policy will pair with
    pub max_peers: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            service_type: DEFAULT_SERVICE_TYPE.to_string(),
            display_name: "player".to_string(),
            is_host: false,
            invite_timeout: Duration::from_secs(10),
            direct_delivery: Delivery::Unreliable,
            max_peers: 1,
        }
    }
}

impl SessionConfig {
    pub fn new(display_name: impl Into<String>, is_host: bool) -> Self {
        Self {
            display_name: display_name.into(),
            is_host,
            ..Default::default()
        }
    }

    pub fn host(display_name: impl Into<String>) -> Self {
        Self::new(display_name, true)
    }

    pub fn guest(display_name: impl Into<String>) -> Self {
        Self::new(display_name, false)
    }

    pub fn with_service_type(mut self, service_type: impl Into<String>) -> Self {
        self.service_type = service_type.into();
        self
    }

    pub fn with_invite_timeout(mut self, timeout: Duration) -> Self {
        self.invite_timeout = timeout;
        self
    }

    pub fn with_direct_delivery(mut self, delivery: Delivery) -> Self {
        self.direct_delivery = delivery;
        self
    }

    pub fn with_max_peers(mut self, max_peers: usize) -> Self {
        self.max_peers = max_peers;
        self
    }
}
