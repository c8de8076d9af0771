use serde::{Deserialize, Serialize};

/// Delivery quality requested when sending data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Delivery {
    /// Ordered, retransmitted
    Reliable,
    /// Best effort, may be dropped or reordered
    Unreliable,
}

impl Delivery {
    /// Data channel index used by channel-based transports
    pub fn channel(self) -> usize {
        match self {
            Delivery::Reliable => 0,
            Delivery::Unreliable => 1,
        }
    }
}
