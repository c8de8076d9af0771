use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain entity: identifier of a remote node, stable for the lifetime of the session.
///
/// This is the display name the node announced when it was discovered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PeerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_id_display() {
        let peer_id = PeerId::new("Alice");
        assert_eq!(peer_id.to_string(), "Alice");
        assert_eq!(peer_id.as_str(), "Alice");
    }

    #[test]
    fn test_peer_id_equality() {
        let id1 = PeerId::from("Alice");
        let id2 = PeerId::from("Alice".to_string());
        let id3 = PeerId::from("Bob");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_peer_id_serialization() {
        let peer = PeerId::new("Alice");

        let json = serde_json::to_string(&peer).unwrap();
        let deserialized: PeerId = serde_json::from_str(&json).unwrap();

        assert_eq!(json, "\"Alice\"");
        assert_eq!(peer, deserialized);
    }
}
