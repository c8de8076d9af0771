use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::CodecError;

/// Identifier of a projectile, assigned by the peer that fired it.
///
/// The spawning peer is authoritative for the id; the receiving peer only
/// mirrors it so that a later despawn can be correlated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(String);

impl ProjectileId {
    /// Generate a fresh, unique id
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accept an id received from a remote peer (any non-empty token)
    pub fn parse(raw: &str) -> Result<Self, CodecError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CodecError::InvalidId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProjectileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProjectileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which base a projectile belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The base of the peer that browses and invites
    Host,
    /// The base of the peer that advertises and accepts
    Guest,
}

impl Side {
    /// Local side for a peer with the given role
    pub fn for_role(is_host: bool) -> Self {
        if is_host {
            Side::Host
        } else {
            Side::Guest
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Side::Host => Side::Guest,
            Side::Guest => Side::Host,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Host => write!(f, "Host"),
            Side::Guest => write!(f, "Guest"),
        }
    }
}

/// 2D vector used for positions and velocities
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
