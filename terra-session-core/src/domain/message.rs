use crate::domain::projectile::{ProjectileId, Vector2};
use crate::domain::wire::{
    CodecError, WireMessage, KEY_EVENT, KEY_ID, KEY_KIND, KEY_POSITION_X, KEY_POSITION_Y,
    KEY_VELOCITY_X, KEY_VELOCITY_Y, KEY_VERSION, LOSS_EVENT, WIRE_VERSION,
};

const KIND_SPAWN: &str = "spawn";
const KIND_DESPAWN: &str = "despawn";
const KIND_LOSS: &str = "loss";

/// Game event exchanged between the two peers of a match
#[derive(Debug, Clone, PartialEq)]
pub enum GameMessage {
    /// A projectile was fired by the sender
    Spawn {
        id: ProjectileId,
        position: Vector2,
        velocity: Vector2,
    },

    /// A projectile owned by the sender left play
    Despawn { id: ProjectileId },

    /// The sender's base was destroyed
    Loss,
}

impl GameMessage {
    pub fn spawn(id: ProjectileId, position: Vector2, velocity: Vector2) -> Self {
        Self::Spawn {
            id,
            position,
            velocity,
        }
    }

    pub fn despawn(id: ProjectileId) -> Self {
        Self::Despawn { id }
    }

    /// Tag written to the `kind` key
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Spawn { .. } => KIND_SPAWN,
            Self::Despawn { .. } => KIND_DESPAWN,
            Self::Loss => KIND_LOSS,
        }
    }

    /// Projectile this message refers to, if any
    pub fn projectile_id(&self) -> Option<&ProjectileId> {
        match self {
            Self::Spawn { id, .. } | Self::Despawn { id } => Some(id),
            Self::Loss => None,
        }
    }

    /// Flatten into the string-keyed wire record.
    ///
    /// Besides the legacy keys, every message carries `kind` and `version`.
    pub fn to_wire(&self) -> WireMessage {
        let wire = WireMessage::new()
            .with(KEY_KIND, self.kind())
            .with(KEY_VERSION, WIRE_VERSION);

        match self {
            Self::Spawn {
                id,
                position,
                velocity,
            } => wire
                .with(KEY_POSITION_X, position.x.to_string())
                .with(KEY_POSITION_Y, position.y.to_string())
                .with(KEY_VELOCITY_X, velocity.x.to_string())
                .with(KEY_VELOCITY_Y, velocity.y.to_string())
                .with(KEY_ID, id.as_str()),
            Self::Despawn { id } => wire.with(KEY_ID, id.as_str()),
            Self::Loss => wire.with(KEY_EVENT, LOSS_EVENT),
        }
    }

    /// Interpret a wire record.
    ///
    /// A loss event wins over every other key. Tagged records are decoded by
    /// `kind`; untagged records are recognised by their key set: `id` alone
    /// is a despawn, the five spawn keys are a spawn.
    pub fn from_wire(wire: &WireMessage) -> Result<Self, CodecError> {
        if let Some(version) = wire.get(KEY_VERSION) {
            if version != WIRE_VERSION {
                return Err(CodecError::UnsupportedVersion(version.to_string()));
            }
        }

        if wire.get(KEY_EVENT) == Some(LOSS_EVENT) {
            return Ok(Self::Loss);
        }

        match wire.get(KEY_KIND) {
            Some(KIND_SPAWN) => Self::spawn_from(wire),
            Some(KIND_DESPAWN) => Self::despawn_from(wire),
            Some(KIND_LOSS) => Ok(Self::Loss),
            Some(other) => Err(CodecError::UnknownKind(other.to_string())),
            None => Self::from_legacy_shape(wire),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        self.to_wire().to_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let wire = WireMessage::from_bytes(bytes)?;
        Self::from_wire(&wire)
    }

    fn from_legacy_shape(wire: &WireMessage) -> Result<Self, CodecError> {
        let payload_keys: Vec<&str> = wire.keys().filter(|key| *key != KEY_VERSION).collect();

        if payload_keys == [KEY_ID] {
            return Self::despawn_from(wire);
        }

        let spawn_keys = [
            KEY_POSITION_X,
            KEY_POSITION_Y,
            KEY_VELOCITY_X,
            KEY_VELOCITY_Y,
            KEY_ID,
        ];
        if spawn_keys.iter().all(|key| wire.contains(key)) {
            return Self::spawn_from(wire);
        }

        Err(CodecError::UnrecognizedShape {
            keys: wire.keys().map(str::to_string).collect(),
        })
    }

    fn spawn_from(wire: &WireMessage) -> Result<Self, CodecError> {
        let id = Self::id_from(wire)?;
        let position = Vector2::new(wire.number(KEY_POSITION_X)?, wire.number(KEY_POSITION_Y)?);
        let velocity = Vector2::new(wire.number(KEY_VELOCITY_X)?, wire.number(KEY_VELOCITY_Y)?);
        Ok(Self::spawn(id, position, velocity))
    }

    fn despawn_from(wire: &WireMessage) -> Result<Self, CodecError> {
        Ok(Self::despawn(Self::id_from(wire)?))
    }

    fn id_from(wire: &WireMessage) -> Result<ProjectileId, CodecError> {
        let raw = wire.get(KEY_ID).ok_or(CodecError::MissingField(KEY_ID))?;
        ProjectileId::parse(raw)
    }
}
