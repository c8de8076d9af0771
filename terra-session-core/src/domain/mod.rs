pub mod message;
pub mod projectile;
pub mod wire;

pub use message::GameMessage;
pub use projectile::{ProjectileId, Side, Vector2};
pub use wire::{CodecError, WireMessage, LOSS_EVENT, WIRE_VERSION};
