pub mod application;
pub mod domain;
pub mod traits;

pub use application::{ProjectileMirror, RenderCommand};
pub use domain::{CodecError, GameMessage, ProjectileId, Side, Vector2, WireMessage};
pub use traits::{GameRenderer, RecordingRenderer, RenderedProjectile};
