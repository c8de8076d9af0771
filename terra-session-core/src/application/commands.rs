use crate::domain::{ProjectileId, Side, Vector2};

/// Commands emitted towards the renderer when remote game events are applied
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Show a projectile fired by the opponent
    Materialize {
        id: ProjectileId,
        position: Vector2,
        velocity: Vector2,
        owner: Side,
    },

    /// Remove a mirrored projectile
    Remove { id: ProjectileId },

    /// The match has ended
    GameOver,
}
