use crate::application::RenderCommand;
use crate::domain::{ProjectileId, Side, Vector2};
use std::collections::HashMap;

/// Game-side collaborator that draws the match.
///
/// Implemented by the consuming app (scene graph, console, test double).
pub trait GameRenderer {
    /// Show a projectile at `position` moving with `velocity`
    fn materialize_projectile(
        &mut self,
        position: Vector2,
        velocity: Vector2,
        owner: Side,
        id: ProjectileId,
    );

    /// Remove a projectile previously materialized
    fn remove_projectile(&mut self, id: &ProjectileId);

    /// End the match locally
    fn game_over(&mut self);

    /// Execute a command produced by the projectile mirror
    fn apply(&mut self, command: RenderCommand) {
        match command {
            RenderCommand::Materialize {
                id,
                position,
                velocity,
                owner,
            } => self.materialize_projectile(position, velocity, owner, id),
            RenderCommand::Remove { id } => self.remove_projectile(&id),
            RenderCommand::GameOver => self.game_over(),
        }
    }
}

/// A materialized projectile as seen by [`RecordingRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedProjectile {
    pub position: Vector2,
    pub velocity: Vector2,
    pub owner: Side,
}

/// Renderer that only records what it was asked to do
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    pub projectiles: HashMap<ProjectileId, RenderedProjectile>,
    pub materialized: Vec<ProjectileId>,
    pub removed: Vec<ProjectileId>,
    pub game_over_calls: usize,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projectile(&self, id: &ProjectileId) -> Option<&RenderedProjectile> {
        self.projectiles.get(id)
    }
}

impl GameRenderer for RecordingRenderer {
    fn materialize_projectile(
        &mut self,
        position: Vector2,
        velocity: Vector2,
        owner: Side,
        id: ProjectileId,
    ) {
        self.materialized.push(id.clone());
        self.projectiles.insert(
            id,
            RenderedProjectile {
                position,
                velocity,
                owner,
            },
        );
    }

    fn remove_projectile(&mut self, id: &ProjectileId) {
        self.projectiles.remove(id);
        self.removed.push(id.clone());
    }

    fn game_over(&mut self) {
        self.game_over_calls += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_dispatches_commands() {
        let mut renderer = RecordingRenderer::new();
        let id = ProjectileId::parse("p1").unwrap();

        renderer.apply(RenderCommand::Materialize {
            id: id.clone(),
            position: Vector2::new(1.0, 1.0),
            velocity: Vector2::ZERO,
            owner: Side::Guest,
        });
        assert_eq!(renderer.projectile(&id).unwrap().owner, Side::Guest);

        renderer.apply(RenderCommand::Remove { id: id.clone() });
        renderer.apply(RenderCommand::GameOver);

        assert!(renderer.projectile(&id).is_none());
        assert_eq!(renderer.removed, vec![id]);
        assert_eq!(renderer.game_over_calls, 1);
    }
}
