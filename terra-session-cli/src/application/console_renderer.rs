use std::collections::HashMap;
use terra_session_core::{GameRenderer, ProjectileId, Side, Vector2};
use tracing::info;

/// Renderer that narrates the match in the log
#[derive(Debug)]
pub struct ConsoleRenderer {
    label: String,
    live: HashMap<ProjectileId, Side>,
    pub materialized: usize,
    pub removed: usize,
    pub game_over: bool,
}

impl ConsoleRenderer {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            live: HashMap::new(),
            materialized: 0,
            removed: 0,
            game_over: false,
        }
    }

    /// Projectiles currently on screen
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl GameRenderer for ConsoleRenderer {
    fn materialize_projectile(
        &mut self,
        position: Vector2,
        velocity: Vector2,
        owner: Side,
        id: ProjectileId,
    ) {
        info!(
            "🎯 [{}] incoming {} projectile {} at {} moving {}",
            self.label, owner, id, position, velocity
        );
        self.live.insert(id, owner);
        self.materialized += 1;
    }

    fn remove_projectile(&mut self, id: &ProjectileId) {
        if self.live.remove(id).is_some() {
            info!("💨 [{}] projectile {} gone", self.label, id);
            self.removed += 1;
        }
    }

    fn game_over(&mut self) {
        info!("🏁 [{}] game over", self.label);
        self.game_over = true;
    }
}
