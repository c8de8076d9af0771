use crate::application::RenderCommand;
use crate::domain::{GameMessage, ProjectileId, Side};
use std::collections::HashSet;
use tracing::debug;

/// Local view of the projectiles in play.
///
/// Applying messages is idempotent: a repeated spawn or despawn is a no-op,
/// and a despawn that arrives before its spawn leaves a tombstone so the late
/// spawn is suppressed. A remote despawn also removes projectiles we fired
/// ourselves. Once the match is over every message is ignored and the
/// bookkeeping is dropped.
#[derive(Debug, Clone)]
pub struct ProjectileMirror {
    local_side: Side,
    mirrored: HashSet<ProjectileId>,
    /// Projectiles fired by this peer and still in play
    owned: HashSet<ProjectileId>,
    retired: HashSet<ProjectileId>,
    game_over: bool,
}

impl ProjectileMirror {
    pub fn new(local_side: Side) -> Self {
        Self {
            local_side,
            mirrored: HashSet::new(),
            owned: HashSet::new(),
            retired: HashSet::new(),
            game_over: false,
        }
    }

    pub fn local_side(&self) -> Side {
        self.local_side
    }

    /// Apply a remote message and return what the renderer has to do
    pub fn apply(&mut self, message: GameMessage) -> Vec<RenderCommand> {
        if self.game_over {
            debug!("Match already over, ignoring {}", message.kind());
            return Vec::new();
        }

        match message {
            GameMessage::Loss => {
                self.end_match();
                vec![RenderCommand::GameOver]
            }

            GameMessage::Despawn { id } => {
                if self.mirrored.remove(&id) || self.owned.remove(&id) {
                    self.retired.insert(id.clone());
                    vec![RenderCommand::Remove { id }]
                } else {
                    if self.retired.insert(id.clone()) {
                        debug!("Despawn for unknown projectile {}, keeping tombstone", id);
                    }
                    Vec::new()
                }
            }

            GameMessage::Spawn {
                id,
                position,
                velocity,
            } => {
                if self.retired.contains(&id)
                    || self.mirrored.contains(&id)
                    || self.owned.contains(&id)
                {
                    debug!("Ignoring spawn for {} (already seen)", id);
                    return Vec::new();
                }
                self.mirrored.insert(id.clone());
                vec![RenderCommand::Materialize {
                    id,
                    position,
                    velocity,
                    owner: self.local_side.opponent(),
                }]
            }
        }
    }

    /// Remember a projectile fired by this peer so a remote despawn can remove it
    pub fn track_local(&mut self, id: ProjectileId) {
        if !self.game_over {
            self.owned.insert(id);
        }
    }

    /// Forget a projectile for good. Returns true if it was still in play.
    pub fn retire(&mut self, id: &ProjectileId) -> bool {
        if !self.game_over {
            self.retired.insert(id.clone());
        }
        let owned = self.owned.remove(id);
        self.mirrored.remove(id) || owned
    }

    /// Returns true the first time only
    pub fn mark_game_over(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        self.end_match();
        true
    }

    fn end_match(&mut self) {
        self.game_over = true;
        self.owned.clear();
        self.retired.clear();
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn contains(&self, id: &ProjectileId) -> bool {
        self.mirrored.contains(id)
    }

    pub fn is_owned(&self, id: &ProjectileId) -> bool {
        self.owned.contains(id)
    }

    /// Despawned ids remembered to suppress late spawns
    pub fn tombstone_count(&self) -> usize {
        self.retired.len()
    }

    pub fn len(&self) -> usize {
        self.mirrored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mirrored.is_empty()
    }
}
