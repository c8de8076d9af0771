use crate::application::config::SessionConfig;
use crate::application::delegate::SessionControl;
use crate::application::replication::ReplicationController;
use crate::application::session_manager::SessionManager;
use crate::infrastructure::error::Result;
use crate::infrastructure::transport::Transport;
use terra_session_core::{GameRenderer, ProjectileId, Vector2};

/// One peer's side of a match: the session wired to the replication layer.
///
/// Call [`poll`](MatchLoop::poll) regularly from the game loop.
pub struct MatchLoop<T: Transport, R: GameRenderer> {
    session: SessionManager<T>,
    replication: ReplicationController<R>,
}

impl<T: Transport, R: GameRenderer> MatchLoop<T, R> {
    pub fn new(config: SessionConfig, transport: T, renderer: R) -> Result<Self> {
        let replication = ReplicationController::for_config(renderer, &config);
        let session = SessionManager::new(config, transport)?;

        Ok(Self {
            session,
            replication,
        })
    }

    /// Process pending network events; returns how many were handled
    pub fn poll(&mut self) -> usize {
        let processed = self.session.dispatch(&mut self.replication);
        if processed > 0 {
            tracing::trace!("Processed {} session events", processed);
        }
        processed
    }

    pub fn spawn_projectile(&mut self, position: Vector2, velocity: Vector2) -> ProjectileId {
        let owner = self.replication.local_side();
        self.replication
            .notify_local_spawn(&mut self.session, position, velocity, owner)
    }

    pub fn despawn_projectile(&mut self, id: &ProjectileId) {
        self.replication.notify_local_despawn(&mut self.session, id);
    }

    pub fn report_loss(&mut self) {
        self.replication.notify_local_loss(&mut self.session);
    }

    pub fn is_paired(&self) -> bool {
        !self.session.connected_peers().is_empty()
    }

    pub fn is_game_over(&self) -> bool {
        self.replication.is_game_over()
    }

    pub fn session(&self) -> &SessionManager<T> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionManager<T> {
        &mut self.session
    }

    pub fn replication(&self) -> &ReplicationController<R> {
        &self.replication
    }

    pub fn renderer(&self) -> &R {
        self.replication.renderer()
    }
}
