use crate::application::ConsoleRenderer;
use crate::infrastructure::error::{CliError, Result};
use std::time::Duration;
use terra_session_core::{ProjectileId, Vector2};
use terra_session_p2p::{MatchLoop, MatchboxTransport, SessionConfig};
use tracing::info;

/// Settings for a match played over a matchbox signalling server
#[derive(Debug, Clone)]
pub struct OnlineOptions {
    pub server: String,
    pub service_type: String,
    pub name: String,
    pub is_host: bool,
    pub invite_timeout: Duration,
    /// Time between automatic volleys once paired
    pub volley_interval: Duration,
    /// Report the loss of our base after this many volleys
    pub lose_after: Option<usize>,
}

impl OnlineOptions {
    pub fn session_config(&self) -> Result<SessionConfig> {
        if self.name.trim().is_empty() {
            return Err(CliError::InvalidConfig(
                "Display name cannot be empty".to_string(),
            ));
        }
        if self.service_type.trim().is_empty() {
            return Err(CliError::InvalidConfig(
                "Service type cannot be empty".to_string(),
            ));
        }
        if self.volley_interval.is_zero() {
            return Err(CliError::InvalidConfig(
                "Volley interval must be positive".to_string(),
            ));
        }

        Ok(SessionConfig::new(self.name.clone(), self.is_host)
            .with_service_type(self.service_type.clone())
            .with_invite_timeout(self.invite_timeout))
    }
}

pub async fn run_online(options: OnlineOptions) -> Result<()> {
    let config = options.session_config()?;

    let transport =
        MatchboxTransport::connect(&options.server, &options.service_type, &options.name).await?;
    let mut match_loop =
        MatchLoop::new(config, transport, ConsoleRenderer::new(options.name.clone()))?;

    info!(
        "{} Waiting for {}...",
        if options.is_host { "🔍" } else { "📣" },
        if options.is_host { "a guest" } else { "an invitation" }
    );
    info!("Press Ctrl+C to exit");

    let mut poll = tokio::time::interval(Duration::from_millis(50));
    let mut volley = tokio::time::interval(options.volley_interval);
    let mut in_flight: Vec<ProjectileId> = Vec::new();
    let mut fired = 0usize;

    loop {
        tokio::select! {
            _ = poll.tick() => {
                match_loop.poll();
                if match_loop.is_game_over() {
                    info!("Match finished after {} volleys", fired);
                    break;
                }
            }
            _ = volley.tick() => {
                if !match_loop.is_paired() || match_loop.is_game_over() {
                    continue;
                }

                for id in in_flight.drain(..) {
                    match_loop.despawn_projectile(&id);
                }

                let direction = if options.is_host { 1.0 } else { -1.0 };
                let id = match_loop.spawn_projectile(
                    Vector2::new(0.0, 100.0),
                    Vector2::new(direction * 5.0, 2.0),
                );
                in_flight.push(id);
                fired += 1;

                if options.lose_after == Some(fired) {
                    info!("💥 Our base is destroyed");
                    match_loop.report_loss();
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("");
                info!("Shutting down...");
                break;
            }
        }
    }

    // let the data channels flush the last messages
    tokio::time::sleep(Duration::from_millis(500)).await;
    Ok(())
}
