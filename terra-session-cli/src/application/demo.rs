use crate::application::ConsoleRenderer;
use crate::infrastructure::error::{CliError, Result};
use terra_session_core::{GameRenderer, Vector2};
use terra_session_p2p::{MatchLoop, MemoryNetwork, SessionConfig, Transport};
use tracing::info;

/// Outcome of an in-process demo match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoReport {
    pub volleys: usize,
    pub host_materialized: usize,
    pub guest_materialized: usize,
    pub host_live: usize,
    pub guest_live: usize,
    pub host_game_over: bool,
    pub guest_game_over: bool,
}

/// Play a scripted match between two peers on an in-memory network.
///
/// Each volley both sides fire one projectile, let it land on the other side,
/// then despawn it. The guest finally reports the loss of its base.
pub fn run_demo(service_type: &str, volleys: usize) -> Result<DemoReport> {
    let network = MemoryNetwork::new();
    let host_config = SessionConfig::host("Alice").with_service_type(service_type);
    let guest_config = SessionConfig::guest("Bob").with_service_type(service_type);

    let mut guest = MatchLoop::new(
        guest_config,
        network.join(service_type, "Bob"),
        ConsoleRenderer::new("Bob"),
    )?;
    let mut host = MatchLoop::new(
        host_config,
        network.join(service_type, "Alice"),
        ConsoleRenderer::new("Alice"),
    )?;

    settle(&mut host, &mut guest);
    if !host.is_paired() || !guest.is_paired() {
        return Err(CliError::P2PConnection(
            "Demo peers did not pair".to_string(),
        ));
    }
    info!("🤝 Alice and Bob are paired, starting {} volleys", volleys);

    for volley in 0..volleys {
        let spread = volley as f64;
        let host_shot =
            host.spawn_projectile(Vector2::new(0.0, 100.0), Vector2::new(5.0 + spread, 2.0));
        let guest_shot =
            guest.spawn_projectile(Vector2::new(400.0, 100.0), Vector2::new(-5.0 - spread, 2.0));
        settle(&mut host, &mut guest);

        host.despawn_projectile(&host_shot);
        guest.despawn_projectile(&guest_shot);
        settle(&mut host, &mut guest);
    }

    guest.report_loss();
    settle(&mut host, &mut guest);

    Ok(DemoReport {
        volleys,
        host_materialized: host.renderer().materialized,
        guest_materialized: guest.renderer().materialized,
        host_live: host.renderer().live_count(),
        guest_live: guest.renderer().live_count(),
        host_game_over: host.renderer().game_over,
        guest_game_over: guest.renderer().game_over,
    })
}

fn settle<T, R>(host: &mut MatchLoop<T, R>, guest: &mut MatchLoop<T, R>)
where
    T: Transport,
    R: GameRenderer,
{
    for _ in 0..16 {
        if host.poll() + guest.poll() == 0 {
            return;
        }
    }
}
