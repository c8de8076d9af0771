use cucumber::{then, when};
use terra_session_core::{Side, Vector2};
use terra_session_tests::MatchWorld;

fn side(role: &str) -> Side {
    match role {
        "host" => Side::Host,
        "guest" => Side::Guest,
        other => panic!("Unknown side '{}'", other),
    }
}

// ===== When Steps =====

#[when(expr = "{string} fires a projectile from \\({float}, {float}\\) with velocity \\({float}, {float}\\)")]
async fn fires(world: &mut MatchWorld, name: String, x: f64, y: f64, vx: f64, vy: f64) {
    let id = world
        .peer_mut(&name)
        .spawn_projectile(Vector2::new(x, y), Vector2::new(vx, vy));
    world.last_projectile.insert(name, id);
    world.settle();
}

#[when(expr = "{string} fires a projectile")]
async fn fires_default(world: &mut MatchWorld, name: String) {
    let id = world
        .peer_mut(&name)
        .spawn_projectile(Vector2::ZERO, Vector2::new(1.0, 0.0));
    world.last_projectile.insert(name, id);
    world.settle();
}

#[when(expr = "{string} despawns its projectile")]
async fn despawns(world: &mut MatchWorld, name: String) {
    let id = world.last_projectile(&name);
    world.peer_mut(&name).despawn_projectile(&id);
    world.settle();
}

#[when(expr = "{string} reports the loss of its base")]
async fn reports_loss(world: &mut MatchWorld, name: String) {
    world.peer_mut(&name).report_loss();
    world.settle();
}

// ===== Then Steps =====

#[then(expr = "{string} sees the projectile of {string} at \\({float}, {float}\\)")]
async fn sees_at(world: &mut MatchWorld, viewer: String, shooter: String, x: f64, y: f64) {
    let id = world.last_projectile(&shooter);
    let rendered = world
        .peer(&viewer)
        .renderer()
        .projectile(&id)
        .unwrap_or_else(|| panic!("{} does not see {}", viewer, id));
    assert_eq!(rendered.position, Vector2::new(x, y));
}

#[then(expr = "{string} sees the projectile of {string} owned by the {word}")]
async fn sees_owned_by(world: &mut MatchWorld, viewer: String, shooter: String, role: String) {
    let id = world.last_projectile(&shooter);
    let owner = world
        .peer(&viewer)
        .renderer()
        .projectile(&id)
        .map(|p| p.owner);
    assert_eq!(owner, Some(side(&role)));
}

#[then(expr = "{string} does not see the projectile of {string}")]
async fn does_not_see(world: &mut MatchWorld, viewer: String, shooter: String) {
    let id = world.last_projectile(&shooter);
    assert!(world.peer(&viewer).renderer().projectile(&id).is_none());
}

#[then(expr = "{string} has removed {int} projectile(s)")]
async fn removed_count(world: &mut MatchWorld, name: String, count: usize) {
    assert_eq!(world.peer(&name).renderer().removed.len(), count);
}

#[then(expr = "the game is over for {string}")]
async fn game_over_for(world: &mut MatchWorld, name: String) {
    let peer = world.peer(&name);
    assert!(peer.is_game_over());
    assert_eq!(peer.renderer().game_over_calls, 1);
}

#[then(expr = "the game is not over for {string}")]
async fn game_not_over_for(world: &mut MatchWorld, name: String) {
    assert!(!world.peer(&name).is_game_over());
}
