use cucumber::{given, then, when};
use terra_session_p2p::{ConnectionState, PeerId, SessionConfig, SessionControl};
use terra_session_tests::MatchWorld;

// ===== Given Steps =====

#[given(expr = "a host {string}")]
async fn a_host(world: &mut MatchWorld, name: String) {
    world.join(SessionConfig::host(name));
}

#[given(expr = "a guest {string}")]
async fn a_guest(world: &mut MatchWorld, name: String) {
    world.join(SessionConfig::guest(name));
}

#[given(expr = "a host {string} accepting {int} guests")]
async fn a_host_with_capacity(world: &mut MatchWorld, name: String, capacity: usize) {
    world.join(SessionConfig::host(name).with_max_peers(capacity));
}

#[given(expr = "{string} and {string} are paired")]
async fn already_paired(world: &mut MatchWorld, host: String, guest: String) {
    world.join(SessionConfig::host(host.clone()));
    world.join(SessionConfig::guest(guest.clone()));
    world.settle();
    assert!(world.peer(&host).is_paired(), "{} should be paired", host);
    assert!(world.peer(&guest).is_paired(), "{} should be paired", guest);
}

// ===== When Steps =====

#[when("the peers exchange messages")]
async fn exchange(world: &mut MatchWorld) {
    world.settle();
}

#[when(expr = "the link between {string} and {string} drops")]
async fn link_drops(world: &mut MatchWorld, a: String, b: String) {
    world.network.disconnect(&a, &b);
    world.settle();
}

#[when(expr = "{string} leaves")]
async fn peer_leaves(world: &mut MatchWorld, name: String) {
    world.peers.remove(&name);
    world.settle();
}

// ===== Then Steps =====

#[then(expr = "{string} is connected to {string}")]
async fn is_connected_to(world: &mut MatchWorld, name: String, other: String) {
    let state = world
        .peer(&name)
        .session()
        .connection_state(&PeerId::new(other.as_str()));
    assert_eq!(state, Some(ConnectionState::Connected));
}

#[then(expr = "{string} is not connected to {string}")]
async fn is_not_connected_to(world: &mut MatchWorld, name: String, other: String) {
    let state = world
        .peer(&name)
        .session()
        .connection_state(&PeerId::new(other.as_str()));
    assert_ne!(state, Some(ConnectionState::Connected));
}

#[then(expr = "{string} is paired")]
async fn is_paired(world: &mut MatchWorld, name: String) {
    assert!(world.peer(&name).is_paired(), "{} should be paired", name);
}

#[then(expr = "{string} is not paired")]
async fn is_not_paired(world: &mut MatchWorld, name: String) {
    assert!(!world.peer(&name).is_paired(), "{} should not be paired", name);
}

#[then(expr = "{string} has {int} connected peer(s)")]
async fn connected_count(world: &mut MatchWorld, name: String, count: usize) {
    assert_eq!(world.peer(&name).session().connected_peers().len(), count);
}
