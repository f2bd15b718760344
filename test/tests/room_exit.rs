/// Integration tests for the room exit sequence
///
/// Exit announces this peer's departure, clears every registry, closes the
/// realtime channel, waits, closes the signaling channel, waits again and
/// only then reports the room closed.
use std::time::{Duration, Instant};

use vrsync_client::{RoomConfig, RoomError, RoomEvent, SessionPhase, TransportError};
use vrsync_shared::{
    Address64, AnimatorReplica, ChannelKind, ElementRef, SpawnState, Transform, TransformReplica,
    WorldEvent,
};
use vrsync_test::{enter_room, init_logger, settle, LocalNetwork, TestPeer};

const HOST: u32 = 1;
const GUEST: u32 = 2;

fn config() -> RoomConfig {
    RoomConfig::default().tick_interval(Duration::ZERO)
}

fn two_peers(network: &LocalNetwork) -> (TestPeer, TestPeer) {
    let host = enter_room(network, config(), HOST, "lobby", None).unwrap();
    let guest = enter_room(network, config(), GUEST, "lobby", None).unwrap();
    (host, guest)
}

/// Three transforms, one animator and `spawns` spawned cubes on the host
fn populate(host: &mut TestPeer, spawns: usize) -> Vec<Address64> {
    let world = host.world_mut();
    for n in 0..3u64 {
        world
            .transforms_mut()
            .register(Address64::from_u64(n), TransformReplica::new(HOST, Transform::IDENTITY));
    }
    world
        .animators_mut()
        .register(Address64::from_u64(10), AnimatorReplica::new(HOST));
    (0..spawns)
        .map(|_| {
            world
                .spawn(ElementRef::Index(0), HOST, Transform::IDENTITY, true)
                .unwrap()
        })
        .collect()
}

#[test]
fn exit_clears_every_registry() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, _guest) = two_peers(&network);
    let spawned = populate(&mut host, 4);
    assert_eq!(host.world().entity_count(), 8);

    host.exit(Instant::now());

    assert_eq!(host.world().entity_count(), 0);
    assert!(host.world().transforms().is_empty());
    assert!(host.world().animators().is_empty());
    assert!(host.world().spawner().is_empty());
    assert_eq!(host.handler_count(), 0);
    assert_eq!(host.world().instantiator().live(), 0);
    for address in spawned {
        assert!(host.world().instantiator().disposed.contains(&address));
    }
}

#[test]
fn channels_close_in_order_after_grace_intervals() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, _guest) = two_peers(&network);
    let now = Instant::now();

    let events = host.exit(now);
    assert_eq!(events, vec![RoomEvent::ExitStarted, RoomEvent::RealtimeClosed]);
    assert_eq!(network.closures(HOST), vec![ChannelKind::Unordered]);
    assert_eq!(host.exit_remaining(now), Some(Duration::from_millis(1000)));

    // still inside the realtime grace interval
    assert!(host.tick(now + Duration::from_millis(499)).unwrap().is_empty());
    assert_eq!(network.closures(HOST), vec![ChannelKind::Unordered]);

    let events = host.tick(now + Duration::from_millis(500)).unwrap();
    assert_eq!(events, vec![RoomEvent::SignalingClosed]);
    assert_eq!(
        network.closures(HOST),
        vec![ChannelKind::Unordered, ChannelKind::Reliable]
    );
    assert!(matches!(host.phase(), SessionPhase::SignalingGrace { .. }));

    assert!(host.tick(now + Duration::from_millis(999)).unwrap().is_empty());
    let events = host.tick(now + Duration::from_millis(1000)).unwrap();
    assert_eq!(events, vec![RoomEvent::Closed]);
    assert!(host.is_closed());
    assert_eq!(host.exit_remaining(now + Duration::from_millis(1000)), None);
}

#[test]
fn late_tick_finishes_the_whole_sequence() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, _guest) = two_peers(&network);
    let now = Instant::now();

    host.exit(now);
    let events = host.tick(now + Duration::from_secs(5)).unwrap();

    assert_eq!(events, vec![RoomEvent::SignalingClosed, RoomEvent::Closed]);
    assert!(host.is_closed());
}

#[test]
fn zero_grace_closes_immediately() {
    init_logger();
    let network = LocalNetwork::new();
    let config = config()
        .realtime_close_grace(Duration::ZERO)
        .signaling_close_grace(Duration::ZERO);
    let mut host = enter_room(&network, config, HOST, "lobby", None).unwrap();

    let events = host.exit(Instant::now());

    assert_eq!(
        events,
        vec![
            RoomEvent::ExitStarted,
            RoomEvent::RealtimeClosed,
            RoomEvent::SignalingClosed,
            RoomEvent::Closed,
        ]
    );
}

#[test]
fn exit_is_announced_before_channels_close() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, mut guest) = two_peers(&network);
    let now = Instant::now();
    let spawned = populate(&mut host, 2);
    settle(&mut [&mut host, &mut guest], now);
    assert_eq!(guest.world().spawner().len(), 2);

    host.exit(now);
    let events = guest.tick(now).unwrap();

    for address in &spawned {
        assert_eq!(guest.world().spawner().state(address), SpawnState::Destroyed);
        assert!(events.contains(&RoomEvent::World(WorldEvent::Destroyed { address: *address })));
    }
    assert!(events.contains(&RoomEvent::World(WorldEvent::PeerLeft { user: HOST })));
}

#[test]
fn exit_twice_changes_nothing() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, _guest) = two_peers(&network);
    let now = Instant::now();

    host.exit(now);
    assert!(host.exit(now).is_empty());
    assert_eq!(network.closures(HOST), vec![ChannelKind::Unordered]);
}

#[test]
fn frames_during_exit_are_not_dispatched() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, mut guest) = two_peers(&network);
    let now = Instant::now();

    host.exit(now);
    guest
        .world_mut()
        .spawn(ElementRef::Index(0), GUEST, Transform::IDENTITY, true)
        .unwrap();
    guest.tick(now).unwrap();

    host.tick(now + Duration::from_millis(10)).unwrap();
    assert_eq!(host.world().entity_count(), 0);
    assert!(host.world().instantiator().instantiated.is_empty());
}

#[test]
fn transport_failure_runs_the_exit_sequence() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, _guest) = two_peers(&network);
    populate(&mut host, 1);
    let now = Instant::now();

    network.fail(HOST, ChannelKind::Unordered);
    let result = host.tick(now);

    assert_eq!(
        result,
        Err(RoomError::Transport(TransportError::ChannelClosed {
            channel: ChannelKind::Unordered
        }))
    );
    assert_eq!(host.world().entity_count(), 0);
    assert_eq!(host.handler_count(), 0);
    assert!(matches!(host.phase(), SessionPhase::RealtimeGrace { .. }));

    let events = host.tick(now).unwrap();
    assert_eq!(events, vec![RoomEvent::ExitStarted, RoomEvent::RealtimeClosed]);

    let events = host.tick(now + Duration::from_secs(2)).unwrap();
    assert_eq!(events, vec![RoomEvent::SignalingClosed, RoomEvent::Closed]);
}
