/// Integration tests for ownership-gated replication between peers
///
/// Only the owner of an entity may author its state. Updates from anyone
/// else are dropped on receipt, and non-owners never push.
use std::time::{Duration, Instant};

use vrsync_client::RoomConfig;
use vrsync_shared::{
    parameter_id, Address64, AnimatorReplica, AnimatorValue, Replicated, Transform,
    TransformReplica, Vec3, WorldEvent,
};
use vrsync_test::{enter_room, init_logger, settle, LocalNetwork, TestPeer};

const HOST: u32 = 1;
const GUEST: u32 = 2;

fn scene_object() -> Address64 {
    Address64::from_u64(0x5C3E_0000_0000_0001)
}

fn config() -> RoomConfig {
    RoomConfig::default().tick_interval(Duration::ZERO)
}

fn two_peers(network: &LocalNetwork) -> (TestPeer, TestPeer) {
    let host = enter_room(network, config(), HOST, "lobby", None).unwrap();
    let guest = enter_room(network, config(), GUEST, "lobby", None).unwrap();
    (host, guest)
}

/// Both peers know the same scene object, owned by the host
fn register_transform(host: &mut TestPeer, guest: &mut TestPeer) {
    for peer in [host, guest] {
        assert!(peer
            .world_mut()
            .transforms_mut()
            .register(scene_object(), TransformReplica::new(HOST, Transform::IDENTITY)));
    }
}

fn position_of(peer: &TestPeer) -> Vec3 {
    peer.world()
        .transforms()
        .get(&scene_object())
        .unwrap()
        .transform()
        .position
}

#[test]
fn owner_transform_reaches_other_peer() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, mut guest) = two_peers(&network);
    register_transform(&mut host, &mut guest);

    let moved = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
    host.world_mut()
        .transforms_mut()
        .get_mut(&scene_object())
        .unwrap()
        .set_transform(moved);

    settle(&mut [&mut host, &mut guest], Instant::now());

    assert_eq!(position_of(&guest), Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn non_owner_never_pushes() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, mut guest) = two_peers(&network);
    register_transform(&mut host, &mut guest);

    guest
        .world_mut()
        .transforms_mut()
        .get_mut(&scene_object())
        .unwrap()
        .set_transform(Transform::from_position(Vec3::splat(9.0)));

    settle(&mut [&mut host, &mut guest], Instant::now());

    assert_eq!(network.sent_by(GUEST), 0);
    assert_eq!(position_of(&host), Vec3::ZERO);
}

#[test]
fn sync_disabled_transform_is_not_pushed() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, mut guest) = two_peers(&network);
    register_transform(&mut host, &mut guest);

    let replica = host
        .world_mut()
        .transforms_mut()
        .get_mut(&scene_object())
        .unwrap();
    replica.set_sync(false);
    replica.set_transform(Transform::from_position(Vec3::X));

    settle(&mut [&mut host, &mut guest], Instant::now());

    assert_eq!(network.sent_by(HOST), 0);
    assert_eq!(position_of(&guest), Vec3::ZERO);
}

#[test]
fn lost_realtime_frames_heal_on_next_push() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, mut guest) = two_peers(&network);
    register_transform(&mut host, &mut guest);
    host.world_mut()
        .transforms_mut()
        .get_mut(&scene_object())
        .unwrap()
        .set_transform(Transform::from_position(Vec3::Y));

    let now = Instant::now();
    network.set_drop_unordered(true);
    settle(&mut [&mut host, &mut guest], now);
    assert_eq!(position_of(&guest), Vec3::ZERO);

    network.set_drop_unordered(false);
    settle(&mut [&mut host, &mut guest], now + Duration::from_millis(50));
    assert_eq!(position_of(&guest), Vec3::Y);
}

#[test]
fn ownership_transfer_moves_authority() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, mut guest) = two_peers(&network);
    register_transform(&mut host, &mut guest);
    let now = Instant::now();

    assert!(host
        .world_mut()
        .transfer_transform(&scene_object(), GUEST)
        .unwrap());
    let events = settle(&mut [&mut host, &mut guest], now);

    assert!(events[1].iter().any(|event| matches!(
        event,
        vrsync_client::RoomEvent::World(WorldEvent::OwnershipChanged { owner: GUEST, .. })
    )));
    assert_eq!(
        guest.world().transforms().get(&scene_object()).unwrap().owner(),
        GUEST
    );

    // the old owner's writes stay local now
    host.world_mut()
        .transforms_mut()
        .get_mut(&scene_object())
        .unwrap()
        .set_transform(Transform::from_position(Vec3::splat(-1.0)));
    guest
        .world_mut()
        .transforms_mut()
        .get_mut(&scene_object())
        .unwrap()
        .set_transform(Transform::from_position(Vec3::splat(4.0)));

    settle(&mut [&mut host, &mut guest], now + Duration::from_millis(50));

    assert_eq!(position_of(&host), Vec3::splat(4.0));
    assert_eq!(position_of(&guest), Vec3::splat(4.0));
}

#[test]
fn non_owner_cannot_hand_off() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, mut guest) = two_peers(&network);
    register_transform(&mut host, &mut guest);

    assert!(!guest
        .world_mut()
        .transfer_transform(&scene_object(), GUEST)
        .unwrap());
    assert_eq!(
        guest.world().transforms().get(&scene_object()).unwrap().owner(),
        HOST
    );
}

#[test]
fn animator_parameters_and_triggers_replicate() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, mut guest) = two_peers(&network);
    for peer in [&mut host, &mut guest] {
        peer.world_mut()
            .animators_mut()
            .register(scene_object(), AnimatorReplica::new(HOST));
    }

    let animator = host
        .world_mut()
        .animators_mut()
        .get_mut(&scene_object())
        .unwrap();
    animator.set_float("speed", 1.5);
    animator.set_bool("grounded", true);
    animator.set_trigger("jump");

    let now = Instant::now();
    settle(&mut [&mut host, &mut guest], now);

    let received = guest
        .world_mut()
        .animators_mut()
        .get_mut(&scene_object())
        .unwrap();
    assert_eq!(received.get("speed"), Some(AnimatorValue::Float(1.5)));
    assert_eq!(received.get("grounded"), Some(AnimatorValue::Bool(true)));
    assert_eq!(received.take_triggers(), vec![parameter_id("jump")]);

    // clean animators stay quiet, so the trigger fires once
    let sent = network.sent_by(HOST);
    settle(&mut [&mut host, &mut guest], now + Duration::from_millis(50));
    assert_eq!(network.sent_by(HOST), sent);
    let received = guest
        .world_mut()
        .animators_mut()
        .get_mut(&scene_object())
        .unwrap();
    assert!(received.take_triggers().is_empty());
}

#[test]
fn push_waits_for_tick_interval() {
    init_logger();
    let network = LocalNetwork::new();
    let config = RoomConfig::default().tick_interval(Duration::from_millis(50));
    let mut host = enter_room(&network, config, HOST, "lobby", None).unwrap();
    host.world_mut()
        .transforms_mut()
        .register(scene_object(), TransformReplica::new(HOST, Transform::IDENTITY));

    let now = Instant::now();
    host.tick(now).unwrap();
    assert_eq!(network.sent_by(HOST), 1);

    host.tick(now + Duration::from_millis(20)).unwrap();
    assert_eq!(network.sent_by(HOST), 1);

    host.tick(now + Duration::from_millis(50)).unwrap();
    assert_eq!(network.sent_by(HOST), 2);
}
