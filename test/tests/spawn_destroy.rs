/// Integration tests for the spawn/destroy protocol across peers
///
/// Spawns and destroys travel on the reliable channel and must be
/// idempotent: duplicates are harmless and a destroyed address stays
/// destroyed for the rest of the session.
use std::time::{Duration, Instant};

use vrsync_client::{RoomConfig, RoomEvent};
use vrsync_shared::{
    marshal, AnimatorReplica, DestroyEntity, ElementRef, SpawnEntity, SpawnError, SpawnState,
    Transform, TransformUpdate, Vec3, WorldEvent,
};
use vrsync_test::{enter_room, init_logger, settle, LocalNetwork, TestPeer};

const HOST: u32 = 1;
const GUEST: u32 = 2;

fn two_peers(network: &LocalNetwork) -> (TestPeer, TestPeer) {
    let config = RoomConfig::default().tick_interval(Duration::ZERO);
    let host = enter_room(network, config.clone(), HOST, "lobby", None).unwrap();
    let guest = enter_room(network, config, GUEST, "lobby", None).unwrap();
    (host, guest)
}

#[test]
fn spawn_reaches_peers_with_distributed_variant() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, mut guest) = two_peers(&network);

    let address = host
        .world_mut()
        .spawn(
            ElementRef::Name("Cube".to_string()),
            HOST,
            Transform::from_position(Vec3::new(0.0, 1.0, 0.0)),
            true,
        )
        .unwrap();
    let events = settle(&mut [&mut host, &mut guest], Instant::now());

    assert_eq!(host.world().instantiator().prefab_at(&address), Some("prefabs/cube"));
    assert_eq!(
        guest.world().instantiator().prefab_at(&address),
        Some("prefabs/cube_lite")
    );

    let spawned = guest.world().spawner().get(&address).unwrap();
    assert_eq!(spawned.element, "Cube");
    assert_eq!(spawned.owner, HOST);
    assert_eq!(spawned.instance.transform.position, Vec3::new(0.0, 1.0, 0.0));

    assert!(events[1].contains(&RoomEvent::World(WorldEvent::Spawned {
        address,
        element: "Cube".to_string(),
        owner: HOST,
    })));
}

#[test]
fn element_without_distributed_variant_uses_owner_variant() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, mut guest) = two_peers(&network);

    let address = host
        .world_mut()
        .spawn(ElementRef::Index(1), HOST, Transform::IDENTITY, true)
        .unwrap();
    settle(&mut [&mut host, &mut guest], Instant::now());

    assert_eq!(
        guest.world().instantiator().prefab_at(&address),
        Some("prefabs/lamp")
    );
}

#[test]
fn local_only_spawn_is_not_announced() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, mut guest) = two_peers(&network);

    let address = host
        .world_mut()
        .spawn(ElementRef::Index(0), HOST, Transform::IDENTITY, false)
        .unwrap();
    settle(&mut [&mut host, &mut guest], Instant::now());

    assert_eq!(host.world().spawner().state(&address), SpawnState::Spawned);
    assert_eq!(guest.world().spawner().state(&address), SpawnState::Unspawned);
}

#[test]
fn duplicate_spawn_frames_create_one_entity() {
    init_logger();
    let network = LocalNetwork::new();
    let (host, mut guest) = two_peers(&network);

    let address = vrsync_shared::Address64::from_u64(77);
    let packet = SpawnEntity {
        address,
        element: ElementRef::Index(0),
        owner: HOST,
        transform: Transform::IDENTITY,
    };
    let frame = marshal(host.world().kinds(), HOST, GUEST, &packet).unwrap();

    network.inject(HOST, GUEST, &frame);
    network.inject(HOST, GUEST, &frame);
    let events = guest.tick(Instant::now()).unwrap();

    assert_eq!(guest.world().spawner().len(), 1);
    assert_eq!(guest.world().instantiator().instantiated.len(), 1);
    let spawned_events = events
        .iter()
        .filter(|event| matches!(event, RoomEvent::World(WorldEvent::Spawned { .. })))
        .count();
    assert_eq!(spawned_events, 1);
}

#[test]
fn destroy_removes_everywhere_and_is_terminal() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, mut guest) = two_peers(&network);
    let now = Instant::now();

    let address = host
        .world_mut()
        .spawn(ElementRef::Index(0), HOST, Transform::IDENTITY, true)
        .unwrap();
    settle(&mut [&mut host, &mut guest], now);
    assert_eq!(guest.world().spawner().len(), 1);

    assert!(host.world_mut().destroy(&address, true).unwrap());
    let events = settle(&mut [&mut host, &mut guest], now);

    assert_eq!(guest.world().spawner().state(&address), SpawnState::Destroyed);
    assert_eq!(guest.world().instantiator().disposed, vec![address]);
    assert!(events[1].contains(&RoomEvent::World(WorldEvent::Destroyed { address })));

    // a late spawn for the same address is ignored
    let late = SpawnEntity {
        address,
        element: ElementRef::Index(0),
        owner: HOST,
        transform: Transform::IDENTITY,
    };
    let frame = marshal(host.world().kinds(), HOST, GUEST, &late).unwrap();
    network.inject(HOST, GUEST, &frame);
    guest.tick(now).unwrap();
    assert_eq!(guest.world().spawner().len(), 0);
    assert_eq!(guest.world().instantiator().live(), 0);
}

#[test]
fn spawned_entities_carry_a_transform_replica() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, mut guest) = two_peers(&network);
    let now = Instant::now();

    let address = host
        .world_mut()
        .spawn(ElementRef::Index(0), HOST, Transform::IDENTITY, true)
        .unwrap();
    settle(&mut [&mut host, &mut guest], now);
    assert!(guest.world().transforms().contains(&address));

    host.world_mut()
        .transforms_mut()
        .get_mut(&address)
        .unwrap()
        .set_transform(Transform::from_position(Vec3::X));
    settle(&mut [&mut host, &mut guest], now);

    assert_eq!(
        guest.world().transforms().get(&address).unwrap().transform().position,
        Vec3::X
    );
}

#[test]
fn destroyed_address_is_neither_pushed_nor_applied() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, mut guest) = two_peers(&network);
    let now = Instant::now();

    let address = host
        .world_mut()
        .spawn(ElementRef::Index(0), HOST, Transform::IDENTITY, true)
        .unwrap();
    settle(&mut [&mut host, &mut guest], now);
    for peer in [&mut host, &mut guest] {
        peer.world_mut()
            .animators_mut()
            .register(address, AnimatorReplica::new(HOST));
    }

    assert!(host.world_mut().destroy(&address, true).unwrap());
    assert!(host.world_mut().transforms_mut().get_mut(&address).is_none());
    settle(&mut [&mut host, &mut guest], now);

    for peer in [&host, &guest] {
        assert!(!peer.world().transforms().contains(&address));
        assert!(!peer.world().animators().contains(&address));
        assert_eq!(peer.world().entity_count(), 0);
    }

    // nothing left to stream
    let sent = network.sent_by(HOST);
    settle(&mut [&mut host, &mut guest], now);
    assert_eq!(network.sent_by(HOST), sent);

    // a stale update still in flight lands nowhere
    let stale = TransformUpdate {
        address,
        transform: Transform::from_position(Vec3::ONE),
    };
    let frame = marshal(host.world().kinds(), HOST, GUEST, &stale).unwrap();
    network.inject(HOST, GUEST, &frame);
    guest.tick(now).unwrap();
    assert!(!guest.world().transforms().contains(&address));
}

#[test]
fn duplicate_destroy_is_harmless() {
    init_logger();
    let network = LocalNetwork::new();
    let (host, mut guest) = two_peers(&network);

    let address = vrsync_shared::Address64::from_u64(5);
    let frame = marshal(
        host.world().kinds(),
        HOST,
        GUEST,
        &DestroyEntity { address },
    )
    .unwrap();

    network.inject(HOST, GUEST, &frame);
    network.inject(HOST, GUEST, &frame);
    let events = guest.tick(Instant::now()).unwrap();

    assert!(events.is_empty());
    assert!(guest.world().instantiator().disposed.is_empty());
}

#[test]
fn unresolved_store_reference_spawns_nothing() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, mut guest) = two_peers(&network);

    let result = host
        .world_mut()
        .spawn(ElementRef::Index(9), HOST, Transform::IDENTITY, true);
    assert!(matches!(
        result,
        Err(SpawnError::UnresolvedStoreReference { available: 2, .. })
    ));

    let result = host.world_mut().spawn(
        ElementRef::Name("Chair".to_string()),
        HOST,
        Transform::IDENTITY,
        true,
    );
    assert!(result.is_err());

    settle(&mut [&mut host, &mut guest], Instant::now());
    assert_eq!(network.sent_by(HOST), 0);
    assert_eq!(host.world().entity_count(), 0);
    assert_eq!(host.world().instantiator().instantiated.len(), 0);
}

#[test]
fn remote_spawn_with_unknown_element_is_dropped() {
    init_logger();
    let network = LocalNetwork::new();
    let (host, mut guest) = two_peers(&network);

    let packet = SpawnEntity {
        address: vrsync_shared::Address64::from_u64(3),
        element: ElementRef::Name("Chair".to_string()),
        owner: HOST,
        transform: Transform::IDENTITY,
    };
    let frame = marshal(host.world().kinds(), HOST, GUEST, &packet).unwrap();
    network.inject(HOST, GUEST, &frame);

    assert!(guest.tick(Instant::now()).unwrap().is_empty());
    assert_eq!(guest.world().spawner().len(), 0);
}

#[test]
fn peer_left_cleans_up_their_entities() {
    init_logger();
    let network = LocalNetwork::new();
    let (mut host, mut guest) = two_peers(&network);
    let now = Instant::now();

    let cube = host
        .world_mut()
        .spawn(ElementRef::Index(0), HOST, Transform::IDENTITY, true)
        .unwrap();
    let lamp = guest
        .world_mut()
        .spawn(ElementRef::Index(1), GUEST, Transform::IDENTITY, true)
        .unwrap();
    settle(&mut [&mut host, &mut guest], now);
    assert_eq!(guest.world().spawner().len(), 2);

    // the host vanishes without its destroys arriving
    let frame = marshal(
        host.world().kinds(),
        HOST,
        GUEST,
        &vrsync_shared::PeerLeft { user: HOST },
    )
    .unwrap();
    network.inject(HOST, GUEST, &frame);
    let events = guest.tick(now).unwrap();

    assert_eq!(guest.world().spawner().state(&cube), SpawnState::Destroyed);
    assert_eq!(guest.world().spawner().state(&lamp), SpawnState::Spawned);
    assert!(!guest.world().transforms().contains(&cube));
    assert!(guest.world().transforms().contains(&lamp));
    assert!(events.contains(&RoomEvent::World(WorldEvent::Destroyed { address: cube })));
    assert!(events.contains(&RoomEvent::World(WorldEvent::PeerLeft { user: HOST })));
}
