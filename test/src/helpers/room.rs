use std::time::Instant;

use vrsync_client::{InboundQueue, RoomConfig, RoomEntry, RoomError, RoomEvent, RoomSession};
use vrsync_shared::{Protocol, Store, StoreElement, PrefabRef, UserId};

use crate::{
    helpers::instantiator::TestInstantiator,
    local_network::{LocalNetwork, LocalTransport},
};

pub type TestPeer = RoomSession<LocalTransport, TestInstantiator>;

pub fn test_protocol() -> Protocol {
    Protocol::builder().build()
}

/// "Cube" has a lighter variant for non-owners, "Lamp" does not
pub fn test_store() -> Store {
    Store::new(vec![
        StoreElement {
            name: "Cube".to_string(),
            owner_variant: PrefabRef::new("prefabs/cube"),
            distributed_variant: Some(PrefabRef::new("prefabs/cube_lite")),
        },
        StoreElement {
            name: "Lamp".to_string(),
            owner_variant: PrefabRef::new("prefabs/lamp"),
            distributed_variant: None,
        },
    ])
    .unwrap()
}

/// Connects `user` to `network` and enters the room with `command`
pub fn enter_room(
    network: &LocalNetwork,
    config: RoomConfig,
    user: UserId,
    command: &str,
    stored_hash: Option<&str>,
) -> Result<TestPeer, RoomError> {
    let inbound = InboundQueue::new();
    let transport = network.connect(user, inbound.handle());
    RoomSession::enter(
        config,
        test_protocol(),
        transport,
        inbound,
        TestInstantiator::new(),
        test_store(),
        RoomEntry {
            local_user: user,
            command,
            stored_hash,
        },
    )
}

/// Ticks every peer twice, so frames sent on the first pass are received on
/// the second. Returns each peer's events.
pub fn settle(peers: &mut [&mut TestPeer], now: Instant) -> Vec<Vec<RoomEvent>> {
    let mut events: Vec<Vec<RoomEvent>> = peers.iter().map(|_| Vec::new()).collect();
    for _ in 0..2 {
        for (index, peer) in peers.iter_mut().enumerate() {
            events[index].extend(peer.tick(now).unwrap());
        }
    }
    events
}
