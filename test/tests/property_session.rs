/// Property-based tests for a live session
///
/// Whatever bytes arrive, a session keeps running and its world only changes
/// through well-formed frames from the right peer.
use std::time::Instant;

use proptest::prelude::*;
use vrsync_client::RoomConfig;
use vrsync_test::{enter_room, LocalNetwork};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_garbage_never_ends_the_session(
        frames in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..128), 1..8),
    ) {
        let network = LocalNetwork::new();
        let mut peer = enter_room(&network, RoomConfig::default(), 2, "lobby", None).unwrap();

        for frame in &frames {
            network.inject(1, 2, frame);
        }

        prop_assert!(peer.tick(Instant::now()).is_ok());
        prop_assert!(!peer.is_closed());
        prop_assert_eq!(peer.world().entity_count(), 0);
    }
}
