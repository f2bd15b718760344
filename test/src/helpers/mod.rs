mod instantiator;
mod room;

pub use instantiator::{TestInstance, TestInstantiator};
pub use room::{enter_room, settle, test_protocol, test_store, TestPeer};

/// Routes `log` output through the test harness. Safe to call repeatedly.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
