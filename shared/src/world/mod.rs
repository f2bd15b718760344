pub mod component;
pub mod registry;
pub mod replication;
pub mod room_world;
pub mod spawn;
