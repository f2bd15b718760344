pub mod coordinator;
pub mod error;
pub mod packets;
pub mod store;
