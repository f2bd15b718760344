pub mod dispatcher;
pub mod error;
pub mod outbox;
pub mod packet;
pub mod packet_kinds;
