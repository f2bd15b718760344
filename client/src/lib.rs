//! # vrsync Client
//! A peer's side of a room: entry, authentication, the cooperative update
//! loop and the exit sequence, over any `Transport`.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use vrsync_shared as shared;

mod auth;
mod config;
mod entry;
mod error;
mod interaction;
mod session;
mod tasks;
pub mod transport;

pub use auth::{authenticate, confirm_password, hash_password, RoomRole};
pub use config::RoomConfig;
pub use entry::{EntryCommand, EntryCommandError};
pub use error::RoomError;
pub use interaction::{Capability, Interactable, InteractionEffect, InteractionEvent};
pub use session::{RoomEntry, RoomEvent, RoomSession, SessionPhase};
pub use tasks::{TaskKind, TaskProgress, TaskScheduler};
pub use transport::{InboundEvent, InboundHandle, InboundQueue, Transport, TransportError};
