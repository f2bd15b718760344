use thiserror::Error;

use crate::{
    address::Address64, messages::error::PacketKindsError, world::spawn::store::ElementRef,
};

/// Errors that can occur while spawning an entity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpawnError {
    /// The element reference names nothing in the store
    #[error("Store element {element} does not exist (store holds {available} elements)")]
    UnresolvedStoreReference { element: ElementRef, available: usize },

    /// The address already belongs to a live or destroyed entity
    #[error("Address {address} is already in use")]
    AddressInUse { address: Address64 },

    /// The spawn packet could not be queued
    #[error("Failed to queue spawn packet: {0}")]
    Protocol(#[from] PacketKindsError),
}
