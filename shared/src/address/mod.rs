mod address32;
mod address64;
mod error;
mod generator;

pub use address32::Address32;
pub use address64::Address64;
pub use error::AddressError;
pub use generator::AddressGenerator;

use std::{fmt::Debug, hash::Hash};

use vrsync_serde::Serde;

/// A fixed-width identifier with a cached hash, usable as a registry key and
/// written raw on the wire.
pub trait NetAddress: Copy + Eq + Hash + Debug + Serde + Send + Sync + 'static {
    /// Width in bytes
    const WIDTH: usize;

    fn as_bytes(&self) -> &[u8];

    /// The cached one-way hash of the current bytes
    fn digest(&self) -> u32;
}
