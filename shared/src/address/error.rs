use thiserror::Error;

/// Errors that can occur while building or mutating an address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Wrong number of bytes supplied for the address width
    #[error("Address of {expected} bytes cannot be built from {actual} bytes")]
    InvalidLength { expected: usize, actual: usize },

    /// Byte index past the end of the address
    #[error("Byte index {index} is out of range for a {width}-byte address")]
    IndexOutOfRange { index: usize, width: usize },
}
