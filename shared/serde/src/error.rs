use thiserror::Error;

/// Returned when a buffer ends early or holds bits that do not form a valid
/// value of the requested type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Serde error: buffer is truncated or holds an invalid value")]
pub struct SerdeErr;
