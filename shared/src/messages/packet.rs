use vrsync_serde::Serde;

/// A message shape that can travel inside a frame.
///
/// The packet kind is derived from `NAME` and `SEED` once, when the type is
/// added to a `Protocol`.
pub trait Packet: Serde + Send + Sync + 'static {
    /// Fully qualified name the packet kind is derived from
    const NAME: &'static str;

    /// Distinguishes packets that share a name and shape but not a purpose
    const SEED: Option<&'static str> = None;
}
