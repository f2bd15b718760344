use sha2::{Digest, Sha256};

/// One-way hash shared by addresses and packet kinds: the first four bytes of
/// SHA-256, read little endian.
pub fn digest32(bytes: &[u8]) -> u32 {
    digest32_parts(&[bytes])
}

/// Same as `digest32`, over the concatenation of `parts`.
pub fn digest32_parts(parts: &[&[u8]]) -> u32 {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(*part);
    }
    let output = hasher.finalize();
    u32::from_le_bytes([output[0], output[1], output[2], output[3]])
}

/// Full SHA-256 of `bytes` as lowercase hex.
pub fn digest_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
