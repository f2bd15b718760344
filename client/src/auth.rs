use log::info;
use vrsync_shared::digest_hex;

use crate::entry::EntryCommand;

/// Which code path room entry takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomRole {
    Host,
    Guest,
}

/// Lowercase hex of the password's SHA-256
pub fn hash_password(plaintext: &str) -> String {
    digest_hex(plaintext.as_bytes())
}

pub fn confirm_password(plaintext: &str, expected_hash: &str) -> bool {
    hash_password(plaintext).eq_ignore_ascii_case(expected_hash.trim())
}

/// Host if the command carries the password matching `stored_hash`, guest
/// otherwise. A wrong or missing password is not an error.
pub fn authenticate(command: &EntryCommand, stored_hash: Option<&str>) -> RoomRole {
    let role = match (command.password(), stored_hash) {
        (Some(password), Some(hash)) if confirm_password(password, hash) => RoomRole::Host,
        _ => RoomRole::Guest,
    };
    info!("entering {} as {:?}", command.address(), role);
    role
}
