//! Approval token generation.

use rand::RngCore;

/// Random bytes per token (rendered as twice as many hex characters).
pub const TOKEN_BYTES: usize = 32;

/// Generates an unguessable, URL-safe approval token.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
