//! Key derivation (C6): PBKDF2-HMAC-SHA256, with the iteration count carried
//! explicitly in [`EnvelopeConfig`] rather than hardcoded, so a vault's KDF
//! cost can be bumped for new files without touching already-written ones
//! (the iteration count travels in the header alongside the salt).

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

/// KDF cost and other envelope-wide knobs, passed explicitly rather than
/// held as global state (spec.md §9's "avoid hidden global configuration").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeConfig {
    pub kdf_iterations: u32,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        EnvelopeConfig { kdf_iterations: 100_000 }
    }
}

/// Derive a 32-byte AES-256 key from a password and salt.
pub fn derive_key(password: &[u8], salt: &[u8; 32], iterations: u32) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key);
    key
}
