//! Honey-encrypted password vault.
//!
//! Composes the alphabet and vault-text framing
//! ([`honeyvault_symbols`]), the IS-PMTE codec ([`honeyvault_codec`]), and
//! the KDF/AEAD envelope with its wrong-key decoy fallback
//! ([`honeyvault_envelope`]) behind the three operations spec.md §6 names
//! as the public core API: `encrypt_vault`, `decrypt_vault`,
//! `append_password`.

pub mod error;
pub mod vault;

pub use error::HoneyVaultError;
pub use vault::{append_password, decrypt_vault, encrypt_vault, is_vault, vault_version, HoneyVaultConfig};

// Re-exported so callers need only this crate to build an oracle, drive the
// codec directly, or inspect envelope-level types.
pub use honeyvault_codec::{DistributionOracle, UniformOracle, VaultCodecConfig, ZipfOracle};
pub use honeyvault_envelope::{
    DecryptedVault, EnvelopeConfig, HoneyAccountStub, PlaintextEntry, VaultCiphertext, VaultHeader,
};
