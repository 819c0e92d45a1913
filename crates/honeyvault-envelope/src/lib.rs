//! Vault envelope: key derivation, AES-256-GCM sealing, the on-disk header,
//! sidecar metadata, and the wrong-key decoy fallback (C6, C7).
//!
//! This crate owns everything between a packed honey-seed
//! ([`honeyvault_codec`]) and a byte string safe to write to disk.

pub mod aead;
pub mod decoy;
pub mod envelope;
pub mod error;
pub mod header;
pub mod kdf;
pub mod sidecar;

pub use envelope::{append_password, decrypt_vault, encrypt_vault, DecryptedVault, VaultCiphertext};
pub use error::EnvelopeError;
pub use header::{VaultHeader, HEADER_SIZE, MAGIC, VERSION};
pub use kdf::EnvelopeConfig;
pub use sidecar::{HoneyAccountStub, PlaintextEntry, Sidecar};
