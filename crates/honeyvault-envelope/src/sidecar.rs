//! Sidecar JSON (spec.md §6): the part of the payload that rides alongside
//! the honey-encoded seed without itself being honey-encoded. Holds entries
//! the caller chose to store in the clear (once the envelope is open),
//! decoy account stubs synthesized by [`crate::decoy`], and the exact bit
//! length of the seed — needed by [`honeyvault_codec::append_password`] to
//! resume packing without disturbing the final partial byte.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaintextEntry {
    pub website: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoneyAccountStub {
    pub website: String,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sidecar {
    #[serde(default)]
    pub plaintext_entries: Vec<PlaintextEntry>,
    #[serde(default)]
    pub honey_accounts: Vec<HoneyAccountStub>,
    pub seed_bits: u32,
}

impl Sidecar {
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
