//! On-disk vault header (C6). Mirrors the manual magic/version/salt/nonce
//! layout the wallet file format uses, extended with the fields honey
//! encryption needs: KDF cost and vault metadata that must be readable
//! (and, critically, *forgeable*) without the key — see
//! [`crate::decoy`] for why `pw_count` has to be attacker/wrong-key
//! producible rather than authenticated on its own.

use crate::error::EnvelopeError;

pub const MAGIC: &[u8; 4] = b"HVLT";
pub const VERSION: u16 = 1;

/// `magic(4) + version(2) + kdf_iters(4) + salt(32) + nonce(12) +
/// created_ms(8) + updated_ms(8) + pw_count(4) + flags(1)`.
pub const HEADER_SIZE: usize = 4 + 2 + 4 + 32 + 12 + 8 + 8 + 4 + 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultHeader {
    pub version: u16,
    pub kdf_iterations: u32,
    pub salt: [u8; 32],
    pub nonce: [u8; 12],
    pub created_ms: i64,
    pub updated_ms: i64,
    pub pw_count: u32,
    pub flags: u8,
}

impl VaultHeader {
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        let mut at = 0;
        out[at..at + 4].copy_from_slice(MAGIC);
        at += 4;
        out[at..at + 2].copy_from_slice(&self.version.to_be_bytes());
        at += 2;
        out[at..at + 4].copy_from_slice(&self.kdf_iterations.to_be_bytes());
        at += 4;
        out[at..at + 32].copy_from_slice(&self.salt);
        at += 32;
        out[at..at + 12].copy_from_slice(&self.nonce);
        at += 12;
        out[at..at + 8].copy_from_slice(&self.created_ms.to_be_bytes());
        at += 8;
        out[at..at + 8].copy_from_slice(&self.updated_ms.to_be_bytes());
        at += 8;
        out[at..at + 4].copy_from_slice(&self.pw_count.to_be_bytes());
        at += 4;
        out[at] = self.flags;
        out
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self, EnvelopeError> {
        if buf.len() < HEADER_SIZE {
            return Err(EnvelopeError::Malformed("header too short".into()));
        }
        if &buf[0..4] != MAGIC {
            return Err(EnvelopeError::Malformed("bad magic bytes".into()));
        }
        let mut at = 4;
        let version = u16::from_be_bytes(buf[at..at + 2].try_into().unwrap());
        at += 2;
        if version != VERSION {
            return Err(EnvelopeError::Malformed(format!(
                "unsupported vault version: {version}"
            )));
        }
        let kdf_iterations = u32::from_be_bytes(buf[at..at + 4].try_into().unwrap());
        at += 4;
        let mut salt = [0u8; 32];
        salt.copy_from_slice(&buf[at..at + 32]);
        at += 32;
        let mut nonce = [0u8; 12];
        nonce.copy_from_slice(&buf[at..at + 12]);
        at += 12;
        let created_ms = i64::from_be_bytes(buf[at..at + 8].try_into().unwrap());
        at += 8;
        let updated_ms = i64::from_be_bytes(buf[at..at + 8].try_into().unwrap());
        at += 8;
        let pw_count = u32::from_be_bytes(buf[at..at + 4].try_into().unwrap());
        at += 4;
        let flags = buf[at];

        Ok(VaultHeader {
            version,
            kdf_iterations,
            salt,
            nonce,
            created_ms,
            updated_ms,
            pw_count,
            flags,
        })
    }
}
