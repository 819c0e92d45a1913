//! Composition root for C6/C7: `encrypt_vault` / `decrypt_vault` /
//! `append_password`, wiring together the header, KDF, AEAD, sidecar and
//! decoy modules into the public core API spec.md §6 describes.

use log::{debug, warn};
use rand::RngCore;

use honeyvault_codec::{self, CancelToken, DistributionOracle, NeverCancel, VaultCodecConfig};

use crate::aead;
use crate::decoy;
use crate::error::EnvelopeError;
use crate::header::{VaultHeader, HEADER_SIZE, VERSION};
use crate::kdf::{self, EnvelopeConfig};
use crate::sidecar::{HoneyAccountStub, PlaintextEntry, Sidecar};

/// An encrypted vault: the clear-text header (also the AEAD associated
/// data) plus the authenticated body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultCiphertext {
    pub header: VaultHeader,
    pub body: Vec<u8>,
}

impl VaultCiphertext {
    /// Flatten into the single-file on-disk layout: `header ‖ body`, mirroring
    /// how the wallet file format concatenates its own header and ciphertext
    /// rather than keeping them as a pair the caller must store separately.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.body.len());
        out.extend_from_slice(&self.header.to_bytes());
        out.extend_from_slice(&self.body);
        out
    }

    /// Split a flattened vault file back into its header and body. Failures
    /// here (bad magic, truncated buffer, unsupported version) mean the input
    /// isn't a vault file at all — there is no salt or `pw_count` to seed a
    /// decoy from, so unlike `AuthFailure`/`Malformed` once inside an opened
    /// envelope (spec.md §7), this is a hard error rather than a decoy trigger.
    pub fn from_bytes(data: &[u8]) -> Result<Self, EnvelopeError> {
        let header = VaultHeader::from_bytes(data)?;
        Ok(VaultCiphertext {
            header,
            body: data[HEADER_SIZE..].to_vec(),
        })
    }
}

/// Result of a successful `decrypt_vault` call. `is_decoy` is surfaced for
/// observability only — callers that branch on it defeat the whole point
/// of honey encryption, since that branch itself becomes a side channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedVault {
    pub passwords: Vec<String>,
    pub plaintext_entries: Vec<PlaintextEntry>,
    pub honey_accounts: Vec<HoneyAccountStub>,
    pub is_decoy: bool,
}

fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Encrypt a fresh vault under `master`.
pub fn encrypt_vault(
    oracle: &dyn DistributionOracle,
    passwords: &[impl AsRef<str>],
    master: &[u8],
    plaintext_entries: Vec<PlaintextEntry>,
    honey_accounts: Vec<HoneyAccountStub>,
    config: &EnvelopeConfig,
    rng: &mut impl RngCore,
) -> Result<VaultCiphertext, EnvelopeError> {
    let encoded = honeyvault_codec::encode(oracle, passwords, rng, &NeverCancel)?;
    debug!("encoded vault of {} password(s) into {} bits", passwords.len(), encoded.bits_used);

    let sidecar = Sidecar {
        plaintext_entries,
        honey_accounts,
        seed_bits: encoded.bits_used as u32,
    };
    let sidecar_json = sidecar.to_json().expect("Sidecar serialization is infallible");

    let mut payload = Vec::with_capacity(4 + encoded.seed_bytes.len() + sidecar_json.len());
    payload.extend_from_slice(&(encoded.seed_bytes.len() as u32).to_be_bytes());
    payload.extend_from_slice(&encoded.seed_bytes);
    payload.extend_from_slice(&sidecar_json);

    let mut salt = [0u8; 32];
    let mut nonce = [0u8; 12];
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut nonce);
    let key = kdf::derive_key(master, &salt, config.kdf_iterations);

    let created_ms = now_ms();
    let header = VaultHeader {
        version: VERSION,
        kdf_iterations: config.kdf_iterations,
        salt,
        nonce,
        created_ms,
        updated_ms: created_ms,
        pw_count: passwords.len() as u32,
        flags: if sidecar.honey_accounts.is_empty() { 0 } else { 1 },
    };

    let body = aead::seal(&key, &nonce, &header.to_bytes(), &payload)?;
    Ok(VaultCiphertext { header, body })
}

/// Open the envelope and split it into its seed and sidecar, without
/// deciding yet whether `AuthFailure`/`Malformed` should become a decoy —
/// that's [`decrypt_vault`]'s call. `append_password` uses this directly and
/// propagates the error, since appending onto a vault that doesn't open is
/// a caller bug, not a case for a decoy.
fn open(ciphertext: &VaultCiphertext, master: &[u8]) -> Result<(Vec<u8>, Sidecar), EnvelopeError> {
    let key = kdf::derive_key(master, &ciphertext.header.salt, ciphertext.header.kdf_iterations);
    let payload = aead::open(&key, &ciphertext.header.nonce, &ciphertext.header.to_bytes(), &ciphertext.body)?;

    if payload.len() < 4 {
        return Err(EnvelopeError::Malformed("payload shorter than the length prefix".into()));
    }
    let seed_len = u32::from_be_bytes(payload[0..4].try_into().unwrap()) as usize;
    if 4 + seed_len > payload.len() {
        return Err(EnvelopeError::Malformed("seed_len exceeds payload size".into()));
    }
    let seed = payload[4..4 + seed_len].to_vec();
    let sidecar = Sidecar::from_json(&payload[4 + seed_len..])
        .map_err(|e| EnvelopeError::Malformed(format!("unparseable sidecar json: {e}")))?;

    Ok((seed, sidecar))
}

/// Decrypt a vault. Total over inputs (spec.md §7): a wrong master or a
/// corrupted ciphertext still returns `Ok`, just with `is_decoy: true`. Only
/// a codec-level fault on an *authenticated* seed (oracle failure,
/// cancellation, an internal invariant break) is a real error — those can
/// only happen with the right key, where decoding is not optional.
pub fn decrypt_vault(
    oracle: &dyn DistributionOracle,
    ciphertext: &VaultCiphertext,
    master: &[u8],
    codec_config: &VaultCodecConfig,
    decoy_temperature: f64,
) -> Result<DecryptedVault, EnvelopeError> {
    match open(ciphertext, master) {
        Ok((seed, sidecar)) => {
            let passwords = honeyvault_codec::decode(oracle, &seed, codec_config, &NeverCancel)?;
            Ok(DecryptedVault {
                passwords,
                plaintext_entries: sidecar.plaintext_entries,
                honey_accounts: sidecar.honey_accounts,
                is_decoy: false,
            })
        }
        Err(EnvelopeError::AuthFailure) | Err(EnvelopeError::Malformed(_)) => {
            warn!("vault did not open under the supplied master; synthesizing a decoy");
            let key = kdf::derive_key(master, &ciphertext.header.salt, ciphertext.header.kdf_iterations);
            let stubs = decoy::synthesize(
                oracle,
                &key,
                &ciphertext.header.salt,
                ciphertext.header.pw_count,
                codec_config.max_password_length,
                decoy_temperature,
            );
            let passwords = stubs.iter().map(|s| s.password.clone()).collect();
            Ok(DecryptedVault {
                passwords,
                plaintext_entries: Vec::new(),
                honey_accounts: stubs,
                is_decoy: true,
            })
        }
        Err(other) => Err(other),
    }
}

/// Append one password to an existing vault, re-encrypting only what
/// changed at the seed level (C8's prefix-keeping guarantee) while
/// necessarily drawing a fresh nonce (spec.md §4.6: a nonce is drawn fresh
/// per encryption).
pub fn append_password(
    oracle: &dyn DistributionOracle,
    ciphertext: &VaultCiphertext,
    existing_passwords: &[impl AsRef<str>],
    master: &str,
    new_password: &str,
    config: &EnvelopeConfig,
    rng: &mut impl RngCore,
) -> Result<VaultCiphertext, EnvelopeError> {
    let (old_seed, mut sidecar) = open(ciphertext, master.as_bytes())?;

    let appended = honeyvault_codec::append_password(
        oracle,
        existing_passwords,
        &old_seed,
        sidecar.seed_bits as usize,
        new_password,
        rng,
        &NeverCancel as &dyn CancelToken,
    )?;
    sidecar.seed_bits = appended.bits_used as u32;
    let sidecar_json = sidecar.to_json().expect("Sidecar serialization is infallible");

    let mut payload = Vec::with_capacity(4 + appended.seed_bytes.len() + sidecar_json.len());
    payload.extend_from_slice(&(appended.seed_bytes.len() as u32).to_be_bytes());
    payload.extend_from_slice(&appended.seed_bytes);
    payload.extend_from_slice(&sidecar_json);

    let mut nonce = [0u8; 12];
    rng.fill_bytes(&mut nonce);
    let key = kdf::derive_key(master.as_bytes(), &ciphertext.header.salt, ciphertext.header.kdf_iterations);

    let header = VaultHeader {
        version: VERSION,
        kdf_iterations: config.kdf_iterations,
        salt: ciphertext.header.salt,
        nonce,
        created_ms: ciphertext.header.created_ms,
        updated_ms: now_ms(),
        pw_count: ciphertext.header.pw_count + 1,
        flags: ciphertext.header.flags,
    };

    let body = aead::seal(&key, &nonce, &header.to_bytes(), &payload)?;
    Ok(VaultCiphertext { header, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use honeyvault_codec::UniformOracle;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn encrypt_then_decrypt_recovers_the_real_vault() {
        let mut rng = StdRng::seed_from_u64(1);
        let passwords = vec!["pw1".to_string(), "pw2".to_string()];
        let ct = encrypt_vault(&UniformOracle, &passwords, b"correct horse", vec![], vec![], &EnvelopeConfig::default(), &mut rng).unwrap();

        let decrypted = decrypt_vault(&UniformOracle, &ct, b"correct horse", &VaultCodecConfig::default(), 1.0).unwrap();
        assert!(!decrypted.is_decoy);
        assert_eq!(decrypted.passwords, passwords);
    }

    #[test]
    fn wrong_key_yields_a_stable_decoy_of_the_right_length() {
        let mut rng = StdRng::seed_from_u64(2);
        let passwords = vec!["pw1".to_string(), "pw2".to_string()];
        let ct = encrypt_vault(&UniformOracle, &passwords, b"correct horse", vec![], vec![], &EnvelopeConfig::default(), &mut rng).unwrap();

        let first = decrypt_vault(&UniformOracle, &ct, b"wrong", &VaultCodecConfig::default(), 1.0).unwrap();
        let second = decrypt_vault(&UniformOracle, &ct, b"wrong", &VaultCodecConfig::default(), 1.0).unwrap();
        assert!(first.is_decoy);
        assert_eq!(first.passwords, second.passwords);
        assert_eq!(first.passwords.len(), 2);
    }

    #[test]
    fn tampered_ciphertext_still_decrypts_to_a_decoy() {
        let mut rng = StdRng::seed_from_u64(3);
        let passwords = vec!["pw1".to_string()];
        let mut ct = encrypt_vault(&UniformOracle, &passwords, b"master", vec![], vec![], &EnvelopeConfig::default(), &mut rng).unwrap();
        let last = ct.body.len() - 1;
        ct.body[last] ^= 0xFF;

        let decrypted = decrypt_vault(&UniformOracle, &ct, b"master", &VaultCodecConfig::default(), 1.0).unwrap();
        assert!(decrypted.is_decoy);
        assert_eq!(decrypted.passwords.len(), 1);
    }

    #[test]
    fn append_then_decrypt_matches_direct_encode() {
        let mut rng = StdRng::seed_from_u64(4);
        let ct = encrypt_vault(&UniformOracle, &["a".to_string()], b"master", vec![], vec![], &EnvelopeConfig::default(), &mut rng).unwrap();

        let appended = append_password(&UniformOracle, &ct, &["a".to_string()], "master", "b", &EnvelopeConfig::default(), &mut rng).unwrap();

        let decrypted = decrypt_vault(&UniformOracle, &appended, b"master", &VaultCodecConfig::default(), 1.0).unwrap();
        assert!(!decrypted.is_decoy);
        assert_eq!(decrypted.passwords, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn ciphertext_survives_a_flatten_roundtrip() {
        let mut rng = StdRng::seed_from_u64(5);
        let passwords = vec!["pw1".to_string()];
        let ct = encrypt_vault(&UniformOracle, &passwords, b"master", vec![], vec![], &EnvelopeConfig::default(), &mut rng).unwrap();

        let flat = ct.to_bytes();
        let parsed = VaultCiphertext::from_bytes(&flat).unwrap();
        assert_eq!(parsed, ct);

        let decrypted = decrypt_vault(&UniformOracle, &parsed, b"master", &VaultCodecConfig::default(), 1.0).unwrap();
        assert_eq!(decrypted.passwords, passwords);
    }

    #[test]
    fn flatten_roundtrip_rejects_truncated_input() {
        assert!(matches!(
            VaultCiphertext::from_bytes(&[0u8; 4]),
            Err(EnvelopeError::Malformed(_))
        ));
    }
}
