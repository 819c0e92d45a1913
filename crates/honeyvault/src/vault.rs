//! Public core API (spec.md §6): `encrypt_vault` / `decrypt_vault` /
//! `append_password`, plus the single-file on-disk convenience wrapping
//! [`honeyvault_envelope::VaultCiphertext`] the way
//! `salvium_wallet::encryption::encrypt_wallet_data` returns one flattened
//! byte buffer rather than a header/body pair the caller must track apart.

use rand::thread_rng;

use honeyvault_codec::DistributionOracle;
use honeyvault_envelope::{
    self, DecryptedVault, EnvelopeConfig, HoneyAccountStub, PlaintextEntry, VaultCiphertext,
};
use honeyvault_codec::VaultCodecConfig;

use crate::error::HoneyVaultError;

/// Tunables for a vault operation, grouped the way
/// `salvium_wallet::encryption`'s Argon2 constants are grouped, but passed
/// explicitly rather than held as module statics (spec.md §9: "single
/// configured instance per vault").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoneyVaultConfig {
    pub codec: VaultCodecConfig,
    pub envelope: EnvelopeConfig,
    /// Sampling temperature for decoy synthesis (spec.md §4.7); `1.0` draws
    /// directly from the oracle's own distribution.
    pub decoy_temperature: f64,
}

impl Default for HoneyVaultConfig {
    fn default() -> Self {
        HoneyVaultConfig {
            codec: VaultCodecConfig::default(),
            envelope: EnvelopeConfig::default(),
            decoy_temperature: 1.0,
        }
    }
}

/// Encrypt a fresh vault under `master`, returning the complete on-disk
/// file contents (header and AEAD body flattened into one buffer).
pub fn encrypt_vault(
    oracle: &dyn DistributionOracle,
    passwords: &[impl AsRef<str>],
    master: &[u8],
    plaintext_entries: Vec<PlaintextEntry>,
    honey_accounts: Vec<HoneyAccountStub>,
    config: &HoneyVaultConfig,
) -> Result<Vec<u8>, HoneyVaultError> {
    let mut rng = thread_rng();
    let ciphertext = honeyvault_envelope::encrypt_vault(
        oracle,
        passwords,
        master,
        plaintext_entries,
        honey_accounts,
        &config.envelope,
        &mut rng,
    )?;
    Ok(ciphertext.to_bytes())
}

/// Decrypt a vault file. Total over `master` (spec.md §7): a wrong master
/// still returns `Ok`, with `DecryptedVault::is_decoy` set. A `data` buffer
/// that isn't shaped like a vault file at all (bad magic, truncated header,
/// unsupported version) is a hard error — there's no salt or password count
/// to seed a decoy from at that point, so this one case sits outside the
/// honey-encryption totality guarantee, which is about wrong *keys* against
/// a well-formed file, not arbitrary byte garbage.
pub fn decrypt_vault(
    oracle: &dyn DistributionOracle,
    data: &[u8],
    master: &[u8],
    config: &HoneyVaultConfig,
) -> Result<DecryptedVault, HoneyVaultError> {
    let ciphertext = VaultCiphertext::from_bytes(data)?;
    Ok(honeyvault_envelope::decrypt_vault(
        oracle,
        &ciphertext,
        master,
        &config.codec,
        config.decoy_temperature,
    )?)
}

/// Append one password to an existing vault file without re-encoding the
/// passwords already stored in it (C8). The caller supplies the existing
/// plaintext passwords in the order they were encoded, since the codec
/// keeps no state of its own between calls.
pub fn append_password(
    oracle: &dyn DistributionOracle,
    data: &[u8],
    existing_passwords: &[impl AsRef<str>],
    master: &str,
    new_password: &str,
    config: &HoneyVaultConfig,
) -> Result<Vec<u8>, HoneyVaultError> {
    let ciphertext = VaultCiphertext::from_bytes(data)?;
    let mut rng = thread_rng();
    let appended = honeyvault_envelope::append_password(
        oracle,
        &ciphertext,
        existing_passwords,
        master,
        new_password,
        &config.envelope,
        &mut rng,
    )?;
    Ok(appended.to_bytes())
}

/// `true` if `data` starts with a recognized vault header. Mirrors
/// `salvium_wallet::encryption::is_encrypted_wallet`'s cheap file-type probe
/// ahead of any key derivation.
pub fn is_vault(data: &[u8]) -> bool {
    honeyvault_envelope::VaultHeader::from_bytes(data).is_ok()
}

/// The vault format version a file declares, without attempting to open it.
pub fn vault_version(data: &[u8]) -> Option<u16> {
    honeyvault_envelope::VaultHeader::from_bytes(data)
        .ok()
        .map(|h| h.version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use honeyvault_codec::UniformOracle;

    #[test]
    fn encrypt_then_decrypt_recovers_the_real_vault() {
        let passwords = vec!["hunter2".to_string(), "correct horse battery staple".to_string()];
        let data = encrypt_vault(&UniformOracle, &passwords, b"my master secret", vec![], vec![], &HoneyVaultConfig::default()).unwrap();

        assert!(is_vault(&data));
        assert_eq!(vault_version(&data), Some(honeyvault_envelope::VERSION));

        let decrypted = decrypt_vault(&UniformOracle, &data, b"my master secret", &HoneyVaultConfig::default()).unwrap();
        assert!(!decrypted.is_decoy);
        assert_eq!(decrypted.passwords, passwords);
    }

    #[test]
    fn wrong_master_yields_a_plausible_decoy_not_an_error() {
        let passwords = vec!["only-one".to_string()];
        let data = encrypt_vault(&UniformOracle, &passwords, b"right", vec![], vec![], &HoneyVaultConfig::default()).unwrap();

        let decrypted = decrypt_vault(&UniformOracle, &data, b"wrong", &HoneyVaultConfig::default()).unwrap();
        assert!(decrypted.is_decoy);
        assert_eq!(decrypted.passwords.len(), 1);
    }

    #[test]
    fn append_extends_the_vault_in_place() {
        let data = encrypt_vault(&UniformOracle, &["first".to_string()], b"master", vec![], vec![], &HoneyVaultConfig::default()).unwrap();
        let appended = append_password(&UniformOracle, &data, &["first".to_string()], "master", "second", &HoneyVaultConfig::default()).unwrap();

        let decrypted = decrypt_vault(&UniformOracle, &appended, b"master", &HoneyVaultConfig::default()).unwrap();
        assert_eq!(decrypted.passwords, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn garbage_input_is_a_hard_error_not_a_decoy() {
        let junk = vec![0xAAu8; 16];
        let err = decrypt_vault(&UniformOracle, &junk, b"anything", &HoneyVaultConfig::default()).unwrap_err();
        assert!(matches!(err, HoneyVaultError::Envelope(_)));
    }
}
