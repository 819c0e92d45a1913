//! C8 — Incremental Appender.
//!
//! Adding one password to an existing vault re-encodes only the new
//! password's symbols and concatenates them onto the existing seed bits;
//! every bit already written for the existing passwords is untouched. This
//! needs the *exact* bit count already used, not just the byte length — the
//! last byte of a seed is usually only partially filled, and resuming from
//! the wrong bit offset would either corrupt real data or leave a gap of
//! stray zero bits that decode would try to interpret as symbols.
//!
//! Callers are responsible for persisting `bits_used` alongside the seed
//! bytes between calls (`SPEC_FULL.md` puts it in the envelope's sidecar
//! metadata as `seed_bits`, since the wire format's payload layout has no
//! field of its own for it).

use log::{debug, warn};
use rand::RngCore;

use crate::bitpack::BitWriter;
use crate::cancel::CancelToken;
use crate::error::CodecError;
use crate::oracle::{self, DistributionOracle};
use crate::interval;
use crate::vault_codec::{validate_password, EncodedVault};

/// Append `new_password` to a vault whose existing passwords and exact seed
/// bit-length are supplied by the caller. The existing passwords are needed
/// to rebuild the oracle context the new password's symbols must be
/// conditioned on — the codec has no state of its own between calls.
pub fn append_password(
    oracle: &dyn DistributionOracle,
    existing_passwords: &[impl AsRef<str>],
    old_seed: &[u8],
    old_bits_used: usize,
    new_password: &str,
    rng: &mut impl RngCore,
    cancel: &dyn CancelToken,
) -> Result<EncodedVault, CodecError> {
    if old_bits_used > old_seed.len() * 8 {
        warn!(
            "append_password: caller-supplied bits_used ({old_bits_used}) exceeds seed length ({} bits)",
            old_seed.len() * 8
        );
        return Err(CodecError::InvalidInput(format!(
            "bits_used {old_bits_used} exceeds seed length {} bits",
            old_seed.len() * 8
        )));
    }

    let mut context = honeyvault_symbols::encode_vault(existing_passwords)?;
    let new_symbols = validate_password(new_password)?;
    debug!(
        "appending {} symbol(s) onto a {old_bits_used}-bit prefix, context length {}",
        new_symbols.len(),
        context.len()
    );

    let mut writer = BitWriter::from_existing(old_seed, old_bits_used);
    for &sym in &new_symbols {
        if cancel.is_cancelled() {
            debug!("append cancelled mid-password");
            return Err(CodecError::Aborted);
        }
        let pi = oracle::predict(oracle, &context)?;
        let cum = interval::cumulative(&pi);
        let (v, b) = interval::encode_symbol(&cum, sym as usize, rng);
        writer.push_bits(v, b);
        context.push(sym);
    }

    let (seed_bytes, bits_used) = writer.into_bytes();
    Ok(EncodedVault { seed_bytes, bits_used })
}
