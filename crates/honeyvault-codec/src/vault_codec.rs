//! C5 — Vault Codec: end to end password-list <-> seed-bytes conversion,
//! built out of C1 (symbol framing), C2 (oracle), C3 (interval codec) and
//! C4 (bit packer).

use log::debug;
use honeyvault_symbols::alphabet::{id_of, is_plain_char, symbol_of, Symbol};
use honeyvault_symbols::{SymbolId, SEP};
use rand::RngCore;

use crate::bitpack::{BitReader, BitWriter};
use crate::cancel::CancelToken;
use crate::error::CodecError;
use crate::oracle::{self, DistributionOracle};
use crate::interval;

/// Bounds the decoder enforces so it stays total and bounded-time over any
/// input seed, including ones no encoder ever produced (spec.md §5, §9).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VaultCodecConfig {
    pub max_passwords: usize,
    pub max_total_length: usize,
    pub max_password_length: usize,
}

impl Default for VaultCodecConfig {
    fn default() -> Self {
        VaultCodecConfig {
            max_passwords: 50,
            max_total_length: 1000,
            max_password_length: 25,
        }
    }
}

/// Result of encoding a vault: the packed seed bytes plus the exact bit
/// count written. [`crate::appender`] needs the bit count, not just the
/// byte length, to resume packing without corrupting the final partial byte.
#[derive(Debug, Clone)]
pub struct EncodedVault {
    pub seed_bytes: Vec<u8>,
    pub bits_used: usize,
}

/// Encode a full password list into a honey-seed. The leading `SEP` that
/// [`honeyvault_symbols::encode_vault`] prepends seeds the oracle's initial
/// context but is never itself encoded as a bit chunk — only the symbols
/// that follow it (each password's characters, and the `SEP` terminating
/// it) are, each conditioned on every symbol encoded before it.
pub fn encode(
    oracle: &dyn DistributionOracle,
    passwords: &[impl AsRef<str>],
    rng: &mut impl RngCore,
    cancel: &dyn CancelToken,
) -> Result<EncodedVault, CodecError> {
    let symbols = honeyvault_symbols::encode_vault(passwords)?;
    let mut writer = BitWriter::new();
    let mut context: Vec<SymbolId> = vec![symbols[0]];

    for &sym in &symbols[1..] {
        if cancel.is_cancelled() {
            debug!("encode cancelled after {} of {} symbols", context.len() - 1, symbols.len() - 1);
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

/// Decode a honey-seed back into a password list. Total over any byte
/// string: a seed no real encoder produced still yields *some* plausible
/// list, bounded by `config`, rather than erroring — that totality is what
/// lets the envelope synthesize a decoy vault from a wrong decryption key
/// (spec.md C7).
pub fn decode(
    oracle: &dyn DistributionOracle,
    seed_bytes: &[u8],
    config: &VaultCodecConfig,
    cancel: &dyn CancelToken,
) -> Result<Vec<String>, CodecError> {
    let mut reader = BitReader::new(seed_bytes);
    let mut context: Vec<SymbolId> = vec![SEP];
    let mut passwords = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    let mut total_symbols = 0usize;

    while passwords.len() < config.max_passwords
        && total_symbols < config.max_total_length
        && !reader.is_exhausted()
    {
        if cancel.is_cancelled() {
            debug!("decode cancelled after {total_symbols} symbols");
            return Err(CodecError::Aborted);
        }
        let pi = oracle::predict(oracle, &context)?;
        let cum = interval::cumulative(&pi);
        let (id, _bits) = interval::decode_symbol(&cum, &mut reader);
        context.push(id);
        total_symbols += 1;

        match symbol_of(id) {
            // Flush unconditionally, even when `current` is empty: an empty
            // password is a real, distinct entry (the encoder emits a SEP for
            // it just like any other), and only flushing on a nonempty buffer
            // would make a one-element vault holding `""` indistinguishable
            // from a zero-element vault, breaking P1 round-tripping.
            Symbol::Sep => {
                passwords.push(std::mem::take(&mut current));
                current_len = 0;
            }
            Symbol::Char(c) => {
                current.push(c);
                current_len += 1;
                if current_len > config.max_password_length {
                    passwords.push(std::mem::take(&mut current));
                    current_len = 0;
                }
            }
            // PAD/UNK: reserved markers never surface in decoded text
            // (mirrors honeyvault_symbols::decode_stream).
            Symbol::Pad | Symbol::Unk => {}
        }
    }

    if current_len > 0 && passwords.len() < config.max_passwords {
        passwords.push(current);
    }

    Ok(passwords)
}

/// Validate and symbol-encode a single password for use by
/// [`crate::appender`], independent of any existing vault's symbol stream.
pub(crate) fn validate_password(password: &str) -> Result<Vec<SymbolId>, CodecError> {
    let mut out = Vec::with_capacity(password.len() + 1);
    for c in password.chars() {
        if !is_plain_char(c) {
            return Err(CodecError::InvalidInput(format!(
                "password contains a reserved symbol: {c:?}"
            )));
        }
        out.push(id_of(c));
    }
    out.push(SEP);
    Ok(out)
}
