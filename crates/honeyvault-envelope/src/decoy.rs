//! C7 — Decoy Fallback.
//!
//! Invoked whenever the envelope can't be opened under the given master
//! secret — AEAD tag mismatch, or a malformed payload. Rather than
//! surfacing that failure, it draws a fresh, plausible-looking vault
//! straight from the distribution oracle (sidestepping the IS-PMTE codec
//! entirely: there's no real seed to decode). The result has to be
//! reproducible so that repeated wrong-key attempts against the same
//! envelope can't be told apart by instability — so every random choice is
//! drawn from a `StdRng` seeded from `(key, salt, entry index)`, never from
//! real entropy.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use honeyvault_codec::{oracle, DistributionOracle};
use honeyvault_symbols::alphabet::{symbol_of, Symbol};
use honeyvault_symbols::{SymbolId, SEP};

use crate::sidecar::HoneyAccountStub;

const WEBSITES: &[&str] = &[
    "mailbox.example",
    "cloudstore.example",
    "social.example",
    "bank.example",
    "shop.example",
];
const USERNAMES: &[&str] = &["alex", "jordan", "sam", "taylor", "morgan"];

/// Synthesize exactly `password_count` decoy accounts. `temperature`
/// controls how sharply the oracle's distribution is sampled (spec.md
/// §4.7; `1.0` samples the oracle's own distribution unmodified).
pub fn synthesize(
    oracle: &dyn DistributionOracle,
    key: &[u8; 32],
    salt: &[u8; 32],
    password_count: u32,
    max_password_length: usize,
    temperature: f64,
) -> Vec<HoneyAccountStub> {
    (0..password_count)
        .map(|idx| {
            let mut rng = seeded_rng(key, salt, idx);
            let password = sample_password(oracle, &mut rng, max_password_length, temperature);
            HoneyAccountStub {
                website: format!("{}-{idx}.example", WEBSITES[idx as usize % WEBSITES.len()]),
                username: format!("{}{idx}", USERNAMES[idx as usize % USERNAMES.len()]),
                password,
                created_at: format!("2024-01-{:02}T00:00:00Z", 1 + (idx % 28)),
            }
        })
        .collect()
}

fn seeded_rng(key: &[u8; 32], salt: &[u8; 32], idx: u32) -> StdRng {
    let mut hasher = Sha256::new();
    hasher.update(key);
    hasher.update(salt);
    hasher.update(idx.to_be_bytes());
    let digest = hasher.finalize();
    let seed = u64::from_be_bytes(digest[0..8].try_into().unwrap());
    StdRng::seed_from_u64(seed)
}

fn temperature_scale(pi: &[f64], tau: f64) -> Vec<f64> {
    if (tau - 1.0).abs() < 1e-12 {
        return pi.to_vec();
    }
    let scaled: Vec<f64> = pi.iter().map(|p| p.powf(1.0 / tau)).collect();
    let sum: f64 = scaled.iter().sum();
    scaled.into_iter().map(|p| p / sum).collect()
}

fn sample_symbol(pi: &[f64], rng: &mut StdRng) -> SymbolId {
    let r: f64 = rng.gen();
    let mut acc = 0.0;
    for (i, p) in pi.iter().enumerate() {
        acc += p;
        if r < acc {
            return i as SymbolId;
        }
    }
    (pi.len() - 1) as SymbolId
}

fn sample_password(oracle: &dyn DistributionOracle, rng: &mut StdRng, max_len: usize, tau: f64) -> String {
    let mut context: Vec<SymbolId> = vec![SEP];
    let mut out = String::new();
    loop {
        let pi = match oracle::predict(oracle, &context) {
            Ok(pi) => pi,
            Err(_) => break,
        };
        let scaled = temperature_scale(&pi, tau);
        let id = sample_symbol(&scaled, rng);
        context.push(id);
        match symbol_of(id) {
            Symbol::Sep => break,
            Symbol::Char(c) => {
                out.push(c);
                if out.chars().count() >= max_len {
                    break;
                }
            }
            Symbol::Pad | Symbol::Unk => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use honeyvault_codec::UniformOracle;

    #[test]
    fn same_key_and_salt_produce_identical_decoys() {
        let key = [5u8; 32];
        let salt = [6u8; 32];
        let a = synthesize(&UniformOracle, &key, &salt, 3, 25, 1.0);
        let b = synthesize(&UniformOracle, &key, &salt, 3, 25, 1.0);
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn different_keys_produce_different_decoys() {
        let salt = [6u8; 32];
        let a = synthesize(&UniformOracle, &[1u8; 32], &salt, 2, 25, 1.0);
        let b = synthesize(&UniformOracle, &[2u8; 32], &salt, 2, 25, 1.0);
        assert_ne!(a, b);
    }

    #[test]
    fn passwords_respect_the_length_bound() {
        let key = [9u8; 32];
        let salt = [1u8; 32];
        let decoys = synthesize(&UniformOracle, &key, &salt, 4, 5, 1.0);
        for d in decoys {
            assert!(d.password.chars().count() <= 5);
        }
    }
}
