//! C2 — Distribution Oracle adapter.
//!
//! Wraps the external next-symbol predictor (out of scope per spec.md §1 —
//! training pipeline and model architecture are a black box here) behind a
//! thin, validated contract: `predict(context) -> π`, a length-`ALPHABET_SIZE`
//! probability vector. The oracle itself must be a pure, reentrant function
//! of `context`; this module owns clamping, normalization, and the context
//! truncation the spec's design notes (§9) call for ("context grows
//! unboundedly in the source; the spec requires truncation to the oracle's
//! receptive field, eliminating hidden quadratic blow-up").

use log::warn;

use crate::error::CodecError;
use honeyvault_symbols::{SymbolId, ALPHABET_SIZE};

/// Numerical floor applied to every probability before use (spec.md §3).
pub const EPSILON: f64 = 1e-10;

/// A black-box next-symbol predictor.
///
/// Implementations MUST be deterministic in `context` and safe to call from
/// multiple threads concurrently (spec.md §5); this crate never mutates
/// shared state across calls. An implementation wrapping a non-reentrant
/// model is responsible for its own internal locking.
pub trait DistributionOracle: Send + Sync {
    /// Raw probability vector for the next symbol given `context`. Must have
    /// length [`ALPHABET_SIZE`] and entries that are nonnegative and sum to
    /// ~1; [`predict`] validates this and turns violations into
    /// [`CodecError::OracleFailure`].
    fn raw_predict(&self, context: &[SymbolId]) -> Vec<f64>;

    /// Maximum context length (in symbols) the model actually conditions on.
    /// Longer contexts are truncated to their tail before the call, per the
    /// "eliminate hidden quadratic blow-up" design note. `usize::MAX` (the
    /// default) disables truncation.
    fn max_context_len(&self) -> usize {
        usize::MAX
    }
}

/// Validate and normalize a raw oracle call: truncate the context to the
/// oracle's receptive field, then clamp/renormalize the returned vector.
pub fn predict(oracle: &dyn DistributionOracle, context: &[SymbolId]) -> Result<Vec<f64>, CodecError> {
    let max_len = oracle.max_context_len();
    let truncated = if context.len() > max_len {
        &context[context.len() - max_len..]
    } else {
        context
    };

    let mut pi = oracle.raw_predict(truncated);
    if pi.len() != ALPHABET_SIZE {
        warn!("oracle returned {} probabilities, expected {}", pi.len(), ALPHABET_SIZE);
        return Err(CodecError::OracleFailure(format!(
            "expected {} probabilities, got {}",
            ALPHABET_SIZE,
            pi.len()
        )));
    }
    if pi.iter().any(|p| !p.is_finite() || *p < 0.0) {
        warn!("oracle returned a negative or non-finite probability");
        return Err(CodecError::OracleFailure(
            "probability vector contains a negative or non-finite entry".into(),
        ));
    }

    // Clamp at epsilon (spec.md §3: "the oracle guarantees no element is
    // exactly zero after smoothing; an implementation MUST clamp at ε").
    for p in pi.iter_mut() {
        if *p < EPSILON {
            *p = EPSILON;
        }
    }

    let sum: f64 = pi.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        return Err(CodecError::OracleFailure("probability vector sums to zero".into()));
    }
    // Renormalize so the vector sums to exactly 1 within tolerance, absorbing
    // clamping drift rather than letting it accumulate into the cumulative
    // interval math.
    for p in pi.iter_mut() {
        *p /= sum;
    }

    Ok(pi)
}

/// Uniform distribution over the alphabet excluding `SEP`/`PAD`/`UNK` being
/// favored — every symbol, reserved or not, gets equal mass. Under this
/// oracle every chunk width is 8 bits (`ceil(-log2(1/98)) + 1 = 8`), which
/// makes the codec reduce to fixed-width base-98 arithmetic: exactly the
/// property spec.md §8 uses to make its concrete scenarios reproducible
/// without a trained model.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformOracle;

impl DistributionOracle for UniformOracle {
    fn raw_predict(&self, _context: &[SymbolId]) -> Vec<f64> {
        vec![1.0 / ALPHABET_SIZE as f64; ALPHABET_SIZE]
    }
}

/// Zipf-skewed test double: symbol `i` gets mass proportional to
/// `1 / (i + 1)`, independent of context. Used alongside [`UniformOracle`] as
/// the second required test double (spec.md §9: "a test double implementing
/// uniform or Zipf distributions is required for the test suite").
#[derive(Debug, Clone, Copy)]
pub struct ZipfOracle {
    pub exponent: f64,
}

impl Default for ZipfOracle {
    fn default() -> Self {
        ZipfOracle { exponent: 1.0 }
    }
}

impl DistributionOracle for ZipfOracle {
    fn raw_predict(&self, _context: &[SymbolId]) -> Vec<f64> {
        let weights: Vec<f64> = (1..=ALPHABET_SIZE)
            .map(|i| 1.0 / (i as f64).powf(self.exponent))
            .collect();
        let total: f64 = weights.iter().sum();
        weights.into_iter().map(|w| w / total).collect()
    }
}
