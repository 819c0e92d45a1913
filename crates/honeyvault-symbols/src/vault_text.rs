//! C1 — vault text framing: passwords <-> a flat `SEP`-delimited symbol stream.

use crate::alphabet::{id_of, is_plain_char, symbol_of, Symbol, SymbolId, SEP};
use crate::error::SymbolError;

/// Prepend `SEP`, then for each password append its symbols and a trailing
/// `SEP`. The final `SEP` is mandatory — it is the vault terminator the
/// decoder looks for.
///
/// Rejects any password containing a character outside the 95-symbol
/// printable range, since such a character would collide with the
/// reserved-marker id space (`SEP`/`PAD`/`UNK`) rather than round-trip.
pub fn encode_vault<S: AsRef<str>>(passwords: &[S]) -> Result<Vec<SymbolId>, SymbolError> {
    let mut out = Vec::with_capacity(passwords.iter().map(|p| p.as_ref().len() + 1).sum::<usize>() + 1);
    out.push(SEP);
    for password in passwords {
        for c in password.as_ref().chars() {
            if !is_plain_char(c) {
                return Err(SymbolError::ReservedSymbol(c));
            }
            out.push(id_of(c));
        }
        out.push(SEP);
    }
    Ok(out)
}

/// Split a symbol stream on `SEP`. The very first `SEP` is the mandatory
/// frame prefix `encode_vault` prepends, not a password terminator, so
/// nothing is flushed for it; every `SEP` after that flushes the buffer
/// accumulated since the previous one — *including when it's empty*, since
/// an empty-string password is a real, distinct entry the encoder frames
/// exactly like any other (dropping it would make `[""]` indistinguishable
/// from `[]`). Reserved markers (`PAD`, `UNK`) encountered mid-password are
/// dropped rather than rendered, so a decoded password never contains a
/// reserved symbol (required by P2's totality guarantee).
pub fn decode_stream(symbols: &[SymbolId]) -> Vec<String> {
    let mut passwords = Vec::new();
    let mut current = String::new();
    let mut started = false;

    for &id in symbols {
        if id == SEP {
            if started {
                passwords.push(std::mem::take(&mut current));
            }
            started = true;
            continue;
        }
        if let Symbol::Char(c) = symbol_of(id) {
            current.push(c);
        }
    }
    // A trailing, unterminated password (no closing SEP) is still surfaced —
    // this happens when the caller truncates the stream before the final
    // terminator (e.g. a bounds-limited decode).
    if !current.is_empty() {
        passwords.push(current);
    }
    passwords
}
