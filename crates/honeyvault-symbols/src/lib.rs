//! Fixed alphabet and vault text framing for the honey-encryption codec.
//!
//! This crate is the foundation every other `honeyvault-*` crate builds on:
//! a stable, versioned symbol table (C1) and the text framing rules that
//! turn a list of passwords into a flat symbol stream and back.

pub mod alphabet;
pub mod error;
pub mod vault_text;

pub use alphabet::{Symbol, SymbolId, ALPHABET_SIZE, PAD, SEP, UNK};
pub use error::SymbolError;
pub use vault_text::{decode_stream, encode_vault};
