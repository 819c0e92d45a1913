//! Error type for the IS-PMTE codec (C2–C5, C8).

use honeyvault_symbols::SymbolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("distribution oracle failure: {0}")]
    OracleFailure(String),

    #[error("operation aborted")]
    Aborted,

    #[error("internal codec invariant violated: {0}")]
    InternalInvariant(String),
}

impl From<SymbolError> for CodecError {
    fn from(e: SymbolError) -> Self {
        CodecError::InvalidInput(e.to_string())
    }
}
