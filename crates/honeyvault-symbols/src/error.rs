//! Error type for symbol-table and vault-text operations.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymbolError {
    #[error("password contains a reserved symbol: {0:?}")]
    ReservedSymbol(char),
}
