//! Facade error type: aggregates every layer beneath it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HoneyVaultError {
    #[error(transparent)]
    Envelope(#[from] honeyvault_envelope::EnvelopeError),
}
