//! Envelope error type (C6, C7).

use honeyvault_codec::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// AEAD tag verification failed. Never surfaced by
    /// [`crate::decrypt_vault`] in production use — it is caught and
    /// turned into a synthesized decoy (C7). Exposed mainly so the lower
    /// [`crate::aead`] layer has something to return.
    #[error("authentication failed (wrong key or corrupted data)")]
    AuthFailure,

    /// Header or payload structurally broken: bad magic, truncated buffer,
    /// unsupported version. Like `AuthFailure`, caught internally by
    /// [`crate::decrypt_vault`] and converted into a decoy.
    #[error("malformed vault file: {0}")]
    Malformed(String),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}
