//! AEAD sealing (C6): AES-256-GCM with the header bytes as associated data,
//! so tampering with any header field (KDF cost, salt, nonce, counts)
//! invalidates the tag even though those fields are necessarily stored in
//! the clear.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};

use crate::error::EnvelopeError;

#[allow(deprecated)] // aes-gcm 0.10 depends on generic-array 0.x
pub fn seal(key: &[u8; 32], nonce: &[u8; 12], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher
        .encrypt(Nonce::from_slice(nonce), Payload { msg: plaintext, aad })
        .map_err(|_| EnvelopeError::AuthFailure)
}

#[allow(deprecated)]
pub fn open(key: &[u8; 32], nonce: &[u8; 12], aad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher
        .decrypt(Nonce::from_slice(nonce), Payload { msg: ciphertext, aad })
        .map_err(|_| EnvelopeError::AuthFailure)
}
