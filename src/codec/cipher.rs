// Cipher capability and decrypt staging
//
// The symmetric cipher lives outside this crate; keys and IV are provisioned
// inside whatever implements `Cipher`. Only the first 24 bytes of a frame are
// ever handed to it.

use super::{BroadcastFrame, CodecError};
use crate::config::FRAME_LEN;
use thiserror::Error;

/// Number of leading frame bytes that are encrypted
pub const ENCRYPTED_LEN: usize = FRAME_LEN - 1;

/// Errors reported by a cipher implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("Input too short: {0} bytes")]
    ShortInput(usize),

    #[error("Decryption rejected: {0}")]
    Rejected(String),
}

/// Symmetric decryption capability
pub trait Cipher {
    /// Decrypt `data`, returning at least `data.len()` plaintext bytes
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CipherError>;
}

impl<C: Cipher + ?Sized> Cipher for &C {
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        (**self).decrypt(data)
    }
}

impl<C: Cipher + ?Sized> Cipher for Box<C> {
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        (**self).decrypt(data)
    }
}

/// Identity cipher for broadcasters that transmit in the clear
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCipher;

impl Cipher for PassthroughCipher {
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        Ok(data.to_vec())
    }
}

/// Decrypt a raw frame into a freshly owned one.
///
/// Bytes `0..24` go through the cipher; the trailer byte is copied verbatim.
/// The raw input is never modified.
pub fn decrypt_frame<C: Cipher + ?Sized>(
    raw: &[u8],
    cipher: &C,
) -> Result<BroadcastFrame, CodecError> {
    if raw.len() < FRAME_LEN {
        return Err(CodecError::Truncated(raw.len()));
    }

    let plain = cipher.decrypt(&raw[..ENCRYPTED_LEN])?;
    if plain.len() < ENCRYPTED_LEN {
        return Err(CipherError::ShortInput(plain.len()).into());
    }

    let mut bytes = [0u8; FRAME_LEN];
    bytes[..ENCRYPTED_LEN].copy_from_slice(&plain[..ENCRYPTED_LEN]);
    bytes[ENCRYPTED_LEN] = raw[ENCRYPTED_LEN];
    Ok(BroadcastFrame::from_bytes(bytes))
}
