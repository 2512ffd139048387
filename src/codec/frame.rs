// Broadcast Frame
// Owned 25-byte decoded payload: 24 decrypted bytes plus a plaintext trailer

use crate::config::FRAME_LEN;
use std::fmt;

/// A decoded and decrypted broadcast payload
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BroadcastFrame([u8; FRAME_LEN]);

impl BroadcastFrame {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// Byte at `index`
    pub fn byte(&self, index: usize) -> u8 {
        self.0[index]
    }

    /// Slice `[start, start + len)`
    pub fn field(&self, start: usize, len: usize) -> &[u8] {
        &self.0[start..start + len]
    }

    /// The plaintext trailer byte, never passed through the cipher
    pub fn trailer(&self) -> u8 {
        self.0[FRAME_LEN - 1]
    }
}

impl fmt::Debug for BroadcastFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BroadcastFrame({})", hex::encode_upper(self.0))
    }
}
