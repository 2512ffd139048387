// Codec module - THE WIRE
// Turns raw advertisement text into an owned, decrypted broadcast frame

mod advert;
mod cipher;
mod digits;
mod frame;

pub use advert::{extract_payload, render_advertisement, AdvertDecoder};
pub use cipher::{decrypt_frame, Cipher, CipherError, PassthroughCipher, ENCRYPTED_LEN};
pub use digits::decode_hex_pairs;
pub use frame::BroadcastFrame;

use thiserror::Error;

/// Reasons an advertisement record is dropped by the codec
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Record too short: {0} characters")]
    TooShort(usize),

    #[error("Record lacks the protocol marker")]
    MissingMarker,

    #[error("Record lacks the payload delimiter")]
    MissingDelimiter,

    #[error("Payload truncated: {0} bytes")]
    Truncated(usize),

    #[error("Invalid hex payload: {0}")]
    InvalidHex(String),

    #[error("Decryption failed: {0}")]
    Decrypt(#[from] CipherError),
}

impl CodecError {
    /// Check if the record simply is not one of ours (as opposed to a damaged one)
    pub fn is_foreign(&self) -> bool {
        matches!(
            self,
            Self::TooShort(_) | Self::MissingMarker | Self::MissingDelimiter
        )
    }
}
