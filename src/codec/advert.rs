// Advertisement text handling
// Locates the payload region inside a raw advertisement record and decodes it

use super::{decode_hex_pairs, decrypt_frame, BroadcastFrame, Cipher, CodecError};
use crate::config::{AdvertFormat, FRAME_LEN};

/// Extract the payload-bearing text from an advertisement record.
///
/// The record must be at least `min_length` characters and contain both the
/// marker and the delimiter. The payload starts `payload_offset` characters
/// after the delimiter (the delimiter itself is position 0).
pub fn extract_payload<'a>(text: &'a str, format: &AdvertFormat) -> Result<&'a str, CodecError> {
    let length = text.chars().count();
    if length < format.min_length {
        return Err(CodecError::TooShort(length));
    }
    if !text.contains(format.marker.as_str()) {
        return Err(CodecError::MissingMarker);
    }
    let start = text.find(format.delimiter).ok_or(CodecError::MissingDelimiter)?;

    let tail = &text[start..];
    match tail.char_indices().nth(format.payload_offset) {
        Some((offset, _)) => Ok(&tail[offset..]),
        None => Err(CodecError::Truncated(0)),
    }
}

/// Render a frame as an advertisement record in `format`.
///
/// Produces the text a radio stack would hand over for a broadcaster sending
/// `frame` unencrypted; used by the simulator and the `synth` command.
pub fn render_advertisement(frame: &[u8; FRAME_LEN], format: &AdvertFormat) -> String {
    let digits = hex::encode_upper(frame);
    let grouped: Vec<&str> = digits
        .as_bytes()
        .chunks(8)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .collect();

    let filler = "0".repeat(format.payload_offset.saturating_sub(1));
    let mut text = format!(
        "<{}> {}{}{}",
        format.marker,
        format.delimiter,
        filler,
        grouped.join(" ")
    );
    while text.chars().count() < format.min_length {
        text.push(' ');
    }
    text
}

/// Full wire pipeline: text -> payload -> bytes -> decrypted frame
#[derive(Debug, Clone, Default)]
pub struct AdvertDecoder {
    format: AdvertFormat,
}

impl AdvertDecoder {
    pub fn new(format: AdvertFormat) -> Self {
        Self { format }
    }

    /// Get the advertisement format
    pub fn format(&self) -> &AdvertFormat {
        &self.format
    }

    /// Decode and decrypt one advertisement record
    pub fn decode<C: Cipher + ?Sized>(
        &self,
        text: &str,
        cipher: &C,
    ) -> Result<BroadcastFrame, CodecError> {
        let payload = extract_payload(text, &self.format)?;
        let raw = decode_hex_pairs(payload, self.format.max_hex_chars)?;
        if raw.len() < FRAME_LEN {
            return Err(CodecError::Truncated(raw.len()));
        }
        decrypt_frame(&raw[..FRAME_LEN], cipher)
    }
}
