// ASCII hex pairing
// Packs consecutive pairs of ASCII hex digits into bytes, high nibble first

use super::CodecError;

/// Decode the payload region of an advertisement.
///
/// Embedded spaces are skipped, at most `max_chars` digits are read, and the
/// digits are packed pairwise. Any non-hex digit rejects the whole payload.
pub fn decode_hex_pairs(text: &str, max_chars: usize) -> Result<Vec<u8>, CodecError> {
    let digits: String = text.chars().filter(|c| *c != ' ').take(max_chars).collect();
    if !digits.is_ascii() {
        return Err(CodecError::InvalidHex("non-ASCII digit".to_string()));
    }
    let even = digits.len() - digits.len() % 2;
    ::hex::decode(&digits[..even]).map_err(|e| CodecError::InvalidHex(e.to_string()))
}
