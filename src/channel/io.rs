// Channel I/O decoding
// Maps a channel value update to the notification it produces, if any

use super::Channel;
use crate::notify::Notification;

/// Bytes written for a text message
pub fn encode_text(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// Decode a value update from `channel`.
///
/// - value: little-endian unsigned integer (up to 8 bytes), surfaced if non-zero
/// - text: UTF-8, surfaced if non-empty
/// - token / confirmation: UTF-8 read-back, surfaced as a confirmation
pub fn decode_update(channel: Channel, bytes: &[u8]) -> Option<Notification> {
    match channel {
        Channel::Value => {
            let mut buf = [0u8; 8];
            let len = bytes.len().min(buf.len());
            buf[..len].copy_from_slice(&bytes[..len]);
            let value = u64::from_le_bytes(buf);
            (value != 0).then_some(Notification::Value3(value))
        }
        Channel::Text => std::str::from_utf8(bytes)
            .ok()
            .filter(|text| !text.is_empty())
            .map(|text| Notification::Text2(text.to_string())),
        Channel::Token | Channel::Confirmation => std::str::from_utf8(bytes)
            .ok()
            .map(|text| Notification::ConfirmationReceived(text.to_string())),
    }
}
