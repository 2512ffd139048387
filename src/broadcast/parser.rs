// Broadcast Parser
// Fixed-offset decoding of a 25-byte frame into typed fields

use super::model::{
    Broadcast, DecodedBroadcast, ExtrasRecord, PayloadKind, PayloadText, Status, ICON_CATALOG,
};
use crate::codec::BroadcastFrame;

const TEXT_OFFSET: usize = 7;
const SIMPLE_TEXT_LEN: usize = 17;
const SEGMENT_LEN: usize = 6;
const EXTRAS_AMOUNT_OFFSET: usize = 7;
const EXTRAS_LABEL_OFFSET: usize = 9;
const EXTRAS_LABEL_LEN: usize = 14;

/// Stateless frame parser
pub struct BroadcastParser;

impl BroadcastParser {
    /// Parse a decrypted frame
    pub fn parse(frame: &BroadcastFrame) -> Broadcast {
        let header = frame.byte(0);
        let status = Status::from_code(header >> 4);
        if let Some(status) = status.filter(Status::is_reset) {
            return Broadcast::Reset(status);
        }

        let icon = ICON_CATALOG.get((header & 0x07) as usize).copied();

        let primary_value = (frame.byte(1) as u32) << 16
            | (frame.byte(2) as u32) << 8
            | frame.byte(3) as u32;
        let secondary_value = u16::from_be_bytes([frame.byte(4), frame.byte(5)]);

        let payload_kind = PayloadKind(frame.byte(6));

        Broadcast::Update(DecodedBroadcast {
            status,
            icon,
            primary_value,
            secondary_value,
            payload_kind,
            text: Self::parse_text(frame, payload_kind),
            extras: Self::parse_extras(frame, payload_kind),
        })
    }

    fn parse_text(frame: &BroadcastFrame, kind: PayloadKind) -> Option<PayloadText> {
        let simple = || trim_field(frame.field(TEXT_OFFSET, SIMPLE_TEXT_LEN));

        match kind {
            PayloadKind::SIMPLE_TEXT => Some(PayloadText::Text(simple())),
            PayloadKind::SEGMENTED_TEXT => {
                let segments: Vec<String> = (0..3)
                    .map(|i| trim_field(frame.field(TEXT_OFFSET + i * SEGMENT_LEN, SEGMENT_LEN)))
                    .collect();
                Some(PayloadText::Text(segments.join(" ")))
            }
            PayloadKind::IDENTIFIER_1 => Some(PayloadText::Identifier1(simple())),
            PayloadKind::IDENTIFIER_2 => Some(PayloadText::Identifier2(simple())),
            _ => None,
        }
    }

    fn parse_extras(frame: &BroadcastFrame, kind: PayloadKind) -> Option<ExtrasRecord> {
        if !kind.has_extras() {
            return None;
        }

        let amount = u16::from_be_bytes([
            frame.byte(EXTRAS_AMOUNT_OFFSET),
            frame.byte(EXTRAS_AMOUNT_OFFSET + 1),
        ]);
        let mut label = trim_field(frame.field(EXTRAS_LABEL_OFFSET, EXTRAS_LABEL_LEN));
        if !label.is_empty() {
            if let Some(suffix) = kind.extras_suffix() {
                label.push_str(suffix);
            }
        }

        Some(ExtrasRecord { label, amount })
    }
}

/// Decode a fixed-width string field.
///
/// Invalid UTF-8 yields an empty string. Surrounding spaces and tabs are
/// trimmed (line breaks are kept), then embedded NULs are removed.
pub fn trim_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text
            .trim_matches(|c: char| c == ' ' || c == '\t')
            .replace('\0', ""),
        Err(_) => String::new(),
    }
}
