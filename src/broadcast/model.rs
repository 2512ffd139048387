// Broadcast Model
// Typed fields decoded from one broadcast frame

use serde::{Deserialize, Serialize};
use std::fmt;

/// Presentation icons, indexed by the low three bits of byte 0
pub const ICON_CATALOG: [&str; 7] = [
    "icon1.png",
    "icon2.png",
    "icon3.png",
    "icon4.png",
    "icon5.png",
    "icon6.png",
    "icon7.png",
];

/// Highest status code the protocol defines
pub const MAX_STATUS: u8 = 11;

// ============================================================================
// STATUS
// ============================================================================

/// Broadcaster status code (0-11)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Status(u8);

impl Status {
    /// Status from a raw code; codes above 11 are not defined
    pub fn from_code(code: u8) -> Option<Self> {
        (code <= MAX_STATUS).then_some(Self(code))
    }

    /// Get the raw code
    pub fn code(&self) -> u8 {
        self.0
    }

    /// Codes 0, 1 and 6 mean the broadcaster is invalid or resetting
    pub fn is_reset(&self) -> bool {
        matches!(self.0, 0 | 1 | 6)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// PAYLOAD KIND
// ============================================================================

/// Byte 6 of a frame: selects the text rule and the extras sub-record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayloadKind(pub u8);

impl PayloadKind {
    pub const SIMPLE_TEXT: PayloadKind = PayloadKind(0x00);
    pub const SEGMENTED_TEXT: PayloadKind = PayloadKind(0x01);
    pub const IDENTIFIER_1: PayloadKind = PayloadKind(0x20);
    pub const IDENTIFIER_2: PayloadKind = PayloadKind(0x21);

    /// Kinds in `[0x80, 0xC0)` carry an extras record
    pub fn has_extras(&self) -> bool {
        (0x80..0xC0).contains(&self.0)
    }

    /// Label suffix for an extras record of this kind
    pub fn extras_suffix(&self) -> Option<&'static str> {
        match self.0 {
            0x80..=0x9F | 0xBE => Some(" PPP"),
            0xBF => None,
            _ => Some(" MAIL"),
        }
    }
}

// ============================================================================
// DECODED FIELDS
// ============================================================================

/// Text carried by the frame, by payload kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadText {
    /// Free text (simple or three-segment)
    Text(String),
    /// First identifier string
    Identifier1(String),
    /// Second identifier string
    Identifier2(String),
}

/// One extras sub-record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtrasRecord {
    /// Trimmed label with its kind suffix; empty when the frame had no label
    pub label: String,
    /// Amount in hundredths; 0 removes the label
    pub amount: u16,
}

impl ExtrasRecord {
    /// Render the amount as `whole.hundredths`
    pub fn rendered_amount(&self) -> String {
        format_amount(self.amount)
    }
}

/// Render hundredths as `whole.hundredths` (`150` -> `"1.50"`)
pub fn format_amount(amount: u16) -> String {
    format!("{}.{:02}", amount / 100, amount % 100)
}

/// Fields decoded from a non-reset frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBroadcast {
    /// Status code, if it is a defined one
    pub status: Option<Status>,
    /// Icon name, if the index is in the catalog
    pub icon: Option<&'static str>,
    /// 24-bit primary value; 0 means absent
    pub primary_value: u32,
    /// 16-bit secondary value
    pub secondary_value: u16,
    pub payload_kind: PayloadKind,
    pub text: Option<PayloadText>,
    pub extras: Option<ExtrasRecord>,
}

/// Outcome of parsing one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Broadcast {
    /// Status 0, 1 or 6: discard the peer, nothing else was parsed
    Reset(Status),
    /// Regular status update
    Update(DecodedBroadcast),
}
