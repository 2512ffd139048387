// Channels and the discovered-channel set

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One of the four well-known logical channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Numeric value, notifies
    Value,
    /// Free text, notifies
    Text,
    /// Confirmation write/read-back
    Confirmation,
    /// Token write/read-back
    Token,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Value,
        Channel::Text,
        Channel::Confirmation,
        Channel::Token,
    ];

    /// Well-known identifier of this channel
    pub fn uuid(&self) -> &'static str {
        match self {
            Self::Value => "00000211-4E86-33A6-7756-0085AE176122",
            Self::Text => "00000212-4E86-33A6-7756-0085AE176122",
            Self::Confirmation => "00000213-4E86-33A6-7756-0085AE176122",
            Self::Token => "00000214-4E86-33A6-7756-0085AE176122",
        }
    }

    /// Look up a channel by identifier (exact match)
    pub fn from_uuid(uuid: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.uuid() == uuid)
    }

    /// Channels whose updates are pushed once subscribed
    pub fn is_notifying(&self) -> bool {
        matches!(self, Self::Value | Self::Text)
    }

    /// Channels the application writes to
    pub fn is_writable(&self) -> bool {
        matches!(self, Self::Confirmation | Self::Token)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uuid())
    }
}

/// Channels discovered on the current link
#[derive(Debug, Clone, Default)]
pub struct ChannelSet {
    discovered: HashSet<Channel>,
}

impl ChannelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a channel; returns true if it was not yet known
    pub fn insert(&mut self, channel: Channel) -> bool {
        self.discovered.insert(channel)
    }

    pub fn contains(&self, channel: Channel) -> bool {
        self.discovered.contains(&channel)
    }

    /// True once all four channels are present
    pub fn is_complete(&self) -> bool {
        Channel::ALL.iter().all(|c| self.discovered.contains(c))
    }

    pub fn len(&self) -> usize {
        self.discovered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.discovered.is_empty()
    }

    pub fn clear(&mut self) {
        self.discovered.clear();
    }
}
