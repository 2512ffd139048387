// Link State
// Lifecycle states of the single beacon connection

use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LinkState {
    #[default]
    Idle,
    Scanning,
    Connecting,
    DiscoveringChannels,
    Connected,
    Disconnected,
}

impl LinkState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: &LinkState) -> bool {
        match (self, target) {
            (Self::Idle, Self::Scanning) => true,
            (Self::Disconnected, Self::Scanning) => true,
            (Self::Scanning, Self::Idle) => true,
            (Self::Scanning, Self::Connecting) => true,
            (Self::Connecting, Self::DiscoveringChannels) => true,
            (Self::Connecting, Self::Scanning) => true, // Connect timeout
            (Self::DiscoveringChannels, Self::Scanning) => true, // Connect timeout
            (Self::Connecting, Self::Disconnected) => true,
            (Self::DiscoveringChannels, Self::Connected) => true,
            (Self::DiscoveringChannels, Self::Disconnected) => true,
            (Self::Connected, Self::Disconnected) => true,
            _ => false,
        }
    }

    /// Check if a connect attempt is in flight
    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::Connecting | Self::DiscoveringChannels)
    }

    /// Check if a link exists or is being set up
    pub fn has_link(&self) -> bool {
        matches!(
            self,
            Self::Connecting | Self::DiscoveringChannels | Self::Connected
        )
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Scanning => "scanning",
            Self::Connecting => "connecting",
            Self::DiscoveringChannels => "discovering-channels",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        };
        write!(f, "{}", name)
    }
}
