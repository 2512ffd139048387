// Radio Transport Traits and Core Types
// Defines the abstract radio capability consumed by the controller

use crate::peer::PeerId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// RADIO POWER
// ============================================================================

/// Power state reported by the radio stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadioPower {
    On,
    Off,
    Unsupported,
    Unauthorized,
    Resetting,
    Unknown,
}

impl fmt::Display for RadioPower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::On => "powered on",
            Self::Off => "powered off",
            Self::Unsupported => "unsupported",
            Self::Unauthorized => "unauthorized",
            Self::Resetting => "resetting",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// TRANSPORT EVENTS
// ============================================================================

/// Events delivered by the radio stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Radio power state changed
    PowerChanged(RadioPower),

    /// Advertisement received while scanning
    PeerDiscovered {
        identity: PeerId,
        signal_strength: i16,
        advertisement: String,
    },

    /// Link to the peer is up
    LinkEstablished { identity: PeerId },

    /// Link could not be established
    LinkFailed {
        identity: PeerId,
        error: Option<String>,
    },

    /// Established link went away
    LinkDropped {
        identity: PeerId,
        error: Option<String>,
    },

    /// Channel found during enumeration
    ChannelDiscovered { channel_id: String },

    /// Push-notification state of a channel changed
    NotificationStateChanged {
        channel_id: String,
        enabled: bool,
        error: Option<String>,
    },

    /// Channel value read or pushed
    ChannelValueUpdated {
        channel_id: String,
        value: Vec<u8>,
        error: Option<String>,
    },

    /// Acknowledged write (with response)
    WriteAcknowledged {
        channel_id: String,
        error: Option<String>,
    },
}

// ============================================================================
// TRANSPORT ERRORS
// ============================================================================

/// Errors that can occur when issuing a radio request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Radio is not powered on")]
    PoweredOff,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Unknown peer: {0}")]
    UnknownPeer(String),

    #[error("Not connected")]
    NotConnected,

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),
}

impl TransportError {
    /// Check if this is a connection-related error
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::UnknownPeer(_) | Self::NotConnected
        )
    }

    /// Check if the request named a channel the peer does not expose
    pub fn is_channel_error(&self) -> bool {
        matches!(self, Self::UnknownChannel(_))
    }
}

// ============================================================================
// RADIO TRANSPORT TRAIT
// ============================================================================

/// Radio stack capability.
///
/// Every method only issues a request and returns immediately; outcomes come
/// back later as [`TransportEvent`]s.
pub trait RadioTransport {
    /// Start scanning for advertisements (duplicates allowed)
    fn start_scan(&mut self) -> Result<(), TransportError>;

    /// Stop scanning
    fn stop_scan(&mut self) -> Result<(), TransportError>;

    /// Open a link to a peer
    fn connect(&mut self, identity: &PeerId) -> Result<(), TransportError>;

    /// Close (or cancel a pending) link to a peer
    fn disconnect(&mut self, identity: &PeerId) -> Result<(), TransportError>;

    /// Enumerate every channel the peer exposes
    fn enumerate_channels(&mut self, identity: &PeerId) -> Result<(), TransportError>;

    /// Enable push notifications on a channel
    fn subscribe(&mut self, channel_id: &str) -> Result<(), TransportError>;

    /// Write with delivery acknowledgment
    fn write(&mut self, channel_id: &str, value: &[u8]) -> Result<(), TransportError>;

    /// Read the current value of a channel
    fn read(&mut self, channel_id: &str) -> Result<(), TransportError>;
}
