// Peer Selector
//
// Tracks at most one active broadcaster. A stronger broadcaster with a
// different identity replaces it wholesale; the same broadcaster accumulates
// a message count until it crosses the stability threshold and is trusted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque device identifier assigned by the radio stack
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ============================================================================
// ACTIVE PEER
// ============================================================================

/// The currently selected broadcaster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePeer {
    identity: PeerId,
    signal_strength: i16,
    message_count: u32,
    trusted: bool,
}

impl ActivePeer {
    fn new(identity: PeerId, signal_strength: i16) -> Self {
        Self {
            identity,
            signal_strength,
            message_count: 0,
            trusted: false,
        }
    }

    /// Get the identity
    pub fn identity(&self) -> &PeerId {
        &self.identity
    }

    /// Signal strength recorded when the peer became active
    pub fn signal_strength(&self) -> i16 {
        self.signal_strength
    }

    /// Advertisements counted since the peer became active
    pub fn message_count(&self) -> u32 {
        self.message_count
    }

    /// Check if the peer has been stable long enough to surface its data
    pub fn is_trusted(&self) -> bool {
        self.trusted
    }

    fn count_message(&mut self, threshold: u32) {
        self.message_count = self.message_count.saturating_add(1);
        self.trusted = self.message_count > threshold;
    }
}

// ============================================================================
// SELECTOR
// ============================================================================

/// What the selector did with one advertisement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// No peer existed; this broadcaster became active
    Created,
    /// Same peer, counter incremented
    Counted,
    /// Same peer, already trusted; counter frozen
    Frozen,
    /// Stronger broadcaster replaced the active peer
    Replaced,
    /// Weaker broadcaster ignored
    Ignored,
    /// Positive signal strength is not a valid reading
    Rejected,
}

impl Selection {
    /// Check if the advertisement belongs to the (possibly new) active peer
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Ignored | Self::Rejected)
    }
}

/// Chooses and tracks the active peer
#[derive(Debug, Clone)]
pub struct PeerSelector {
    active: Option<ActivePeer>,
    stability_threshold: u32,
}

impl PeerSelector {
    pub fn new(stability_threshold: u32) -> Self {
        Self {
            active: None,
            stability_threshold,
        }
    }

    /// Get the active peer
    pub fn active(&self) -> Option<&ActivePeer> {
        self.active.as_ref()
    }

    /// Check if the active peer is trusted
    pub fn is_trusted(&self) -> bool {
        self.active.as_ref().is_some_and(ActivePeer::is_trusted)
    }

    /// Feed one advertisement from `identity` at `signal_strength`
    pub fn observe(&mut self, identity: &PeerId, signal_strength: i16) -> Selection {
        if signal_strength > 0 {
            return Selection::Rejected;
        }

        match self.active.as_mut() {
            None => {
                self.active = Some(ActivePeer::new(identity.clone(), signal_strength));
                Selection::Created
            }
            Some(active) if active.identity == *identity => {
                if active.trusted {
                    Selection::Frozen
                } else {
                    active.count_message(self.stability_threshold);
                    Selection::Counted
                }
            }
            Some(active) if active.signal_strength > signal_strength => Selection::Ignored,
            Some(_) => {
                self.active = Some(ActivePeer::new(identity.clone(), signal_strength));
                Selection::Replaced
            }
        }
    }

    /// Drop the active peer
    pub fn clear(&mut self) -> Option<ActivePeer> {
        self.active.take()
    }
}
