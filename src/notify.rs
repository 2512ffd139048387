// Notifications
// Every event the controller reports upward, as one sum type on one channel

use crate::broadcast::Status;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tokio::sync::mpsc;

/// Event delivered to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// Radio powered on
    PowerOn,
    /// Radio powered off
    PowerOff,

    // Broadcast fields
    Status(Status),
    Icon(String),
    Value1(u32),
    Value2(u16),
    Text(String),
    Identifier1(String),
    Identifier2(String),
    Extras(BTreeMap<String, String>),

    // Connected-channel fields
    Value3(u64),
    Text2(String),

    // Lifecycle
    BroadcastLost,
    Connected,
    ConnectFailed,
    Disconnected,

    /// Echo of a value written to the token or confirmation channel
    ConfirmationReceived(String),
}

impl Notification {
    /// Check if this is a lifecycle event
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::BroadcastLost | Self::Connected | Self::ConnectFailed | Self::Disconnected
        )
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PowerOn => write!(f, "power: on"),
            Self::PowerOff => write!(f, "power: off"),
            Self::Status(status) => write!(f, "state: {}", status),
            Self::Icon(name) => write!(f, "icon: {}", name),
            Self::Value1(v) => write!(f, "value1: {}", v),
            Self::Value2(v) => write!(f, "value2: {}", v),
            Self::Text(text) => write!(f, "text: {}", text),
            Self::Identifier1(id) => write!(f, "id1: {}", id),
            Self::Identifier2(id) => write!(f, "id2: {}", id),
            Self::Extras(entries) => {
                write!(f, "extras:")?;
                for (label, amount) in entries {
                    write!(f, " [{} = {}]", label, amount)?;
                }
                Ok(())
            }
            Self::Value3(v) => write!(f, "value3: {}", v),
            Self::Text2(text) => write!(f, "text2: {}", text),
            Self::BroadcastLost => write!(f, "broadcast lost"),
            Self::Connected => write!(f, "connected"),
            Self::ConnectFailed => write!(f, "connect failed"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::ConfirmationReceived(text) => write!(f, "confirmation: {}", text),
        }
    }
}

/// Sending half of the notification channel
pub type NotificationSender = mpsc::UnboundedSender<Notification>;

/// Receiving half of the notification channel
pub type NotificationReceiver = mpsc::UnboundedReceiver<Notification>;

/// Drain everything currently queued on a receiver
pub fn drain(rx: &mut NotificationReceiver) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        out.push(notification);
    }
    out
}
