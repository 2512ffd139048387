// Latest Snapshot
// Last trusted value of each broadcast field, replayable to late subscribers

use super::model::Status;
use crate::notify::Notification;
use std::collections::BTreeMap;

/// Last known broadcast values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatestSnapshot {
    pub status: Option<Status>,
    pub primary_value: Option<u32>,
    pub icon: Option<&'static str>,
    pub secondary_value: Option<u16>,
    pub text: Option<String>,
    pub identifier_1: Option<String>,
    pub identifier_2: Option<String>,
    pub extras: Option<BTreeMap<String, String>>,
}

impl LatestSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Notifications reproducing every recorded field
    pub fn replay(&self) -> Vec<Notification> {
        let mut out = Vec::new();
        if let Some(status) = self.status {
            out.push(Notification::Status(status));
        }
        if let Some(value) = self.primary_value {
            out.push(Notification::Value1(value));
        }
        if let Some(icon) = self.icon {
            out.push(Notification::Icon(icon.to_string()));
        }
        if let Some(value) = self.secondary_value {
            out.push(Notification::Value2(value));
        }
        if let Some(text) = &self.text {
            out.push(Notification::Text(text.clone()));
        }
        if let Some(id) = &self.identifier_1 {
            out.push(Notification::Identifier1(id.clone()));
        }
        if let Some(id) = &self.identifier_2 {
            out.push(Notification::Identifier2(id.clone()));
        }
        if let Some(extras) = &self.extras {
            out.push(Notification::Extras(extras.clone()));
        }
        out
    }
}
