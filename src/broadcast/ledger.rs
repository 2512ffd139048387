// Extras Ledger
// Label -> rendered amount table kept current by upsert-or-delete-on-zero

use super::model::ExtrasRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Change applied to the ledger by one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerChange {
    /// Label was inserted or its amount replaced
    Upserted,
    /// Label was removed (amount 0)
    Removed,
    /// Nothing changed (empty label, or removal of an absent label)
    Unchanged,
}

/// Extras ledger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtrasLedger {
    entries: BTreeMap<String, String>,
}

impl ExtrasLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one extras record
    pub fn apply(&mut self, record: &ExtrasRecord) -> LedgerChange {
        if record.label.is_empty() {
            return LedgerChange::Unchanged;
        }
        if record.amount == 0 {
            return match self.entries.remove(&record.label) {
                Some(_) => LedgerChange::Removed,
                None => LedgerChange::Unchanged,
            };
        }
        self.entries
            .insert(record.label.clone(), record.rendered_amount());
        LedgerChange::Upserted
    }

    /// Rendered amount for a label
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries.get(label).map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of every entry, for notification
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.entries.clone()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
