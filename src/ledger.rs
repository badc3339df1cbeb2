// 🧾 Adjustment Ledger - Revaluation entries keyed by line-item id
// BTreeMap-backed so exports iterate in a deterministic key order

use crate::model::{Adjustment, LineItem};
use std::collections::BTreeMap;

// ============================================================================
// ADJUSTMENT LEDGER
// ============================================================================

/// Mapping from line-item id to its revaluation adjustment.
///
/// Entries are created lazily on first edit; an item with no entry reads as
/// the synthesized default for its current state. Defaults are recomputed
/// from the item on every call, never cached, since the item's category or
/// fictitious flag can change underneath a stale default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjustmentLedger {
    entries: BTreeMap<String, Adjustment>,
}

impl AdjustmentLedger {
    pub fn new() -> Self {
        AdjustmentLedger {
            entries: BTreeMap::new(),
        }
    }

    pub fn from_entries(entries: BTreeMap<String, Adjustment>) -> Self {
        AdjustmentLedger { entries }
    }

    /// Stored entry for an id, if any
    pub fn get(&self, id: &str) -> Option<&Adjustment> {
        self.entries.get(id)
    }

    /// Stored entry for the item, or the synthesized default.
    pub fn get_or_default(&self, item: &LineItem) -> Adjustment {
        self.entries
            .get(&item.id)
            .cloned()
            .unwrap_or_else(|| Adjustment::default_for(item))
    }

    /// Fully replace the entry for an id (never a merge: callers
    /// read-modify-write the whole record). A non-finite revalued value is
    /// coerced to unset.
    pub fn set(
        &mut self,
        id: &str,
        revalued_value: Option<f64>,
        justification: &str,
        apply_deferred_tax: bool,
    ) {
        let revalued_value = revalued_value.filter(|v| v.is_finite());
        self.entries.insert(
            id.to_string(),
            Adjustment {
                revalued_value,
                justification: justification.to_string(),
                apply_deferred_tax,
            },
        );
    }

    /// Remove the entry for an id. Returns true if something was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn entries(&self) -> &BTreeMap<String, Adjustment> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
