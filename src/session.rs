// 🔐 Session Controller - Lock-gated state + snapshot/restore contract
// Owns the balance sheet and the adjustment ledger; every user edit goes
// through here, derived results are recomputed on every read

use crate::bilan::BalanceSheet;
use crate::engine;
use crate::ledger::AdjustmentLedger;
use crate::model::{Adjustment, AnccResult, BilanCategory};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// IMPORT ERROR
// ============================================================================

/// Why an import document was rejected. A rejected import never mutates
/// state: the restore is all-or-nothing.
#[derive(Debug)]
pub enum ImportError {
    /// The document is not valid JSON
    Parse(serde_json::Error),

    /// A required top-level key is missing or has the wrong shape
    /// (`adjustments` must be a mapping, `bilan` a sequence)
    MissingField(&'static str),

    /// A line item in `bilan` is malformed
    InvalidItem { index: usize, reason: String },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Parse(err) => write!(f, "invalid JSON: {}", err),
            ImportError::MissingField(field) => {
                write!(f, "document must contain a valid \"{}\" key", field)
            }
            ImportError::InvalidItem { index, reason } => {
                write!(f, "invalid line item at index {}: {}", index, reason)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::Parse(err)
    }
}

// ============================================================================
// SESSION STATE (wire document)
// ============================================================================

/// The exchanged save document: exactly two top-level keys, matching the
/// historical JSON save format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub adjustments: BTreeMap<String, Adjustment>,
    pub bilan: Vec<crate::model::LineItem>,
}

impl SessionState {
    /// Parse and shape-check a save document. Content-level validation
    /// (id uniqueness etc.) happens in [`Session::restore`].
    pub fn from_json(text: &str) -> Result<Self, ImportError> {
        let value: Value = serde_json::from_str(text)?;

        let Some(adjustments) = value.get("adjustments") else {
            return Err(ImportError::MissingField("adjustments"));
        };
        if !adjustments.is_object() {
            return Err(ImportError::MissingField("adjustments"));
        }
        let Some(bilan) = value.get("bilan") else {
            return Err(ImportError::MissingField("bilan"));
        };
        if !bilan.is_array() {
            return Err(ImportError::MissingField("bilan"));
        }

        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> String {
        // Serialization of this shape cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// Composes the balance sheet, the adjustment ledger and the valuation
/// behind a single lock flag.
///
/// The lock is a coarse, user-toggled read-only gate for the four mutators,
/// not a concurrency primitive: reads and derived results are unaffected.
#[derive(Debug, Clone)]
pub struct Session {
    bilan: BalanceSheet,
    adjustments: AdjustmentLedger,
    locked: bool,
}

impl Session {
    /// Start a session from the fixed seed balance sheet, unlocked.
    pub fn new() -> Self {
        Session {
            bilan: BalanceSheet::seed(),
            adjustments: AdjustmentLedger::new(),
            locked: false,
        }
    }

    /// Start from an empty balance sheet
    pub fn empty() -> Self {
        Session {
            bilan: BalanceSheet::new(),
            adjustments: AdjustmentLedger::new(),
            locked: false,
        }
    }

    /// Start from a prepared balance sheet (e.g. a CSV ledger extract)
    pub fn with_bilan(bilan: BalanceSheet) -> Self {
        Session {
            bilan,
            adjustments: AdjustmentLedger::new(),
            locked: false,
        }
    }

    // ========================================================================
    // LOCK
    // ========================================================================

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    // ========================================================================
    // GATED MUTATORS
    // ========================================================================

    /// Add a new line item with a fresh id. Returns the id, or `None` when
    /// the session is locked.
    pub fn add_item(&mut self, label: &str, category: BilanCategory, value: f64) -> Option<String> {
        if self.locked {
            return None;
        }
        Some(self.bilan.add(label, category, value))
    }

    /// Remove a line item and, atomically, its adjustment entry (cascading
    /// delete: an adjustment must never outlive its item). Returns true if
    /// the item existed and the session was unlocked.
    pub fn remove_item(&mut self, id: &str) -> bool {
        if self.locked {
            return false;
        }
        let removed = self.bilan.remove(id);
        if removed {
            self.adjustments.remove(id);
        }
        removed
    }

    /// Update an item's book value (non-finite coerced to zero).
    pub fn set_value(&mut self, id: &str, value: f64) -> bool {
        if self.locked {
            return false;
        }
        self.bilan.set_value(id, value)
    }

    /// Fully replace the adjustment for an existing item. Rejected when
    /// locked or when no item carries the id (no orphan entries).
    pub fn set_adjustment(
        &mut self,
        id: &str,
        revalued_value: Option<f64>,
        justification: &str,
        apply_deferred_tax: bool,
    ) -> bool {
        if self.locked || !self.bilan.contains(id) {
            return false;
        }
        self.adjustments
            .set(id, revalued_value, justification, apply_deferred_tax);
        true
    }

    /// Drop the stored adjustment for an item, reverting it to the
    /// synthesized default.
    pub fn clear_adjustment(&mut self, id: &str) -> bool {
        if self.locked {
            return false;
        }
        self.adjustments.remove(id)
    }

    // ========================================================================
    // READS
    // ========================================================================

    pub fn bilan(&self) -> &BalanceSheet {
        &self.bilan
    }

    pub fn adjustments(&self) -> &AdjustmentLedger {
        &self.adjustments
    }

    /// Stored or synthesized adjustment for an item id
    pub fn adjustment_for(&self, id: &str) -> Option<Adjustment> {
        self.bilan
            .get(id)
            .map(|item| self.adjustments.get_or_default(item))
    }

    /// Current valuation, recomputed from scratch
    pub fn results(&self) -> AnccResult {
        engine::evaluate(&self.bilan, &self.adjustments)
    }

    pub fn results_with_rate(&self, tax_rate: f64) -> AnccResult {
        engine::evaluate_with_rate(&self.bilan, &self.adjustments, tax_rate)
    }

    /// Percentage of eligible items with an explicit revaluation
    pub fn completeness(&self) -> u8 {
        engine::completeness(&self.bilan, &self.adjustments)
    }

    // ========================================================================
    // SNAPSHOT / RESTORE
    // ========================================================================

    /// Deep, independent copy of both stores for export.
    pub fn snapshot(&self) -> SessionState {
        SessionState {
            adjustments: self.adjustments.entries().clone(),
            bilan: self.bilan.items().to_vec(),
        }
    }

    /// Validate and atomically replace both stores. On failure the prior
    /// state is left untouched; there is never a partial import.
    ///
    /// Adjustments keyed by an id absent from the imported `bilan` are
    /// discarded (referential integrity), and a non-finite revalued value
    /// is coerced to unset, same as the ledger's own sanitation.
    pub fn restore(&mut self, state: SessionState) -> Result<(), ImportError> {
        validate_items(&state.bilan)?;

        let bilan = BalanceSheet::from_items(state.bilan);
        let mut entries = state.adjustments;
        entries.retain(|id, _| bilan.contains(id));
        for adj in entries.values_mut() {
            adj.revalued_value = adj.revalued_value.filter(|v| v.is_finite());
        }

        self.bilan = bilan;
        self.adjustments = AdjustmentLedger::from_entries(entries);
        Ok(())
    }

    /// Parse a save document and restore from it.
    pub fn restore_json(&mut self, text: &str) -> Result<(), ImportError> {
        let state = SessionState::from_json(text)?;
        self.restore(state)
    }

    /// Serialize the current snapshot as the save document.
    pub fn export_json(&self) -> String {
        self.snapshot().to_json()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Content-level checks on an imported item sequence: non-empty unique ids,
/// non-empty labels, finite values, and no fictitious equity.
fn validate_items(items: &[crate::model::LineItem]) -> Result<(), ImportError> {
    let mut seen = std::collections::HashSet::new();
    for (index, item) in items.iter().enumerate() {
        if item.id.is_empty() {
            return Err(ImportError::InvalidItem {
                index,
                reason: "empty id".to_string(),
            });
        }
        if item.label.is_empty() {
            return Err(ImportError::InvalidItem {
                index,
                reason: "empty label".to_string(),
            });
        }
        if !seen.insert(item.id.as_str()) {
            return Err(ImportError::InvalidItem {
                index,
                reason: format!("duplicate id \"{}\"", item.id),
            });
        }
        if !item.value.is_finite() {
            return Err(ImportError::InvalidItem {
                index,
                reason: "non-finite value".to_string(),
            });
        }
        if item.category == BilanCategory::Equity && item.is_fictitious {
            return Err(ImportError::InvalidItem {
                index,
                reason: "equity items cannot be fictitious".to_string(),
            });
        }
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
