// 📊 Core Data Model - Balance sheet line items and revaluation adjustments
// Wire-compatible with the sauvegarde-ancc.json save document

use serde::{Deserialize, Serialize};

// ============================================================================
// CATEGORY
// ============================================================================

/// Closed balance-sheet category enumeration.
///
/// Serialized with the save document's historical tokens (`actif-immo`,
/// `dettes`, ...) so existing save files keep loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BilanCategory {
    /// Fixed assets (immobilisations)
    #[serde(rename = "actif-immo")]
    FixedAsset,

    /// Current assets (stocks, receivables)
    #[serde(rename = "actif-circulant")]
    CurrentAsset,

    /// Cash and cash equivalents
    #[serde(rename = "tresorerie-actif")]
    TreasuryAsset,

    /// Equity (capitaux propres) - defines the baseline net worth
    #[serde(rename = "capitaux-propres")]
    Equity,

    /// Debts and provisions
    #[serde(rename = "dettes")]
    Debt,

    /// Off-balance-sheet commitments
    #[serde(rename = "hors-bilan")]
    OffBalanceSheet,
}

impl BilanCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BilanCategory::FixedAsset => "actif-immo",
            BilanCategory::CurrentAsset => "actif-circulant",
            BilanCategory::TreasuryAsset => "tresorerie-actif",
            BilanCategory::Equity => "capitaux-propres",
            BilanCategory::Debt => "dettes",
            BilanCategory::OffBalanceSheet => "hors-bilan",
        }
    }

    /// Asset side of the balance sheet (contributes to totalActif).
    pub fn is_asset(&self) -> bool {
        matches!(
            self,
            BilanCategory::FixedAsset
                | BilanCategory::CurrentAsset
                | BilanCategory::TreasuryAsset
        )
    }

    /// Liability side of the balance sheet (contributes to totalPassif).
    pub fn is_liability_side(&self) -> bool {
        matches!(self, BilanCategory::Equity | BilanCategory::Debt)
    }

    /// Categories where a higher revalued value is a LOSS for the owner:
    /// the raw gap is negated before aggregation.
    pub fn flips_sign(&self) -> bool {
        matches!(self, BilanCategory::Debt | BilanCategory::OffBalanceSheet)
    }
}

// ============================================================================
// LINE ITEM
// ============================================================================

/// One balance-sheet entry.
///
/// `id` is the stable identity (opaque string, unique within a sheet);
/// everything else is a value the user can edit while the session is
/// unlocked. Equity items are never fictitious: they define the baseline
/// net worth and are excluded from adjustment and tax computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,

    /// Display name, non-empty
    pub label: String,

    pub category: BilanCategory,

    /// Historical/accounting book value (signed)
    pub value: f64,

    /// Marks assets with no realizable value (e.g. formation costs) that
    /// must always be fully written off
    #[serde(rename = "isFictif")]
    #[serde(default)]
    #[serde(skip_serializing_if = "is_false")]
    pub is_fictitious: bool,

    /// Item-level override for the default inclusion-in-tax-base state.
    /// `None` means "unspecified": the category/fictitious rule decides.
    #[serde(rename = "applyDeferredTax")]
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deferred_tax_default: Option<bool>,
}

// Helper for serde skip
fn is_false(val: &bool) -> bool {
    !*val
}

impl LineItem {
    pub fn new(id: &str, label: &str, category: BilanCategory, value: f64) -> Self {
        LineItem {
            id: id.to_string(),
            label: label.to_string(),
            category,
            value: sanitize_value(value),
            is_fictitious: false,
            deferred_tax_default: None,
        }
    }

    /// Mark the item as fictitious (builder-style, used by the seed data)
    pub fn fictitious(mut self) -> Self {
        self.is_fictitious = true;
        self
    }

    /// Set the item-level deferred-tax default (builder-style)
    pub fn with_deferred_tax(mut self, apply: bool) -> Self {
        self.deferred_tax_default = Some(apply);
        self
    }

    /// Default inclusion-in-tax-base state for this item's adjustment.
    ///
    /// `false` when the item is fictitious, when it is equity, or when the
    /// item carries an explicit `applyDeferredTax: false`; otherwise `true`.
    /// Always derived from the current item state, never cached.
    pub fn default_apply_deferred_tax(&self) -> bool {
        !self.is_fictitious
            && self.category != BilanCategory::Equity
            && self.deferred_tax_default != Some(false)
    }
}

/// Coerce a non-finite book value to zero. Edits must never leave a line
/// item in a non-numeric state.
pub fn sanitize_value(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

// ============================================================================
// ADJUSTMENT
// ============================================================================

/// One user-entered revaluation for a line item, keyed by the item's id.
///
/// `revalued_value = None` means no revaluation has been entered yet; the
/// item then contributes nothing to the valuation (unless fictitious).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    #[serde(rename = "revaluedValue")]
    #[serde(default)]
    pub revalued_value: Option<f64>,

    #[serde(default)]
    pub justification: String,

    /// Whether this item's gap counts toward the taxable base
    #[serde(rename = "applyDeferredTax")]
    pub apply_deferred_tax: bool,
}

impl Adjustment {
    /// Synthesize the default adjustment for an item with no stored entry.
    pub fn default_for(item: &LineItem) -> Self {
        Adjustment {
            revalued_value: None,
            justification: String::new(),
            apply_deferred_tax: item.default_apply_deferred_tax(),
        }
    }

    /// True once the user has entered a revalued value.
    pub fn is_set(&self) -> bool {
        self.revalued_value.is_some()
    }
}

// ============================================================================
// VALUATION RESULT
// ============================================================================

/// Aggregate valuation output. Pure derived data: recomputed from the
/// current state on every read, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnccResult {
    /// Accounting net worth: sum of equity book values
    pub anc: f64,

    /// Sum of book values over the asset-side categories
    pub total_asset: f64,

    /// Sum of book values over equity + debts
    pub total_liability: f64,

    /// Post-flip revaluation gains (plus-values)
    pub total_gains: f64,

    /// Post-flip revaluation losses, as absolute value (moins-values)
    pub total_losses: f64,

    /// total_gains - total_losses
    pub net_adjustment: f64,

    /// Latent tax on the net taxable gain (never negative)
    pub deferred_tax: f64,

    /// anc + net_adjustment - deferred_tax
    pub corrected_net_worth: f64,
}

// ============================================================================
// TESTS
// ============================================================================
