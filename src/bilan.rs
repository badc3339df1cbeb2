// 📒 Balance Sheet - Ordered line-item store + seeded initial data
// Order-preserving: exports and reports keep the user's item order

use crate::model::{sanitize_value, BilanCategory, LineItem};

// ============================================================================
// BALANCE SHEET
// ============================================================================

/// Ordered collection of balance-sheet line items.
///
/// Plain store: the session controller enforces the lock and the cascading
/// delete of adjustments; this type only guarantees id uniqueness, item
/// order and numeric sanitation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceSheet {
    items: Vec<LineItem>,
}

impl BalanceSheet {
    /// Create an empty balance sheet
    pub fn new() -> Self {
        BalanceSheet { items: Vec::new() }
    }

    /// Build from an existing item sequence (order preserved).
    /// Items with an id already present are skipped.
    pub fn from_items(items: Vec<LineItem>) -> Self {
        let mut sheet = BalanceSheet::new();
        for item in items {
            sheet.push(item);
        }
        sheet
    }

    /// The fixed seed set a session starts from: a small French balance
    /// sheet with formation costs marked fictitious.
    pub fn seed() -> Self {
        BalanceSheet::from_items(vec![
            // Actifs
            LineItem::new("frais-etablissement", "Frais d'établissement", BilanCategory::FixedAsset, 15_000.0)
                .fictitious()
                .with_deferred_tax(false),
            LineItem::new("fonds-commerce", "Fonds de commerce", BilanCategory::FixedAsset, 120_000.0)
                .with_deferred_tax(true),
            LineItem::new("terrains", "Terrains", BilanCategory::FixedAsset, 250_000.0)
                .with_deferred_tax(true),
            LineItem::new("constructions", "Constructions", BilanCategory::FixedAsset, 450_000.0)
                .with_deferred_tax(true),
            LineItem::new("materiel-industriel", "Matériel industriel", BilanCategory::FixedAsset, 180_000.0)
                .with_deferred_tax(true),
            LineItem::new("stocks", "Stocks de marchandises", BilanCategory::CurrentAsset, 95_000.0)
                .with_deferred_tax(false),
            LineItem::new("creances-clients", "Créances clients", BilanCategory::CurrentAsset, 75_000.0)
                .with_deferred_tax(false),
            LineItem::new("vmp", "Valeurs Mobilières de Placement", BilanCategory::TreasuryAsset, 50_000.0)
                .with_deferred_tax(true),
            LineItem::new("disponibilites", "Disponibilités", BilanCategory::TreasuryAsset, 110_000.0)
                .with_deferred_tax(false),
            // Passifs
            LineItem::new("capital-social", "Capital social", BilanCategory::Equity, 300_000.0)
                .with_deferred_tax(false),
            LineItem::new("reserves", "Réserves", BilanCategory::Equity, 220_000.0)
                .with_deferred_tax(false),
            LineItem::new("resultat-exercice", "Résultat de l'exercice", BilanCategory::Equity, 85_000.0)
                .with_deferred_tax(false),
            LineItem::new("provisions-risques", "Provisions pour risques", BilanCategory::Debt, 40_000.0)
                .with_deferred_tax(false),
            LineItem::new("dettes-financieres", "Dettes financières", BilanCategory::Debt, 350_000.0)
                .with_deferred_tax(false),
            LineItem::new("dettes-fournisseurs", "Dettes fournisseurs", BilanCategory::Debt, 50_000.0)
                .with_deferred_tax(false),
            // Engagements hors bilan
            LineItem::new("ifc", "Engagement hors bilan (IFC)", BilanCategory::OffBalanceSheet, 0.0)
                .with_deferred_tax(false),
        ])
    }

    /// Append an item, skipping it if the id is already taken.
    /// Returns true if the item was inserted.
    pub fn push(&mut self, item: LineItem) -> bool {
        if self.contains(&item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Append a new user-created item with a fresh UUID identity.
    /// Returns the generated id.
    pub fn add(&mut self, label: &str, category: BilanCategory, value: f64) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.items.push(LineItem::new(&id, label, category, value));
        id
    }

    /// Remove an item by id. Returns true if something was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Update an item's book value. A non-finite value is coerced to zero.
    /// Returns true if the item exists.
    pub fn set_value(&mut self, id: &str, value: f64) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.value = sanitize_value(value);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Items in insertion order
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
