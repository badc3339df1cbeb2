// 🗂️ Account Classification - Ledger extracts → balance-sheet construction
// Maps raw account codes to categories and aggregates CSV trial-balance
// rows into line items

use crate::bilan::BalanceSheet;
use crate::model::{BilanCategory, LineItem};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Headers a ledger extract must carry; the whole file is rejected otherwise
pub const REQUIRED_HEADERS: [&str; 5] = ["COMPTE", "LIBELLE", "DEBIT", "CREDIT", "ANNEE"];

// ============================================================================
// ACCOUNT → CATEGORY
// ============================================================================

/// Classify a raw account code by its first character.
///
/// Pure, total, single-character lookup with an explicit fallback: any code
/// outside classes 1-7 (including the empty string) lands in current assets.
pub fn category_for_account(account: &str) -> BilanCategory {
    match account.chars().next() {
        Some('1') => BilanCategory::Equity,
        Some('2') => BilanCategory::FixedAsset,
        Some('3') => BilanCategory::CurrentAsset, // stocks
        Some('4') => BilanCategory::Debt,         // dettes et comptes de tiers
        Some('5') => BilanCategory::TreasuryAsset,
        Some('6') => BilanCategory::Debt,   // charges, peuvent générer des dettes
        Some('7') => BilanCategory::Equity, // produits, impactent le résultat
        _ => BilanCategory::CurrentAsset,
    }
}

// ============================================================================
// EXTRACT ROWS
// ============================================================================

/// One row of a trial-balance CSV extract
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractRow {
    #[serde(rename = "COMPTE")]
    pub account: String,

    #[serde(rename = "LIBELLE")]
    pub label: String,

    #[serde(rename = "DEBIT")]
    pub debit: String,

    #[serde(rename = "CREDIT")]
    pub credit: String,

    #[serde(rename = "ANNEE")]
    pub year: String,
}

/// Lenient amount parsing for extract cells: French decimal comma, grouping
/// spaces (plain or non-breaking) and blanks all normalize; anything else
/// coerces to zero rather than failing the import.
pub fn parse_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Load a ledger extract from a CSV file.
pub fn load_extract<P: AsRef<Path>>(path: P) -> Result<Vec<ExtractRow>> {
    let file = std::fs::File::open(path.as_ref())
        .with_context(|| format!("Failed to open extract file: {:?}", path.as_ref()))?;
    read_extract(file)
}

/// Read a ledger extract from any reader, checking the required headers
/// before deserializing rows.
pub fn read_extract<R: Read>(reader: R) -> Result<Vec<ExtractRow>> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader
        .headers()
        .context("Failed to read extract headers")?
        .clone();
    for required in REQUIRED_HEADERS {
        if !headers.iter().any(|h| h == required) {
            return Err(anyhow!(
                "Missing required header \"{}\" (expected {})",
                required,
                REQUIRED_HEADERS.join(", ")
            ));
        }
    }

    let mut rows = Vec::new();
    for (line, record) in csv_reader.deserialize().enumerate() {
        let row: ExtractRow =
            record.with_context(|| format!("Failed to parse extract row {}", line + 2))?;
        rows.push(row);
    }
    Ok(rows)
}

// ============================================================================
// EXTRACT → BALANCE SHEET
// ============================================================================

/// Aggregate extract rows into a balance sheet, one line item per account
/// code in first-seen order.
///
/// The balance is oriented by side: debit − credit for asset categories,
/// credit − debit for equity and debts, so a normal credit-side account
/// yields a positive book value.
pub fn bilan_from_extract(rows: &[ExtractRow]) -> BalanceSheet {
    let mut order: Vec<String> = Vec::new();
    let mut balances: HashMap<String, f64> = HashMap::new();
    let mut labels: HashMap<String, String> = HashMap::new();

    for row in rows {
        let account = row.account.trim().to_string();
        if account.is_empty() {
            continue;
        }
        let net = parse_amount(&row.debit) - parse_amount(&row.credit);

        if !balances.contains_key(&account) {
            order.push(account.clone());
            let label = row.label.trim();
            labels.insert(
                account.clone(),
                if label.is_empty() {
                    format!("Compte {}", account)
                } else {
                    label.to_string()
                },
            );
        }
        *balances.entry(account).or_insert(0.0) += net;
    }

    let mut sheet = BalanceSheet::new();
    for account in order {
        let category = category_for_account(&account);
        let net = balances[&account];
        let value = if category.is_liability_side() { -net } else { net };

        let id = format!("compte-{}", account);
        sheet.push(LineItem::new(&id, &labels[&account], category, value));
    }
    sheet
}

// ============================================================================
// TESTS
// ============================================================================
