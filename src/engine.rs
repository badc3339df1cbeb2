// 💰 Valuation Engine - ANC/ANCC derivation and completeness
// Pure functions of (BalanceSheet, AdjustmentLedger): no state, no caching

use crate::bilan::BalanceSheet;
use crate::ledger::AdjustmentLedger;
use crate::model::{AnccResult, BilanCategory};

/// Corporate tax rate applied to the net taxable revaluation gain
pub const TAX_RATE: f64 = 0.25;

// ============================================================================
// VALUATION
// ============================================================================

/// Compute the full valuation at the default [`TAX_RATE`].
pub fn evaluate(bilan: &BalanceSheet, adjustments: &AdjustmentLedger) -> AnccResult {
    evaluate_with_rate(bilan, adjustments, TAX_RATE)
}

/// Compute the full valuation at an explicit tax rate.
///
/// Total over any structurally valid state: numeric edge cases (NaN,
/// infinity) are excluded upstream by the stores' input sanitation.
///
/// Per item (equity only contributes to `anc`):
/// - fictitious: gap = -value, unconditional full write-off, always taxable
/// - revalued: gap = revalued - value
/// - otherwise the item contributes nothing
/// The gap is negated for debts and off-balance-sheet commitments (a higher
/// valuation there is a loss for the owner). Only a positive net taxable
/// base generates a deferred-tax liability; a net taxable loss never
/// generates a tax asset (conservatism).
pub fn evaluate_with_rate(
    bilan: &BalanceSheet,
    adjustments: &AdjustmentLedger,
    tax_rate: f64,
) -> AnccResult {
    let mut anc = 0.0;
    let mut total_asset = 0.0;
    let mut total_liability = 0.0;
    let mut total_gains = 0.0;
    let mut total_losses = 0.0;
    let mut taxable_base = 0.0;

    for item in bilan.iter() {
        if item.category.is_asset() {
            total_asset += item.value;
        }
        if item.category.is_liability_side() {
            total_liability += item.value;
        }
        if item.category == BilanCategory::Equity {
            anc += item.value;
            continue;
        }

        let adj = adjustments.get_or_default(item);
        let raw_gap = if item.is_fictitious {
            Some(-item.value)
        } else {
            adj.revalued_value.map(|revalued| revalued - item.value)
        };

        let Some(mut gap) = raw_gap else {
            continue;
        };

        if item.category.flips_sign() {
            gap = -gap;
        }

        if gap > 0.0 {
            total_gains += gap;
        } else {
            total_losses += gap.abs();
        }

        // Fictitious write-offs are always part of the taxable base
        if adj.apply_deferred_tax || item.is_fictitious {
            taxable_base += gap;
        }
    }

    let net_adjustment = total_gains - total_losses;
    let deferred_tax = if taxable_base > 0.0 {
        taxable_base * tax_rate
    } else {
        0.0
    };

    AnccResult {
        anc,
        total_asset,
        total_liability,
        total_gains,
        total_losses,
        net_adjustment,
        deferred_tax,
        corrected_net_worth: anc + net_adjustment - deferred_tax,
    }
}

// ============================================================================
// COMPLETENESS
// ============================================================================

/// Percentage (0..=100, rounded) of eligible items that have received an
/// explicit revaluation. Eligible = non-equity, non-fictitious (equity is
/// never adjusted; fictitious items are written off automatically). An
/// empty eligible set is vacuously complete.
pub fn completeness(bilan: &BalanceSheet, adjustments: &AdjustmentLedger) -> u8 {
    let eligible: Vec<_> = bilan
        .iter()
        .filter(|item| item.category != BilanCategory::Equity && !item.is_fictitious)
        .collect();

    if eligible.is_empty() {
        return 100;
    }

    let adjusted = eligible
        .iter()
        .filter(|item| adjustments.get(&item.id).is_some_and(|adj| adj.is_set()))
        .count();

    ((adjusted as f64 / eligible.len() as f64) * 100.0).round() as u8
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineItem;

    fn sheet(items: Vec<LineItem>) -> BalanceSheet {
        BalanceSheet::from_items(items)
    }

    #[test]
    fn test_no_adjustments_yields_baseline() {
        let bilan = sheet(vec![
            LineItem::new("capital", "Capital", BilanCategory::Equity, 300_000.0),
            LineItem::new("terrains", "Terrains", BilanCategory::FixedAsset, 250_000.0),
            LineItem::new("dettes", "Dettes", BilanCategory::Debt, 100_000.0),
        ]);
        let result = evaluate(&bilan, &AdjustmentLedger::new());

        assert_eq!(result.anc, 300_000.0);
        assert_eq!(result.net_adjustment, 0.0);
        assert_eq!(result.deferred_tax, 0.0);
        assert_eq!(result.corrected_net_worth, result.anc);
    }

    #[test]
    fn test_reference_scenario() {
        // Single equity item 300k, one asset 100k revalued to 130k, taxed at 25%
        let bilan = sheet(vec![
            LineItem::new("capital", "Capital", BilanCategory::Equity, 300_000.0),
            LineItem::new("terrains", "Terrains", BilanCategory::FixedAsset, 100_000.0),
        ]);
        let mut ledger = AdjustmentLedger::new();
        ledger.set("terrains", Some(130_000.0), "Expertise", true);

        let result = evaluate_with_rate(&bilan, &ledger, 0.25);
        assert_eq!(result.anc, 300_000.0);
        assert_eq!(result.total_gains, 30_000.0);
        assert_eq!(result.total_losses, 0.0);
        assert_eq!(result.net_adjustment, 30_000.0);
        assert_eq!(result.deferred_tax, 7_500.0);
        assert_eq!(result.corrected_net_worth, 322_500.0);
    }

    #[test]
    fn test_fictitious_written_off_unconditionally() {
        let bilan = sheet(vec![
            LineItem::new("capital", "Capital", BilanCategory::Equity, 300_000.0),
            LineItem::new("fe", "Frais d'établissement", BilanCategory::FixedAsset, 15_000.0)
                .fictitious(),
        ]);

        // No stored adjustment: full write-off, taxable base takes -15000
        let result = evaluate(&bilan, &AdjustmentLedger::new());
        assert_eq!(result.total_losses, 15_000.0);
        assert_eq!(result.net_adjustment, -15_000.0);
        assert_eq!(result.deferred_tax, 0.0);
        assert_eq!(result.corrected_net_worth, 285_000.0);

        // A stored revaluation is ignored for fictitious items
        let mut ledger = AdjustmentLedger::new();
        ledger.set("fe", Some(15_000.0), "should be ignored", false);
        let result = evaluate(&bilan, &ledger);
        assert_eq!(result.total_losses, 15_000.0);
    }

    #[test]
    fn test_fictitious_offsets_taxable_gain() {
        // Fictitious -15000 enters the taxable base even with
        // apply_deferred_tax stored false: only 15000 of the 30000 gain
        // remains taxable.
        let bilan = sheet(vec![
            LineItem::new("terrains", "Terrains", BilanCategory::FixedAsset, 100_000.0),
            LineItem::new("fe", "Frais d'établissement", BilanCategory::FixedAsset, 15_000.0)
                .fictitious(),
        ]);
        let mut ledger = AdjustmentLedger::new();
        ledger.set("terrains", Some(130_000.0), "", true);
        ledger.set("fe", None, "", false);

        let result = evaluate_with_rate(&bilan, &ledger, 0.25);
        assert_eq!(result.deferred_tax, 15_000.0 * 0.25);
    }

    #[test]
    fn test_sign_flip_symmetry() {
        // Increasing a debt's valuation by 20k is a 20k loss; the same
        // increase on an asset is a 20k gain.
        let debt_bilan = sheet(vec![LineItem::new("d", "Dettes", BilanCategory::Debt, 100_000.0)]);
        let asset_bilan = sheet(vec![LineItem::new("a", "Actif", BilanCategory::FixedAsset, 100_000.0)]);

        let mut ledger = AdjustmentLedger::new();
        ledger.set("d", Some(120_000.0), "", false);
        let debt_result = evaluate(&debt_bilan, &ledger);

        let mut ledger = AdjustmentLedger::new();
        ledger.set("a", Some(120_000.0), "", false);
        let asset_result = evaluate(&asset_bilan, &ledger);

        assert_eq!(debt_result.net_adjustment, -20_000.0);
        assert_eq!(asset_result.net_adjustment, 20_000.0);
    }

    #[test]
    fn test_off_balance_sheet_flips_sign() {
        let bilan = sheet(vec![
            LineItem::new("ifc", "Engagement hors bilan (IFC)", BilanCategory::OffBalanceSheet, 0.0),
        ]);
        let mut ledger = AdjustmentLedger::new();
        ledger.set("ifc", Some(25_000.0), "Engagement retraites", false);

        let result = evaluate(&bilan, &ledger);
        assert_eq!(result.total_losses, 25_000.0);
        assert_eq!(result.net_adjustment, -25_000.0);
    }

    #[test]
    fn test_deferred_tax_never_negative() {
        // Net taxable loss: no tax asset (conservatism)
        let bilan = sheet(vec![
            LineItem::new("stocks", "Stocks", BilanCategory::CurrentAsset, 95_000.0),
        ]);
        let mut ledger = AdjustmentLedger::new();
        ledger.set("stocks", Some(60_000.0), "Dépréciation", true);

        let result = evaluate(&bilan, &ledger);
        assert_eq!(result.total_losses, 35_000.0);
        assert_eq!(result.deferred_tax, 0.0);
        assert!(result.deferred_tax >= 0.0);
    }

    #[test]
    fn test_untaxed_gain_generates_no_tax() {
        let bilan = sheet(vec![
            LineItem::new("stocks", "Stocks", BilanCategory::CurrentAsset, 95_000.0)
                .with_deferred_tax(false),
        ]);
        let mut ledger = AdjustmentLedger::new();
        ledger.set("stocks", Some(110_000.0), "", false);

        let result = evaluate(&bilan, &ledger);
        assert_eq!(result.total_gains, 15_000.0);
        assert_eq!(result.deferred_tax, 0.0);
    }

    #[test]
    fn test_totals_by_side() {
        let bilan = BalanceSheet::seed();
        let result = evaluate(&bilan, &AdjustmentLedger::new());

        // 15000+120000+250000+450000+180000+95000+75000+50000+110000
        assert_eq!(result.total_asset, 1_345_000.0);
        // 300000+220000+85000+40000+350000+50000
        assert_eq!(result.total_liability, 1_045_000.0);
        assert_eq!(result.anc, 605_000.0);
    }

    #[test]
    fn test_equity_revaluation_ignored() {
        let bilan = sheet(vec![
            LineItem::new("capital", "Capital", BilanCategory::Equity, 300_000.0),
        ]);
        let mut ledger = AdjustmentLedger::new();
        ledger.set("capital", Some(999_999.0), "", true);

        let result = evaluate(&bilan, &ledger);
        assert_eq!(result.anc, 300_000.0);
        assert_eq!(result.net_adjustment, 0.0);
        assert_eq!(result.corrected_net_worth, 300_000.0);
    }

    #[test]
    fn test_completeness_counts_eligible_items() {
        let bilan = sheet(vec![
            LineItem::new("capital", "Capital", BilanCategory::Equity, 300_000.0),
            LineItem::new("fe", "Frais d'établissement", BilanCategory::FixedAsset, 15_000.0)
                .fictitious(),
            LineItem::new("terrains", "Terrains", BilanCategory::FixedAsset, 250_000.0),
            LineItem::new("stocks", "Stocks", BilanCategory::CurrentAsset, 95_000.0),
        ]);
        let mut ledger = AdjustmentLedger::new();

        // Equity and fictitious items are out of the denominator
        assert_eq!(completeness(&bilan, &ledger), 0);

        ledger.set("terrains", Some(300_000.0), "", true);
        assert_eq!(completeness(&bilan, &ledger), 50);

        ledger.set("stocks", Some(90_000.0), "", false);
        assert_eq!(completeness(&bilan, &ledger), 100);

        // An entry without a set value does not count
        ledger.set("stocks", None, "note seule", false);
        assert_eq!(completeness(&bilan, &ledger), 50);
    }

    #[test]
    fn test_completeness_vacuously_complete() {
        let bilan = sheet(vec![
            LineItem::new("capital", "Capital", BilanCategory::Equity, 300_000.0),
        ]);
        assert_eq!(completeness(&bilan, &AdjustmentLedger::new()), 100);
        assert_eq!(completeness(&BalanceSheet::new(), &AdjustmentLedger::new()), 100);
    }

    #[test]
    fn test_completeness_rounds() {
        let bilan = sheet(vec![
            LineItem::new("a", "A", BilanCategory::FixedAsset, 1.0),
            LineItem::new("b", "B", BilanCategory::FixedAsset, 1.0),
            LineItem::new("c", "C", BilanCategory::FixedAsset, 1.0),
        ]);
        let mut ledger = AdjustmentLedger::new();
        ledger.set("a", Some(2.0), "", true);

        // 1/3 → 33
        assert_eq!(completeness(&bilan, &ledger), 33);

        ledger.set("b", Some(2.0), "", true);
        // 2/3 → 67
        assert_eq!(completeness(&bilan, &ledger), 67);
    }
}
