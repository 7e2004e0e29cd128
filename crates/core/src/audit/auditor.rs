//! Reconciliation auditor.
//!
//! Cross-checks the classifier's category totals against the holding
//! set: the per-category sums must add up to the grand total within
//! tolerance, and every holding must sit in exactly one bucket. The
//! checks are advisory; callers still get best-effort totals with the
//! findings listed next to them.

use std::collections::BTreeMap;
use std::str::FromStr;

use log::warn;
use rust_decimal::Decimal;

use crate::categories::Category;
use crate::constants::RECONCILIATION_TOLERANCE;
use crate::holdings::Holding;
use crate::portfolio::CategoryTotal;

use super::audit_model::{AuditFinding, HoldingRef};

pub struct ReconciliationAuditor {
    tolerance: Decimal,
}

impl Default for ReconciliationAuditor {
    fn default() -> Self {
        Self {
            tolerance: Decimal::from_str(RECONCILIATION_TOLERANCE)
                .expect("Invalid tolerance constant"),
        }
    }
}

impl ReconciliationAuditor {
    pub fn new(tolerance: Decimal) -> Self {
        Self { tolerance }
    }

    /// Verifies the category partition over the valued holding set.
    pub fn audit(
        &self,
        holdings: &[Holding],
        category_totals: &BTreeMap<Category, CategoryTotal>,
    ) -> Vec<AuditFinding> {
        let mut findings = Vec::new();

        // Holdings that fell through the rule table. Should be
        // unreachable while the table ends in a catch-all; this guards
        // future rule regressions.
        let unclassified: Vec<HoldingRef> = holdings
            .iter()
            .filter(|h| h.category.is_none())
            .map(HoldingRef::from)
            .collect();
        if !unclassified.is_empty() {
            warn!("{} holdings matched no classification rule", unclassified.len());
            findings.push(AuditFinding::classification_gap(unclassified.clone()));
        }

        // Recompute bucket sums from scratch rather than trusting the
        // supplied totals.
        let mut recomputed: BTreeMap<Category, Decimal> = BTreeMap::new();
        let mut membership: BTreeMap<Category, usize> = BTreeMap::new();
        let mut grand_total = Decimal::ZERO;
        for holding in holdings {
            let value = holding.current_value.unwrap_or(Decimal::ZERO);
            grand_total += value;
            if let Some(category) = holding.category {
                *recomputed.entry(category).or_insert(Decimal::ZERO) += value;
                *membership.entry(category).or_insert(0) += 1;
            }
        }

        // Per-category drift between the supplied totals and the
        // recomputation.
        for (category, total) in category_totals {
            let expected = recomputed
                .get(category)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let drift = total.current_value - expected;
            if drift.abs() > self.tolerance {
                warn!(
                    "Category {} total {} drifts from recomputed {}",
                    category, total.current_value, expected
                );
                findings.push(AuditFinding::reconciliation_mismatch(drift, Vec::new()));
            }
        }

        // The partition check: bucket sums vs the sum over all holdings.
        let category_sum: Decimal = category_totals
            .values()
            .map(|t| t.current_value)
            .sum();
        let difference = grand_total - category_sum;
        if difference.abs() > self.tolerance {
            warn!(
                "Category sums {} differ from grand total {} by {}",
                category_sum, grand_total, difference
            );
            findings.push(AuditFinding::reconciliation_mismatch(
                difference,
                holdings
                    .iter()
                    .filter(|h| h.category.is_none())
                    .map(HoldingRef::from)
                    .collect(),
            ));
        }

        // Membership sanity: bucket counts must cover every classified
        // holding exactly once.
        let classified = holdings.iter().filter(|h| h.category.is_some()).count();
        let counted: usize = category_totals.values().map(|t| t.count).sum();
        if counted != classified {
            warn!(
                "Category buckets count {} holdings but {} are classified",
                counted, classified
            );
            findings.push(AuditFinding::reconciliation_mismatch(
                Decimal::ZERO,
                Vec::new(),
            ));
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::super::audit_model::FindingCode;
    use super::*;
    use crate::assets::{Asset, InstrumentKind};
    use crate::portfolio::summarize_by_category;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn holding(identity: &str, category: Option<Category>, value: Decimal) -> Holding {
        Holding {
            id: Uuid::new_v4(),
            asset: Asset {
                identity: identity.to_string(),
                name: identity.to_string(),
                kind: InstrumentKind::Equity,
                symbol: None,
                exchange: None,
                scheme: None,
            },
            sub_account: "ACC".to_string(),
            currency: "INR".to_string(),
            quantity: Decimal::ONE,
            invested: value,
            statement_value: None,
            current_value: Some(value),
            unrealized_gain: Some(Decimal::ZERO),
            unrealized_gain_pct: None,
            annualized_return: None,
            acquired_at: None,
            category,
            category_hint: None,
            transactions: vec![],
        }
    }

    #[test]
    fn test_clean_partition_yields_no_findings() {
        let holdings = vec![
            holding("A", Some(Category::Stock), dec!(1000)),
            holding("B", Some(Category::MutualFund), dec!(2000)),
            holding("C", Some(Category::Stock), dec!(500)),
        ];
        let totals = summarize_by_category(&holdings);
        let findings = ReconciliationAuditor::default().audit(&holdings, &totals);
        assert!(findings.is_empty(), "unexpected findings: {:?}", findings);
    }

    #[test]
    fn test_unclassified_holding_is_reported() {
        let holdings = vec![
            holding("A", Some(Category::Stock), dec!(1000)),
            holding("B", None, dec!(2000)),
        ];
        let totals = summarize_by_category(&holdings);
        let findings = ReconciliationAuditor::default().audit(&holdings, &totals);

        // The gap itself, plus the mismatch it causes in the partition.
        assert!(findings
            .iter()
            .any(|f| f.code == FindingCode::ClassificationGap));
        let mismatch = findings
            .iter()
            .find(|f| f.code == FindingCode::ReconciliationMismatch)
            .expect("partition mismatch expected");
        assert_eq!(mismatch.difference, Some(dec!(2000)));
        assert_eq!(mismatch.affected.len(), 1);
        assert_eq!(mismatch.affected[0].identity, "B");
    }

    #[test]
    fn test_tampered_totals_are_caught() {
        let holdings = vec![holding("A", Some(Category::Stock), dec!(1000))];
        let mut totals = summarize_by_category(&holdings);
        totals
            .get_mut(&Category::Stock)
            .expect("stock bucket")
            .current_value = dec!(900);

        let findings = ReconciliationAuditor::default().audit(&holdings, &totals);
        assert!(!findings.is_empty());
    }

    #[test]
    fn test_difference_within_tolerance_passes() {
        let holdings = vec![holding("A", Some(Category::Stock), dec!(1000))];
        let mut totals = summarize_by_category(&holdings);
        totals
            .get_mut(&Category::Stock)
            .expect("stock bucket")
            .current_value = dec!(1000.005);

        let findings = ReconciliationAuditor::default().audit(&holdings, &totals);
        assert!(findings.is_empty());
    }
}
