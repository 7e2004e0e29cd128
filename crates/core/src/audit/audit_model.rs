//! Audit finding models.
//!
//! Findings are advisory: the engine always returns its best-effort
//! results and surfaces these alongside them, never instead of them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::holdings::Holding;

/// Severity of an audit finding.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// What condition a finding reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FindingCode {
    /// A holding failed every classification rule.
    ClassificationGap,
    /// Category sums disagree with the grand total beyond tolerance.
    ReconciliationMismatch,
    /// Conflicting contributions for one (identity, sub-account) pair.
    DuplicateSubAccount,
}

/// A reference to a holding, carried by findings so a human can audit a
/// misclassification without re-deriving the whole computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingRef {
    pub identity: String,
    pub sub_account: String,
    pub current_value: Option<Decimal>,
}

impl From<&Holding> for HoldingRef {
    fn from(holding: &Holding) -> Self {
        HoldingRef {
            identity: holding.asset.identity.clone(),
            sub_account: holding.sub_account.clone(),
            current_value: holding.current_value,
        }
    }
}

/// One advisory audit finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFinding {
    pub code: FindingCode,
    pub severity: Severity,
    pub message: String,
    /// Holdings this finding is about.
    pub affected: Vec<HoldingRef>,
    /// Signed amount by which the books disagree, where applicable.
    pub difference: Option<Decimal>,
}

impl AuditFinding {
    /// Finding for holdings that fell through the whole rule table.
    pub fn classification_gap(unclassified: Vec<HoldingRef>) -> Self {
        let message = if unclassified.len() == 1 {
            format!(
                "Holding {} / {} matched no classification rule",
                unclassified[0].identity, unclassified[0].sub_account
            )
        } else {
            format!(
                "{} holdings matched no classification rule",
                unclassified.len()
            )
        };
        AuditFinding {
            code: FindingCode::ClassificationGap,
            severity: Severity::Warning,
            message,
            affected: unclassified,
            difference: None,
        }
    }

    /// Finding for a category-sum vs grand-total disagreement.
    pub fn reconciliation_mismatch(difference: Decimal, unaccounted: Vec<HoldingRef>) -> Self {
        AuditFinding {
            code: FindingCode::ReconciliationMismatch,
            severity: Severity::Error,
            message: format!(
                "Category totals differ from the grand total by {} ({} unaccounted holdings)",
                difference,
                unaccounted.len()
            ),
            affected: unaccounted,
            difference: Some(difference),
        }
    }

    /// Finding for conflicting contributions to one sub-account. Both
    /// cost bases are recorded so neither silently wins.
    pub fn duplicate_sub_account(
        identity: &str,
        sub_account: &str,
        existing_cost: Decimal,
        existing_currency: &str,
        incoming_cost: Decimal,
        incoming_currency: &str,
    ) -> Self {
        AuditFinding {
            code: FindingCode::DuplicateSubAccount,
            severity: Severity::Warning,
            message: format!(
                "Conflicting contributions for {} / {}: kept {} {}, excluded {} {}",
                identity, sub_account, existing_cost, existing_currency, incoming_cost,
                incoming_currency
            ),
            affected: vec![HoldingRef {
                identity: identity.to_string(),
                sub_account: sub_account.to_string(),
                current_value: None,
            }],
            difference: None,
        }
    }
}
