//! Portfolio summary models.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditFinding;
use crate::categories::Category;
use crate::holdings::Holding;
use crate::statements::RecordError;

/// Aggregated figures for one category bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    /// Number of holdings in the bucket.
    pub count: usize,
    pub invested: Decimal,
    pub current_value: Decimal,
    pub gain_pct: Option<Decimal>,
    /// Share of the portfolio's current value, percent.
    pub allocation_pct: Decimal,
}

/// Grand totals over the whole holding set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub invested: Decimal,
    pub current_value: Decimal,
    pub gain: Decimal,
    pub gain_pct: Option<Decimal>,
}

/// The complete output of one reconcile-and-value pass: per-holding
/// detail, the category breakdown, the grand total, the advisory audit
/// findings, and the records that failed validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuation {
    pub holdings: Vec<Holding>,
    pub category_totals: BTreeMap<Category, CategoryTotal>,
    pub grand_total: PortfolioTotals,
    pub audit_findings: Vec<AuditFinding>,
    pub errors: Vec<RecordError>,
    pub import_run_id: Uuid,
}
