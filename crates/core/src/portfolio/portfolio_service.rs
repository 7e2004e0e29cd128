//! Portfolio service.
//!
//! Orchestrates the full reconcile-and-value pass:
//! normalize → resolve identities → aggregate → classify → value →
//! audit. Per-record errors are collected along the way so one
//! malformed statement line never aborts an import, and every pass is
//! recorded in the import-run ledger.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use log::info;
use rust_decimal::Decimal;

use crate::assets::resolve_identity;
use crate::audit::ReconciliationAuditor;
use crate::categories::{classify_all, Category};
use crate::constants::PERCENT_PRECISION;
use crate::holdings::{AggregationResult, Holding, HoldingAggregator};
use crate::imports::{ImportLedger, ImportRun};
use crate::statements::{normalize_payload, RecordError, StatementPayload};
use crate::valuation::{self, PriceLookupTrait, PricePoint, ValuationCalculator};

use super::portfolio_model::{CategoryTotal, PortfolioTotals, PortfolioValuation};

pub struct PortfolioService {
    prices: Arc<dyn PriceLookupTrait>,
    auditor: ReconciliationAuditor,
    ledger: ImportLedger,
}

impl PortfolioService {
    pub fn new(prices: Arc<dyn PriceLookupTrait>) -> Self {
        Self {
            prices,
            auditor: ReconciliationAuditor::default(),
            ledger: ImportLedger::new(),
        }
    }

    /// Runs a full pass over the given payloads, valued as of today.
    pub fn reconcile_and_value(&mut self, payloads: &[StatementPayload]) -> PortfolioValuation {
        self.reconcile_and_value_as_of(payloads, Utc::now().date_naive())
    }

    /// Runs a full pass valued as of an explicit date.
    pub fn reconcile_and_value_as_of(
        &mut self,
        payloads: &[StatementPayload],
        as_of: NaiveDate,
    ) -> PortfolioValuation {
        let started_at = Utc::now();
        let mut errors: Vec<RecordError> = Vec::new();
        let mut aggregator = HoldingAggregator::new();

        for payload in payloads {
            let output = normalize_payload(payload, as_of);
            errors.extend(output.errors);
            for record in output.records {
                match resolve_identity(
                    record.isin.as_deref(),
                    record.issuer.as_deref(),
                    record.name.as_deref(),
                ) {
                    Ok(identity) => aggregator.ingest(identity, record),
                    Err(err) => errors.push(RecordError {
                        source: record.source,
                        record: record.label(),
                        message: err.to_string(),
                    }),
                }
            }
        }

        let AggregationResult {
            mut holdings,
            mut findings,
            stats,
        } = aggregator.finish();

        classify_all(&mut holdings);
        ValuationCalculator::new(as_of).value_holdings(&mut holdings, self.prices.as_ref());

        let category_totals = summarize_by_category(&holdings);
        let grand_total = grand_total(&holdings);
        findings.extend(self.auditor.audit(&holdings, &category_totals));

        let run = ImportRun::finish(started_at, stats, errors.len());
        let import_run_id = run.id;
        info!(
            "Import {}: {} holdings from {} records ({} duplicates skipped, {} errors, {} findings)",
            import_run_id,
            holdings.len(),
            stats.ingested,
            stats.skipped_duplicates,
            errors.len(),
            findings.len()
        );
        self.ledger.record(run);

        PortfolioValuation {
            holdings,
            category_totals,
            grand_total,
            audit_findings: findings,
            errors,
            import_run_id,
        }
    }

    /// Refreshes one holding from a fresh price point.
    pub fn revalue(&self, holding: &Holding, latest: &PricePoint, as_of: NaiveDate) -> Holding {
        valuation::revalue(holding, latest, as_of)
    }

    /// The ledger of import runs executed by this service.
    pub fn ledger(&self) -> &ImportLedger {
        &self.ledger
    }
}

/// Category breakdown over a valued holding set.
pub fn summarize_by_category(holdings: &[Holding]) -> BTreeMap<Category, CategoryTotal> {
    let portfolio_value: Decimal = holdings
        .iter()
        .filter_map(|h| h.current_value)
        .sum();

    let mut totals: BTreeMap<Category, CategoryTotal> = BTreeMap::new();
    for holding in holdings {
        let Some(category) = holding.category else {
            continue;
        };
        let entry = totals.entry(category).or_insert(CategoryTotal {
            count: 0,
            invested: Decimal::ZERO,
            current_value: Decimal::ZERO,
            gain_pct: None,
            allocation_pct: Decimal::ZERO,
        });
        entry.count += 1;
        entry.invested += holding.invested;
        entry.current_value += holding.current_value.unwrap_or(Decimal::ZERO);
    }

    for total in totals.values_mut() {
        total.gain_pct = valuation::gain_percentage(total.invested, total.current_value);
        total.allocation_pct = if portfolio_value > Decimal::ZERO {
            (total.current_value / portfolio_value * Decimal::ONE_HUNDRED)
                .round_dp(PERCENT_PRECISION)
        } else {
            Decimal::ZERO
        };
    }

    totals
}

/// Grand totals over a valued holding set.
pub fn grand_total(holdings: &[Holding]) -> PortfolioTotals {
    let invested: Decimal = holdings.iter().map(|h| h.invested).sum();
    let current_value: Decimal = holdings
        .iter()
        .map(|h| h.current_value.unwrap_or(Decimal::ZERO))
        .sum();
    PortfolioTotals {
        invested,
        current_value,
        gain: current_value - invested,
        gain_pct: valuation::gain_percentage(invested, current_value),
    }
}
