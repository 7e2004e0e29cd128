//! Holding aggregator.
//!
//! Merges normalized records sharing the same `(asset identity,
//! sub_account)` key into one holding. Replaying the same record does
//! not double-count: every record is fingerprinted on ingest and a
//! previously seen fingerprint is skipped, so aggregation over the same
//! inputs is idempotent. Records for the same key in a different
//! currency are not summed; both contributions are surfaced in a
//! warning finding instead.

use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::assets::Asset;
use crate::audit::AuditFinding;
use crate::statements::NormalizedRecord;

use super::holdings_model::Holding;

/// Counters for one aggregation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationStats {
    /// Records merged into the holding set.
    pub ingested: usize,
    /// Records skipped because their fingerprint was already processed.
    pub skipped_duplicates: usize,
    /// Records excluded from summation over a currency conflict.
    pub conflicts: usize,
}

/// Output of [`HoldingAggregator::finish`].
#[derive(Debug)]
pub struct AggregationResult {
    pub holdings: Vec<Holding>,
    pub findings: Vec<AuditFinding>,
    pub stats: AggregationStats,
}

/// Accumulates normalized records into the holding set.
#[derive(Debug, Default)]
pub struct HoldingAggregator {
    holdings: BTreeMap<(String, String), Holding>,
    seen: HashSet<String>,
    findings: Vec<AuditFinding>,
    stats: AggregationStats,
}

impl HoldingAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingests one record under its resolved identity key.
    pub fn ingest(&mut self, identity: String, record: NormalizedRecord) {
        let fingerprint = record_fingerprint(&identity, &record);
        if !self.seen.insert(fingerprint) {
            debug!(
                "Skipping already processed record for {} / {}",
                identity, record.sub_account
            );
            self.stats.skipped_duplicates += 1;
            return;
        }

        let key = (identity.clone(), record.sub_account.clone());
        match self.holdings.get_mut(&key) {
            Some(existing) => merge_into(existing, record, &mut self.findings, &mut self.stats),
            None => {
                let holding = new_holding(identity, record);
                self.holdings.insert(key, holding);
                self.stats.ingested += 1;
            }
        }
    }

    /// Consumes the aggregator, returning the holding set, the findings
    /// raised while merging, and the pass counters.
    pub fn finish(self) -> AggregationResult {
        AggregationResult {
            holdings: self.holdings.into_values().collect(),
            findings: self.findings,
            stats: self.stats,
        }
    }
}

/// Merges a second statement line into an existing holding: quantity and
/// cost sum, transactions concatenate, the earliest acquisition date
/// wins.
fn merge_into(
    existing: &mut Holding,
    record: NormalizedRecord,
    findings: &mut Vec<AuditFinding>,
    stats: &mut AggregationStats,
) {
    if !existing.currency.eq_ignore_ascii_case(&record.currency) {
        warn!(
            "Currency conflict for {} / {}: holding is {} with cost {}, record is {} with cost {}",
            existing.asset.identity,
            existing.sub_account,
            existing.currency,
            existing.invested,
            record.currency,
            record.cost
        );
        findings.push(AuditFinding::duplicate_sub_account(
            &existing.asset.identity,
            &existing.sub_account,
            existing.invested,
            &existing.currency,
            record.cost,
            &record.currency,
        ));
        // Amounts are not summed across currencies, but the history is
        // kept so nothing disappears from the record.
        existing.transactions.extend(record.transactions);
        stats.conflicts += 1;
        return;
    }

    existing.quantity += record.quantity;
    existing.invested += record.cost;
    existing.statement_value = match (existing.statement_value, record.statement_value) {
        (Some(a), Some(b)) => Some(a + b),
        (a, b) => a.or(b),
    };
    let record_acquired = record.acquired_at();
    existing.acquired_at = match (existing.acquired_at, record_acquired) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    existing.transactions.extend(record.transactions);
    if existing.category_hint.is_none() {
        existing.category_hint = record.category_hint;
    }
    stats.ingested += 1;
}

fn new_holding(identity: String, record: NormalizedRecord) -> Holding {
    let acquired_at = record.acquired_at();
    Holding {
        id: Uuid::new_v4(),
        asset: Asset {
            identity,
            name: record.label(),
            kind: record.kind,
            symbol: record.symbol,
            exchange: record.exchange,
            scheme: record.scheme,
        },
        sub_account: record.sub_account,
        currency: record.currency,
        quantity: record.quantity,
        invested: record.cost,
        statement_value: record.statement_value,
        current_value: None,
        unrealized_gain: None,
        unrealized_gain_pct: None,
        annualized_return: None,
        acquired_at,
        category: None,
        category_hint: record.category_hint,
        transactions: record.transactions,
    }
}

/// Stable fingerprint of a record's semantic content.
///
/// Covers the identity, sub-account, amounts and the transaction list,
/// so the same statement page replayed hashes identically while a
/// genuinely new line for the same holding does not.
fn record_fingerprint(identity: &str, record: &NormalizedRecord) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    hasher.update(b"|");
    hasher.update(record.sub_account.as_bytes());
    hasher.update(b"|");
    hasher.update(normalize_decimal(record.quantity).as_bytes());
    hasher.update(b"|");
    hasher.update(normalize_decimal(record.cost).as_bytes());
    hasher.update(b"|");
    if let Some(value) = record.statement_value {
        hasher.update(normalize_decimal(value).as_bytes());
    }
    hasher.update(b"|");
    hasher.update(record.currency.as_bytes());
    hasher.update(b"|");
    for txn in &record.transactions {
        hasher.update(txn.date.to_string().as_bytes());
        hasher.update(b"/");
        hasher.update(normalize_decimal(txn.amount).as_bytes());
        hasher.update(b";");
    }
    hex::encode(hasher.finalize())
}

/// Normalize a decimal to a consistent string form for hashing.
fn normalize_decimal(d: Decimal) -> String {
    d.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::InstrumentKind;
    use crate::statements::StatementSource;
    use rust_decimal_macros::dec;

    fn record(sub_account: &str, units: &str, cost: &str, value: &str) -> NormalizedRecord {
        NormalizedRecord {
            source: StatementSource::MutualFundFolio,
            isin: Some("INF194K01391".to_string()),
            issuer: None,
            name: Some("Index Fund".to_string()),
            symbol: None,
            kind: InstrumentKind::MutualFundUnit,
            exchange: None,
            scheme: None,
            sub_account: sub_account.to_string(),
            currency: "INR".to_string(),
            quantity: units.parse().unwrap(),
            cost: cost.parse().unwrap(),
            statement_value: Some(value.parse().unwrap()),
            unit_price: None,
            category_hint: None,
            transactions: vec![],
        }
    }

    #[test]
    fn test_identical_record_is_skipped() {
        let mut aggregator = HoldingAggregator::new();
        aggregator.ingest("INF194K01391".to_string(), record("1215430", "5305.175", "300000", "450000"));
        aggregator.ingest("INF194K01391".to_string(), record("1215430", "5305.175", "300000", "450000"));

        let result = aggregator.finish();
        assert_eq!(result.holdings.len(), 1);
        assert_eq!(result.holdings[0].invested, dec!(300000));
        assert_eq!(result.holdings[0].quantity, dec!(5305.175));
        assert_eq!(result.stats.skipped_duplicates, 1);
    }

    #[test]
    fn test_distinct_records_for_same_key_merge() {
        let mut aggregator = HoldingAggregator::new();
        aggregator.ingest("INF194K01391".to_string(), record("1215430", "100", "10000", "12000"));
        aggregator.ingest("INF194K01391".to_string(), record("1215430", "50", "6000", "7000"));

        let result = aggregator.finish();
        assert_eq!(result.holdings.len(), 1);
        let holding = &result.holdings[0];
        assert_eq!(holding.quantity, dec!(150));
        assert_eq!(holding.invested, dec!(16000));
        assert_eq!(holding.statement_value, Some(dec!(19000)));
    }

    #[test]
    fn test_sub_accounts_stay_distinct() {
        let mut aggregator = HoldingAggregator::new();
        aggregator.ingest("INF194K01391".to_string(), record("1215430", "100", "10000", "12000"));
        aggregator.ingest("INF194K01391".to_string(), record("9988776", "100", "10000", "12000"));

        let result = aggregator.finish();
        assert_eq!(result.holdings.len(), 2);
    }

    #[test]
    fn test_currency_conflict_is_flagged_not_summed() {
        let mut aggregator = HoldingAggregator::new();
        aggregator.ingest("INF194K01391".to_string(), record("1215430", "100", "10000", "12000"));
        let mut conflicting = record("1215430", "10", "900", "1000");
        conflicting.currency = "USD".to_string();
        aggregator.ingest("INF194K01391".to_string(), conflicting);

        let result = aggregator.finish();
        assert_eq!(result.holdings.len(), 1);
        // The conflicting record's amounts were not summed.
        assert_eq!(result.holdings[0].invested, dec!(10000));
        assert_eq!(result.holdings[0].quantity, dec!(100));
        assert_eq!(result.stats.conflicts, 1);
        assert_eq!(result.findings.len(), 1);
    }
}
