//! Transaction domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Canonical transaction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Buy,
    Sell,
    Dividend,
    Interest,
    Redemption,
}

impl TransactionKind {
    /// Maps a raw statement label onto a canonical kind.
    ///
    /// Purchases and SIP instalments count as buys. Unrecognised labels
    /// default to Buy so a statement line is never dropped over an
    /// unexpected spelling.
    pub fn from_source_label(label: &str) -> Self {
        let upper = label.to_uppercase();
        if upper.contains("PURCHASE") || upper.contains("SIP") {
            TransactionKind::Buy
        } else if upper.contains("REDEMPTION") {
            TransactionKind::Redemption
        } else if upper.contains("SELL") {
            TransactionKind::Sell
        } else if upper.contains("DIVIDEND") {
            TransactionKind::Dividend
        } else if upper.contains("INTEREST") {
            TransactionKind::Interest
        } else {
            TransactionKind::Buy
        }
    }

    /// Whether the kind reduces the position.
    pub fn is_outflow(&self) -> bool {
        matches!(self, TransactionKind::Sell | TransactionKind::Redemption)
    }
}

/// A single buy/sell/contribution/redemption event.
///
/// Created once during import from a statement line and never mutated
/// afterwards; removing one from a holding triggers re-aggregation of
/// that holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub kind: TransactionKind,
    pub date: NaiveDate,
    pub units: Option<Decimal>,
    /// Price per unit (NAV for fund transactions).
    pub price: Option<Decimal>,
    pub amount: Decimal,
    pub description: Option<String>,
}

/// Replays a transaction history into a net position.
///
/// Buys add units and invested amount; sells and redemptions remove
/// units at the running average cost and reduce the invested amount
/// proportionally. Dividends and interest leave the position unchanged.
/// Both totals are clamped at zero.
///
/// Returns `(quantity, invested_amount)`.
pub fn replay_position(transactions: &[Transaction]) -> (Decimal, Decimal) {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|t| t.date);

    let mut quantity = Decimal::ZERO;
    let mut invested = Decimal::ZERO;

    for txn in ordered {
        let units = txn.units.unwrap_or(Decimal::ZERO);
        match txn.kind {
            TransactionKind::Buy => {
                quantity += units;
                invested += txn.amount;
            }
            TransactionKind::Sell | TransactionKind::Redemption => {
                if quantity > Decimal::ZERO && invested > Decimal::ZERO {
                    let avg_cost = invested / quantity;
                    invested -= units * avg_cost;
                }
                quantity -= units;
                if quantity < Decimal::ZERO {
                    quantity = Decimal::ZERO;
                }
                if invested < Decimal::ZERO {
                    invested = Decimal::ZERO;
                }
            }
            TransactionKind::Dividend | TransactionKind::Interest => {}
        }
    }

    (quantity, invested)
}
