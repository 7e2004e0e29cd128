//! Holding domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assets::{Asset, InstrumentKind};
use crate::categories::Category;
use crate::transactions::{replay_position, Transaction};

/// A position in one asset within one sub-account.
///
/// Sub-account boundaries (folio, BO ID, contract number) reflect real
/// custody, so the same asset held across two folios stays two holdings.
/// At most one holding exists per `(asset identity, sub_account)` pair;
/// additional statement lines for the pair merge into it.
///
/// `current_value` and the gain fields are derived by the valuation
/// calculator, never taken directly from input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: Uuid,
    pub asset: Asset,
    pub sub_account: String,
    pub currency: String,
    /// Units held; 1 for lump-sum instruments (deposits, fund accounts).
    pub quantity: Decimal,
    /// Cost basis.
    pub invested: Decimal,
    /// Current value as supplied by the statement, if any.
    pub statement_value: Option<Decimal>,
    /// Derived current value.
    pub current_value: Option<Decimal>,
    pub unrealized_gain: Option<Decimal>,
    pub unrealized_gain_pct: Option<Decimal>,
    pub annualized_return: Option<Decimal>,
    /// Earliest contributing transaction date, for annualization.
    pub acquired_at: Option<NaiveDate>,
    pub category: Option<Category>,
    pub category_hint: Option<Category>,
    pub transactions: Vec<Transaction>,
}

impl Holding {
    /// The aggregation key.
    pub fn key(&self) -> (&str, &str) {
        (&self.asset.identity, &self.sub_account)
    }

    /// Whether this holding is a lump-sum instrument (quantity is a
    /// nominal 1, not a unit count).
    pub fn is_lump_sum(&self) -> bool {
        matches!(
            self.asset.kind,
            InstrumentKind::FixedDeposit
                | InstrumentKind::ProvidentFund
                | InstrumentKind::LiquidAccount
        )
    }

    /// Whether this holding is cash (liquid/savings account). Cash is
    /// exempt from gain and return calculation by convention.
    pub fn is_liquid(&self) -> bool {
        self.asset.kind == InstrumentKind::LiquidAccount
            || self.category_hint == Some(Category::LiquidAccount)
            || self.category == Some(Category::LiquidAccount)
    }

    /// Rebuilds quantity and invested amount from the transaction
    /// history and clears the derived valuation fields.
    ///
    /// Lump-sum holdings keep their nominal quantity of 1; only the
    /// invested amount is replayed for them.
    pub fn recompute_from_transactions(&mut self) {
        let (quantity, invested) = replay_position(&self.transactions);
        if !self.is_lump_sum() {
            self.quantity = quantity;
        }
        self.invested = invested;
        self.acquired_at = self.transactions.iter().map(|t| t.date).min();
        self.current_value = None;
        self.unrealized_gain = None;
        self.unrealized_gain_pct = None;
        self.annualized_return = None;
    }

    /// Removes one transaction and re-aggregates the holding from the
    /// remaining history.
    pub fn delete_transaction(&mut self, index: usize) -> Option<Transaction> {
        if index >= self.transactions.len() {
            return None;
        }
        let removed = self.transactions.remove(index);
        self.recompute_from_transactions();
        Some(removed)
    }
}
