//! Valuation calculator.
//!
//! Pure functions over aggregated holdings: current value, unrealized
//! gain, gain percentage and annualized return. Everything takes an
//! explicit as-of date; nothing here reads the clock or performs I/O.

use chrono::NaiveDate;
use log::warn;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::constants::{DAYS_PER_YEAR, PERCENT_PRECISION};
use crate::holdings::Holding;
use crate::valuation::price_model::{PriceLookupTrait, PricePoint};

/// Values holdings as of a fixed date.
#[derive(Debug, Clone, Copy)]
pub struct ValuationCalculator {
    as_of: NaiveDate,
}

impl ValuationCalculator {
    pub fn new(as_of: NaiveDate) -> Self {
        Self { as_of }
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// Values every holding, looking prices up per asset identity.
    pub fn value_holdings(&self, holdings: &mut [Holding], prices: &dyn PriceLookupTrait) {
        for holding in holdings.iter_mut() {
            let latest = prices.latest_price(&holding.asset.identity);
            self.value_holding(holding, latest.as_ref());
        }
    }

    /// Values one holding from an optional latest price.
    ///
    /// Current value precedence: price feed, then statement-supplied
    /// value, then the invested amount as a last resort (so a holding
    /// without any quote never reads as zero).
    ///
    /// Liquid accounts are cash: their value is the balance and the
    /// gain/return fields stay empty by convention.
    pub fn value_holding(&self, holding: &mut Holding, latest: Option<&PricePoint>) {
        if holding.is_liquid() {
            holding.current_value = Some(
                holding
                    .statement_value
                    .unwrap_or(holding.invested),
            );
            holding.unrealized_gain = None;
            holding.unrealized_gain_pct = None;
            holding.annualized_return = None;
            return;
        }

        let current = self.current_value(holding, latest);
        holding.current_value = Some(current);
        holding.unrealized_gain = Some(current - holding.invested);
        holding.unrealized_gain_pct = gain_percentage(holding.invested, current);
        holding.annualized_return =
            annualized_return(holding.invested, current, holding.acquired_at, self.as_of);
    }

    fn current_value(&self, holding: &Holding, latest: Option<&PricePoint>) -> Decimal {
        if holding.quantity > Decimal::ZERO {
            if let Some(point) = latest {
                return (holding.quantity * point.price).round_dp(2);
            }
        }
        if let Some(value) = holding.statement_value {
            return value;
        }
        if holding.quantity > Decimal::ZERO && holding.invested > Decimal::ZERO {
            warn!(
                "No price or statement value for {} / {}; using invested amount",
                holding.asset.identity, holding.sub_account
            );
            return holding.invested;
        }
        Decimal::ZERO
    }
}

/// Returns a copy of the holding revalued from a fresh price point.
pub fn revalue(holding: &Holding, latest: &PricePoint, as_of: NaiveDate) -> Holding {
    let mut updated = holding.clone();
    ValuationCalculator::new(as_of).value_holding(&mut updated, Some(latest));
    updated
}

/// Unrealized gain percentage, rounded for display. Undefined (None)
/// when nothing was invested - not zero, not an error.
pub fn gain_percentage(invested: Decimal, current: Decimal) -> Option<Decimal> {
    if invested == Decimal::ZERO {
        return None;
    }
    Some(((current - invested) / invested * dec!(100)).round_dp(PERCENT_PRECISION))
}

/// Annualized return in percent: `((current/invested)^(365/days) - 1) × 100`.
///
/// Undefined when the holding period is under a day, nothing was
/// invested, or the value ratio is non-positive. Computed through an
/// f64 bridge since Decimal has no fractional power.
pub fn annualized_return(
    invested: Decimal,
    current: Decimal,
    acquired_at: Option<NaiveDate>,
    as_of: NaiveDate,
) -> Option<Decimal> {
    let acquired = acquired_at?;
    let days = (as_of - acquired).num_days();
    if days < 1 || invested <= Decimal::ZERO || current <= Decimal::ZERO {
        return None;
    }

    let ratio = (current / invested).to_f64()?;
    if ratio <= 0.0 {
        return None;
    }
    let annualized = ratio.powf(DAYS_PER_YEAR / days as f64) - 1.0;
    if !annualized.is_finite() {
        return None;
    }
    Decimal::from_f64(annualized * 100.0).map(|d| d.round_dp(PERCENT_PRECISION))
}
