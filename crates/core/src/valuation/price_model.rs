//! Price models and the unit-price lookup seam.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A point-in-time per-unit value for an asset (NAV, market price).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: Decimal,
}

/// Unit-price lookup used by the valuation calculator.
///
/// Implemented by the caller's price feed; the engine never performs
/// I/O of its own mid-computation.
pub trait PriceLookupTrait: Send + Sync {
    /// Latest known price for an asset identity, if any.
    fn latest_price(&self, identity: &str) -> Option<PricePoint>;
}

/// In-memory price history keyed by asset identity.
///
/// Points are appended on each refresh and superseded, not deleted, by
/// newer dates: lookups return the latest-dated point.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceStore {
    points: HashMap<String, Vec<PricePoint>>,
}

impl InMemoryPriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a price point for an identity.
    pub fn append(&mut self, identity: impl Into<String>, point: PricePoint) {
        self.points.entry(identity.into()).or_default().push(point);
    }

    /// Full recorded history for an identity, in insertion order.
    pub fn history(&self, identity: &str) -> &[PricePoint] {
        self.points.get(identity).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl PriceLookupTrait for InMemoryPriceStore {
    fn latest_price(&self, identity: &str) -> Option<PricePoint> {
        self.points
            .get(identity)?
            .iter()
            .max_by_key(|p| p.date)
            .copied()
    }
}
