//! Valuation module - price lookup seam and the valuation calculator.

mod price_model;
mod valuation_service;

pub use price_model::{InMemoryPriceStore, PriceLookupTrait, PricePoint};
pub use valuation_service::{
    annualized_return, gain_percentage, revalue, ValuationCalculator,
};
