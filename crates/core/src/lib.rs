//! Nivesh Core - holdings reconciliation and valuation engine.
//!
//! Takes raw, differently-shaped statement records (mutual-fund folios,
//! demat equities and ETFs, fixed deposits, provident funds, liquid
//! accounts, crypto), resolves them to canonical assets, aggregates
//! them into holdings, classifies each holding into a portfolio
//! category, computes valuation and return metrics, and reconciles the
//! category breakdown against the grand total.
//!
//! The crate is storage-, transport- and UI-agnostic: callers hand it
//! parsed payloads and a price lookup, and get in-memory results back.

pub mod assets;
pub mod audit;
pub mod categories;
pub mod constants;
pub mod errors;
pub mod holdings;
pub mod imports;
pub mod portfolio;
pub mod statements;
pub mod transactions;
pub mod valuation;

// Re-export the primary surface
pub use categories::Category;
pub use holdings::Holding;
pub use portfolio::{
    grand_total, summarize_by_category, PortfolioService, PortfolioValuation,
};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
