//! Portfolio module - summary models and the orchestrating service.

mod portfolio_model;
mod portfolio_service;

pub use portfolio_model::{CategoryTotal, PortfolioTotals, PortfolioValuation};
pub use portfolio_service::{grand_total, summarize_by_category, PortfolioService};
