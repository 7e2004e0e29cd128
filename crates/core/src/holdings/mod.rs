//! Holdings module - domain model and aggregation.

mod aggregator;
mod holdings_model;

pub use aggregator::{AggregationResult, AggregationStats, HoldingAggregator};
pub use holdings_model::Holding;
