//! Transactions module - domain models and position replay.

mod transactions_model;

pub use transactions_model::{replay_position, Transaction, TransactionKind};
