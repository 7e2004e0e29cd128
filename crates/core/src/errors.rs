//! Core error types for the reconciliation engine.
//!
//! Per-record failures never abort an import batch: they are collected
//! into an error list and returned alongside the partial results. Only
//! the record-level validation failures below are modeled as errors;
//! reconciliation and classification problems are advisory audit
//! findings (see the `audit` module).

use chrono::ParseError as ChronoParseError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Valuation failed: {0}")]
    Valuation(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Validation errors for statement records.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The record carries neither an ISIN nor a display name, so no
    /// identity key can be derived for it.
    #[error("record has neither an ISIN nor a display name")]
    MissingIdentity,

    #[error("negative quantity {quantity} for '{name}'")]
    NegativeQuantity { name: String, quantity: Decimal },

    #[error("required field '{0}' is missing")]
    MissingField(String),

    #[error("failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("failed to parse date: {0}")]
    DateParse(#[from] ChronoParseError),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
