//! Canonical asset identity resolution.
//!
//! Every raw record is mapped to a stable identity key before
//! aggregation:
//!
//! - an ISIN, when present, wins unconditionally: two records with the
//!   same ISIN resolve identically regardless of which statement source
//!   supplied them;
//! - otherwise a synthetic `ISSUER|NAME` key is built from the
//!   normalized issuer (AMC, bank, depository participant) and display
//!   name.
//!
//! The fallback is deterministic but may under-merge: two genuinely
//! identical instruments named inconsistently across statements resolve
//! to different keys. That is a documented limitation, not something to
//! paper over with fuzzy matching.

use lazy_static::lazy_static;
use log::warn;
use regex::Regex;

use crate::errors::{Result, ValidationError};

/// Delimiter between the issuer and name components of a synthetic key.
pub const IDENTITY_DELIMITER: char = '|';

lazy_static! {
    /// ISIN shape: two-letter country prefix, nine alphanumerics, and a
    /// numeric check digit.
    static ref ISIN_REGEX: Regex =
        Regex::new(r"^[A-Z]{2}[A-Z0-9]{9}[0-9]$").expect("Invalid regex pattern");
}

/// Normalizes an ISIN: strips all whitespace and uppercases.
pub fn normalize_isin(isin: &str) -> String {
    isin.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Returns whether a normalized ISIN matches the standard shape.
pub fn is_valid_isin(isin: &str) -> bool {
    ISIN_REGEX.is_match(isin)
}

/// Collapses runs of whitespace and uppercases, for synthetic key parts.
fn normalize_component(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Resolves a raw record to a stable asset identity key.
///
/// A malformed ISIN is still used as the key (it remains a better
/// discriminator than the name), but is logged so it can be audited.
/// A record with neither an ISIN nor a name is rejected.
pub fn resolve_identity(
    isin: Option<&str>,
    issuer: Option<&str>,
    name: Option<&str>,
) -> Result<String> {
    if let Some(raw) = isin {
        let normalized = normalize_isin(raw);
        if !normalized.is_empty() {
            if !is_valid_isin(&normalized) {
                warn!(
                    "ISIN '{}' does not match the standard shape; using it as-is",
                    normalized
                );
            }
            return Ok(normalized);
        }
    }

    let name = name.map(normalize_component).filter(|n| !n.is_empty());
    match name {
        Some(name) => {
            let issuer = issuer.map(normalize_component).unwrap_or_default();
            Ok(format!("{}{}{}", issuer, IDENTITY_DELIMITER, name))
        }
        None => Err(ValidationError::MissingIdentity.into()),
    }
}
