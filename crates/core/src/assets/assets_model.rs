//! Asset domain models.

use serde::{Deserialize, Serialize};

/// The kind of instrument a statement line describes.
///
/// The kind is decided by the statement shape that produced the record
/// (a folio line is a fund unit, a demat equity line is an equity, and
/// so on); the category classifier refines it further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstrumentKind {
    MutualFundUnit,
    Equity,
    EtfUnit,
    FixedDeposit,
    ProvidentFund,
    Crypto,
    LiquidAccount,
    UnlistedEquity,
}

/// Scheme metadata carried by mutual-fund statement lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeMeta {
    /// Asset Management Company (fund house).
    pub amc: Option<String>,
    /// "Direct" or "Regular".
    pub plan_type: Option<String>,
    /// "Growth", "Dividend", "IDCW".
    pub option_type: Option<String>,
}

/// A tradable or holdable instrument.
///
/// Shared by every holding that references it; the identity key is
/// unique across the asset universe (two records with the same ISIN
/// always resolve to the same asset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Canonical identity key: an ISIN, or a synthetic `ISSUER|NAME` key
    /// when no ISIN is available (see the identity resolver).
    pub identity: String,
    pub name: String,
    pub kind: InstrumentKind,
    /// Ticker or symbol, when the source supplies one.
    pub symbol: Option<String>,
    /// Exchange code (e.g. "NSE", "US").
    pub exchange: Option<String>,
    pub scheme: Option<SchemeMeta>,
}
