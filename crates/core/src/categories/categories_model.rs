//! Portfolio category model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Portfolio categories.
///
/// A closed enumeration: every holding is assigned exactly one category,
/// and the categories partition the holding set. The partition property
/// is what the reconciliation auditor verifies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    MutualFund,
    Stock,
    Etf,
    Crypto,
    FixedDeposit,
    ProvidentFund,
    UsStock,
    LiquidAccount,
    UnlistedShare,
    Other,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 10] = [
        Category::MutualFund,
        Category::Stock,
        Category::Etf,
        Category::Crypto,
        Category::FixedDeposit,
        Category::ProvidentFund,
        Category::UsStock,
        Category::LiquidAccount,
        Category::UnlistedShare,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::MutualFund => "MUTUAL_FUND",
            Category::Stock => "STOCK",
            Category::Etf => "ETF",
            Category::Crypto => "CRYPTO",
            Category::FixedDeposit => "FIXED_DEPOSIT",
            Category::ProvidentFund => "PROVIDENT_FUND",
            Category::UsStock => "US_STOCK",
            Category::LiquidAccount => "LIQUID_ACCOUNT",
            Category::UnlistedShare => "UNLISTED_SHARE",
            Category::Other => "OTHER",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
