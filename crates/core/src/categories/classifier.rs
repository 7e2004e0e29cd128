//! Category classifier.
//!
//! One ordered rule table, first match wins. Each rule is named so a
//! classification can be traced back to the rule that produced it, and
//! the table ends in a catch-all so it is total: every holding receives
//! exactly one category. The reconciliation auditor is the safety net
//! for rule-table regressions.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::assets::InstrumentKind;
use crate::holdings::Holding;

use super::categories_model::Category;

lazy_static! {
    /// Demat BO-ID shape: 16 alphanumeric characters with an "IN" or
    /// "12" prefix (NSDL and CDSL account numbering).
    static ref BO_ID_REGEX: Regex =
        Regex::new(r"^(IN|12)[A-Za-z0-9]{14}$").expect("Invalid regex pattern");
}

/// One classification rule: a name and a matcher.
pub struct ClassificationRule {
    pub name: &'static str,
    matcher: fn(&Holding) -> Option<Category>,
}

/// The rule table, in precedence order.
pub static RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "direct-kind",
        matcher: direct_kind,
    },
    ClassificationRule {
        name: "name-contains-etf",
        matcher: name_contains_etf,
    },
    ClassificationRule {
        name: "demat-held-fund",
        matcher: demat_held_fund,
    },
    ClassificationRule {
        name: "us-equity",
        matcher: us_equity,
    },
    ClassificationRule {
        name: "listed-equity",
        matcher: listed_equity,
    },
    ClassificationRule {
        name: "fund-unit",
        matcher: fund_unit,
    },
    ClassificationRule {
        name: "liquid-account",
        matcher: liquid_account,
    },
    ClassificationRule {
        name: "unlisted-equity",
        matcher: unlisted_equity,
    },
    ClassificationRule {
        name: "catch-all",
        matcher: catch_all,
    },
];

/// Fixed deposits, provident funds and crypto map straight from the
/// instrument kind.
fn direct_kind(holding: &Holding) -> Option<Category> {
    match holding.asset.kind {
        InstrumentKind::FixedDeposit => Some(Category::FixedDeposit),
        InstrumentKind::ProvidentFund => Some(Category::ProvidentFund),
        InstrumentKind::Crypto => Some(Category::Crypto),
        _ => None,
    }
}

/// Anything calling itself an ETF is one, whatever shape it arrived in.
fn name_contains_etf(holding: &Holding) -> Option<Category> {
    if holding.asset.name.to_uppercase().contains("ETF")
        || holding.asset.kind == InstrumentKind::EtfUnit
    {
        Some(Category::Etf)
    } else {
        None
    }
}

/// Fund units held in a demat account (sub-account has the BO-ID shape)
/// are economically ETFs in this system's convention.
fn demat_held_fund(holding: &Holding) -> Option<Category> {
    if holding.asset.kind == InstrumentKind::MutualFundUnit
        && BO_ID_REGEX.is_match(&holding.sub_account)
    {
        Some(Category::Etf)
    } else {
        None
    }
}

fn us_equity(holding: &Holding) -> Option<Category> {
    if holding.asset.kind == InstrumentKind::Equity
        && holding
            .asset
            .exchange
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case("US"))
    {
        Some(Category::UsStock)
    } else {
        None
    }
}

fn listed_equity(holding: &Holding) -> Option<Category> {
    (holding.asset.kind == InstrumentKind::Equity).then_some(Category::Stock)
}

fn fund_unit(holding: &Holding) -> Option<Category> {
    (holding.asset.kind == InstrumentKind::MutualFundUnit).then_some(Category::MutualFund)
}

fn liquid_account(holding: &Holding) -> Option<Category> {
    if holding.asset.kind == InstrumentKind::LiquidAccount
        || holding.category_hint == Some(Category::LiquidAccount)
    {
        Some(Category::LiquidAccount)
    } else {
        None
    }
}

fn unlisted_equity(holding: &Holding) -> Option<Category> {
    (holding.asset.kind == InstrumentKind::UnlistedEquity).then_some(Category::UnlistedShare)
}

fn catch_all(_holding: &Holding) -> Option<Category> {
    Some(Category::Other)
}

/// Classifies one holding, returning the category and the name of the
/// rule that matched.
pub fn classify(holding: &Holding) -> (Category, &'static str) {
    for rule in RULES {
        if let Some(category) = (rule.matcher)(holding) {
            return (category, rule.name);
        }
    }
    // The table ends in a catch-all, so this is unreachable; the auditor
    // would flag any holding left without a category regardless.
    (Category::Other, "catch-all")
}

/// Assigns a category to every holding in place.
pub fn classify_all(holdings: &mut [Holding]) {
    for holding in holdings.iter_mut() {
        let (category, rule) = classify(holding);
        debug!(
            "Classified {} / {} as {} via rule '{}'",
            holding.asset.identity, holding.sub_account, category, rule
        );
        holding.category = Some(category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Asset;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn holding(kind: InstrumentKind, name: &str, sub_account: &str) -> Holding {
        Holding {
            id: Uuid::new_v4(),
            asset: Asset {
                identity: "ID".to_string(),
                name: name.to_string(),
                kind,
                symbol: None,
                exchange: None,
                scheme: None,
            },
            sub_account: sub_account.to_string(),
            currency: "INR".to_string(),
            quantity: Decimal::ONE,
            invested: Decimal::ZERO,
            statement_value: None,
            current_value: None,
            unrealized_gain: None,
            unrealized_gain_pct: None,
            annualized_return: None,
            acquired_at: None,
            category: None,
            category_hint: None,
            transactions: vec![],
        }
    }

    #[test]
    fn test_direct_kinds() {
        assert_eq!(
            classify(&holding(InstrumentKind::FixedDeposit, "FD", "FD-1")).0,
            Category::FixedDeposit
        );
        assert_eq!(
            classify(&holding(InstrumentKind::ProvidentFund, "EPF", "PF-1")).0,
            Category::ProvidentFund
        );
        assert_eq!(
            classify(&holding(InstrumentKind::Crypto, "BTC", "W1")).0,
            Category::Crypto
        );
    }

    #[test]
    fn test_etf_name_beats_kind_rules() {
        let h = holding(
            InstrumentKind::Equity,
            "Nippon India ETF Nifty BeES",
            "IN30463323161984",
        );
        let (category, rule) = classify(&h);
        assert_eq!(category, Category::Etf);
        assert_eq!(rule, "name-contains-etf");

        // Case-insensitive match.
        let h = holding(InstrumentKind::MutualFundUnit, "Gold etf fund", "123");
        assert_eq!(classify(&h).0, Category::Etf);
    }

    #[test]
    fn test_demat_held_fund_units_are_etfs() {
        let h = holding(
            InstrumentKind::MutualFundUnit,
            "Liquid Fund",
            "IN30290247224760",
        );
        let (category, rule) = classify(&h);
        assert_eq!(category, Category::Etf);
        assert_eq!(rule, "demat-held-fund");

        // CDSL-style numeric prefix.
        let h = holding(
            InstrumentKind::MutualFundUnit,
            "Liquid Fund",
            "1204470001234567",
        );
        assert_eq!(classify(&h).0, Category::Etf);
    }

    #[test]
    fn test_folio_held_fund_units_are_mutual_funds() {
        let h = holding(InstrumentKind::MutualFundUnit, "Flexi Cap Fund", "6134102");
        let (category, rule) = classify(&h);
        assert_eq!(category, Category::MutualFund);
        assert_eq!(rule, "fund-unit");

        // A 16-char folio with the wrong prefix is not a BO ID.
        let h = holding(
            InstrumentKind::MutualFundUnit,
            "Flexi Cap Fund",
            "AB34567890123456",
        );
        assert_eq!(classify(&h).0, Category::MutualFund);
    }

    #[test]
    fn test_equities_split_by_exchange() {
        let mut h = holding(InstrumentKind::Equity, "Apple Inc", "ACC-1");
        h.asset.exchange = Some("US".to_string());
        assert_eq!(classify(&h).0, Category::UsStock);

        let mut h = holding(InstrumentKind::Equity, "Reliance", "IN30463323161984");
        h.asset.exchange = Some("NSE".to_string());
        assert_eq!(classify(&h).0, Category::Stock);

        // No exchange at all is still a listed stock.
        let h = holding(InstrumentKind::Equity, "Reliance", "IN30463323161984");
        assert_eq!(classify(&h).0, Category::Stock);
    }

    #[test]
    fn test_liquid_and_unlisted() {
        let h = holding(InstrumentKind::LiquidAccount, "HDFC Savings", "5011");
        assert_eq!(classify(&h).0, Category::LiquidAccount);

        let h = holding(InstrumentKind::UnlistedEquity, "Pre-IPO Co", "UNSPECIFIED");
        assert_eq!(classify(&h).0, Category::UnlistedShare);
    }

    #[test]
    fn test_rule_table_is_total() {
        // Every kind lands somewhere; nothing falls through.
        let kinds = [
            InstrumentKind::MutualFundUnit,
            InstrumentKind::Equity,
            InstrumentKind::EtfUnit,
            InstrumentKind::FixedDeposit,
            InstrumentKind::ProvidentFund,
            InstrumentKind::Crypto,
            InstrumentKind::LiquidAccount,
            InstrumentKind::UnlistedEquity,
        ];
        for kind in kinds {
            let mut h = holding(kind, "Anything", "X");
            classify_all(std::slice::from_mut(&mut h));
            assert!(h.category.is_some(), "kind {:?} fell through", kind);
        }
    }
}
