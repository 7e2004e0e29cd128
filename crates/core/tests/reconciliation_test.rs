//! End-to-end tests for the reconcile-and-value pipeline.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use nivesh_core::audit::FindingCode;
use nivesh_core::statements::{
    CasStatement, DematAccount, DematHoldings, EquityEntry, FixedDepositRecord, FolioSection,
    LiquidAccountRecord, SchemeEntry, StatementPayload,
};
use nivesh_core::valuation::{InMemoryPriceStore, PricePoint};
use nivesh_core::{Category, PortfolioService};

fn as_of() -> NaiveDate {
    "2025-06-03".parse().unwrap()
}

fn service() -> PortfolioService {
    PortfolioService::new(Arc::new(InMemoryPriceStore::new()))
}

fn folio(folio_number: &str, amc: &str, schemes: Vec<SchemeEntry>) -> FolioSection {
    FolioSection {
        amc: Some(amc.to_string()),
        folio_number: Some(folio_number.to_string()),
        schemes,
    }
}

fn scheme(name: &str, isin: &str, units: &str, value: &str, cost: Option<&str>) -> SchemeEntry {
    SchemeEntry {
        name: Some(name.to_string()),
        isin: Some(isin.to_string()),
        units: units.parse().unwrap(),
        value: value.parse().unwrap(),
        cost: cost.map(|c| c.parse().unwrap()),
        ..Default::default()
    }
}

#[test]
fn scenario_a_mutual_fund_import() {
    let cas = CasStatement {
        mutual_funds: vec![folio(
            "6134102",
            "HDFC Mutual Fund",
            vec![scheme(
                "HDFC Top 100 Fund - Growth",
                "INF179K01608",
                "1294.097",
                "2690184.37",
                Some("560000"),
            )],
        )],
        demat_accounts: vec![],
    };

    let mut service = service();
    let result = service.reconcile_and_value_as_of(&[StatementPayload::Cas(cas)], as_of());

    assert!(result.errors.is_empty());
    assert_eq!(result.holdings.len(), 1);

    let holding = &result.holdings[0];
    assert_eq!(holding.asset.identity, "INF179K01608");
    assert_eq!(holding.sub_account, "6134102");
    assert_eq!(holding.invested, dec!(560000));
    assert_eq!(holding.current_value, Some(dec!(2690184.37)));
    assert_eq!(holding.unrealized_gain, Some(dec!(2130184.37)));
    assert_eq!(holding.category, Some(Category::MutualFund));

    let totals = &result.category_totals[&Category::MutualFund];
    assert_eq!(totals.current_value, dec!(2690184.37));
    assert_eq!(result.grand_total.current_value, dec!(2690184.37));
    assert!(result.audit_findings.is_empty());
}

#[test]
fn scenario_b_demat_classification() {
    let cas = CasStatement {
        mutual_funds: vec![],
        demat_accounts: vec![
            DematAccount {
                dp_name: Some("Zerodha Broking".to_string()),
                bo_id: "IN30290247224760".to_string(),
                holdings: DematHoldings {
                    equities: vec![],
                    demat_mutual_funds: vec![scheme(
                        "Motilal Oswal Nifty 500 Fund",
                        "INF247L01445",
                        "1500",
                        "45000",
                        Some("30000"),
                    )],
                },
            },
            DematAccount {
                dp_name: Some("Zerodha Broking".to_string()),
                bo_id: "IN30463323161984".to_string(),
                holdings: DematHoldings {
                    equities: vec![
                        EquityEntry {
                            name: Some("Reliance Industries Ltd".to_string()),
                            isin: Some("INE002A01018".to_string()),
                            symbol: Some("RELIANCE".to_string()),
                            exchange: Some("NSE".to_string()),
                            units: dec!(12),
                            value: dec!(34000),
                            cost: Some(dec!(28000)),
                            transactions: vec![],
                        },
                        EquityEntry {
                            name: Some("Apple Inc".to_string()),
                            isin: Some("US0378331005".to_string()),
                            symbol: Some("AAPL".to_string()),
                            exchange: Some("US".to_string()),
                            units: dec!(3),
                            value: dec!(60000),
                            cost: Some(dec!(45000)),
                            transactions: vec![],
                        },
                    ],
                    demat_mutual_funds: vec![],
                },
            },
        ],
    };

    let mut service = service();
    let result = service.reconcile_and_value_as_of(&[StatementPayload::Cas(cas)], as_of());
    assert!(result.errors.is_empty());
    assert_eq!(result.holdings.len(), 3);

    let by_identity = |identity: &str| {
        result
            .holdings
            .iter()
            .find(|h| h.asset.identity == identity)
            .unwrap()
    };
    // Fund units held in a demat account classify as ETF.
    assert_eq!(by_identity("INF247L01445").category, Some(Category::Etf));
    // Listed equity stays a stock; the US exchange splits off US stocks.
    assert_eq!(by_identity("INE002A01018").category, Some(Category::Stock));
    assert_eq!(by_identity("US0378331005").category, Some(Category::UsStock));
}

#[test]
fn scenario_c_duplicate_statement_page_does_not_double_count() {
    let line = scheme(
        "Parag Parikh Flexi Cap Fund",
        "INF194K01391",
        "5305.175",
        "450000",
        Some("300000"),
    );
    let cas = CasStatement {
        // The same folio page appears twice in the payload.
        mutual_funds: vec![
            folio("1215430", "PPFAS Mutual Fund", vec![line.clone()]),
            folio("1215430", "PPFAS Mutual Fund", vec![line]),
        ],
        demat_accounts: vec![],
    };

    let mut service = service();
    let result = service.reconcile_and_value_as_of(&[StatementPayload::Cas(cas)], as_of());

    assert_eq!(result.holdings.len(), 1);
    let holding = &result.holdings[0];
    assert_eq!(holding.invested, dec!(300000));
    assert_eq!(holding.quantity, dec!(5305.175));
    assert_eq!(holding.current_value, Some(dec!(450000)));

    let run = service.ledger().last_run().unwrap();
    assert_eq!(run.records_skipped, 1);
}

#[test]
fn scenario_d_invalid_record_does_not_abort_import() {
    let cas = CasStatement {
        mutual_funds: vec![folio(
            "777",
            "Some AMC",
            vec![
                // No ISIN and no name: unresolvable identity.
                SchemeEntry {
                    units: dec!(10),
                    value: dec!(1000),
                    ..Default::default()
                },
                scheme("Good Scheme", "INF200K01180", "10", "1000", Some("800")),
            ],
        )],
        demat_accounts: vec![],
    };

    let mut service = service();
    let result = service.reconcile_and_value_as_of(&[StatementPayload::Cas(cas)], as_of());

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].message.contains("ISIN"));
    assert_eq!(result.holdings.len(), 1);
    assert_eq!(result.holdings[0].asset.identity, "INF200K01180");
}

#[test]
fn same_isin_across_folios_stays_two_holdings() {
    let cas = CasStatement {
        mutual_funds: vec![
            folio(
                "1215430",
                "PPFAS Mutual Fund",
                vec![scheme("Flexi Cap", "INF194K01391", "100", "15000", Some("10000"))],
            ),
            folio(
                "9988776",
                "PPFAS Mutual Fund",
                vec![scheme("Flexi Cap", "INF194K01391", "50", "7500", Some("5000"))],
            ),
        ],
        demat_accounts: vec![],
    };

    let mut service = service();
    let result = service.reconcile_and_value_as_of(&[StatementPayload::Cas(cas)], as_of());

    assert_eq!(result.holdings.len(), 2);
    assert!(result
        .holdings
        .iter()
        .all(|h| h.asset.identity == "INF194K01391"));
    // Both still roll up into the one category bucket.
    assert_eq!(result.category_totals[&Category::MutualFund].count, 2);
    assert_eq!(
        result.category_totals[&Category::MutualFund].current_value,
        dec!(22500)
    );
}

#[test]
fn price_feed_revalues_holdings() {
    let cas = CasStatement {
        mutual_funds: vec![folio(
            "6134102",
            "HDFC Mutual Fund",
            vec![scheme(
                "HDFC Top 100 Fund - Growth",
                "INF179K01608",
                "100",
                "110000",
                Some("100000"),
            )],
        )],
        demat_accounts: vec![],
    };

    let mut prices = InMemoryPriceStore::new();
    prices.append(
        "INF179K01608",
        PricePoint {
            date: "2025-06-02".parse().unwrap(),
            price: dec!(1250),
        },
    );
    let mut service = PortfolioService::new(Arc::new(prices));
    let result = service.reconcile_and_value_as_of(&[StatementPayload::Cas(cas)], as_of());

    let holding = &result.holdings[0];
    // The feed's quote wins over the statement's stated value.
    assert_eq!(holding.current_value, Some(dec!(125000)));
    assert_eq!(holding.unrealized_gain, Some(dec!(25000)));

    // A later quote refreshes the holding through revalue.
    let updated = service.revalue(
        holding,
        &PricePoint {
            date: "2025-06-03".parse().unwrap(),
            price: dec!(1300),
        },
        as_of(),
    );
    assert_eq!(updated.current_value, Some(dec!(130000)));
}

#[test]
fn mixed_payloads_partition_cleanly() {
    let cas = CasStatement {
        mutual_funds: vec![folio(
            "6134102",
            "HDFC Mutual Fund",
            vec![scheme("Top 100", "INF179K01608", "100", "110000", Some("100000"))],
        )],
        demat_accounts: vec![],
    };
    let fds = vec![FixedDepositRecord {
        name: "Tax Saver".to_string(),
        bank: "HDFC Bank".to_string(),
        account_number: "FD-001".to_string(),
        principal: dec!(100000),
        interest_rate: dec!(7),
        start_date: "2024-01-01".parse().unwrap(),
        maturity_date: "2026-01-01".parse().unwrap(),
        compounding: Default::default(),
    }];
    let liquid = vec![LiquidAccountRecord {
        account_name: "HDFC Savings".to_string(),
        account_number: "5011".to_string(),
        balance: dec!(150000),
    }];

    let mut service = service();
    let result = service.reconcile_and_value_as_of(
        &[
            StatementPayload::Cas(cas),
            StatementPayload::FixedDeposits(fds),
            StatementPayload::LiquidAccounts(liquid),
        ],
        as_of(),
    );

    assert!(result.errors.is_empty());
    assert!(result.audit_findings.is_empty());
    assert_eq!(result.holdings.len(), 3);

    // Every holding landed in exactly one bucket and the sums agree.
    let bucket_sum: rust_decimal::Decimal = result
        .category_totals
        .values()
        .map(|t| t.current_value)
        .sum();
    assert_eq!(bucket_sum, result.grand_total.current_value);
    assert!(result.category_totals.contains_key(&Category::MutualFund));
    assert!(result.category_totals.contains_key(&Category::FixedDeposit));
    assert!(result.category_totals.contains_key(&Category::LiquidAccount));

    // The cash account reports no gain.
    let cash = result
        .holdings
        .iter()
        .find(|h| h.category == Some(Category::LiquidAccount))
        .unwrap();
    assert!(cash.unrealized_gain.is_none());

    // The FD accrued interest over the invested principal.
    let fd = result
        .holdings
        .iter()
        .find(|h| h.category == Some(Category::FixedDeposit))
        .unwrap();
    assert!(fd.current_value.unwrap() > fd.invested);
    assert!(fd.annualized_return.is_some());

    // No finding was raised, so none carries the mismatch code either.
    assert!(!result
        .audit_findings
        .iter()
        .any(|f| f.code == FindingCode::ReconciliationMismatch));
}
