//! Statement normalizer.
//!
//! Converts each source-specific statement shape into the common
//! [`NormalizedRecord`] form. Normalization is pure and order
//! independent: it never touches global state, and price lookups happen
//! in the valuation stage, not here. Per-record validation failures are
//! collected and returned with the successfully normalized records so an
//! import is never aborted by a single malformed line.

use chrono::NaiveDate;
use log::warn;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::assets::{InstrumentKind, SchemeMeta};
use crate::categories::Category;
use crate::constants::{ACCRUAL_DAYS_PER_YEAR, DEFAULT_CURRENCY, UNSPECIFIED_SUB_ACCOUNT};
use crate::errors::{Error, Result, ValidationError};
use crate::transactions::{replay_position, Transaction, TransactionKind};

use super::statements_model::{
    CasStatement, CryptoRecord, EquityEntry, FixedDepositRecord, LiquidAccountRecord,
    NormalizedRecord, ProvidentFundRecord, ProvidentScheme, RecordError, SchemeEntry,
    SourceTransaction, StatementPayload, StatementSource, UnlistedShareRecord, UsStockRecord,
};

/// Result of normalizing one payload: the records that passed validation
/// plus the errors for those that did not.
#[derive(Debug, Default)]
pub struct NormalizerOutput {
    pub records: Vec<NormalizedRecord>,
    pub errors: Vec<RecordError>,
}

impl NormalizerOutput {
    fn push(&mut self, source: StatementSource, label: &str, outcome: Result<NormalizedRecord>) {
        match outcome {
            Ok(record) => self.records.push(record),
            Err(err) => self.errors.push(RecordError {
                source,
                record: label.to_string(),
                message: err.to_string(),
            }),
        }
    }
}

/// Normalizes one statement payload into intermediate records.
///
/// `as_of` is the valuation date used for accrual arithmetic (fixed
/// deposits); nothing here reads the clock.
pub fn normalize_payload(payload: &StatementPayload, as_of: NaiveDate) -> NormalizerOutput {
    let mut out = NormalizerOutput::default();
    match payload {
        StatementPayload::Cas(cas) => normalize_cas(cas, &mut out),
        StatementPayload::FixedDeposits(records) => {
            for fd in records {
                out.push(
                    StatementSource::FixedDeposit,
                    &fd.name,
                    normalize_fixed_deposit(fd, as_of),
                );
            }
        }
        StatementPayload::ProvidentFunds(records) => {
            for pf in records {
                out.push(
                    StatementSource::ProvidentFund,
                    &pf.account_number,
                    Ok(normalize_provident_fund(pf, as_of)),
                );
            }
        }
        StatementPayload::LiquidAccounts(records) => {
            for account in records {
                out.push(
                    StatementSource::LiquidAccount,
                    &account.account_name,
                    Ok(normalize_liquid_account(account)),
                );
            }
        }
        StatementPayload::CryptoHoldings(records) => {
            for coin in records {
                out.push(
                    StatementSource::Crypto,
                    &coin.symbol,
                    normalize_crypto(coin),
                );
            }
        }
        StatementPayload::UsStocks(records) => {
            for stock in records {
                out.push(
                    StatementSource::UsStock,
                    &stock.symbol,
                    normalize_us_stock(stock),
                );
            }
        }
        StatementPayload::UnlistedShares(records) => {
            for share in records {
                out.push(
                    StatementSource::UnlistedShare,
                    &share.name,
                    normalize_unlisted_share(share),
                );
            }
        }
    }
    out
}

fn normalize_cas(cas: &CasStatement, out: &mut NormalizerOutput) {
    for folio in &cas.mutual_funds {
        let sub_account = folio
            .folio_number
            .clone()
            .unwrap_or_else(|| UNSPECIFIED_SUB_ACCOUNT.to_string());
        for scheme in &folio.schemes {
            let label = scheme.name.clone().unwrap_or_else(|| "<unnamed>".to_string());
            out.push(
                StatementSource::MutualFundFolio,
                &label,
                normalize_folio_scheme(scheme, &sub_account, folio.amc.as_deref()),
            );
        }
    }
    for account in &cas.demat_accounts {
        for equity in &account.holdings.equities {
            let label = equity.name.clone().unwrap_or_else(|| "<unnamed>".to_string());
            out.push(
                StatementSource::DematEquity,
                &label,
                normalize_demat_equity(equity, &account.bo_id, account.dp_name.as_deref()),
            );
        }
        for fund in &account.holdings.demat_mutual_funds {
            let label = fund.name.clone().unwrap_or_else(|| "<unnamed>".to_string());
            out.push(
                StatementSource::DematFund,
                &label,
                normalize_demat_fund(fund, &account.bo_id, account.dp_name.as_deref()),
            );
        }
    }
}

/// Mutual-fund folio line: sub-account = folio number, quantity = units.
fn normalize_folio_scheme(
    scheme: &SchemeEntry,
    sub_account: &str,
    amc: Option<&str>,
) -> Result<NormalizedRecord> {
    validate_quantity(scheme.name.as_deref(), scheme.units)?;
    let transactions = convert_transactions(&scheme.transactions);
    let cost = resolve_cost(
        scheme.cost,
        &transactions,
        scheme.value,
        scheme.name.as_deref(),
    );

    Ok(NormalizedRecord {
        source: StatementSource::MutualFundFolio,
        isin: scheme.isin.clone(),
        issuer: amc.map(String::from),
        name: scheme.name.clone(),
        symbol: None,
        kind: InstrumentKind::MutualFundUnit,
        exchange: None,
        scheme: Some(SchemeMeta {
            amc: amc.map(String::from),
            plan_type: scheme.plan_type.clone(),
            option_type: scheme.option_type.clone(),
        }),
        sub_account: sub_account.to_string(),
        currency: DEFAULT_CURRENCY.to_string(),
        quantity: scheme.units,
        cost,
        statement_value: Some(scheme.value),
        unit_price: scheme.nav,
        category_hint: None,
        transactions,
    })
}

/// Demat equity line: sub-account = BO ID.
fn normalize_demat_equity(
    equity: &EquityEntry,
    bo_id: &str,
    dp_name: Option<&str>,
) -> Result<NormalizedRecord> {
    validate_quantity(equity.name.as_deref(), equity.units)?;
    let transactions = convert_transactions(&equity.transactions);
    let cost = resolve_cost(
        equity.cost,
        &transactions,
        equity.value,
        equity.name.as_deref(),
    );

    Ok(NormalizedRecord {
        source: StatementSource::DematEquity,
        isin: equity.isin.clone(),
        issuer: dp_name.map(String::from),
        name: equity.name.clone(),
        symbol: equity.symbol.clone(),
        kind: InstrumentKind::Equity,
        exchange: equity.exchange.clone(),
        scheme: None,
        sub_account: bo_id.to_string(),
        currency: DEFAULT_CURRENCY.to_string(),
        quantity: equity.units,
        cost,
        statement_value: Some(equity.value),
        unit_price: None,
        category_hint: None,
        transactions,
    })
}

/// Demat-held fund unit line: sub-account = BO ID; cost is derived from
/// the trade history by the average-cost method when not stated.
fn normalize_demat_fund(
    fund: &SchemeEntry,
    bo_id: &str,
    dp_name: Option<&str>,
) -> Result<NormalizedRecord> {
    validate_quantity(fund.name.as_deref(), fund.units)?;
    let transactions = convert_transactions(&fund.transactions);
    let cost = resolve_cost(fund.cost, &transactions, fund.value, fund.name.as_deref());

    Ok(NormalizedRecord {
        source: StatementSource::DematFund,
        isin: fund.isin.clone(),
        issuer: dp_name.map(String::from),
        name: fund.name.clone(),
        symbol: None,
        kind: InstrumentKind::MutualFundUnit,
        exchange: None,
        scheme: None,
        sub_account: bo_id.to_string(),
        currency: DEFAULT_CURRENCY.to_string(),
        quantity: fund.units,
        cost,
        statement_value: Some(fund.value),
        unit_price: fund.nav,
        category_hint: None,
        transactions,
    })
}

/// Fixed deposit: quantity 1, cost = principal, value accrued to `as_of`.
fn normalize_fixed_deposit(fd: &FixedDepositRecord, as_of: NaiveDate) -> Result<NormalizedRecord> {
    if fd.principal < Decimal::ZERO {
        return Err(ValidationError::NegativeQuantity {
            name: fd.name.clone(),
            quantity: fd.principal,
        }
        .into());
    }

    let value = fixed_deposit_value(fd, as_of)?;
    let transactions = vec![Transaction {
        kind: TransactionKind::Buy,
        date: fd.start_date,
        units: Some(Decimal::ONE),
        price: Some(fd.principal),
        amount: fd.principal,
        description: Some(format!("FD opened: {} - {}", fd.name, fd.bank)),
    }];

    Ok(NormalizedRecord {
        source: StatementSource::FixedDeposit,
        isin: None,
        issuer: Some(fd.bank.clone()),
        name: Some(format!("{} - {}", fd.name, fd.bank)),
        symbol: None,
        kind: InstrumentKind::FixedDeposit,
        exchange: None,
        scheme: None,
        sub_account: fd.account_number.clone(),
        currency: DEFAULT_CURRENCY.to_string(),
        quantity: Decimal::ONE,
        cost: fd.principal,
        statement_value: Some(value),
        unit_price: None,
        category_hint: Some(Category::FixedDeposit),
        transactions,
    })
}

/// Provident fund: quantity 1, cost = contributions, value includes the
/// accrued interest.
fn normalize_provident_fund(pf: &ProvidentFundRecord, as_of: NaiveDate) -> NormalizedRecord {
    let contributions = pf.member_contribution + pf.employer_contribution;
    let interest = pf.member_interest + pf.employer_interest;

    let scheme_label = match pf.scheme {
        ProvidentScheme::Epf => "EPF",
        ProvidentScheme::Ppf => "PPF",
    };
    let name = match &pf.employer {
        Some(employer) => format!("{} - {}", scheme_label, employer),
        None => format!("{} - {}", scheme_label, pf.account_number),
    };

    let mut transactions = Vec::new();
    if pf.member_contribution > Decimal::ZERO {
        transactions.push(Transaction {
            kind: TransactionKind::Buy,
            date: pf.opened_on,
            units: None,
            price: None,
            amount: pf.member_contribution,
            description: Some("Member contribution".to_string()),
        });
    }
    if pf.employer_contribution > Decimal::ZERO {
        transactions.push(Transaction {
            kind: TransactionKind::Buy,
            date: pf.opened_on,
            units: None,
            price: None,
            amount: pf.employer_contribution,
            description: Some("Employer contribution".to_string()),
        });
    }
    if interest > Decimal::ZERO {
        transactions.push(Transaction {
            kind: TransactionKind::Interest,
            date: as_of,
            units: None,
            price: None,
            amount: interest,
            description: Some("Accrued interest".to_string()),
        });
    }

    NormalizedRecord {
        source: StatementSource::ProvidentFund,
        isin: None,
        issuer: pf.employer.clone(),
        name: Some(name),
        symbol: Some(pf.account_number.clone()),
        kind: InstrumentKind::ProvidentFund,
        exchange: None,
        scheme: None,
        sub_account: pf.account_number.clone(),
        currency: DEFAULT_CURRENCY.to_string(),
        quantity: Decimal::ONE,
        cost: contributions,
        statement_value: Some(contributions + interest),
        unit_price: None,
        category_hint: Some(Category::ProvidentFund),
        transactions,
    }
}

/// Liquid/savings account: cash, cost = value = balance.
fn normalize_liquid_account(account: &LiquidAccountRecord) -> NormalizedRecord {
    NormalizedRecord {
        source: StatementSource::LiquidAccount,
        isin: None,
        issuer: Some(account.account_name.clone()),
        name: Some(format!(
            "{} ({})",
            account.account_name, account.account_number
        )),
        symbol: Some(account.account_number.clone()),
        kind: InstrumentKind::LiquidAccount,
        exchange: None,
        scheme: None,
        sub_account: account.account_number.clone(),
        currency: DEFAULT_CURRENCY.to_string(),
        quantity: Decimal::ONE,
        cost: account.balance,
        statement_value: Some(account.balance),
        unit_price: None,
        category_hint: Some(Category::LiquidAccount),
        transactions: Vec::new(),
    }
}

fn normalize_crypto(coin: &CryptoRecord) -> Result<NormalizedRecord> {
    validate_quantity(Some(&coin.symbol), coin.units)?;
    let transactions = convert_transactions(&coin.transactions);
    let fallback = coin.current_value.unwrap_or(Decimal::ZERO);
    let cost = resolve_cost(coin.cost, &transactions, fallback, Some(&coin.symbol));

    Ok(NormalizedRecord {
        source: StatementSource::Crypto,
        isin: None,
        issuer: Some("CRYPTO".to_string()),
        name: Some(coin.name.clone().unwrap_or_else(|| coin.symbol.clone())),
        symbol: Some(coin.symbol.clone()),
        kind: InstrumentKind::Crypto,
        exchange: None,
        scheme: None,
        sub_account: coin
            .wallet
            .clone()
            .unwrap_or_else(|| UNSPECIFIED_SUB_ACCOUNT.to_string()),
        currency: DEFAULT_CURRENCY.to_string(),
        quantity: coin.units,
        cost,
        statement_value: coin.current_value,
        unit_price: None,
        category_hint: Some(Category::Crypto),
        transactions,
    })
}

fn normalize_us_stock(stock: &UsStockRecord) -> Result<NormalizedRecord> {
    validate_quantity(Some(&stock.symbol), stock.units)?;
    let transactions = convert_transactions(&stock.transactions);
    let fallback = stock.current_value.unwrap_or(Decimal::ZERO);
    let cost = resolve_cost(stock.cost, &transactions, fallback, Some(&stock.symbol));

    Ok(NormalizedRecord {
        source: StatementSource::UsStock,
        isin: None,
        issuer: Some("US".to_string()),
        name: Some(stock.name.clone().unwrap_or_else(|| stock.symbol.clone())),
        symbol: Some(stock.symbol.clone()),
        kind: InstrumentKind::Equity,
        exchange: Some("US".to_string()),
        scheme: None,
        sub_account: stock
            .account
            .clone()
            .unwrap_or_else(|| UNSPECIFIED_SUB_ACCOUNT.to_string()),
        currency: "USD".to_string(),
        quantity: stock.units,
        cost,
        statement_value: stock.current_value,
        unit_price: None,
        category_hint: Some(Category::UsStock),
        transactions,
    })
}

fn normalize_unlisted_share(share: &UnlistedShareRecord) -> Result<NormalizedRecord> {
    validate_quantity(Some(&share.name), share.units)?;
    let fallback = share.value.unwrap_or(Decimal::ZERO);
    let cost = resolve_cost(share.cost, &[], fallback, Some(&share.name));

    Ok(NormalizedRecord {
        source: StatementSource::UnlistedShare,
        isin: share.isin.clone(),
        issuer: None,
        name: Some(share.name.clone()),
        symbol: None,
        kind: InstrumentKind::UnlistedEquity,
        exchange: None,
        scheme: None,
        sub_account: UNSPECIFIED_SUB_ACCOUNT.to_string(),
        currency: DEFAULT_CURRENCY.to_string(),
        quantity: share.units,
        cost,
        statement_value: share.value,
        unit_price: None,
        category_hint: Some(Category::UnlistedShare),
        transactions: Vec::new(),
    })
}

// --- Shared helpers ---

fn validate_quantity(name: Option<&str>, quantity: Decimal) -> Result<()> {
    if quantity < Decimal::ZERO {
        return Err(ValidationError::NegativeQuantity {
            name: name.unwrap_or("<unnamed>").to_string(),
            quantity,
        }
        .into());
    }
    Ok(())
}

/// Resolves a record's cost basis.
///
/// Stated cost wins; otherwise the transaction history is replayed at
/// average cost; otherwise the stated value is used so the cost is never
/// left empty (that last fallback yields zero computed gain for the
/// record until a corrected statement arrives).
fn resolve_cost(
    stated: Option<Decimal>,
    transactions: &[Transaction],
    value: Decimal,
    label: Option<&str>,
) -> Decimal {
    if let Some(cost) = stated {
        return cost;
    }
    let (_, replayed) = replay_position(transactions);
    if replayed > Decimal::ZERO {
        return replayed;
    }
    warn!(
        "No cost basis for '{}'; falling back to stated value {}",
        label.unwrap_or("<unnamed>"),
        value
    );
    value
}

fn convert_transactions(source: &[SourceTransaction]) -> Vec<Transaction> {
    source
        .iter()
        .map(|txn| Transaction {
            kind: TransactionKind::from_source_label(&txn.label),
            date: txn.date,
            units: txn.units,
            price: txn.nav,
            amount: txn.amount,
            description: txn.description.clone(),
        })
        .collect()
}

/// Value of a fixed deposit at `as_of`.
///
/// Before maturity, interest accrues on a simple basis:
/// `principal × rate × days / 365.25`. From maturity onwards the value
/// is the compound maturity amount `P (1 + r/n)^(n·t)`.
fn fixed_deposit_value(fd: &FixedDepositRecord, as_of: NaiveDate) -> Result<Decimal> {
    if as_of >= fd.maturity_date {
        return fixed_deposit_maturity_value(fd);
    }

    let days_elapsed = (as_of - fd.start_date).num_days().max(0);
    let rate = fd.interest_rate / dec!(100);
    let years =
        Decimal::from_f64(days_elapsed as f64 / ACCRUAL_DAYS_PER_YEAR).unwrap_or(Decimal::ZERO);
    let accrued = fd.principal * rate * years;
    Ok((fd.principal + accrued).round_dp(2))
}

/// Compound maturity value `P (1 + r/n)^(n·t)`.
fn fixed_deposit_maturity_value(fd: &FixedDepositRecord) -> Result<Decimal> {
    let days = (fd.maturity_date - fd.start_date).num_days().max(0);
    let years = days as f64 / ACCRUAL_DAYS_PER_YEAR;
    let n = fd.compounding.periods_per_year() as f64;
    let principal = fd
        .principal
        .to_f64()
        .ok_or_else(|| Error::Valuation(format!("principal {} out of range", fd.principal)))?;
    let rate = fd
        .interest_rate
        .to_f64()
        .ok_or_else(|| Error::Valuation(format!("rate {} out of range", fd.interest_rate)))?
        / 100.0;

    let amount = principal * (1.0 + rate / n).powf(n * years);
    Decimal::from_f64(amount)
        .map(|d| d.round_dp(2))
        .ok_or_else(|| Error::Valuation(format!("maturity value {} out of range", amount)))
}
