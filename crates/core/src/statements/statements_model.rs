//! Parsed statement payload models.
//!
//! These are the shapes handed over by the statement parsers (PDF/JSON
//! extraction lives outside this crate): a consolidated account
//! statement with mutual-fund folios and demat accounts, plus
//! single-purpose payloads for fixed deposits, provident funds, liquid
//! accounts, crypto, US stocks and unlisted shares. Field names follow
//! the parsers' snake_case convention.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assets::{InstrumentKind, SchemeMeta};
use crate::categories::Category;
use crate::transactions::Transaction;

/// A transaction line as it appears in a parsed statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceTransaction {
    pub date: NaiveDate,
    /// Raw label, e.g. "Purchase - SIP", "Redemption".
    #[serde(rename = "type")]
    pub label: String,
    #[serde(default)]
    pub units: Option<Decimal>,
    /// Per-unit price (NAV for fund transactions).
    #[serde(default)]
    pub nav: Option<Decimal>,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

/// One scheme line inside a mutual-fund folio, or one demat-held fund
/// unit line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemeEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub isin: Option<String>,
    #[serde(default)]
    pub units: Decimal,
    #[serde(default)]
    pub value: Decimal,
    #[serde(default)]
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub nav: Option<Decimal>,
    #[serde(default)]
    pub plan_type: Option<String>,
    #[serde(default)]
    pub option_type: Option<String>,
    #[serde(default)]
    pub transactions: Vec<SourceTransaction>,
}

/// A mutual-fund folio section of a consolidated statement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolioSection {
    #[serde(default)]
    pub amc: Option<String>,
    #[serde(default)]
    pub folio_number: Option<String>,
    #[serde(default)]
    pub schemes: Vec<SchemeEntry>,
}

/// One equity or ETF line inside a demat account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquityEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub isin: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub units: Decimal,
    #[serde(default)]
    pub value: Decimal,
    #[serde(default)]
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub transactions: Vec<SourceTransaction>,
}

/// The holdings block of a demat account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DematHoldings {
    #[serde(default)]
    pub equities: Vec<EquityEntry>,
    #[serde(default)]
    pub demat_mutual_funds: Vec<SchemeEntry>,
}

/// A demat account section of a consolidated statement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DematAccount {
    /// Depository participant name.
    #[serde(default)]
    pub dp_name: Option<String>,
    /// Beneficiary Owner ID - the demat account identifier.
    pub bo_id: String,
    #[serde(default)]
    pub holdings: DematHoldings,
}

/// A parsed consolidated account statement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CasStatement {
    #[serde(default)]
    pub mutual_funds: Vec<FolioSection>,
    #[serde(default)]
    pub demat_accounts: Vec<DematAccount>,
}

/// Compounding frequency for fixed deposits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompoundingFrequency {
    Monthly,
    #[default]
    Quarterly,
    Annually,
}

impl CompoundingFrequency {
    /// Compounding periods per year.
    pub fn periods_per_year(&self) -> u32 {
        match self {
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::Annually => 1,
        }
    }
}

/// A fixed-deposit contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedDepositRecord {
    pub name: String,
    pub bank: String,
    pub account_number: String,
    pub principal: Decimal,
    /// Annual interest rate, percent.
    pub interest_rate: Decimal,
    pub start_date: NaiveDate,
    pub maturity_date: NaiveDate,
    #[serde(default)]
    pub compounding: CompoundingFrequency,
}

/// Provident fund scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProvidentScheme {
    Epf,
    Ppf,
}

/// A provident fund account (EPF or PPF).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidentFundRecord {
    pub scheme: ProvidentScheme,
    pub account_number: String,
    #[serde(default)]
    pub employer: Option<String>,
    #[serde(default)]
    pub member_contribution: Decimal,
    #[serde(default)]
    pub employer_contribution: Decimal,
    #[serde(default)]
    pub member_interest: Decimal,
    #[serde(default)]
    pub employer_interest: Decimal,
    pub opened_on: NaiveDate,
}

/// A liquid/savings account balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidAccountRecord {
    pub account_name: String,
    pub account_number: String,
    #[serde(default)]
    pub balance: Decimal,
}

/// A crypto holding line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoRecord {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub wallet: Option<String>,
    #[serde(default)]
    pub units: Decimal,
    #[serde(default)]
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub current_value: Option<Decimal>,
    #[serde(default)]
    pub transactions: Vec<SourceTransaction>,
}

/// A US-listed stock line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsStockRecord {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub units: Decimal,
    #[serde(default)]
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub current_value: Option<Decimal>,
    #[serde(default)]
    pub transactions: Vec<SourceTransaction>,
}

/// An unlisted share line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlistedShareRecord {
    pub name: String,
    #[serde(default)]
    pub isin: Option<String>,
    #[serde(default)]
    pub units: Decimal,
    #[serde(default)]
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub value: Option<Decimal>,
}

/// One parsed statement payload of any supported shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "data")]
pub enum StatementPayload {
    Cas(CasStatement),
    FixedDeposits(Vec<FixedDepositRecord>),
    ProvidentFunds(Vec<ProvidentFundRecord>),
    LiquidAccounts(Vec<LiquidAccountRecord>),
    CryptoHoldings(Vec<CryptoRecord>),
    UsStocks(Vec<UsStockRecord>),
    UnlistedShares(Vec<UnlistedShareRecord>),
}

/// Which statement shape a record (or error) came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementSource {
    MutualFundFolio,
    DematEquity,
    DematFund,
    FixedDeposit,
    ProvidentFund,
    LiquidAccount,
    Crypto,
    UsStock,
    UnlistedShare,
}

/// A record that failed validation during normalization or identity
/// resolution. The import continues past it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordError {
    pub source: StatementSource,
    /// Best-effort label for the offending record (name, account, index).
    pub record: String,
    pub message: String,
}

/// The common intermediate record every source shape is normalized into.
///
/// Identity-key inputs are kept raw here; the identity resolver runs on
/// the normalized record in the next pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    pub source: StatementSource,
    pub isin: Option<String>,
    pub issuer: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub kind: InstrumentKind,
    pub exchange: Option<String>,
    pub scheme: Option<SchemeMeta>,
    /// Custody-boundary key: folio number, BO ID, contract number.
    pub sub_account: String,
    pub currency: String,
    pub quantity: Decimal,
    /// Cost basis. Never left empty: sources without a stated cost fall
    /// back to the stated value.
    pub cost: Decimal,
    /// Current value as stated by the source, when it supplies one.
    pub statement_value: Option<Decimal>,
    /// Per-unit price as stated by the source (NAV), when supplied.
    pub unit_price: Option<Decimal>,
    pub category_hint: Option<Category>,
    pub transactions: Vec<Transaction>,
}

impl NormalizedRecord {
    /// Earliest contributing transaction date, used for annualization.
    pub fn acquired_at(&self) -> Option<NaiveDate> {
        self.transactions.iter().map(|t| t.date).min()
    }

    /// Display label for error reporting.
    pub fn label(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.symbol.clone())
            .or_else(|| self.isin.clone())
            .unwrap_or_else(|| "<unnamed>".to_string())
    }
}
