//! Statements module - parsed payload models and the normalizer.

mod normalizer;
mod statements_model;

pub use normalizer::{normalize_payload, NormalizerOutput};
pub use statements_model::{
    CasStatement, CompoundingFrequency, CryptoRecord, DematAccount, DematHoldings, EquityEntry,
    FixedDepositRecord, FolioSection, LiquidAccountRecord, NormalizedRecord, ProvidentFundRecord,
    ProvidentScheme, RecordError, SchemeEntry, SourceTransaction, StatementPayload,
    StatementSource, UnlistedShareRecord, UsStockRecord,
};
