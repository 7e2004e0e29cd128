//! Imports module - the import-run ledger.

mod import_run;

pub use import_run::{ImportLedger, ImportRun, ImportRunStatus};
