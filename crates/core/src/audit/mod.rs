//! Audit module - advisory findings and the reconciliation auditor.

mod audit_model;
mod auditor;

pub use audit_model::{AuditFinding, FindingCode, HoldingRef, Severity};
pub use auditor::ReconciliationAuditor;
