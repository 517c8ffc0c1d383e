//! Orchestration layer for the secret access audit
//!
//! This module drives one audit run from authentication through the
//! optional allow-list remediation, and renders its console report.

pub mod remediation;
pub mod report;
pub mod secret_auditor;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use remediation::{RemediationReport, SecretUpdate, grant_roster_access};
pub use secret_auditor::{
    AccessAudit, RunMode, RunOutcome, SecretAccessAuditor, SecretAudit, SecretPresence,
    SecretStatus, exit_code_for,
};
