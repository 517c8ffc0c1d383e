//! Core traits for secret access auditing
//!
//! [`SecretsApi`] is the seam between the orchestration and the remote
//! platform; [`Confirmer`] is the seam for the single operator decision.

use crate::core::error::{ApiError, AuditError};
use crate::github::types::{OrgSecret, RepositoryRef};
use async_trait::async_trait;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Remote operations against one organization
///
/// Every operation reports failures as [`ApiError`]; implementations never
/// let transport errors escape in any other form.
#[async_trait]
pub trait SecretsApi: Send + Sync {
    /// Login of the user the credential belongs to
    async fn check_identity(&self) -> Result<String, ApiError>;

    /// Confirm the organization is visible to the credential
    async fn check_org_access(&self) -> Result<(), ApiError>;

    /// All Actions secrets defined at organization scope
    async fn list_org_secrets(&self) -> Result<Vec<OrgSecret>, ApiError>;

    /// Visibility and timestamps of one organization secret
    async fn get_secret_detail(&self, name: &str) -> Result<OrgSecret, ApiError>;

    /// Explicit allow-list of a `selected` secret
    async fn list_secret_repos(&self, name: &str) -> Result<Vec<RepositoryRef>, ApiError>;

    /// Replace the allow-list of a secret with exactly `repository_ids`
    async fn set_secret_repos(&self, name: &str, repository_ids: &[u64]) -> Result<(), ApiError>;

    /// Numeric id of a repository in the organization, cached per instance
    async fn resolve_repo_id(&mut self, name: &str) -> Result<u64, ApiError>;
}

/// Yes/no decision from the operator
#[async_trait]
pub trait Confirmer: Send {
    async fn confirm(&mut self, message: &str) -> Result<bool, AuditError>;
}

/// Reads the answer from standard input
#[derive(Debug, Default)]
pub struct StdinConfirmer;

#[async_trait]
impl Confirmer for StdinConfirmer {
    async fn confirm(&mut self, message: &str) -> Result<bool, AuditError> {
        let mut stdout = io::stdout();
        stdout.write_all(format!("{} (y/n): ", message).as_bytes()).await?;
        stdout.flush().await?;

        let mut reader = BufReader::new(io::stdin());
        let mut answer = String::new();
        reader.read_line(&mut answer).await?;

        Ok(is_affirmative(&answer))
    }
}

/// Fixed answer, for `--yes` and for tests
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

#[async_trait]
impl Confirmer for AutoConfirm {
    async fn confirm(&mut self, _message: &str) -> Result<bool, AuditError> {
        Ok(self.0)
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    answer == "y" || answer == "yes"
}
