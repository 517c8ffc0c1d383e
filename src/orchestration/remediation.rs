//! Bulk grant of the required secrets to the whole roster
//!
//! The allow-list of every required secret is overwritten with the ids of the
//! roster repositories that resolve. Repositories outside the roster lose
//! access as a side effect.

use crate::core::error::ApiError;
use crate::core::traits::SecretsApi;

/// Outcome of updating one secret's allow-list
#[derive(Debug, Clone, PartialEq)]
pub struct SecretUpdate {
    pub secret: String,
    pub result: Result<(), ApiError>,
}

/// Outcome of a remediation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemediationReport {
    /// Roster repositories with their platform ids, in roster order
    pub resolved: Vec<(String, u64)>,
    /// Roster repositories whose id could not be resolved
    pub unresolved: Vec<(String, ApiError)>,
    pub updates: Vec<SecretUpdate>,
}

impl RemediationReport {
    pub fn repository_ids(&self) -> Vec<u64> {
        self.resolved.iter().map(|(_, id)| *id).collect()
    }

    /// Every required secret was updated
    pub fn success(&self) -> bool {
        !self.updates.is_empty() && self.updates.iter().all(|u| u.result.is_ok())
    }

    /// Nothing resolved, so no allow-list was touched
    pub fn nothing_to_grant(&self) -> bool {
        self.resolved.is_empty()
    }
}

/// Resolve the roster to ids and set that exact list on every secret
pub async fn grant_roster_access<A>(
    api: &mut A,
    secrets: &[String],
    roster: &[String],
) -> RemediationReport
where
    A: SecretsApi + ?Sized,
{
    let mut report = RemediationReport::default();

    for (i, repository) in roster.iter().enumerate() {
        match api.resolve_repo_id(repository).await {
            Ok(id) => {
                tracing::info!(repository = %repository, id, "resolved {}/{}", i + 1, roster.len());
                report.resolved.push((repository.clone(), id));
            }
            Err(err) => {
                tracing::warn!(
                    repository = %repository,
                    error = %err,
                    "could not resolve repository"
                );
                report.unresolved.push((repository.clone(), err));
            }
        }
    }

    if report.nothing_to_grant() {
        tracing::warn!("no roster repository resolved; leaving allow-lists untouched");
        return report;
    }

    let ids = report.repository_ids();
    for secret in secrets {
        let result = api.set_secret_repos(secret, &ids).await;
        if let Err(err) = &result {
            tracing::warn!(secret = %secret, error = %err, "failed to update allow-list");
        }
        report.updates.push(SecretUpdate {
            secret: secret.clone(),
            result,
        });
    }

    report
}
