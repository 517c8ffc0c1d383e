//! Secret Access Auditor - main orchestrator for one audit run
//!
//! The run is strictly linear:
//! - authenticate (fatal gate)
//! - confirm the required secrets exist (fatal gate)
//! - audit which roster repositories can read each secret
//! - summarize
//! - optionally overwrite the allow-lists after operator confirmation

use crate::audit::access::{AccessMatrix, allow_list_names};
use crate::audit::summary::AccessSummary;
use crate::core::config::AuditConfig;
use crate::core::error::{ApiError, AuditError};
use crate::core::traits::{Confirmer, SecretsApi};
use crate::github::types::{OrgSecret, Visibility};
use crate::orchestration::remediation::{RemediationReport, grant_roster_access};
use crate::orchestration::report;
use std::collections::HashMap;

/// Presence and metadata of one required secret
#[derive(Debug, Clone, PartialEq)]
pub struct SecretStatus {
    pub secret: OrgSecret,
    pub exists: bool,
}

/// Result of the secret presence gate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecretPresence {
    /// Number of secrets defined at organization scope
    pub total_secrets: usize,
    pub statuses: Vec<SecretStatus>,
}

impl SecretPresence {
    pub fn all_present(&self) -> bool {
        !self.statuses.is_empty() && self.statuses.iter().all(|s| s.exists)
    }

    pub fn missing(&self) -> Vec<String> {
        self.statuses
            .iter()
            .filter(|s| !s.exists)
            .map(|s| s.secret.name.clone())
            .collect()
    }
}

/// Audit result for one secret; `outcome` holds the allow-list size
#[derive(Debug, Clone, PartialEq)]
pub struct SecretAudit {
    pub name: String,
    pub visibility: Visibility,
    pub outcome: Result<usize, ApiError>,
}

/// Everything the access audit learned
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessAudit {
    pub secrets: Vec<SecretAudit>,
    /// Roster repositories that failed the existence check
    pub unverified: Vec<(String, ApiError)>,
    pub matrix: AccessMatrix,
}

/// What the run should do after the two gates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Audit, summarize and offer remediation unless `report_only`
    Verify { report_only: bool },
    /// Stop after the gates
    Check,
    /// Skip the audit and go straight to the remediation offer
    Grant,
}

/// How a run ended (gate failures are returned as errors instead)
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    GatesPassed,
    AllGood,
    ReportOnly(AccessSummary),
    Declined,
    Remediated(RemediationReport),
}

/// Process exit code for a finished run; every run-level error exits 1
pub fn exit_code_for(result: &Result<RunOutcome, AuditError>) -> i32 {
    match result {
        Ok(outcome) => outcome.exit_code(),
        Err(_) => 1,
    }
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::GatesPassed | Self::AllGood | Self::Declined => 0,
            Self::ReportOnly(_) => 1,
            Self::Remediated(report) => {
                if report.success() {
                    0
                } else {
                    1
                }
            }
        }
    }
}

/// Orchestrates the audit against any [`SecretsApi`]
pub struct SecretAccessAuditor<A: SecretsApi> {
    api: A,
    config: AuditConfig,
}

impl<A: SecretsApi> SecretAccessAuditor<A> {
    pub fn new(api: A, config: AuditConfig) -> Self {
        Self { api, config }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Verify the credential and the organization; returns the login
    pub async fn authenticate(&self) -> Result<String, AuditError> {
        let login = self
            .api
            .check_identity()
            .await
            .map_err(|source| AuditError::AuthenticationFailed { source })?;

        self.api
            .check_org_access()
            .await
            .map_err(|source| AuditError::AuthenticationFailed { source })?;

        tracing::info!(login = %login, organization = %self.config.organization, "authenticated");
        Ok(login)
    }

    /// Check every required secret exists at organization scope
    ///
    /// Only a failed secret listing is an error here; missing secrets are
    /// reported in the returned [`SecretPresence`].
    pub async fn check_secret_presence(&self) -> Result<SecretPresence, AuditError> {
        let secrets = self
            .api
            .list_org_secrets()
            .await
            .map_err(|source| AuditError::SecretListingFailed { source })?;

        let listed: HashMap<&str, &OrgSecret> =
            secrets.iter().map(|s| (s.name.as_str(), s)).collect();

        let mut presence = SecretPresence {
            total_secrets: secrets.len(),
            statuses: Vec::with_capacity(self.config.required_secrets.len()),
        };

        for name in &self.config.required_secrets {
            let Some(listing) = listed.get(name.as_str()) else {
                presence.statuses.push(SecretStatus {
                    secret: OrgSecret::unknown(name),
                    exists: false,
                });
                continue;
            };

            let visibility = match self.api.get_secret_detail(name).await {
                Ok(detail) => detail.visibility,
                Err(err) => {
                    tracing::warn!(secret = %name, error = %err, "secret detail unavailable");
                    Visibility::Unknown
                }
            };

            presence.statuses.push(SecretStatus {
                secret: OrgSecret {
                    visibility,
                    ..(*listing).clone()
                },
                exists: true,
            });
        }

        Ok(presence)
    }

    /// Determine which roster repositories can read each required secret
    ///
    /// A secret whose allow-list cannot be fetched is skipped and reported;
    /// the remaining secrets are still audited.
    pub async fn audit_access(&mut self) -> AccessAudit {
        let mut audit = AccessAudit::default();

        let audited: Vec<String> = if self.config.audit.verify_repositories {
            let mut existing = Vec::with_capacity(self.config.repositories.len());
            for repository in &self.config.repositories {
                match self.api.resolve_repo_id(repository).await {
                    Ok(_) => existing.push(repository.clone()),
                    Err(err) => {
                        tracing::warn!(
                            repository = %repository,
                            error = %err,
                            "repository not found"
                        );
                        audit.unverified.push((repository.clone(), err));
                    }
                }
            }
            existing
        } else {
            self.config.repositories.clone()
        };

        for secret in &self.config.required_secrets {
            let visibility = match self.api.get_secret_detail(secret).await {
                Ok(detail) => detail.visibility,
                Err(err) => {
                    tracing::warn!(secret = %secret, error = %err, "secret detail unavailable");
                    Visibility::Unknown
                }
            };

            let allow_list = match (visibility, self.api.list_secret_repos(secret).await) {
                (_, Ok(list)) => list,
                (Visibility::All | Visibility::Private, Err(err)) => {
                    tracing::debug!(
                        secret = %secret,
                        error = %err,
                        "allow-list ignored for visibility {}",
                        visibility
                    );
                    Vec::new()
                }
                (_, Err(err)) => {
                    audit.secrets.push(SecretAudit {
                        name: secret.clone(),
                        visibility,
                        outcome: Err(err),
                    });
                    continue;
                }
            };

            let names = allow_list_names(&allow_list);
            audit.matrix.record_secret(
                secret,
                visibility,
                &names,
                audited.iter().map(|r| r.as_str()),
            );
            audit.secrets.push(SecretAudit {
                name: secret.clone(),
                visibility,
                outcome: Ok(allow_list.len()),
            });
        }

        audit
    }

    pub fn summarize(&self, audit: &AccessAudit) -> AccessSummary {
        AccessSummary::classify(
            &self.config.repositories,
            &self.config.required_secrets,
            &audit.matrix,
        )
    }

    /// Overwrite every required secret's allow-list with the resolved roster
    pub async fn remediate(&mut self) -> RemediationReport {
        grant_roster_access(
            &mut self.api,
            &self.config.required_secrets,
            &self.config.repositories,
        )
        .await
    }

    /// Run the whole flow, printing progress to stdout
    pub async fn run(
        &mut self,
        mode: RunMode,
        confirmer: &mut dyn Confirmer,
    ) -> Result<RunOutcome, AuditError> {
        report::print_section("Testing Authentication");
        let login = self.authenticate().await?;
        report::print_identity(&login, &self.config.organization);

        report::print_section("Checking Organization Secrets");
        let presence = self.check_secret_presence().await?;
        report::print_presence(&presence);
        if !presence.all_present() {
            return Err(AuditError::SecretsMissing {
                missing: presence.missing(),
            });
        }

        let report_only = match mode {
            RunMode::Check => return Ok(RunOutcome::GatesPassed),
            RunMode::Grant => return self.offer_remediation(confirmer).await,
            RunMode::Verify { report_only } => report_only,
        };

        report::print_section("Checking Repository Access");
        let audit = self.audit_access().await;
        report::print_access_audit(&audit);

        report::print_section("Detailed Summary");
        let summary = self.summarize(&audit);
        report::print_summary(&summary, self.config.audit.example_limit);

        if summary.all_good() {
            report::print_all_good();
            return Ok(RunOutcome::AllGood);
        }
        if report_only {
            return Ok(RunOutcome::ReportOnly(summary));
        }

        self.offer_remediation(confirmer).await
    }

    async fn offer_remediation(
        &mut self,
        confirmer: &mut dyn Confirmer,
    ) -> Result<RunOutcome, AuditError> {
        report::print_grant_prompt(&self.config);
        if !confirmer.confirm("Proceed?").await? {
            report::print_manual_instructions(&self.config);
            return Ok(RunOutcome::Declined);
        }

        report::print_section("Granting Repository Access");
        let remediation = self.remediate().await;
        report::print_remediation(&remediation);
        Ok(RunOutcome::Remediated(remediation))
    }
}
