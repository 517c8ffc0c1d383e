//! Configuration structures and types for secret-access-auditor
//!
//! [`AuditConfig`] is the resolved configuration handed to the auditor.
//! [`AuditConfigFile`] is the partial, all-optional shape read from YAML files,
//! environment variables and CLI flags before they are layered onto the defaults.

use serde::{Deserialize, Serialize};

pub const DEFAULT_ORGANIZATION: &str = "Struxel-Dynamics";

pub const DEFAULT_REQUIRED_SECRETS: &[&str] = &["DOCKER_USERNAME", "DOCKER_PASSWORD"];

pub const DEFAULT_REPOSITORIES: &[&str] = &[
    "struxel-credential-verifier",
    "struxel-audit-simulator",
    "struxel-data-lineage",
    "struxel-bias-engine",
    "struxel-contributor-risk",
    "struxel-identity-manager",
    "struxel-data-validator",
    "struxel-vendor-analyzer",
    "struxel-governance-framework",
    "struxel-predictive-module",
    "struxel-api-gateway",
    "struxel-risk-forecast",
    "struxel-core",
    "struxel-compliance-monitor",
    "struxel-audit-logger",
    "struxel-prompt-risk",
    "struxel-task-runner",
    "struxel-rubric-checker",
    "struxel-audit-artifact-kit",
    "struxel-badge-issuer",
    "struxel-client-intake-helper",
    "struxel-dataset-cataloger",
    "struxel-prompt-sanitizer",
    "struxel-fintech-stack",
    "struxel-hrtech-suite",
    "struxel-retail-analytics-suite",
    "struxel-insurtech-suite",
    "struxel-manufacturtech-suite",
    "struxel-energy-utilities-suite",
];

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_API_VERSION: &str = "2022-11-28";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const DEFAULT_EXAMPLE_LIMIT: usize = 10;

/// Resolved configuration for one audit run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditConfig {
    /// Organization that owns the secrets and the repositories
    pub organization: String,

    /// Organization secrets every roster repository must be able to read
    #[serde(rename = "requiredSecrets")]
    pub required_secrets: Vec<String>,

    /// Roster of repository names to audit, in report order
    pub repositories: Vec<String>,

    pub api: ApiConfig,

    pub auth: AuthConfig,

    pub audit: AuditOptions,
}

/// REST endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    #[serde(rename = "baseUrl")]
    pub base_url: String,

    /// Value of the `X-GitHub-Api-Version` header
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: u64,
}

/// Credential source settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthConfig {
    /// Environment variable holding the bearer token
    #[serde(rename = "tokenEnv")]
    pub token_env: String,
}

/// Audit behavior settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditOptions {
    /// Probe each roster repository before recording its access
    #[serde(rename = "verifyRepositories")]
    pub verify_repositories: bool,

    /// Number of example repositories listed per summary category
    #[serde(rename = "exampleLimit")]
    pub example_limit: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            organization: DEFAULT_ORGANIZATION.to_string(),
            required_secrets: DEFAULT_REQUIRED_SECRETS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            repositories: DEFAULT_REPOSITORIES.iter().map(|s| s.to_string()).collect(),
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            audit: AuditOptions::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            verify_repositories: true,
            example_limit: DEFAULT_EXAMPLE_LIMIT,
        }
    }
}

impl AuditConfig {
    /// Build a configuration for the given organization, secrets and roster,
    /// keeping every other setting at its default
    pub fn new<S: Into<String>>(
        organization: S,
        required_secrets: &[&str],
        repositories: &[&str],
    ) -> Self {
        Self {
            organization: organization.into(),
            required_secrets: required_secrets.iter().map(|s| s.to_string()).collect(),
            repositories: repositories.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Web page where organization secrets can be edited by hand
    pub fn secrets_settings_url(&self) -> String {
        format!(
            "https://github.com/organizations/{}/settings/secrets/actions",
            self.organization
        )
    }
}

/// Partial configuration as read from one source (file, environment, CLI)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AuditConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "requiredSecrets")]
    pub required_secrets: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub repositories: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiConfigFile>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfigFile>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditOptionsFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ApiConfigFile {
    #[serde(skip_serializing_if = "Option::is_none", rename = "baseUrl")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "apiVersion")]
    pub api_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "timeoutSecs")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AuthConfigFile {
    #[serde(skip_serializing_if = "Option::is_none", rename = "tokenEnv")]
    pub token_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AuditOptionsFile {
    #[serde(skip_serializing_if = "Option::is_none", rename = "verifyRepositories")]
    pub verify_repositories: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "exampleLimit")]
    pub example_limit: Option<usize>,
}
