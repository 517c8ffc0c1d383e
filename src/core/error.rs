//! Error handling for secret access auditing
//!
//! Remote failures are captured as [`ApiError`] at the client boundary, the
//! run-level gates report [`AuditError`], and the configuration layer reports
//! [`ConfigError`]. Each carries a stable code and operator guidance.

use thiserror::Error;

/// Failure of a single call against the version-control platform
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("credential rejected: {message}")]
    Auth { message: String },

    #[error("permission denied: {message}")]
    Permission { message: String },

    #[error("{resource} not found or not accessible")]
    NotFound { resource: String },

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("invalid response body: {message}")]
    Decode { message: String },
}

impl ApiError {
    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "AUTH_ERROR",
            Self::Permission { .. } => "PERMISSION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Status { .. } => "HTTP_STATUS_ERROR",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::Decode { .. } => "DECODE_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode {
                message: err.to_string(),
            }
        } else {
            Self::Transport {
                message: err.to_string(),
            }
        }
    }
}

/// Run-level failure that stops the audit
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("no GitHub token provided (set {variable} or enter one when prompted)")]
    TokenMissing { variable: String },

    #[error("authentication failed: {source}")]
    AuthenticationFailed {
        #[source]
        source: ApiError,
    },

    #[error("could not list organization secrets: {source}")]
    SecretListingFailed {
        #[source]
        source: ApiError,
    },

    #[error("required organization secrets missing: {}", missing.join(", "))]
    SecretsMissing { missing: Vec<String> },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to read operator input: {0}")]
    Prompt(#[from] std::io::Error),

    #[error("failed to build HTTP client: {message}")]
    Client { message: String },
}

impl AuditError {
    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::TokenMissing { .. } => "TOKEN_MISSING",
            Self::AuthenticationFailed { .. } => "AUTHENTICATION_FAILED",
            Self::SecretListingFailed { .. } => "SECRET_LISTING_FAILED",
            Self::SecretsMissing { .. } => "SECRETS_MISSING",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Prompt(_) => "PROMPT_ERROR",
            Self::Client { .. } => "CLIENT_ERROR",
        }
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::TokenMissing { .. } => vec![
                "Create a token at https://github.com/settings/tokens",
                "Export it as GITHUB_TOKEN before running",
            ],
            Self::AuthenticationFailed { .. } => vec![
                "Token is valid",
                "Token has 'admin:org' and 'repo' scopes",
                "You have access to the organization",
            ],
            Self::SecretListingFailed { source } => match source {
                ApiError::Permission { .. } => {
                    vec!["Grant the token the 'admin:org' scope"]
                }
                ApiError::NotFound { .. } => vec!["Check the organization name"],
                _ => vec!["Check network connectivity and try again"],
            },
            Self::SecretsMissing { .. } => vec![
                "Create the missing secrets at organization level",
                "Re-run the audit once they exist",
            ],
            Self::Config(_) => vec!["Fix the configuration file and try again"],
            Self::Prompt(_) => vec!["Run from an interactive terminal or pass --yes"],
            Self::Client { .. } => vec!["Check the configured API URL and TLS setup"],
        }
    }
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse YAML config {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid configuration: {}", errors.join("; "))]
    Invalid { errors: Vec<String> },
}
