//! Wire types for the GitHub REST endpoints the auditor consumes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which repositories of the organization may read a secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    All,
    Private,
    Selected,
    /// Detail lookup failed or the platform returned a value we do not know
    #[default]
    #[serde(other)]
    Unknown,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Private => "private",
            Self::Selected => "selected",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Organization-level Actions secret (values are never returned by the API)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgSecret {
    pub name: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub visibility: Visibility,
}

impl OrgSecret {
    /// Placeholder used when the detail endpoint could not be read
    pub fn unknown(name: &str) -> Self {
        Self {
            name: name.to_string(),
            created_at: None,
            updated_at: None,
            visibility: Visibility::Unknown,
        }
    }

    pub fn updated_display(&self) -> String {
        self.updated_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Minimal repository record as returned in secret repository listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AuthenticatedUser {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OrgSecretList {
    pub total_count: u64,
    pub secrets: Vec<OrgSecret>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SecretRepositoryList {
    pub total_count: u64,
    pub repositories: Vec<RepositoryRef>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SelectedRepositoryIds<'a> {
    pub selected_repository_ids: &'a [u64],
}

/// Error body GitHub attaches to non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GitHubErrorBody {
    pub message: String,
}
