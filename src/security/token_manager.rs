//! GitHub token acquisition with memory-safe handling and masking
//!
//! The token comes from an environment variable or, failing that, from a
//! single line typed by the operator. It is held as a [`SecretString`] and
//! only ever displayed in masked form.

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Prefixes GitHub uses for its token kinds
const GITHUB_TOKEN_PREFIXES: &[&str] = &["ghp_", "github_pat_", "gho_", "ghu_", "ghs_"];

/// Where the token was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Environment,
    Prompt,
}

/// Resolves the bearer token for the API client
pub struct TokenManager {
    variable: String,
}

impl TokenManager {
    /// Creates a manager reading the given environment variable
    pub fn new<S: Into<String>>(variable: S) -> Self {
        Self {
            variable: variable.into(),
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Token from the environment, ignoring blank values
    pub fn from_env(&self, env: &HashMap<String, String>) -> Option<SecretString> {
        env.get(&self.variable)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(|v| SecretString::new(v.into()))
    }

    /// Reads one line from `reader`; a blank line yields `None`
    pub async fn from_reader<R>(&self, reader: &mut R) -> std::io::Result<Option<SecretString>>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut line = String::new();
        reader.read_line(&mut line).await?;
        let token = line.trim();

        if token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(SecretString::new(token.into())))
        }
    }

    /// Masks a token for safe logging
    ///
    /// Shows only the first 3 and last 3 characters for identification purposes.
    /// Tokens shorter than 10 characters are fully masked as "****".
    pub fn mask_token(token: &str) -> String {
        if token.len() < 10 || !token.is_ascii() {
            return "****".to_string();
        }

        let prefix = &token[..3];
        let suffix = &token[token.len() - 3..];
        format!("{}...{}", prefix, suffix)
    }

    /// Whether the token carries one of GitHub's known prefixes
    pub fn looks_like_github_token(token: &SecretString) -> bool {
        let value = token.expose_secret();
        GITHUB_TOKEN_PREFIXES.iter().any(|p| value.starts_with(p))
    }
}
