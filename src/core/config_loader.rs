//! Configuration file loader for secret-access-auditor
//!
//! This module provides configuration loading, layering, and validation.

use super::config::*;
use crate::core::error::ConfigError;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Configuration file name
pub const CONFIG_FILENAME: &str = ".secret-audit.yaml";

lazy_static! {
    static ref SECRET_NAME_PATTERN: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("secret name pattern is valid");
    static ref ACCOUNT_NAME_PATTERN: Regex =
        Regex::new(r"^[A-Za-z0-9._-]+$").expect("account name pattern is valid");
}

/// Configuration load options
#[derive(Debug, Clone, Default)]
pub struct ConfigLoadOptions {
    /// Directory searched for a project config file
    pub project_path: PathBuf,

    /// Directory searched for a global config file (usually `$HOME`)
    pub home_dir: Option<PathBuf>,

    /// Explicit config file; it is an error if it does not exist
    pub config_path: Option<PathBuf>,

    /// CLI arguments (highest priority)
    pub cli_args: Option<AuditConfigFile>,

    /// Environment variables
    pub env: HashMap<String, String>,
}

/// Configuration validation result
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationResult {
    pub valid: bool,
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationWarning>,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Field path (e.g., "api.baseUrl")
    pub field: String,
    pub message: String,
}

/// Configuration validation warning
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

/// Configuration file loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from multiple sources with priority
    ///
    /// Priority (high to low):
    /// 1. CLI arguments
    /// 2. Environment variables
    /// 3. Explicit config file (`--config`)
    /// 4. Project config (./.secret-audit.yaml)
    /// 5. Global config (~/.secret-audit.yaml)
    /// 6. Default values
    pub async fn load(options: ConfigLoadOptions) -> Result<AuditConfig, ConfigError> {
        let mut layers: Vec<AuditConfigFile> = Vec::new();

        if let Some(home_dir) = &options.home_dir
            && let Some(global) =
                Self::load_config_file(&home_dir.join(CONFIG_FILENAME), false).await?
        {
            layers.push(global);
        }

        let project_file = options.project_path.join(CONFIG_FILENAME);
        if let Some(project) = Self::load_config_file(&project_file, false).await? {
            layers.push(project);
        }

        if let Some(config_path) = &options.config_path
            && let Some(explicit) = Self::load_config_file(config_path, true).await?
        {
            layers.push(explicit);
        }

        if let Some(env_config) = Self::load_env_config(&options.env) {
            layers.push(env_config);
        }

        if let Some(cli_config) = options.cli_args {
            layers.push(cli_config);
        }

        let mut config = AuditConfig::default();
        for layer in layers {
            Self::merge_into(&mut config, layer);
        }

        let result = Self::validate(&config);
        if !result.valid || !result.warnings.is_empty() {
            tracing::warn!("{}", Self::format_validation_result(&result));
        }

        if !result.valid {
            return Err(ConfigError::Invalid {
                errors: result
                    .errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect(),
            });
        }

        Ok(config)
    }

    /// Load a partial configuration from a YAML file
    async fn load_config_file(
        file_path: &Path,
        required: bool,
    ) -> Result<Option<AuditConfigFile>, ConfigError> {
        if !file_path.exists() {
            if required {
                return Err(ConfigError::Read {
                    path: file_path.display().to_string(),
                    message: "file does not exist".to_string(),
                });
            }
            return Ok(None);
        }

        let content = fs::read_to_string(file_path)
            .await
            .map_err(|e| ConfigError::Read {
                path: file_path.display().to_string(),
                message: e.to_string(),
            })?;

        let config: AuditConfigFile =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: file_path.display().to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(path = %file_path.display(), "loaded config file");
        Ok(Some(config))
    }

    /// Load configuration from environment variables
    fn load_env_config(env: &HashMap<String, String>) -> Option<AuditConfigFile> {
        let mut config = AuditConfigFile::default();
        let mut has_changes = false;

        // SECRET_AUDIT_ORG -> organization
        if let Some(org) = env.get("SECRET_AUDIT_ORG") {
            config.organization = Some(org.trim().to_string());
            has_changes = true;
        }

        // SECRET_AUDIT_SECRETS -> requiredSecrets
        if let Some(secrets) = env.get("SECRET_AUDIT_SECRETS") {
            config.required_secrets = Some(split_list(secrets));
            has_changes = true;
        }

        // SECRET_AUDIT_REPOSITORIES -> repositories
        if let Some(repos) = env.get("SECRET_AUDIT_REPOSITORIES") {
            config.repositories = Some(split_list(repos));
            has_changes = true;
        }

        // GITHUB_API_URL -> api.baseUrl
        if let Some(url) = env.get("GITHUB_API_URL") {
            config.api = Some(ApiConfigFile {
                base_url: Some(url.trim().to_string()),
                ..Default::default()
            });
            has_changes = true;
        }

        if has_changes { Some(config) } else { None }
    }

    /// Merge a partial source config into the resolved target
    fn merge_into(target: &mut AuditConfig, source: AuditConfigFile) {
        if let Some(organization) = source.organization {
            target.organization = organization;
        }
        if let Some(secrets) = source.required_secrets {
            target.required_secrets = secrets;
        }
        if let Some(repositories) = source.repositories {
            target.repositories = repositories;
        }

        if let Some(api) = source.api {
            if let Some(base_url) = api.base_url {
                target.api.base_url = base_url.trim_end_matches('/').to_string();
            }
            if let Some(api_version) = api.api_version {
                target.api.api_version = api_version;
            }
            if let Some(timeout_secs) = api.timeout_secs {
                target.api.timeout_secs = timeout_secs;
            }
        }

        if let Some(auth) = source.auth
            && let Some(token_env) = auth.token_env
        {
            target.auth.token_env = token_env;
        }

        if let Some(audit) = source.audit {
            if let Some(verify) = audit.verify_repositories {
                target.audit.verify_repositories = verify;
            }
            if let Some(limit) = audit.example_limit {
                target.audit.example_limit = limit;
            }
        }
    }

    /// Validate a resolved configuration
    pub fn validate(config: &AuditConfig) -> ConfigValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if config.organization.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "organization".to_string(),
                message: "organization must not be empty".to_string(),
            });
        } else if !ACCOUNT_NAME_PATTERN.is_match(&config.organization) {
            errors.push(ConfigValidationError {
                field: "organization".to_string(),
                message: format!("'{}' is not a valid organization name", config.organization),
            });
        }

        if config.required_secrets.is_empty() {
            errors.push(ConfigValidationError {
                field: "requiredSecrets".to_string(),
                message: "at least one required secret must be configured".to_string(),
            });
        }
        for (i, name) in config.required_secrets.iter().enumerate() {
            if !SECRET_NAME_PATTERN.is_match(name) {
                errors.push(ConfigValidationError {
                    field: format!("requiredSecrets[{}]", i),
                    message: format!("'{}' is not a valid secret name", name),
                });
            }
        }
        if let Some(duplicate) = first_duplicate(&config.required_secrets) {
            errors.push(ConfigValidationError {
                field: "requiredSecrets".to_string(),
                message: format!("secret '{}' is listed more than once", duplicate),
            });
        }

        if config.repositories.is_empty() {
            errors.push(ConfigValidationError {
                field: "repositories".to_string(),
                message: "repository roster must not be empty".to_string(),
            });
        }
        for (i, name) in config.repositories.iter().enumerate() {
            if !ACCOUNT_NAME_PATTERN.is_match(name) {
                errors.push(ConfigValidationError {
                    field: format!("repositories[{}]", i),
                    message: format!("'{}' is not a valid repository name", name),
                });
            }
        }
        if let Some(duplicate) = first_duplicate(&config.repositories) {
            errors.push(ConfigValidationError {
                field: "repositories".to_string(),
                message: format!("repository '{}' is listed more than once", duplicate),
            });
        }

        let base_url = &config.api.base_url;
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            errors.push(ConfigValidationError {
                field: "api.baseUrl".to_string(),
                message: format!("'{}' is not an http(s) URL", config.api.base_url),
            });
        } else if base_url.starts_with("http://") {
            warnings.push(ConfigValidationWarning {
                field: "api.baseUrl".to_string(),
                message: "API URL does not use TLS; the token is sent in clear text".to_string(),
                suggestion: Some("Use an https:// URL".to_string()),
            });
        }

        if config.api.timeout_secs == 0 {
            errors.push(ConfigValidationError {
                field: "api.timeoutSecs".to_string(),
                message: "timeout must be greater than zero".to_string(),
            });
        }

        if config.auth.token_env.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "auth.tokenEnv".to_string(),
                message: "token environment variable name must not be empty".to_string(),
            });
        }

        if config.audit.example_limit == 0 {
            warnings.push(ConfigValidationWarning {
                field: "audit.exampleLimit".to_string(),
                message: "summary will list no example repositories".to_string(),
                suggestion: Some("Set exampleLimit to 10".to_string()),
            });
        }

        ConfigValidationResult {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Format validation result as human-readable string
    pub fn format_validation_result(result: &ConfigValidationResult) -> String {
        let mut lines = Vec::new();

        if result.valid {
            lines.push("✅ Configuration validation succeeded".to_string());
        } else {
            lines.push("❌ Configuration has errors".to_string());
        }

        for error in &result.errors {
            lines.push(format!("  - [{}] {}", error.field, error.message));
        }

        for warning in &result.warnings {
            lines.push(format!("  ⚠️  [{}] {}", warning.field, warning.message));
            if let Some(suggestion) = &warning.suggestion {
                lines.push(format!("    Suggestion: {}", suggestion));
            }
        }

        lines.join("\n")
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn first_duplicate(values: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    values
        .iter()
        .find(|v| !seen.insert(v.as_str()))
        .map(|v| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options_for(dir: &Path) -> ConfigLoadOptions {
        ConfigLoadOptions {
            project_path: dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_load_defaults_without_files() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::load(options_for(temp_dir.path())).await.unwrap();
        assert_eq!(config, AuditConfig::default());
    }

    #[tokio::test]
    async fn test_project_file_overrides_global_file() {
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        std::fs::write(
            home.path().join(CONFIG_FILENAME),
            "organization: global-org\napi:\n  timeoutSecs: 7\n",
        )
        .unwrap();
        std::fs::write(
            project.path().join(CONFIG_FILENAME),
            "organization: project-org\nrepositories: [alpha, beta]\n",
        )
        .unwrap();

        let options = ConfigLoadOptions {
            project_path: project.path().to_path_buf(),
            home_dir: Some(home.path().to_path_buf()),
            ..Default::default()
        };
        let config = ConfigLoader::load(options).await.unwrap();

        assert_eq!(config.organization, "project-org");
        assert_eq!(config.repositories, vec!["alpha".to_string(), "beta".to_string()]);
        assert_eq!(config.api.timeout_secs, 7);
    }

    #[tokio::test]
    async fn test_env_and_cli_priority() {
        let temp_dir = TempDir::new().unwrap();
        let mut env = HashMap::new();
        env.insert("SECRET_AUDIT_ORG".to_string(), "env-org".to_string());
        env.insert(
            "SECRET_AUDIT_REPOSITORIES".to_string(),
            "one, two ,,three".to_string(),
        );
        env.insert(
            "GITHUB_API_URL".to_string(),
            "https://ghe.example.com/api/v3/".to_string(),
        );

        let options = ConfigLoadOptions {
            project_path: temp_dir.path().to_path_buf(),
            cli_args: Some(AuditConfigFile {
                organization: Some("cli-org".to_string()),
                ..Default::default()
            }),
            env,
            ..Default::default()
        };
        let config = ConfigLoader::load(options).await.unwrap();

        assert_eq!(config.organization, "cli-org");
        assert_eq!(
            config.repositories,
            vec!["one".to_string(), "two".to_string(), "three".to_string()]
        );
        assert_eq!(config.api.base_url, "https://ghe.example.com/api/v3");
    }

    #[tokio::test]
    async fn test_missing_explicit_config_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let options = ConfigLoadOptions {
            project_path: temp_dir.path().to_path_buf(),
            config_path: Some(temp_dir.path().join("nope.yaml")),
            ..Default::default()
        };
        let err = ConfigLoader::load(options).await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[tokio::test]
    async fn test_malformed_yaml_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILENAME),
            "repositories: {not: [a list\n",
        )
        .unwrap();
        let err = ConfigLoader::load(options_for(temp_dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILENAME),
            "organization: ''\nrequiredSecrets: []\n",
        )
        .unwrap();
        let err = ConfigLoader::load(options_for(temp_dir.path()))
            .await
            .unwrap_err();
        match err {
            ConfigError::Invalid { errors } => {
                assert!(errors.iter().any(|e| e.starts_with("organization")));
                assert!(errors.iter().any(|e| e.starts_with("requiredSecrets")));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_duplicates_and_bad_names() {
        let mut config = AuditConfig::new("acme", &["GOOD", "bad-name"], &["r1", "r1", "org/r2"]);
        config.api.timeout_secs = 0;

        let result = ConfigLoader::validate(&config);
        assert!(!result.valid);
        let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"requiredSecrets[1]"));
        assert!(fields.contains(&"repositories"));
        assert!(fields.contains(&"repositories[2]"));
        assert!(fields.contains(&"api.timeoutSecs"));
    }

    #[test]
    fn test_validate_warns_on_plain_http() {
        let mut config = AuditConfig::new("acme", &["A"], &["r1"]);
        config.api.base_url = "http://localhost:8080".to_string();

        let result = ConfigLoader::validate(&config);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].field, "api.baseUrl");

        let formatted = ConfigLoader::format_validation_result(&result);
        assert!(formatted.contains("Suggestion: Use an https:// URL"));
    }

    #[test]
    fn test_validate_rejects_names_that_break_url_paths() {
        let config = AuditConfig::new("acme corp", &["A"], &["r1#typo", "ok.repo-1_x", "a?b"]);

        let result = ConfigLoader::validate(&config);
        assert!(!result.valid);
        let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["organization", "repositories[0]", "repositories[2]"]
        );
    }

    #[test]
    fn test_load_env_config_none_when_unset() {
        assert!(ConfigLoader::load_env_config(&HashMap::new()).is_none());
    }
}
