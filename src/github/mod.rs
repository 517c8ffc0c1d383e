//! GitHub REST API access for organization Actions secrets

pub mod client;
pub mod types;

pub use client::GitHubClient;
pub use types::{OrgSecret, RepositoryRef, Visibility};
