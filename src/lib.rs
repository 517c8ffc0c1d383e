pub mod audit;
pub mod core;
pub mod github;
pub mod orchestration;
pub mod security;

pub use audit::{AccessCategory, AccessMatrix, AccessSummary};
pub use self::core::*;
pub use github::{GitHubClient, OrgSecret, RepositoryRef, Visibility};
pub use orchestration::{RunMode, RunOutcome, SecretAccessAuditor, exit_code_for};
pub use security::{TokenManager, TokenSource};
