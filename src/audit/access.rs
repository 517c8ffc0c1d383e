//! Per-repository access rules and the accumulated access matrix

use crate::github::types::{RepositoryRef, Visibility};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Whether `repository` can read a secret with the given visibility and allow-list
///
/// `all` grants every repository, `private` is never counted as granting a
/// roster repository, and `selected` (or an unknown visibility) is exact-name
/// membership in the allow-list.
pub fn has_access(visibility: Visibility, allow_list: &HashSet<&str>, repository: &str) -> bool {
    match visibility {
        Visibility::All => true,
        Visibility::Private => false,
        Visibility::Selected | Visibility::Unknown => allow_list.contains(repository),
    }
}

/// Names of the repositories in an allow-list
pub fn allow_list_names(repositories: &[RepositoryRef]) -> HashSet<&str> {
    repositories.iter().map(|r| r.name.as_str()).collect()
}

/// Access of each audited repository to each successfully audited secret
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessMatrix {
    entries: HashMap<String, BTreeMap<String, bool>>,
}

impl AccessMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, repository: &str, secret: &str, access: bool) {
        self.entries
            .entry(repository.to_string())
            .or_default()
            .insert(secret.to_string(), access);
    }

    /// Record one secret's access for every repository in `roster`
    pub fn record_secret<'a, I>(
        &mut self,
        secret: &str,
        visibility: Visibility,
        allow_list: &HashSet<&str>,
        roster: I,
    ) where
        I: IntoIterator<Item = &'a str>,
    {
        for repository in roster {
            self.record(repository, secret, has_access(visibility, allow_list, repository));
        }
    }

    /// Entries recorded for a repository, if any
    pub fn entries_for(&self, repository: &str) -> Option<&BTreeMap<String, bool>> {
        self.entries.get(repository).filter(|e| !e.is_empty())
    }

    /// Missing entries count as no access
    pub fn can_read(&self, repository: &str, secret: &str) -> bool {
        self.entries
            .get(repository)
            .and_then(|e| e.get(secret))
            .copied()
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
