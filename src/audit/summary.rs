//! Classification of roster repositories by how many required secrets they can read

use crate::audit::access::AccessMatrix;

/// Access category of one roster repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessCategory {
    /// Reads every required secret
    Full,
    /// Reads some required secrets; `missing` lists the others
    Partial { missing: Vec<String> },
    /// Reads none of the required secrets
    None,
    /// No access entry was recorded for the repository
    NotFound,
}

/// Classify a single repository
pub fn classify(matrix: &AccessMatrix, repository: &str, secrets: &[String]) -> AccessCategory {
    if matrix.entries_for(repository).is_none() {
        return AccessCategory::NotFound;
    }

    let missing: Vec<String> = secrets
        .iter()
        .filter(|s| !matrix.can_read(repository, s))
        .cloned()
        .collect();

    if missing.is_empty() {
        AccessCategory::Full
    } else if missing.len() == secrets.len() {
        AccessCategory::None
    } else {
        AccessCategory::Partial { missing }
    }
}

/// Partition of the roster into access categories, in roster order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessSummary {
    pub roster_size: usize,
    pub full: Vec<String>,
    pub partial: Vec<(String, Vec<String>)>,
    pub none: Vec<String>,
    pub not_found: Vec<String>,
}

impl AccessSummary {
    pub fn classify(roster: &[String], secrets: &[String], matrix: &AccessMatrix) -> Self {
        let mut summary = Self {
            roster_size: roster.len(),
            ..Default::default()
        };

        for repository in roster {
            match classify(matrix, repository, secrets) {
                AccessCategory::Full => summary.full.push(repository.clone()),
                AccessCategory::Partial { missing } => {
                    summary.partial.push((repository.clone(), missing))
                }
                AccessCategory::None => summary.none.push(repository.clone()),
                AccessCategory::NotFound => summary.not_found.push(repository.clone()),
            }
        }

        summary
    }

    /// True only when every roster repository reads every required secret.
    /// Not-found repositories count against the result.
    pub fn all_good(&self) -> bool {
        self.partial.is_empty() && self.none.is_empty() && self.not_found.is_empty()
    }

    pub fn classified(&self) -> usize {
        self.full.len() + self.partial.len() + self.none.len() + self.not_found.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::Visibility;
    use std::collections::HashSet;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_secret_selected_allow_list() {
        let roster = names(&["r1", "r2"]);
        let secrets = names(&["A"]);
        let mut matrix = AccessMatrix::new();
        let allow: HashSet<&str> = ["r1"].into_iter().collect();
        matrix.record_secret("A", Visibility::Selected, &allow, roster.iter().map(|s| s.as_str()));

        let summary = AccessSummary::classify(&roster, &secrets, &matrix);
        assert_eq!(summary.full, names(&["r1"]));
        assert_eq!(summary.none, names(&["r2"]));
        assert!(summary.partial.is_empty());
        assert!(!summary.all_good());
    }

    #[test]
    fn test_two_secrets_selected_gives_partial() {
        let roster = names(&["r1", "r2"]);
        let secrets = names(&["A", "B"]);
        let mut matrix = AccessMatrix::new();
        let allow: HashSet<&str> = ["r1"].into_iter().collect();
        let empty: HashSet<&str> = HashSet::new();
        matrix.record_secret("A", Visibility::Selected, &allow, roster.iter().map(|s| s.as_str()));
        matrix.record_secret("B", Visibility::Selected, &empty, roster.iter().map(|s| s.as_str()));

        let summary = AccessSummary::classify(&roster, &secrets, &matrix);
        assert_eq!(summary.partial, vec![("r1".to_string(), names(&["B"]))]);
        assert_eq!(summary.none, names(&["r2"]));
    }

    #[test]
    fn test_all_visibility_everyone_full() {
        let roster = names(&["r1", "r2", "r3"]);
        let secrets = names(&["A", "B"]);
        let mut matrix = AccessMatrix::new();
        let empty: HashSet<&str> = HashSet::new();
        for secret in &secrets {
            let repositories = roster.iter().map(|s| s.as_str());
            matrix.record_secret(secret, Visibility::All, &empty, repositories);
        }

        let summary = AccessSummary::classify(&roster, &secrets, &matrix);
        assert_eq!(summary.full.len(), 3);
        assert!(summary.all_good());
    }

    #[test]
    fn test_unrecorded_repository_is_not_found_and_blocks_all_good() {
        let roster = names(&["r1", "ghost"]);
        let secrets = names(&["A"]);
        let mut matrix = AccessMatrix::new();
        matrix.record("r1", "A", true);

        let summary = AccessSummary::classify(&roster, &secrets, &matrix);
        assert_eq!(summary.full, names(&["r1"]));
        assert_eq!(summary.not_found, names(&["ghost"]));
        assert!(!summary.all_good());
    }

    #[test]
    fn test_roster_of_only_missing_repositories_is_not_all_good() {
        let roster = names(&["ghost1", "ghost2"]);
        let summary = AccessSummary::classify(&roster, &names(&["A"]), &AccessMatrix::new());
        assert_eq!(summary.not_found.len(), 2);
        assert!(!summary.all_good());
    }

    #[test]
    fn test_failed_secret_audit_counts_as_missing() {
        // only "A" was audited; "B" failed and has no entries
        let roster = names(&["r1"]);
        let secrets = names(&["A", "B"]);
        let mut matrix = AccessMatrix::new();
        matrix.record("r1", "A", true);

        assert_eq!(
            classify(&matrix, "r1", &secrets),
            AccessCategory::Partial {
                missing: names(&["B"])
            }
        );
        let summary = AccessSummary::classify(&roster, &secrets, &matrix);
        assert_eq!(summary.partial.len(), 1);
    }

    #[test]
    fn test_partition_is_total() {
        let roster = names(&["full", "part", "none", "ghost"]);
        let secrets = names(&["A", "B"]);
        let mut matrix = AccessMatrix::new();
        matrix.record("full", "A", true);
        matrix.record("full", "B", true);
        matrix.record("part", "A", false);
        matrix.record("part", "B", true);
        matrix.record("none", "A", false);
        matrix.record("none", "B", false);

        let summary = AccessSummary::classify(&roster, &secrets, &matrix);
        assert_eq!(summary.classified(), roster.len());
        assert_eq!(summary.roster_size, 4);
        assert_eq!(summary.full, names(&["full"]));
        assert_eq!(summary.partial[0].0, "part");
        assert_eq!(summary.none, names(&["none"]));
        assert_eq!(summary.not_found, names(&["ghost"]));
    }
}
