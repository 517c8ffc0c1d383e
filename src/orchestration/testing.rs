//! In-memory `SecretsApi` used by the orchestration tests

use crate::core::error::{ApiError, AuditError};
use crate::core::traits::{Confirmer, SecretsApi};
use crate::github::types::{OrgSecret, RepositoryRef, Visibility};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

pub(crate) struct FakeSecretsApi {
    organization: String,
    login: Result<String, ApiError>,
    org_access: Result<(), ApiError>,
    listing_error: Option<ApiError>,
    secrets: Vec<OrgSecret>,
    detail_errors: HashSet<String>,
    list_errors: HashMap<String, ApiError>,
    resolve_errors: HashMap<String, ApiError>,
    repos: BTreeMap<String, u64>,
    allow_lists: Mutex<HashMap<String, Vec<RepositoryRef>>>,
    set_calls: Mutex<Vec<(String, Vec<u64>)>>,
    list_repo_calls: Mutex<usize>,
    resolve_calls: usize,
}

impl FakeSecretsApi {
    pub fn new(organization: &str) -> Self {
        Self {
            organization: organization.to_string(),
            login: Ok("octocat".to_string()),
            org_access: Ok(()),
            listing_error: None,
            secrets: Vec::new(),
            detail_errors: HashSet::new(),
            list_errors: HashMap::new(),
            resolve_errors: HashMap::new(),
            repos: BTreeMap::new(),
            allow_lists: Mutex::new(HashMap::new()),
            set_calls: Mutex::new(Vec::new()),
            list_repo_calls: Mutex::new(0),
            resolve_calls: 0,
        }
    }

    /// Repositories that exist on the platform
    pub fn with_repos(mut self, repos: &[(&str, u64)]) -> Self {
        for (name, id) in repos {
            self.repos.insert(name.to_string(), *id);
        }
        self
    }

    /// Organization secret with an explicit allow-list
    pub fn with_secret(mut self, name: &str, visibility: Visibility, allow: &[&str]) -> Self {
        self.secrets.push(OrgSecret {
            name: name.to_string(),
            created_at: None,
            updated_at: None,
            visibility,
        });
        let refs = allow
            .iter()
            .map(|repo| RepositoryRef {
                id: self.repos.get(*repo).copied().unwrap_or(0),
                name: repo.to_string(),
                full_name: None,
            })
            .collect();
        self.allow_lists
            .lock()
            .unwrap()
            .insert(name.to_string(), refs);
        self
    }

    pub fn with_login_error(mut self, err: ApiError) -> Self {
        self.login = Err(err);
        self
    }

    pub fn with_org_error(mut self, err: ApiError) -> Self {
        self.org_access = Err(err);
        self
    }

    pub fn with_listing_error(mut self, err: ApiError) -> Self {
        self.listing_error = Some(err);
        self
    }

    pub fn with_detail_error(mut self, secret: &str) -> Self {
        self.detail_errors.insert(secret.to_string());
        self
    }

    pub fn with_list_error(mut self, secret: &str, err: ApiError) -> Self {
        self.list_errors.insert(secret.to_string(), err);
        self
    }

    pub fn with_resolve_error(mut self, repository: &str, err: ApiError) -> Self {
        self.resolve_errors.insert(repository.to_string(), err);
        self
    }

    pub fn set_calls(&self) -> Vec<(String, Vec<u64>)> {
        self.set_calls.lock().unwrap().clone()
    }

    pub fn list_repo_calls(&self) -> usize {
        *self.list_repo_calls.lock().unwrap()
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls
    }

    pub fn allow_list_names(&self, secret: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .allow_lists
            .lock()
            .unwrap()
            .get(secret)
            .map(|list| list.iter().map(|r| r.name.clone()).collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    fn visibility_of(&self, secret: &str) -> Option<Visibility> {
        self.secrets
            .iter()
            .find(|s| s.name == secret)
            .map(|s| s.visibility)
    }

    fn not_selected(secret: &str) -> ApiError {
        ApiError::Status {
            status: 409,
            message: format!("The visibility of secret {} is not set to selected.", secret),
        }
    }
}

#[async_trait]
impl SecretsApi for FakeSecretsApi {
    async fn check_identity(&self) -> Result<String, ApiError> {
        self.login.clone()
    }

    async fn check_org_access(&self) -> Result<(), ApiError> {
        self.org_access.clone()
    }

    async fn list_org_secrets(&self) -> Result<Vec<OrgSecret>, ApiError> {
        match &self.listing_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.secrets.clone()),
        }
    }

    async fn get_secret_detail(&self, name: &str) -> Result<OrgSecret, ApiError> {
        if self.detail_errors.contains(name) {
            return Err(ApiError::Status {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }
        self.secrets
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("secret '{}'", name),
            })
    }

    async fn list_secret_repos(&self, name: &str) -> Result<Vec<RepositoryRef>, ApiError> {
        *self.list_repo_calls.lock().unwrap() += 1;
        if let Some(err) = self.list_errors.get(name) {
            return Err(err.clone());
        }
        match self.visibility_of(name) {
            None => Err(ApiError::NotFound {
                resource: format!("secret '{}'", name),
            }),
            Some(Visibility::Selected) => Ok(self
                .allow_lists
                .lock()
                .unwrap()
                .get(name)
                .cloned()
                .unwrap_or_default()),
            Some(_) => Err(Self::not_selected(name)),
        }
    }

    async fn set_secret_repos(&self, name: &str, repository_ids: &[u64]) -> Result<(), ApiError> {
        self.set_calls
            .lock()
            .unwrap()
            .push((name.to_string(), repository_ids.to_vec()));

        match self.visibility_of(name) {
            Some(Visibility::Selected) => {
                let refs = repository_ids
                    .iter()
                    .filter_map(|id| {
                        self.repos
                            .iter()
                            .find(|(_, repo_id)| *repo_id == id)
                            .map(|(repo, _)| RepositoryRef {
                                id: *id,
                                name: repo.clone(),
                                full_name: None,
                            })
                    })
                    .collect();
                self.allow_lists
                    .lock()
                    .unwrap()
                    .insert(name.to_string(), refs);
                Ok(())
            }
            Some(_) => Err(Self::not_selected(name)),
            None => Err(ApiError::NotFound {
                resource: format!("secret '{}'", name),
            }),
        }
    }

    async fn resolve_repo_id(&mut self, name: &str) -> Result<u64, ApiError> {
        self.resolve_calls += 1;
        if let Some(err) = self.resolve_errors.get(name) {
            return Err(err.clone());
        }
        self.repos
            .get(name)
            .copied()
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("repository '{}/{}'", self.organization, name),
            })
    }
}

/// Confirmer with a fixed answer that records how often it was asked
pub(crate) struct ScriptedConfirmer {
    pub answer: bool,
    pub asked: usize,
}

impl ScriptedConfirmer {
    pub fn new(answer: bool) -> Self {
        Self { answer, asked: 0 }
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&mut self, _message: &str) -> Result<bool, AuditError> {
        self.asked += 1;
        Ok(self.answer)
    }
}
