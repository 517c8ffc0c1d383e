//! GitHub REST client bound to a single organization
//!
//! Every call goes through [`GitHubClient::send`], which attaches the bearer
//! token and turns any transport or HTTP failure into an [`ApiError`].

use crate::core::config::{ApiConfig, AuditConfig};
use crate::core::error::ApiError;
use crate::core::traits::SecretsApi;
use crate::github::types::{
    AuthenticatedUser, GitHubErrorBody, OrgSecret, OrgSecretList, RepositoryRef,
    SecretRepositoryList, SelectedRepositoryIds,
};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

/// Largest page size the REST API accepts
pub const MAX_PAGE_SIZE: usize = 100;

const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";

/// Authenticated client for one organization
pub struct GitHubClient {
    http: Client,
    base_url: String,
    organization: String,
    token: SecretString,
    page_size: usize,
    repo_ids: HashMap<String, u64>,
}

impl GitHubClient {
    /// Create a client for the configured organization and API endpoint
    pub fn new(config: &AuditConfig, token: SecretString) -> Result<Self, ApiError> {
        Ok(Self {
            http: Self::create_client(&config.api)?,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            organization: config.organization.clone(),
            token,
            page_size: MAX_PAGE_SIZE,
            repo_ids: HashMap::new(),
        })
    }

    /// Override the page size used for list endpoints
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    fn create_client(api: &ApiConfig) -> Result<Client, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        let version = HeaderValue::from_str(&api.api_version).map_err(|e| ApiError::Transport {
            message: format!("invalid API version header: {}", e),
        })?;
        headers.insert(API_VERSION_HEADER, version);

        Client::builder()
            .default_headers(headers)
            .user_agent(concat!("secret-access-auditor/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(api.timeout_secs))
            .connect_timeout(Duration::from_secs(api.timeout_secs.min(10)))
            .build()
            .map_err(ApiError::from)
    }

    /// Number of repository ids resolved so far
    pub fn cached_repo_ids(&self) -> usize {
        self.repo_ids.len()
    }

    /// Endpoint URL with every segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ApiError::Transport {
            message: format!("invalid API base URL '{}': {}", self.base_url, e),
        })?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport {
                message: format!("API base URL '{}' cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .http
            .request(method, self.endpoint(segments)?)
            .bearer_auth(self.token.expose_secret()))
    }

    async fn send(&self, builder: RequestBuilder, resource: &str) -> Result<Response, ApiError> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().path().to_string();

        let response = self.http.execute(request).await?;
        let status = response.status();
        tracing::debug!(%method, path = %url, status = status.as_u16(), "github request");

        if status.is_success() {
            Ok(response)
        } else {
            Err(Self::error_from(status, response, resource).await)
        }
    }

    async fn error_from(status: StatusCode, response: Response, resource: &str) -> ApiError {
        let message = response
            .json::<GitHubErrorBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            });

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Auth { message },
            StatusCode::FORBIDDEN => ApiError::Permission { message },
            StatusCode::NOT_FOUND => ApiError::NotFound {
                resource: resource.to_string(),
            },
            _ => ApiError::Status {
                status: status.as_u16(),
                message,
            },
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
        resource: &str,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::GET, segments)?.query(query);
        let response = self.send(request, resource).await?;
        response.json::<T>().await.map_err(|e| ApiError::Decode {
            message: e.to_string(),
        })
    }

    /// Follow `page` until `total_count` items are collected or a short page arrives
    async fn get_paginated<L, T, F>(
        &self,
        segments: &[&str],
        resource: &str,
        extract: F,
    ) -> Result<Vec<T>, ApiError>
    where
        L: DeserializeOwned,
        F: Fn(L) -> (u64, Vec<T>),
    {
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let query = [
                ("per_page", self.page_size.to_string()),
                ("page", page.to_string()),
            ];
            let list: L = self.get_json(segments, &query, resource).await?;
            let (total, batch) = extract(list);
            let fetched = batch.len();
            items.extend(batch);

            if fetched == 0 || fetched < self.page_size || items.len() as u64 >= total {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    fn org_resource(&self) -> String {
        format!("organization '{}'", self.organization)
    }
}

#[async_trait]
impl SecretsApi for GitHubClient {
    async fn check_identity(&self) -> Result<String, ApiError> {
        let user: AuthenticatedUser = self.get_json(&["user"], &[], "authenticated user").await?;
        Ok(user.login)
    }

    async fn check_org_access(&self) -> Result<(), ApiError> {
        let request = self.request(Method::GET, &["orgs", self.organization.as_str()])?;
        match self.send(request, &self.org_resource()).await {
            Ok(_) => Ok(()),
            Err(err @ ApiError::NotFound { .. }) => Err(err),
            Err(ApiError::Auth { message })
            | Err(ApiError::Permission { message })
            | Err(ApiError::Status { message, .. }) => Err(ApiError::Permission {
                message: format!("cannot access organization '{}': {}", self.organization, message),
            }),
            Err(other) => Err(other),
        }
    }

    async fn list_org_secrets(&self) -> Result<Vec<OrgSecret>, ApiError> {
        let segments = ["orgs", self.organization.as_str(), "actions", "secrets"];
        self.get_paginated(&segments, &self.org_resource(), |list: OrgSecretList| {
            (list.total_count, list.secrets)
        })
        .await
        .map_err(|err| match err {
            ApiError::Permission { message } => ApiError::Permission {
                message: format!("{} (token needs 'admin:org' scope)", message),
            },
            other => other,
        })
    }

    async fn get_secret_detail(&self, name: &str) -> Result<OrgSecret, ApiError> {
        let segments = ["orgs", self.organization.as_str(), "actions", "secrets", name];
        self.get_json(&segments, &[], &format!("secret '{}'", name)).await
    }

    async fn list_secret_repos(&self, name: &str) -> Result<Vec<RepositoryRef>, ApiError> {
        let segments = [
            "orgs",
            self.organization.as_str(),
            "actions",
            "secrets",
            name,
            "repositories",
        ];
        let resource = format!("secret '{}'", name);
        self.get_paginated(&segments, &resource, |list: SecretRepositoryList| {
            (list.total_count, list.repositories)
        })
        .await
    }

    async fn set_secret_repos(&self, name: &str, repository_ids: &[u64]) -> Result<(), ApiError> {
        let segments = [
            "orgs",
            self.organization.as_str(),
            "actions",
            "secrets",
            name,
            "repositories",
        ];
        let body = SelectedRepositoryIds {
            selected_repository_ids: repository_ids,
        };
        let request = self.request(Method::PUT, &segments)?.json(&body);
        self.send(request, &format!("secret '{}'", name)).await?;
        Ok(())
    }

    async fn resolve_repo_id(&mut self, name: &str) -> Result<u64, ApiError> {
        if let Some(id) = self.repo_ids.get(name) {
            return Ok(*id);
        }

        let resource = format!("repository '{}/{}'", self.organization, name);
        let repo: RepositoryRef = self
            .get_json(&["repos", self.organization.as_str(), name], &[], &resource)
            .await?;

        self.repo_ids.insert(name.to_string(), repo.id);
        Ok(repo.id)
    }
}
