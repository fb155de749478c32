//! Authenticated HTTP transport for the GitHub API.

use std::time::Duration;

use collector::{EmailAddress, FetchError, Login};
use reqwest::{header, Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};

use crate::wire::{self, UserResponse};

/// Public GitHub REST root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Per-request timeout unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("org-export/", env!("CARGO_PKG_VERSION"));

/// Longest response body quoted in a [`FetchError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Connection settings for [`GithubClient`].
#[derive(Clone)]
pub struct GithubConfig {
    /// REST root, e.g. `https://api.github.com` or
    /// `https://ghe.example.com/api/v3`.
    pub api_url: String,
    /// Personal access token sent as a bearer credential.
    pub token: String,
    pub timeout: Duration,
}

impl GithubConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// GitHub client implementing [`collector::OrganizationSource`] and
/// [`collector::HandleResolver`].
pub struct GithubClient {
    http: Client,
    rest_url: String,
    graphql_url: String,
    token: String,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("rest_url", &self.rest_url)
            .field("graphql_url", &self.graphql_url)
            .finish_non_exhaustive()
    }
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(transport)?;

        let rest_url = config.api_url.trim_end_matches('/').to_string();
        Ok(Self {
            http,
            graphql_url: graphql_endpoint(&rest_url),
            rest_url,
            token: config.token,
        })
    }

    /// Executes one GraphQL query and decodes its `data` into `D`.
    pub async fn graphql<V, D>(&self, query: &str, variables: &V) -> Result<D, FetchError>
    where
        V: Serialize + ?Sized,
        D: DeserializeOwned,
    {
        let response = self
            .http
            .post(&self.graphql_url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        wire::decode_graphql(&body)
    }

    /// Reads the public address of `login` from `GET /users/{login}`.
    #[instrument(skip_all, fields(login = %login))]
    pub async fn public_email(&self, login: &Login) -> Result<Option<EmailAddress>, FetchError> {
        let url = format!("{}/users/{}", self.rest_url, login);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                what: format!("user {login}"),
            });
        }
        let body = response.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let user: UserResponse = serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            message: e.to_string(),
        })?;
        debug!(published = user.email.is_some(), "Fetched user profile");
        Ok(user.public_email())
    }
}

/// GraphQL endpoint that belongs to a REST root.
///
/// `https://api.github.com` serves GraphQL at `/graphql`; Enterprise Server
/// serves REST at `/api/v3` and GraphQL at `/api/graphql`.
fn graphql_endpoint(rest_url: &str) -> String {
    match rest_url.strip_suffix("/api/v3") {
        Some(host) => format!("{host}/api/graphql"),
        None => format!("{rest_url}/graphql"),
    }
}

fn transport(error: reqwest::Error) -> FetchError {
    FetchError::Transport {
        message: error.to_string(),
    }
}

fn status_error(status: StatusCode, body: &str) -> FetchError {
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("").to_string()
    } else {
        body.chars().take(MAX_ERROR_BODY).collect()
    };
    FetchError::Status {
        status: status.as_u16(),
        message,
    }
}
