//! Port implementations for [`GithubClient`].

use async_trait::async_trait;
use collector::{
    walk, Commit, Cursor, EmailAddress, FetchError, HandleResolver, Login, OrganizationName,
    OrganizationSource, Page, PageInfo, PageWalk, PullRequest, Repository, RepositoryName,
};
use serde_json::json;
use tracing::{debug, instrument};

use crate::queries;
use crate::wire::{
    CommitNode, HistoryData, PullRequestNode, PullRequestsData, RepositoriesData, RepositoryNode,
};
use crate::GithubClient;

// ---------------------------------------------------------------------------
// Single pages
// ---------------------------------------------------------------------------

impl GithubClient {
    async fn repositories_page(
        &self,
        organization: &OrganizationName,
        cursor: Option<Cursor>,
    ) -> Result<Page<Repository>, FetchError> {
        let variables = json!({ "org": organization.as_str(), "cursor": cursor });
        let data: RepositoriesData = self
            .graphql(queries::ORGANIZATION_REPOSITORIES, &variables)
            .await?;
        let organization = data.organization.ok_or_else(|| FetchError::NotFound {
            what: format!("organization {organization}"),
        })?;
        Ok(organization
            .repositories
            .into_page(RepositoryNode::into_domain))
    }

    async fn commits_page(
        &self,
        organization: &OrganizationName,
        repository: &RepositoryName,
        cursor: Option<Cursor>,
    ) -> Result<Page<Commit>, FetchError> {
        let variables = json!({
            "owner": organization.as_str(),
            "name": repository.as_str(),
            "cursor": cursor,
        });
        let data: HistoryData = self
            .graphql(queries::DEFAULT_BRANCH_HISTORY, &variables)
            .await?;
        let repo = data.repository.ok_or_else(|| not_found(organization, repository))?;

        match repo.into_history() {
            Some(history) => Ok(history.into_page(CommitNode::into_domain)),
            None => {
                debug!("Repository has no default branch history");
                Ok(Page::new(Vec::new(), PageInfo::last()))
            }
        }
    }

    async fn pull_requests_page(
        &self,
        organization: &OrganizationName,
        repository: &RepositoryName,
        cursor: Option<Cursor>,
    ) -> Result<Page<PullRequest>, FetchError> {
        let variables = json!({
            "owner": organization.as_str(),
            "name": repository.as_str(),
            "cursor": cursor,
        });
        let data: PullRequestsData = self.graphql(queries::PULL_REQUESTS, &variables).await?;
        let repo = data.repository.ok_or_else(|| not_found(organization, repository))?;
        Ok(repo.pull_requests.into_page(PullRequestNode::into_domain))
    }
}

fn not_found(organization: &OrganizationName, repository: &RepositoryName) -> FetchError {
    FetchError::NotFound {
        what: format!("repository {organization}/{repository}"),
    }
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

#[async_trait]
impl OrganizationSource for GithubClient {
    #[instrument(skip_all, fields(organization = %organization))]
    async fn repositories(&self, organization: &OrganizationName) -> PageWalk<Repository> {
        walk(move |cursor| self.repositories_page(organization, cursor)).await
    }

    #[instrument(skip_all, fields(repository = %repository))]
    async fn commits(
        &self,
        organization: &OrganizationName,
        repository: &RepositoryName,
    ) -> PageWalk<Commit> {
        walk(move |cursor| self.commits_page(organization, repository, cursor)).await
    }

    #[instrument(skip_all, fields(repository = %repository))]
    async fn pull_requests(
        &self,
        organization: &OrganizationName,
        repository: &RepositoryName,
    ) -> PageWalk<PullRequest> {
        walk(move |cursor| self.pull_requests_page(organization, repository, cursor)).await
    }
}

#[async_trait]
impl HandleResolver for GithubClient {
    async fn resolve(&self, login: &Login) -> Result<Option<EmailAddress>, FetchError> {
        self.public_email(login).await
    }
}
