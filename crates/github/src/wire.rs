//! Response shapes returned by the GitHub API.
//!
//! GitHub marks almost every field nullable: deleted accounts come back as a
//! `null` author, team review requests have no `login`, and connection node
//! lists may contain `null` entries. The wire types mirror that looseness and
//! the `into_*` conversions decide what survives into the domain.

use collector::{
    Commit, CommitSha, Cursor, EmailAddress, FetchError, GitActor, Login, Page, PageInfo,
    PullRequest, Repository, RepositoryName, Review,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// GraphQL envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope<D> {
    data: Option<D>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Decodes a GraphQL response body into `D`.
///
/// Any entry in `errors` fails the whole response, even when partial `data`
/// came back with it. A `NOT_FOUND` error maps to [`FetchError::NotFound`].
pub fn decode_graphql<D: DeserializeOwned>(body: &str) -> Result<D, FetchError> {
    let envelope: Envelope<D> = serde_json::from_str(body).map_err(|e| FetchError::Decode {
        message: e.to_string(),
    })?;

    if let Some(missing) = envelope
        .errors
        .iter()
        .find(|e| e.kind.as_deref() == Some("NOT_FOUND"))
    {
        return Err(FetchError::NotFound {
            what: missing.message.clone(),
        });
    }
    if !envelope.errors.is_empty() {
        return Err(FetchError::Query {
            messages: envelope.errors.into_iter().map(|e| e.message).collect(),
        });
    }

    envelope.data.ok_or_else(|| FetchError::Decode {
        message: "response carried neither data nor errors".to_string(),
    })
}

// ---------------------------------------------------------------------------
// Connections
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

impl From<WirePageInfo> for PageInfo {
    fn from(info: WirePageInfo) -> Self {
        PageInfo {
            has_next_page: info.has_next_page,
            end_cursor: info.end_cursor.and_then(Cursor::new),
        }
    }
}

/// A top-level connection that is walked page by page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedConnection<T> {
    pub page_info: WirePageInfo,
    #[serde(default = "Vec::new")]
    pub nodes: Vec<Option<T>>,
}

impl<T> PagedConnection<T> {
    /// Converts every present node with `convert`, dropping nulls and nodes
    /// the conversion rejects.
    pub fn into_page<U>(self, convert: impl FnMut(T) -> Option<U>) -> Page<U> {
        let data = self.nodes.into_iter().flatten().filter_map(convert).collect();
        Page::new(data, self.page_info.into())
    }
}

/// A nested connection fetched in a single slice.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slice<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<Option<T>>,
    pub total_count: Option<u64>,
}

impl<T> Default for Slice<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            total_count: None,
        }
    }
}

impl<T> Slice<T> {
    fn present(self) -> impl Iterator<Item = T> {
        self.nodes.into_iter().flatten()
    }
}

/// Anything with an optional `login`: users, bots, mannequins.
#[derive(Debug, Deserialize)]
pub struct Actor {
    pub login: Option<String>,
}

fn login_of(actor: Option<Actor>) -> Option<Login> {
    actor.and_then(|a| a.login).and_then(Login::new)
}

fn logins(slice: Option<Slice<Actor>>) -> Vec<Login> {
    slice
        .unwrap_or_default()
        .present()
        .filter_map(|a| login_of(Some(a)))
        .collect()
}

// ---------------------------------------------------------------------------
// Repositories
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RepositoriesData {
    pub organization: Option<OrganizationRepositories>,
}

#[derive(Debug, Deserialize)]
pub struct OrganizationRepositories {
    pub repositories: PagedConnection<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
pub struct Named {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode {
    pub name: String,
    pub description: Option<String>,
    pub primary_language: Option<Named>,
    pub stargazer_count: u64,
    pub fork_count: u64,
    pub created_at: String,
    pub updated_at: String,
    pub url: String,
    pub is_empty: bool,
    pub is_archived: bool,
    pub is_fork: bool,
    pub is_private: bool,
    pub is_mirror: bool,
    pub is_template: bool,
    pub is_locked: bool,
}

impl RepositoryNode {
    pub fn into_domain(self) -> Option<Repository> {
        Some(Repository {
            name: RepositoryName::new(self.name)?,
            description: self.description,
            primary_language: self.primary_language.map(|l| l.name),
            stargazer_count: self.stargazer_count,
            fork_count: self.fork_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
            url: self.url,
            is_empty: self.is_empty,
            is_archived: self.is_archived,
            is_fork: self.is_fork,
            is_private: self.is_private,
            is_mirror: self.is_mirror,
            is_template: self.is_template,
            is_locked: self.is_locked,
        })
    }
}

// ---------------------------------------------------------------------------
// Commits
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct HistoryData {
    pub repository: Option<HistoryRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRepository {
    pub default_branch_ref: Option<BranchRef>,
}

#[derive(Debug, Deserialize)]
pub struct BranchRef {
    pub target: Option<HistoryTarget>,
}

/// The branch target. `history` is absent when the target is not a commit.
#[derive(Debug, Deserialize)]
pub struct HistoryTarget {
    pub history: Option<PagedConnection<CommitNode>>,
}

impl HistoryRepository {
    /// The history connection of the default branch, if the repository has
    /// one that points at a commit.
    pub fn into_history(self) -> Option<PagedConnection<CommitNode>> {
        self.default_branch_ref?.target?.history
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitNode {
    pub oid: String,
    pub message: String,
    pub authored_date: Option<String>,
    pub author: Option<GitActorNode>,
    pub committer: Option<GitActorNode>,
}

#[derive(Debug, Deserialize)]
pub struct GitActorNode {
    pub name: Option<String>,
    pub email: Option<String>,
    pub user: Option<Actor>,
}

impl From<GitActorNode> for GitActor {
    fn from(node: GitActorNode) -> Self {
        GitActor {
            name: node.name,
            email: node.email,
            login: login_of(node.user),
        }
    }
}

impl CommitNode {
    pub fn into_domain(self) -> Option<Commit> {
        Some(Commit {
            sha: CommitSha::new(self.oid)?,
            message: self.message,
            authored_at: self.authored_date,
            author: self.author.map(GitActor::from),
            committer: self.committer.map(GitActor::from),
        })
    }
}

// ---------------------------------------------------------------------------
// Pull requests
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PullRequestsData {
    pub repository: Option<PullRequestsRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestsRepository {
    pub pull_requests: PagedConnection<PullRequestNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestNode {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub author: Option<Actor>,
    pub created_at: String,
    pub merged_at: Option<String>,
    pub merged_by: Option<Actor>,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    pub assignees: Option<Slice<Actor>>,
    pub review_requests: Option<Slice<ReviewRequestNode>>,
    pub reviews: Option<Slice<ReviewNode>>,
    pub comments: Option<Slice<CommentNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequestNode {
    /// A user, or a team (which carries no `login` in the query).
    pub requested_reviewer: Option<Actor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewNode {
    pub author: Option<Actor>,
    pub state: String,
    pub submitted_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentNode {
    pub author: Option<Actor>,
}

impl PullRequestNode {
    pub fn into_domain(self) -> Option<PullRequest> {
        let number = self.number;

        let requested_reviewers = self
            .review_requests
            .unwrap_or_default()
            .present()
            .filter_map(|r| login_of(r.requested_reviewer))
            .collect();

        let reviews = self
            .reviews
            .unwrap_or_default()
            .present()
            .map(|r| Review {
                pull_request_number: number,
                author: login_of(r.author),
                state: r.state,
                submitted_at: r.submitted_at,
            })
            .collect();

        let comments = self.comments.unwrap_or_default();
        let comment_count = comments.total_count.unwrap_or(0);
        let comment_authors = comments.present().filter_map(|c| login_of(c.author)).collect();

        Some(PullRequest {
            number,
            title: self.title,
            state: self.state,
            author: login_of(self.author),
            created_at: self.created_at,
            merged_at: self.merged_at,
            merged_by: login_of(self.merged_by),
            assignees: logins(self.assignees),
            requested_reviewers,
            comment_count,
            comment_authors,
            additions: self.additions,
            deletions: self.deletions,
            reviews,
        })
    }
}

// ---------------------------------------------------------------------------
// REST: users
// ---------------------------------------------------------------------------

/// The subset of `GET /users/{login}` the resolver reads.
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub login: String,
    pub email: Option<String>,
}

impl UserResponse {
    /// The account's public address, if it publishes a non-empty one.
    pub fn public_email(self) -> Option<EmailAddress> {
        self.email.and_then(EmailAddress::new)
    }
}
