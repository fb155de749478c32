//! Row mappers: one domain node in, one output row out.
//!
//! Commit mapping only feeds the identity registry (no network). Pull request
//! and review mapping resolve every participant login through the registry,
//! so those rows reference user-table emails rather than raw logins. Lookups
//! happen one at a time, in field order, which keeps the number of network
//! calls bounded by the number of distinct logins in the run.

use crate::csv::join_unique;
use crate::{
    Commit, CommitRow, CsvRecord, ExportTable, GitActor, IdentityRegistry, Login, Node,
    OrganizationName, PullRequest, PullRequestRow, Repository, RepositoryName, RepositoryRow,
    Review, ReviewRow,
};

/// A rendered line together with the table it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub table: ExportTable,
    pub line: String,
}

impl TableRow {
    /// Renders `record` into its table's line format.
    pub fn from_record<R: CsvRecord>(record: &R) -> Self {
        Self {
            table: R::TABLE,
            line: record.to_line(),
        }
    }
}

/// Maps any node to its row.
///
/// `repository` is the repository the node was fetched from; for a
/// [`Node::Repository`] it is ignored in favour of the node's own name.
pub async fn map_node(
    organization: &OrganizationName,
    repository: &RepositoryName,
    node: Node<'_>,
    registry: &mut IdentityRegistry,
) -> TableRow {
    match node {
        Node::Repository(repo) => TableRow::from_record(&repository_row(organization, repo)),
        Node::Commit(commit) => TableRow::from_record(&commit_row(repository, commit, registry)),
        Node::PullRequest(pr) => {
            TableRow::from_record(&pull_request_row(repository, pr, registry).await)
        }
        Node::Review(review) => {
            TableRow::from_record(&review_row(repository, review, registry).await)
        }
    }
}

pub fn repository_row(organization: &OrganizationName, repo: &Repository) -> RepositoryRow {
    RepositoryRow {
        name: repo.name.to_string(),
        full_name: format!("{organization}/{}", repo.name),
        description: repo.description.clone().unwrap_or_default(),
        language: repo.primary_language.clone().unwrap_or_default(),
        stargazers_count: repo.stargazer_count,
        forks_count: repo.fork_count,
        created_at: repo.created_at.clone(),
        updated_at: repo.updated_at.clone(),
        url: repo.url.clone(),
        is_archived: repo.is_archived,
        is_fork: repo.is_fork,
        is_private: repo.is_private,
        is_mirror: repo.is_mirror,
        is_template: repo.is_template,
        is_locked: repo.is_locked,
    }
}

/// Maps a commit and registers its author and committer.
pub fn commit_row(
    repository: &RepositoryName,
    commit: &Commit,
    registry: &mut IdentityRegistry,
) -> CommitRow {
    for actor in [&commit.author, &commit.committer].into_iter().flatten() {
        register_actor(actor, registry);
    }

    CommitRow {
        repo_name: repository.to_string(),
        sha: commit.sha.to_string(),
        author_login: actor_login(commit.author.as_ref()),
        committer_login: actor_login(commit.committer.as_ref()),
        author_email: commit
            .author
            .as_ref()
            .and_then(|a| a.email.clone())
            .unwrap_or_default(),
        message: commit.message.clone(),
        date: commit.authored_at.clone().unwrap_or_default(),
    }
}

fn register_actor(actor: &GitActor, registry: &mut IdentityRegistry) {
    let email = actor.email.as_deref().unwrap_or_default();
    registry.register_from_commit(email, actor.name.as_deref().unwrap_or_default());
    if let Some(login) = &actor.login {
        registry.link_account(email, login.as_str());
    }
}

fn actor_login(actor: Option<&GitActor>) -> String {
    actor
        .and_then(|a| a.login.as_ref())
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// Maps a pull request, resolving every participant to an address.
pub async fn pull_request_row(
    repository: &RepositoryName,
    pr: &PullRequest,
    registry: &mut IdentityRegistry,
) -> PullRequestRow {
    let author = resolve_one(pr.author.as_ref(), registry).await;
    let merged_by = resolve_one(pr.merged_by.as_ref(), registry).await;
    let assignees = resolve_list(&pr.assignees, registry).await;
    let requested_reviewers = resolve_list(&pr.requested_reviewers, registry).await;
    let comment_authors = resolve_list(&pr.comment_authors, registry).await;

    PullRequestRow {
        repo_name: repository.to_string(),
        number: pr.number,
        title: pr.title.clone(),
        state: pr.state.clone(),
        author,
        created_at: pr.created_at.clone(),
        merged_at: pr.merged_at.clone().unwrap_or_default(),
        merged_by,
        assignees,
        requested_reviewers,
        comments: pr.comment_count,
        additions: pr.additions,
        deletions: pr.deletions,
        comment_authors,
    }
}

/// Maps a review, resolving its author to an address.
pub async fn review_row(
    repository: &RepositoryName,
    review: &Review,
    registry: &mut IdentityRegistry,
) -> ReviewRow {
    ReviewRow {
        repo_name: repository.to_string(),
        pr_number: review.pull_request_number,
        reviewer: resolve_one(review.author.as_ref(), registry).await,
        state: review.state.clone(),
        submitted_at: review.submitted_at.clone().unwrap_or_default(),
    }
}

async fn resolve_one(login: Option<&Login>, registry: &mut IdentityRegistry) -> String {
    match login {
        Some(login) => registry
            .resolve_handle(login.as_str())
            .await
            .map(|email| email.into_string())
            .unwrap_or_default(),
        None => String::new(),
    }
}

async fn resolve_list(logins: &[Login], registry: &mut IdentityRegistry) -> String {
    let mut addresses = Vec::with_capacity(logins.len());
    for login in logins {
        if let Some(email) = registry.resolve_handle(login.as_str()).await {
            addresses.push(email.into_string());
        }
    }
    join_unique(addresses)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::{CommitSha, EmailAddress, FetchError, HandleResolver, RecordingEventSink};

    struct TableResolver(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl HandleResolver for TableResolver {
        async fn resolve(&self, login: &Login) -> Result<Option<EmailAddress>, FetchError> {
            self.0
                .get(login.as_str())
                .map(|email| EmailAddress::new(*email))
                .ok_or_else(|| FetchError::NotFound {
                    what: format!("user {login}"),
                })
        }
    }

    fn registry() -> IdentityRegistry {
        let resolver = TableResolver(HashMap::from([
            ("alice", "alice@x.com"),
            ("bob", "bob@x.com"),
            ("bobby", "bob@x.com"),
        ]));
        IdentityRegistry::new(Arc::new(resolver), Arc::new(RecordingEventSink::new()))
    }

    fn login(value: &str) -> Login {
        Login::new(value).unwrap()
    }

    fn repo_name() -> RepositoryName {
        RepositoryName::new("engine").unwrap()
    }

    fn pull_request() -> PullRequest {
        PullRequest {
            number: 42,
            title: "Fix \"quoted\", things".to_string(),
            state: "MERGED".to_string(),
            author: Some(login("alice")),
            created_at: "2024-03-01T10:00:00Z".to_string(),
            merged_at: Some("2024-03-02T10:00:00Z".to_string()),
            merged_by: Some(login("bob")),
            assignees: vec![login("bob"), login("bobby"), login("alice")],
            requested_reviewers: vec![],
            comment_count: 7,
            comment_authors: vec![login("ghost"), login("alice"), login("ghost")],
            additions: 10,
            deletions: 3,
            reviews: vec![],
        }
    }

    #[tokio::test]
    async fn pull_request_participants_become_addresses() {
        let mut reg = registry();
        let row = pull_request_row(&repo_name(), &pull_request(), &mut reg).await;

        assert_eq!(row.author, "alice@x.com");
        assert_eq!(row.merged_by, "bob@x.com");
        // bob and bobby share an address, so it appears once.
        assert_eq!(row.assignees, "bob@x.com;alice@x.com");
        assert_eq!(row.requested_reviewers, "");
        assert_eq!(
            row.comment_authors,
            "ghost@users.noreply.github.com;alice@x.com"
        );
        assert_eq!(row.comments, 7);
        assert!(row.to_line().starts_with("engine,42,\"Fix \"\"quoted\"\", things\",MERGED,"));
    }

    #[tokio::test]
    async fn review_without_author_has_empty_reviewer() {
        let mut reg = registry();
        let review = Review {
            pull_request_number: 42,
            author: None,
            state: "COMMENTED".to_string(),
            submitted_at: None,
        };

        let row = review_row(&repo_name(), &review, &mut reg).await;

        assert_eq!(row.to_line(), "engine,42,,COMMENTED,\n");
        assert!(reg.is_empty());
    }

    #[test]
    fn commit_registers_author_and_committer() {
        let mut reg = registry();
        let commit = Commit {
            sha: CommitSha::new("abc123").unwrap(),
            message: "Initial commit\n\nwith body".to_string(),
            authored_at: Some("2024-01-01T00:00:00Z".to_string()),
            author: Some(GitActor {
                name: Some("Alice L.".to_string()),
                email: Some("alice@corp.com".to_string()),
                login: Some(login("alice")),
            }),
            committer: Some(GitActor {
                name: Some("GitHub".to_string()),
                email: Some("noreply@github.com".to_string()),
                login: None,
            }),
        };

        let row = commit_row(&repo_name(), &commit, &mut reg);

        assert_eq!(row.author_login, "alice");
        assert_eq!(row.committer_login, "");
        assert_eq!(row.author_email, "alice@corp.com");
        assert_eq!(
            row.to_line(),
            "engine,abc123,alice,,alice@corp.com,\"Initial commit\n\nwith body\",2024-01-01T00:00:00Z\n"
        );

        let users = reg.export_users();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].email, "alice@corp.com");
        assert_eq!(users[0].account_handle, "alice");
        assert_eq!(users[1].email, "noreply@github.com");
        assert_eq!(reg.resolution_count(), 0);
    }

    #[tokio::test]
    async fn map_node_routes_to_the_right_table() {
        let mut reg = registry();
        let org = OrganizationName::new("acme").unwrap();
        let repo = Repository {
            name: repo_name(),
            description: None,
            primary_language: Some("Rust".to_string()),
            stargazer_count: 5,
            fork_count: 1,
            created_at: "2020-01-01T00:00:00Z".to_string(),
            updated_at: "2021-01-01T00:00:00Z".to_string(),
            url: "https://github.com/acme/engine".to_string(),
            is_empty: false,
            is_archived: false,
            is_fork: false,
            is_private: true,
            is_mirror: false,
            is_template: false,
            is_locked: false,
        };

        let row = map_node(&org, &repo_name(), Node::Repository(&repo), &mut reg).await;
        assert_eq!(row.table, ExportTable::Repositories);
        assert!(row.line.starts_with("engine,acme/engine,,Rust,5,1,"));

        let pr = pull_request();
        let row = map_node(&org, &repo_name(), Node::PullRequest(&pr), &mut reg).await;
        assert_eq!(row.table, ExportTable::PullRequests);
    }
}
