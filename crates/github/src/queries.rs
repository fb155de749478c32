//! GraphQL documents sent to the GitHub API.
//!
//! Every connection query takes an optional `$cursor` and selects
//! `pageInfo { hasNextPage endCursor }` so it can be driven by
//! [`collector::walk`].

/// Repositories of an organization, 100 per page.
pub const ORGANIZATION_REPOSITORIES: &str = r#"
query OrganizationRepositories($org: String!, $cursor: String) {
  organization(login: $org) {
    repositories(first: 100, after: $cursor) {
      pageInfo { hasNextPage endCursor }
      nodes {
        name
        description
        primaryLanguage { name }
        stargazerCount
        forkCount
        createdAt
        updatedAt
        url
        isEmpty
        isArchived
        isFork
        isPrivate
        isMirror
        isTemplate
        isLocked
      }
    }
  }
}
"#;

/// History of a repository's default branch, 100 commits per page.
pub const DEFAULT_BRANCH_HISTORY: &str = r#"
query DefaultBranchHistory($owner: String!, $name: String!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    defaultBranchRef {
      target {
        ... on Commit {
          history(first: 100, after: $cursor) {
            pageInfo { hasNextPage endCursor }
            nodes {
              oid
              message
              authoredDate
              author { name email user { login } }
              committer { name email user { login } }
            }
          }
        }
      }
    }
  }
}
"#;

/// Pull requests in every state with their participants and reviews.
///
/// Nested connections are not paginated: assignees and review requests are
/// capped at 5, reviews and comments at 50.
pub const PULL_REQUESTS: &str = r#"
query PullRequests($owner: String!, $name: String!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    pullRequests(first: 100, after: $cursor, states: [OPEN, CLOSED, MERGED]) {
      pageInfo { hasNextPage endCursor }
      nodes {
        number
        title
        state
        author { login }
        createdAt
        mergedAt
        mergedBy { login }
        additions
        deletions
        assignees(first: 5) { nodes { login } }
        reviewRequests(first: 5) {
          nodes { requestedReviewer { ... on User { login } } }
        }
        reviews(first: 50) {
          nodes { author { login } state submittedAt }
        }
        comments(first: 50) {
          totalCount
          nodes { author { login } }
        }
      }
    }
  }
}
"#;
