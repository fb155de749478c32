//! Shared value types for the export domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! structured values: pages of query results, and the four kinds of domain node
//! the exporter understands. Date/time fields coming from the query source are
//! kept as the source's ISO-8601 strings so they round-trip into the CSV output
//! byte-for-byte.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{CommitSha, Cursor, Login, RepositoryName};

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Continuation metadata returned alongside every page.
///
/// `end_cursor` is only meaningful when `has_next_page` is `true`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageInfo {
    /// Whether another page follows this one.
    pub has_next_page: bool,
    /// Cursor to pass to the next page request.
    pub end_cursor: Option<Cursor>,
}

impl PageInfo {
    /// Page info for the final page of a sequence.
    pub fn last() -> Self {
        Self::default()
    }

    /// Page info pointing at a following page.
    pub fn next(cursor: Cursor) -> Self {
        Self {
            has_next_page: true,
            end_cursor: Some(cursor),
        }
    }
}

/// One batch of items plus continuation metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items on this page, in source order.
    pub data: Vec<T>,
    /// Whether and where to continue.
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    /// Creates a page from its items and continuation metadata.
    pub fn new(data: Vec<T>, page_info: PageInfo) -> Self {
        Self { data, page_info }
    }
}

// ---------------------------------------------------------------------------
// Domain nodes
// ---------------------------------------------------------------------------

/// A repository owned by the exported organization.
#[derive(Debug, Clone, PartialEq)]
pub struct Repository {
    pub name: RepositoryName,
    pub description: Option<String>,
    pub primary_language: Option<String>,
    pub stargazer_count: u64,
    pub fork_count: u64,
    pub created_at: String,
    pub updated_at: String,
    pub url: String,
    /// `true` when the repository has no commits at all. Commit collection is
    /// skipped for empty repositories.
    pub is_empty: bool,
    pub is_archived: bool,
    pub is_fork: bool,
    pub is_private: bool,
    pub is_mirror: bool,
    pub is_template: bool,
    pub is_locked: bool,
}

/// Author or committer metadata recorded in a Git commit.
///
/// `name` and `email` are free text taken from the commit itself. `login` is
/// present only when the source could associate the address with an account.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GitActor {
    pub name: Option<String>,
    pub email: Option<String>,
    pub login: Option<Login>,
}

/// One commit on a repository's default branch.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub sha: CommitSha,
    pub message: String,
    /// Author date as reported by the source.
    pub authored_at: Option<String>,
    pub author: Option<GitActor>,
    pub committer: Option<GitActor>,
}

/// A review submitted on a pull request.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub pull_request_number: u64,
    pub author: Option<Login>,
    /// `APPROVED`, `CHANGES_REQUESTED`, `COMMENTED`, `DISMISSED` or `PENDING`.
    pub state: String,
    pub submitted_at: Option<String>,
}

/// A pull request, with the participant lists and reviews nested under it.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    /// `OPEN`, `CLOSED` or `MERGED`.
    pub state: String,
    pub author: Option<Login>,
    pub created_at: String,
    pub merged_at: Option<String>,
    pub merged_by: Option<Login>,
    pub assignees: Vec<Login>,
    /// Requested reviewers that are users. Team review requests carry no login
    /// and are dropped by the fetcher.
    pub requested_reviewers: Vec<Login>,
    /// Total comment count reported by the source, which may exceed the number
    /// of comment authors fetched.
    pub comment_count: u64,
    pub comment_authors: Vec<Login>,
    pub additions: u64,
    pub deletions: u64,
    pub reviews: Vec<Review>,
}

/// A borrowed view over the closed set of node kinds handed to row mappers.
///
/// Reviews are nested inside their pull request, so mappers work on borrowed
/// nodes rather than taking ownership of the fetched lists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    Repository(&'a Repository),
    Commit(&'a Commit),
    PullRequest(&'a PullRequest),
    Review(&'a Review),
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Milliseconds elapsed from `earlier` to `self` (zero if negative).
    pub fn millis_since(self, earlier: Timestamp) -> u64 {
        (self.0 - earlier.0).num_milliseconds().max(0) as u64
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
