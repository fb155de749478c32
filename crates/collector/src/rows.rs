//! Output tables and their row types.
//!
//! Column order is part of the output contract and never changes between
//! runs. Each row type knows its own columns and renders itself to a CSV line.

use crate::csv::{csv_line, header_line};

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// The five CSV files produced by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExportTable {
    Repositories,
    Commits,
    PullRequests,
    Reviews,
    Users,
}

impl ExportTable {
    /// Every table, in the order their files are created.
    pub const ALL: [ExportTable; 5] = [
        ExportTable::Repositories,
        ExportTable::Commits,
        ExportTable::PullRequests,
        ExportTable::Reviews,
        ExportTable::Users,
    ];

    /// File name of the table inside the output directory.
    pub fn file_name(self) -> &'static str {
        match self {
            ExportTable::Repositories => "repos.csv",
            ExportTable::Commits => "commits.csv",
            ExportTable::PullRequests => "pull_requests.csv",
            ExportTable::Reviews => "reviews.csv",
            ExportTable::Users => "users.csv",
        }
    }

    /// Column names, in output order.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            ExportTable::Repositories => RepositoryRow::COLUMNS,
            ExportTable::Commits => CommitRow::COLUMNS,
            ExportTable::PullRequests => PullRequestRow::COLUMNS,
            ExportTable::Reviews => ReviewRow::COLUMNS,
            ExportTable::Users => UserRow::COLUMNS,
        }
    }

    /// The header line written once at the top of the file.
    pub fn header(self) -> String {
        header_line(self.columns())
    }
}

impl std::fmt::Display for ExportTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// A row belonging to one [`ExportTable`].
pub trait CsvRecord {
    /// Table the row is written to.
    const TABLE: ExportTable;

    /// Column names, matching the order of [`CsvRecord::values`].
    const COLUMNS: &'static [&'static str];

    /// Field values as strings. Absent values are empty strings.
    fn values(&self) -> Vec<String>;

    /// The rendered, quoted, newline-terminated CSV line.
    fn to_line(&self) -> String {
        csv_line(self.values())
    }
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRow {
    pub name: String,
    /// `"{organization}/{name}"`.
    pub full_name: String,
    pub description: String,
    pub language: String,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub created_at: String,
    pub updated_at: String,
    pub url: String,
    pub is_archived: bool,
    pub is_fork: bool,
    pub is_private: bool,
    pub is_mirror: bool,
    pub is_template: bool,
    pub is_locked: bool,
}

impl CsvRecord for RepositoryRow {
    const TABLE: ExportTable = ExportTable::Repositories;
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "full_name",
        "description",
        "language",
        "stargazers_count",
        "forks_count",
        "created_at",
        "updated_at",
        "url",
        "is_archived",
        "is_fork",
        "is_private",
        "is_mirror",
        "is_template",
        "is_locked",
    ];

    fn values(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.full_name.clone(),
            self.description.clone(),
            self.language.clone(),
            self.stargazers_count.to_string(),
            self.forks_count.to_string(),
            self.created_at.clone(),
            self.updated_at.clone(),
            self.url.clone(),
            self.is_archived.to_string(),
            self.is_fork.to_string(),
            self.is_private.to_string(),
            self.is_mirror.to_string(),
            self.is_template.to_string(),
            self.is_locked.to_string(),
        ]
    }
}

/// One commit. Logins are raw account handles; `author_email` joins to the
/// user table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRow {
    pub repo_name: String,
    pub sha: String,
    pub author_login: String,
    pub committer_login: String,
    pub author_email: String,
    pub message: String,
    pub date: String,
}

impl CsvRecord for CommitRow {
    const TABLE: ExportTable = ExportTable::Commits;
    const COLUMNS: &'static [&'static str] = &[
        "repo_name",
        "sha",
        "author_login",
        "committer_login",
        "author_email",
        "message",
        "date",
    ];

    fn values(&self) -> Vec<String> {
        vec![
            self.repo_name.clone(),
            self.sha.clone(),
            self.author_login.clone(),
            self.committer_login.clone(),
            self.author_email.clone(),
            self.message.clone(),
            self.date.clone(),
        ]
    }
}

/// One pull request. Every participant field holds resolved addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRow {
    pub repo_name: String,
    pub number: u64,
    pub title: String,
    pub state: String,
    pub author: String,
    pub created_at: String,
    pub merged_at: String,
    pub merged_by: String,
    pub assignees: String,
    pub requested_reviewers: String,
    pub comments: u64,
    pub additions: u64,
    pub deletions: u64,
    pub comment_authors: String,
}

impl CsvRecord for PullRequestRow {
    const TABLE: ExportTable = ExportTable::PullRequests;
    const COLUMNS: &'static [&'static str] = &[
        "repo_name",
        "number",
        "title",
        "state",
        "author",
        "created_at",
        "merged_at",
        "merged_by",
        "assignees",
        "requested_reviewers",
        "comments",
        "additions",
        "deletions",
        "comment_authors",
    ];

    fn values(&self) -> Vec<String> {
        vec![
            self.repo_name.clone(),
            self.number.to_string(),
            self.title.clone(),
            self.state.clone(),
            self.author.clone(),
            self.created_at.clone(),
            self.merged_at.clone(),
            self.merged_by.clone(),
            self.assignees.clone(),
            self.requested_reviewers.clone(),
            self.comments.to_string(),
            self.additions.to_string(),
            self.deletions.to_string(),
            self.comment_authors.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRow {
    pub repo_name: String,
    pub pr_number: u64,
    /// Resolved address of the review author.
    pub reviewer: String,
    pub state: String,
    pub submitted_at: String,
}

impl CsvRecord for ReviewRow {
    const TABLE: ExportTable = ExportTable::Reviews;
    const COLUMNS: &'static [&'static str] =
        &["repo_name", "pr_number", "reviewer", "state", "submitted_at"];

    fn values(&self) -> Vec<String> {
        vec![
            self.repo_name.clone(),
            self.pr_number.to_string(),
            self.reviewer.clone(),
            self.state.clone(),
            self.submitted_at.clone(),
        ]
    }
}

/// One unified contributor identity.
///
/// The column set is a compatibility contract for downstream loaders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    /// Primary key.
    pub email: String,
    /// Longest known name variant.
    pub primary_name: String,
    /// Empty when no account is known for this address.
    pub account_handle: String,
    /// Every name variant, `"; "`-joined, in the order first seen.
    pub all_names: String,
}

impl CsvRecord for UserRow {
    const TABLE: ExportTable = ExportTable::Users;
    const COLUMNS: &'static [&'static str] =
        &["email", "primary_name", "account_handle", "all_names"];

    fn values(&self) -> Vec<String> {
        vec![
            self.email.clone(),
            self.primary_name.clone(),
            self.account_handle.clone(),
            self.all_names.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_header_is_stable() {
        assert_eq!(
            ExportTable::Users.header(),
            "email,primary_name,account_handle,all_names\n"
        );
    }

    #[test]
    fn every_table_has_a_distinct_file() {
        let mut names: Vec<_> = ExportTable::ALL.iter().map(|t| t.file_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ExportTable::ALL.len());
    }

    #[test]
    fn row_values_match_column_count() {
        let review = ReviewRow {
            repo_name: "duckdb".to_string(),
            pr_number: 12,
            reviewer: "a@x.com".to_string(),
            state: "APPROVED".to_string(),
            submitted_at: String::new(),
        };
        assert_eq!(review.values().len(), ReviewRow::COLUMNS.len());
        assert_eq!(review.to_line(), "duckdb,12,a@x.com,APPROVED,\n");
    }

    #[test]
    fn numbers_and_booleans_are_verbatim() {
        let repo = RepositoryRow {
            name: "r".to_string(),
            full_name: "o/r".to_string(),
            description: "A, B".to_string(),
            language: String::new(),
            stargazers_count: 1200,
            forks_count: 0,
            created_at: "2020-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
            url: "https://github.com/o/r".to_string(),
            is_archived: false,
            is_fork: true,
            is_private: false,
            is_mirror: false,
            is_template: false,
            is_locked: true,
        };
        assert_eq!(
            repo.to_line(),
            "r,o/r,\"A, B\",,1200,0,2020-01-01T00:00:00Z,2024-01-01T00:00:00Z,https://github.com/o/r,false,true,false,false,false,true\n"
        );
    }
}
