//! Port traits implemented by infrastructure crates.
//!
//! The domain defines *what* it needs: a paginated organization source, a
//! login-to-address resolver, and somewhere to put rows. The `github` crate
//! supplies the first two over HTTP; the CLI supplies a file-backed row sink.

use async_trait::async_trait;

use crate::{
    Commit, EmailAddress, ExportTable, FetchError, Login, OrganizationName, PageWalk,
    PullRequest, Repository, RepositoryName, SinkError,
};

/// Typed access to an organization's resources.
///
/// Each method walks every page of one resource (see [`crate::paginate`]) and
/// returns the [`PageWalk`] as is.
///
/// ## Failure contract
///
/// - `error` with zero pages means *total* failure: the first page could not
///   be fetched.
/// - `error` after one or more pages means the walk was cut short; `items`
///   holds everything collected up to that point.
#[async_trait]
pub trait OrganizationSource: Send + Sync {
    /// All repositories owned by `organization`, in source order.
    async fn repositories(
        &self,
        organization: &OrganizationName,
    ) -> PageWalk<Repository>;

    /// Commits on the default branch of `repository`, newest first.
    ///
    /// A repository without a default branch yields an empty list.
    async fn commits(
        &self,
        organization: &OrganizationName,
        repository: &RepositoryName,
    ) -> PageWalk<Commit>;

    /// Pull requests of `repository` in every state, with reviews nested.
    async fn pull_requests(
        &self,
        organization: &OrganizationName,
        repository: &RepositoryName,
    ) -> PageWalk<PullRequest>;
}

/// Looks up the public contact address of an account.
#[async_trait]
pub trait HandleResolver: Send + Sync {
    /// Resolves `login` to an address.
    ///
    /// Returns `Ok(None)` when the account exists but publishes no address,
    /// and `Err` when the lookup itself failed (unknown login, permissions,
    /// transport).
    async fn resolve(&self, login: &Login) -> Result<Option<EmailAddress>, FetchError>;
}

/// Destination for rendered CSV lines.
///
/// Lines arrive already terminated with `\n`, one call per row, in the order
/// they should appear in the table.
#[async_trait]
pub trait RowSink: Send {
    /// Appends one line to `table`.
    async fn write_line(&mut self, table: ExportTable, line: &str) -> Result<(), SinkError>;

    /// Flushes and closes every table. Further writes fail.
    async fn finish(&mut self) -> Result<(), SinkError>;
}
