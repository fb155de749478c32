//! Error types for the export domain.
//!
//! [`CollectorError`] covers conditions that stop a run. Everything below it is
//! absorbed somewhere on the way up:
//!
//! - [`FetchError`] mid-walk is absorbed by the paginator (partial result);
//!   on a first page it is absorbed at the repository boundary by the driver.
//! - [`FetchError`] from a handle lookup is absorbed by the identity registry
//!   (fallback address).
//! - [`SinkError`] is never absorbed: losing output rows silently is worse than
//!   stopping.

use thiserror::Error;

use crate::OrganizationName;

// ---------------------------------------------------------------------------
// Query source errors
// ---------------------------------------------------------------------------

/// A failed request against the query source (page fetch or account lookup).
///
/// Carries strings rather than the transport's own error type so it can be
/// cloned into events and compared in tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, TLS, timeout, reset).
    #[error("Transport error: {message}")]
    Transport {
        /// Description from the HTTP client.
        message: String,
    },

    /// The source answered with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The query executed but the source reported errors in its payload.
    #[error("Query failed: {}", messages.join("; "))]
    Query {
        /// One entry per reported error.
        messages: Vec<String>,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("Malformed response: {message}")]
    Decode {
        /// Description of the decoding failure.
        message: String,
    },

    /// The addressed object does not exist or is not visible to the token.
    #[error("Not found: {what}")]
    NotFound {
        /// What was looked up (e.g. `"repository duckdb/duckdb"`, `"user ghost"`).
        what: String,
    },
}

// ---------------------------------------------------------------------------
// Output errors
// ---------------------------------------------------------------------------

/// A failure writing rows to an output table.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The underlying writer failed.
    #[error("Failed writing {table}: {source}")]
    Io {
        /// File name of the affected table.
        table: &'static str,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A row was written after the sink was finished.
    #[error("Sink for {table} is already closed")]
    Closed {
        /// File name of the affected table.
        table: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Run-level errors
// ---------------------------------------------------------------------------

/// Errors that stop an export run.
///
/// These are distinct from per-repository failures, which are logged and
/// reported through the event sink without affecting the exit code.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The repository list itself could not be fetched; there is nothing to do.
    #[error("Could not list repositories for organization '{organization}': {source}")]
    RepositoryListing {
        /// The organization whose repositories were requested.
        organization: OrganizationName,
        /// The underlying fetch failure.
        #[source]
        source: FetchError,
    },

    /// Writing output failed.
    #[error(transparent)]
    Sink(#[from] SinkError),
}
