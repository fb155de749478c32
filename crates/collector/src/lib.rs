//! Core domain for the organization exporter.
//!
//! This crate contains every domain concept, newtype identifier, and error type
//! used to turn an organization's repositories, commits, pull requests and
//! reviews into relational CSV tables. Infrastructure crates implement the
//! traits defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`Login`, `EmailAddress`, `Cursor`, etc.) |
//! | [`types`] | Pages and domain nodes (`Repository`, `Commit`, `PullRequest`, `Review`) |
//! | [`errors`] | `FetchError`, `SinkError`, run-level `CollectorError` |
//! | [`events`] | Structured failure events and the `EventSink` port |
//! | [`ports`] | `OrganizationSource`, `HandleResolver`, `RowSink` |
//! | [`paginate`] | Failure-tolerant cursor walk |
//! | [`identity`] | `IdentityRegistry`: login/email unification |
//! | [`csv`] | Field quoting |
//! | [`rows`] | Output tables and row types |
//! | [`mapping`] | Node → row mappers |
//! | [`sink`] | In-memory `RowSink` |

pub mod csv;
pub mod errors;
pub mod events;
pub mod identifiers;
pub mod identity;
pub mod mapping;
pub mod paginate;
pub mod ports;
pub mod rows;
pub mod sink;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{CollectorError, FetchError, SinkError};
pub use events::{
    CollectionEvent, EventSink, RecordingEventSink, ResourceKind, TracingEventSink,
};
pub use identifiers::{
    CommitSha, Cursor, EmailAddress, Login, OrganizationName, RepositoryName, RunId,
};
pub use identity::{fallback_address, IdentityRegistry, UserIdentity, FALLBACK_EMAIL_DOMAIN};
pub use mapping::{map_node, TableRow};
pub use paginate::{fetch_all, walk, PageWalk};
pub use ports::{HandleResolver, OrganizationSource, RowSink};
pub use rows::{
    CommitRow, CsvRecord, ExportTable, PullRequestRow, RepositoryRow, ReviewRow, UserRow,
};
pub use sink::MemoryRowSink;
pub use types::{
    Commit, GitActor, Node, Page, PageInfo, PullRequest, Repository, Review, Timestamp,
};
