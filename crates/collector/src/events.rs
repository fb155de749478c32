//! Structured failure events.
//!
//! Every failure the exporter absorbs instead of propagating is reported
//! through an [`EventSink`] with one [`CollectionEvent`] variant per kind. The
//! production sink writes them to `tracing`; tests use
//! [`RecordingEventSink`] and assert on the recorded values.

use std::sync::Mutex;

use crate::{FetchError, Login, RepositoryName};

/// The paginated resources fetched by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Repositories,
    Commits,
    PullRequests,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Repositories => write!(f, "repositories"),
            ResourceKind::Commits => write!(f, "commits"),
            ResourceKind::PullRequests => write!(f, "pull_requests"),
        }
    }
}

/// A failure (or deliberate skip) that did not stop the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionEvent {
    /// A resource could not be fetched at all for one repository; its output
    /// for that repository is empty.
    ResourceFailed {
        repository: RepositoryName,
        resource: ResourceKind,
        error: FetchError,
    },

    /// A paginated fetch failed after at least one page; the items from the
    /// pages before the failure were kept. `repository` is `None` for the
    /// organization's repository listing.
    PaginationInterrupted {
        repository: Option<RepositoryName>,
        resource: ResourceKind,
        pages: usize,
        items: usize,
        error: FetchError,
    },

    /// Commit collection was skipped because the repository has no commits.
    EmptyRepositorySkipped { repository: RepositoryName },

    /// A login could not be resolved to an address; the fallback address was
    /// used instead.
    HandleResolutionFailed { login: Login, error: FetchError },
}

/// Receives [`CollectionEvent`]s.
pub trait EventSink: Send + Sync {
    /// Records one event. Must not fail.
    fn emit(&self, event: CollectionEvent);
}

/// Forwards events to `tracing` as warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: CollectionEvent) {
        match event {
            CollectionEvent::ResourceFailed {
                repository,
                resource,
                error,
            } => {
                tracing::warn!(
                    repository = %repository,
                    resource = %resource,
                    error = %error,
                    "Could not fetch {resource} for {repository}, continuing without them"
                );
            }
            CollectionEvent::PaginationInterrupted {
                repository,
                resource,
                pages,
                items,
                error,
            } => {
                let repository = repository.map(|r| r.to_string()).unwrap_or_default();
                tracing::warn!(
                    repository = %repository,
                    resource = %resource,
                    pages,
                    items,
                    error = %error,
                    "Pagination of {resource} stopped early, keeping partial result"
                );
            }
            CollectionEvent::EmptyRepositorySkipped { repository } => {
                tracing::warn!(repository = %repository, "Repository has no commits (empty)");
            }
            CollectionEvent::HandleResolutionFailed { login, error } => {
                tracing::warn!(
                    login = %login,
                    error = %error,
                    "Could not fetch address for login, using fallback"
                );
            }
        }
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<CollectionEvent>>,
}

impl RecordingEventSink {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    pub fn events(&self) -> Vec<CollectionEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: CollectionEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
