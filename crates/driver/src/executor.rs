//! The collection loop.

use std::sync::Arc;
use std::time::Duration;

use collector::{
    map_node, CollectionEvent, CollectorError, EventSink, ExportTable, FetchError,
    IdentityRegistry, Node, OrganizationName, OrganizationSource, PageWalk, Repository,
    RepositoryName, ResourceKind, RowSink, RunId, SinkError, TableRow, Timestamp, UserRow,
};
use tracing::{info, instrument};

use crate::RunSummary;

/// Delay between two repositories unless configured otherwise.
pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

/// Static settings for one run.
#[derive(Debug, Clone)]
pub struct CollectionSettings {
    /// Organization to export.
    pub organization: OrganizationName,
    /// Pause inserted between two repositories to smooth the request rate.
    pub pacing: Duration,
}

impl CollectionSettings {
    pub fn new(organization: OrganizationName) -> Self {
        Self {
            organization,
            pacing: DEFAULT_PACING,
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }
}

/// Drives one export run.
///
/// Repositories are processed strictly one after another; within a
/// repository, commits are collected before pull requests. A resource whose
/// fetch fails outright is reported through the [`EventSink`] and contributes
/// no rows for that repository; the run moves on. A resource whose pagination
/// is cut short keeps its partial rows and is reported as well. Only a failure
/// to list the repositories, or to write output, ends the run with an error.
pub struct CollectionDriver {
    source: Arc<dyn OrganizationSource>,
    events: Arc<dyn EventSink>,
    settings: CollectionSettings,
}

impl std::fmt::Debug for CollectionDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionDriver")
            .field("settings", &self.settings)
            .finish()
    }
}

impl CollectionDriver {
    pub fn new(
        source: Arc<dyn OrganizationSource>,
        events: Arc<dyn EventSink>,
        settings: CollectionSettings,
    ) -> Self {
        Self {
            source,
            events,
            settings,
        }
    }

    /// Runs the export, writing every table to `sink` and finishing it.
    ///
    /// `registry` is threaded through every mapper and exported into the user
    /// table once all repositories are done.
    #[instrument(
        name = "collection",
        skip_all,
        fields(run_id = %run_id, organization = %self.settings.organization)
    )]
    pub async fn run(
        &self,
        run_id: RunId,
        registry: &mut IdentityRegistry,
        sink: &mut dyn RowSink,
    ) -> Result<RunSummary, CollectorError> {
        let organization = &self.settings.organization;
        let mut summary = RunSummary::start(run_id, organization.clone());

        for table in ExportTable::ALL {
            sink.write_line(table, &table.header()).await?;
        }

        let listing = self.source.repositories(organization).await;
        let repositories = self
            .settle(None, ResourceKind::Repositories, listing, &mut summary)
            .map_err(|source| CollectorError::RepositoryListing {
                organization: organization.clone(),
                source,
            })?;
        info!(count = repositories.len(), "Found repositories");

        for repo in &repositories {
            let row = map_node(organization, &repo.name, Node::Repository(repo), registry).await;
            write_row(sink, &row).await?;
        }
        summary.repositories = repositories.len();

        let total = repositories.len();
        for (index, repo) in repositories.iter().enumerate() {
            info!(
                repository = %repo.name,
                "Processing repository {}/{}: {}",
                index + 1,
                total,
                repo.name
            );
            self.collect_repository(repo, registry, sink, &mut summary)
                .await?;

            if index + 1 < total && !self.settings.pacing.is_zero() {
                tokio::time::sleep(self.settings.pacing).await;
            }
        }

        let users = registry.export_users();
        for user in &users {
            write_row(sink, &TableRow::from_record::<UserRow>(user)).await?;
        }
        summary.users = users.len();
        summary.handle_lookups = registry.resolution_count();

        sink.finish().await?;
        summary.finished_at = Timestamp::now();

        info!(
            repositories = summary.repositories,
            commits = summary.commits,
            pull_requests = summary.pull_requests,
            reviews = summary.reviews,
            users = summary.users,
            failed_resources = summary.failed_resources,
            interrupted_resources = summary.interrupted_resources,
            handle_lookups = summary.handle_lookups,
            elapsed_ms = summary.elapsed_ms(),
            "Data collection complete"
        );
        Ok(summary)
    }

    #[instrument(skip_all, fields(repository = %repo.name))]
    async fn collect_repository(
        &self,
        repo: &Repository,
        registry: &mut IdentityRegistry,
        sink: &mut dyn RowSink,
        summary: &mut RunSummary,
    ) -> Result<(), SinkError> {
        let organization = &self.settings.organization;

        if repo.is_empty {
            self.events.emit(CollectionEvent::EmptyRepositorySkipped {
                repository: repo.name.clone(),
            });
        } else {
            let walk = self.source.commits(organization, &repo.name).await;
            match self.settle(Some(&repo.name), ResourceKind::Commits, walk, summary) {
                Ok(commits) => {
                    for commit in &commits {
                        let row =
                            map_node(organization, &repo.name, Node::Commit(commit), registry)
                                .await;
                        write_row(sink, &row).await?;
                    }
                    summary.commits += commits.len();
                }
                Err(error) => {
                    summary.failed_resources += 1;
                    self.events.emit(CollectionEvent::ResourceFailed {
                        repository: repo.name.clone(),
                        resource: ResourceKind::Commits,
                        error,
                    });
                }
            }
        }

        let walk = self.source.pull_requests(organization, &repo.name).await;
        match self.settle(Some(&repo.name), ResourceKind::PullRequests, walk, summary) {
            Ok(pull_requests) => {
                for pr in &pull_requests {
                    let row =
                        map_node(organization, &repo.name, Node::PullRequest(pr), registry).await;
                    write_row(sink, &row).await?;

                    for review in &pr.reviews {
                        let row =
                            map_node(organization, &repo.name, Node::Review(review), registry)
                                .await;
                        write_row(sink, &row).await?;
                    }
                    summary.reviews += pr.reviews.len();
                }
                summary.pull_requests += pull_requests.len();
            }
            Err(error) => {
                summary.failed_resources += 1;
                self.events.emit(CollectionEvent::ResourceFailed {
                    repository: repo.name.clone(),
                    resource: ResourceKind::PullRequests,
                    error,
                });
            }
        }

        Ok(())
    }

    /// Splits a finished walk into the items the run keeps.
    ///
    /// A walk that failed on its first page comes back as `Err`. A walk cut
    /// short later keeps its items and is reported as
    /// [`CollectionEvent::PaginationInterrupted`].
    fn settle<T>(
        &self,
        repository: Option<&RepositoryName>,
        resource: ResourceKind,
        walk: PageWalk<T>,
        summary: &mut RunSummary,
    ) -> Result<Vec<T>, FetchError> {
        let PageWalk {
            items,
            pages,
            error,
        } = walk;
        match error {
            None => Ok(items),
            Some(error) if pages == 0 => Err(error),
            Some(error) => {
                summary.interrupted_resources += 1;
                self.events.emit(CollectionEvent::PaginationInterrupted {
                    repository: repository.cloned(),
                    resource,
                    pages,
                    items: items.len(),
                    error,
                });
                Ok(items)
            }
        }
    }
}

async fn write_row(sink: &mut dyn RowSink, row: &TableRow) -> Result<(), SinkError> {
    sink.write_line(row.table, &row.line).await
}
