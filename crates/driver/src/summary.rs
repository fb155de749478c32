//! End-of-run counters.

use collector::{OrganizationName, RunId, Timestamp};
use serde::Serialize;

/// What one run produced.
///
/// Row counts exclude header lines. `failed_resources` counts per-repository
/// fetches that produced nothing because their first page failed;
/// `interrupted_resources` counts fetches that kept a partial result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub organization: OrganizationName,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    pub repositories: usize,
    pub commits: usize,
    pub pull_requests: usize,
    pub reviews: usize,
    pub users: usize,
    pub failed_resources: usize,
    pub interrupted_resources: usize,
    /// Lookups actually sent to the handle resolver (cache misses).
    pub handle_lookups: usize,
}

impl RunSummary {
    pub(crate) fn start(run_id: RunId, organization: OrganizationName) -> Self {
        let now = Timestamp::now();
        Self {
            run_id,
            organization,
            started_at: now,
            finished_at: now,
            repositories: 0,
            commits: 0,
            pull_requests: 0,
            reviews: 0,
            users: 0,
            failed_resources: 0,
            interrupted_resources: 0,
            handle_lookups: 0,
        }
    }

    /// Wall-clock duration of the run in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.finished_at.millis_since(self.started_at)
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Data summary for {}:", self.organization)?;
        writeln!(f, "  Repositories:  {}", self.repositories)?;
        writeln!(f, "  Commits:       {}", self.commits)?;
        writeln!(f, "  Pull Requests: {}", self.pull_requests)?;
        writeln!(f, "  Reviews:       {}", self.reviews)?;
        writeln!(f, "  Users:         {}", self.users)?;
        if self.failed_resources > 0 {
            writeln!(f, "  Failed fetches: {}", self.failed_resources)?;
        }
        if self.interrupted_resources > 0 {
            writeln!(f, "  Partial fetches: {}", self.interrupted_resources)?;
        }
        write!(f, "  Elapsed:       {} ms", self.elapsed_ms())
    }
}
