use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use collector::{
    CollectionEvent, CollectorError, Commit, CommitSha, EmailAddress, ExportTable, FetchError,
    GitActor, HandleResolver, IdentityRegistry, Login, MemoryRowSink, OrganizationName,
    OrganizationSource, PageWalk, PullRequest, RecordingEventSink, Repository, RepositoryName,
    ResourceKind, Review, RunId,
};
use driver::{CollectionDriver, CollectionSettings};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeSource {
    repositories: Option<PageWalk<Repository>>,
    commits: HashMap<String, PageWalk<Commit>>,
    pull_requests: HashMap<String, PageWalk<PullRequest>>,
}

fn unavailable() -> FetchError {
    FetchError::Status {
        status: 502,
        message: "Bad Gateway".to_string(),
    }
}

fn complete<T>(items: Vec<T>) -> PageWalk<T> {
    PageWalk {
        items,
        pages: 1,
        error: None,
    }
}

fn failed<T>() -> PageWalk<T> {
    PageWalk {
        items: Vec::new(),
        pages: 0,
        error: Some(unavailable()),
    }
}

fn cut_short<T>(items: Vec<T>, pages: usize) -> PageWalk<T> {
    PageWalk {
        items,
        pages,
        error: Some(unavailable()),
    }
}

#[async_trait]
impl OrganizationSource for FakeSource {
    async fn repositories(
        &self,
        _organization: &OrganizationName,
    ) -> PageWalk<Repository> {
        self.repositories.clone().unwrap_or_else(failed)
    }

    async fn commits(
        &self,
        _organization: &OrganizationName,
        repository: &RepositoryName,
    ) -> PageWalk<Commit> {
        self.commits
            .get(repository.as_str())
            .cloned()
            .unwrap_or_else(|| complete(Vec::new()))
    }

    async fn pull_requests(
        &self,
        _organization: &OrganizationName,
        repository: &RepositoryName,
    ) -> PageWalk<PullRequest> {
        self.pull_requests
            .get(repository.as_str())
            .cloned()
            .unwrap_or_else(|| complete(Vec::new()))
    }
}

/// Resolves every login to `{login}@example.com` and counts calls.
#[derive(Default)]
struct ExampleDotCom {
    calls: AtomicUsize,
}

#[async_trait]
impl HandleResolver for ExampleDotCom {
    async fn resolve(&self, login: &Login) -> Result<Option<EmailAddress>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(EmailAddress::new(format!("{login}@example.com")))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn repo(name: &str) -> Repository {
    Repository {
        name: RepositoryName::new(name).unwrap(),
        description: Some(format!("The {name} repository")),
        primary_language: Some("Rust".to_string()),
        stargazer_count: 3,
        fork_count: 1,
        created_at: "2023-01-01T00:00:00Z".to_string(),
        updated_at: "2024-01-01T00:00:00Z".to_string(),
        url: format!("https://github.com/acme/{name}"),
        is_empty: false,
        is_archived: false,
        is_fork: false,
        is_private: false,
        is_mirror: false,
        is_template: false,
        is_locked: false,
    }
}

fn commit(sha: &str, email: &str, name: &str) -> Commit {
    Commit {
        sha: CommitSha::new(sha).unwrap(),
        message: format!("commit {sha}"),
        authored_at: Some("2024-02-01T00:00:00Z".to_string()),
        author: Some(GitActor {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            login: None,
        }),
        committer: None,
    }
}

fn pull_request(number: u64, author: &str, reviewer: &str) -> PullRequest {
    PullRequest {
        number,
        title: format!("Change {number}"),
        state: "OPEN".to_string(),
        author: Login::new(author),
        created_at: "2024-03-01T00:00:00Z".to_string(),
        merged_at: None,
        merged_by: None,
        assignees: vec![],
        requested_reviewers: Login::new(reviewer).into_iter().collect(),
        comment_count: 0,
        comment_authors: vec![],
        additions: 1,
        deletions: 0,
        reviews: vec![Review {
            pull_request_number: number,
            author: Login::new(reviewer),
            state: "APPROVED".to_string(),
            submitted_at: Some("2024-03-02T00:00:00Z".to_string()),
        }],
    }
}

struct Harness {
    driver: CollectionDriver,
    registry: IdentityRegistry,
    events: Arc<RecordingEventSink>,
    resolver: Arc<ExampleDotCom>,
}

fn harness(source: FakeSource) -> Harness {
    let events = Arc::new(RecordingEventSink::new());
    let resolver = Arc::new(ExampleDotCom::default());
    let settings = CollectionSettings::new(OrganizationName::new("acme").unwrap())
        .with_pacing(Duration::ZERO);
    Harness {
        driver: CollectionDriver::new(Arc::new(source), events.clone(), settings),
        registry: IdentityRegistry::new(resolver.clone(), events.clone()),
        events,
        resolver,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn commit_outage_in_one_repository_keeps_the_rest() {
    let source = FakeSource {
        repositories: Some(complete(vec![repo("alpha"), repo("beta")])),
        commits: HashMap::from([
            (
                "alpha".to_string(),
                complete(vec![commit("a1", "ann@acme.dev", "Ann")]),
            ),
            ("beta".to_string(), failed()),
        ]),
        pull_requests: HashMap::from([
            ("alpha".to_string(), complete(vec![])),
            ("beta".to_string(), complete(vec![pull_request(7, "bo", "ann")])),
        ]),
    };
    let mut h = harness(source);
    let mut sink = MemoryRowSink::new();

    let summary = h
        .driver
        .run(RunId::new_random(), &mut h.registry, &mut sink)
        .await
        .unwrap();

    let commits = sink.rows(ExportTable::Commits);
    assert_eq!(commits.len(), 1);
    assert!(commits[0].starts_with("alpha,a1,"));

    let prs = sink.rows(ExportTable::PullRequests);
    assert_eq!(prs.len(), 1);
    assert!(prs[0].starts_with("beta,7,Change 7,OPEN,bo@example.com,"));

    assert_eq!(
        sink.rows(ExportTable::Reviews),
        ["beta,7,ann@example.com,APPROVED,2024-03-02T00:00:00Z"]
    );

    assert_eq!(summary.commits, 1);
    assert_eq!(summary.pull_requests, 1);
    assert_eq!(summary.reviews, 1);
    assert_eq!(summary.failed_resources, 1);
    assert_eq!(
        h.events.events(),
        vec![CollectionEvent::ResourceFailed {
            repository: RepositoryName::new("beta").unwrap(),
            resource: ResourceKind::Commits,
            error: unavailable(),
        }]
    );
    assert!(sink.is_finished());
}

#[tokio::test]
async fn pull_request_outage_in_one_repository_keeps_the_rest() {
    let source = FakeSource {
        repositories: Some(complete(vec![repo("alpha"), repo("beta")])),
        commits: HashMap::from([(
            "alpha".to_string(),
            complete(vec![commit("a1", "ann@acme.dev", "Ann")]),
        )]),
        pull_requests: HashMap::from([
            ("alpha".to_string(), failed()),
            ("beta".to_string(), complete(vec![pull_request(3, "bo", "ann")])),
        ]),
    };
    let mut h = harness(source);
    let mut sink = MemoryRowSink::new();

    let summary = h
        .driver
        .run(RunId::new_random(), &mut h.registry, &mut sink)
        .await
        .unwrap();

    // alpha keeps its commits but contributes no pull request or review rows.
    assert_eq!(sink.rows(ExportTable::Commits).len(), 1);
    let prs = sink.rows(ExportTable::PullRequests);
    assert_eq!(prs.len(), 1);
    assert!(prs[0].starts_with("beta,3,"));
    let reviews = sink.rows(ExportTable::Reviews);
    assert_eq!(reviews.len(), 1);
    assert!(reviews[0].starts_with("beta,3,"));

    assert_eq!(summary.failed_resources, 1);
    assert_eq!(
        h.events.events(),
        vec![CollectionEvent::ResourceFailed {
            repository: RepositoryName::new("alpha").unwrap(),
            resource: ResourceKind::PullRequests,
            error: unavailable(),
        }]
    );
}

#[tokio::test]
async fn interrupted_pagination_keeps_partial_rows_and_is_reported() {
    let source = FakeSource {
        repositories: Some(complete(vec![repo("alpha")])),
        commits: HashMap::from([(
            "alpha".to_string(),
            cut_short(
                vec![
                    commit("a1", "ann@acme.dev", "Ann"),
                    commit("a2", "bo@acme.dev", "Bo"),
                ],
                2,
            ),
        )]),
        ..FakeSource::default()
    };
    let mut h = harness(source);
    let mut sink = MemoryRowSink::new();

    let summary = h
        .driver
        .run(RunId::new_random(), &mut h.registry, &mut sink)
        .await
        .unwrap();

    assert_eq!(sink.rows(ExportTable::Commits).len(), 2);
    assert_eq!(summary.commits, 2);
    assert_eq!(summary.failed_resources, 0);
    assert_eq!(summary.interrupted_resources, 1);
    assert_eq!(
        h.events.events(),
        vec![CollectionEvent::PaginationInterrupted {
            repository: Some(RepositoryName::new("alpha").unwrap()),
            resource: ResourceKind::Commits,
            pages: 2,
            items: 2,
            error: unavailable(),
        }]
    );
}

#[tokio::test]
async fn interrupted_repository_listing_exports_the_repositories_it_found() {
    let source = FakeSource {
        repositories: Some(cut_short(vec![repo("alpha")], 1)),
        ..FakeSource::default()
    };
    let mut h = harness(source);
    let mut sink = MemoryRowSink::new();

    let summary = h
        .driver
        .run(RunId::new_random(), &mut h.registry, &mut sink)
        .await
        .unwrap();

    assert_eq!(summary.repositories, 1);
    assert_eq!(sink.rows(ExportTable::Repositories).len(), 1);
    assert_eq!(
        h.events.events(),
        vec![CollectionEvent::PaginationInterrupted {
            repository: None,
            resource: ResourceKind::Repositories,
            pages: 1,
            items: 1,
            error: unavailable(),
        }]
    );
}

#[tokio::test]
async fn every_table_starts_with_its_header() {
    let mut h = harness(FakeSource {
        repositories: Some(complete(vec![])),
        ..FakeSource::default()
    });
    let mut sink = MemoryRowSink::new();

    h.driver
        .run(RunId::new_random(), &mut h.registry, &mut sink)
        .await
        .unwrap();

    for table in ExportTable::ALL {
        let lines = sink.lines(table);
        assert_eq!(lines.len(), 1, "{table} should only hold its header");
        assert_eq!(format!("{}\n", lines[0]), table.header());
    }
}

#[tokio::test]
async fn users_table_unifies_commit_and_review_identities() {
    let source = FakeSource {
        repositories: Some(complete(vec![repo("alpha")])),
        commits: HashMap::from([(
            "alpha".to_string(),
            complete(vec![
                commit("a1", "ann@example.com", "Ann"),
                commit("a2", "ann@example.com", "Ann Example"),
            ]),
        )]),
        pull_requests: HashMap::from([(
            "alpha".to_string(),
            complete(vec![
                pull_request(1, "ann", "bo"),
                pull_request(2, "bo", "ann"),
            ]),
        )]),
    };
    let mut h = harness(source);
    let mut sink = MemoryRowSink::new();

    let summary = h
        .driver
        .run(RunId::new_random(), &mut h.registry, &mut sink)
        .await
        .unwrap();

    assert_eq!(
        sink.rows(ExportTable::Users),
        [
            "ann@example.com,Ann Example,ann,Ann; Ann Example; ann",
            "bo@example.com,bo,bo,bo",
        ]
    );
    assert_eq!(summary.users, 2);
    // Two distinct logins, each looked up exactly once.
    assert_eq!(h.resolver.calls.load(Ordering::SeqCst), 2);
    assert_eq!(summary.handle_lookups, 2);
}

#[tokio::test]
async fn empty_repositories_skip_commit_collection() {
    let mut empty = repo("void");
    empty.is_empty = true;
    let source = FakeSource {
        repositories: Some(complete(vec![empty])),
        commits: HashMap::from([("void".to_string(), failed())]),
        ..FakeSource::default()
    };
    let mut h = harness(source);
    let mut sink = MemoryRowSink::new();

    let summary = h
        .driver
        .run(RunId::new_random(), &mut h.registry, &mut sink)
        .await
        .unwrap();

    assert_eq!(summary.failed_resources, 0);
    assert_eq!(
        h.events.events(),
        vec![CollectionEvent::EmptyRepositorySkipped {
            repository: RepositoryName::new("void").unwrap(),
        }]
    );
    assert_eq!(sink.rows(ExportTable::Repositories).len(), 1);
}

#[tokio::test]
async fn repository_listing_failure_ends_the_run() {
    let mut h = harness(FakeSource::default());
    let mut sink = MemoryRowSink::new();

    let result = h
        .driver
        .run(RunId::new_random(), &mut h.registry, &mut sink)
        .await;

    assert!(matches!(
        result,
        Err(CollectorError::RepositoryListing { .. })
    ));
    assert!(!sink.is_finished());
}

#[tokio::test(start_paused = true)]
async fn repositories_are_paced_apart() {
    let events = Arc::new(RecordingEventSink::new());
    let source = FakeSource {
        repositories: Some(complete(vec![repo("one"), repo("two"), repo("three")])),
        ..FakeSource::default()
    };
    let settings = CollectionSettings::new(OrganizationName::new("acme").unwrap())
        .with_pacing(Duration::from_millis(500));
    let driver = CollectionDriver::new(Arc::new(source), events.clone(), settings);
    let mut registry = IdentityRegistry::new(Arc::new(ExampleDotCom::default()), events);
    let mut sink = MemoryRowSink::new();

    let started = tokio::time::Instant::now();
    driver
        .run(RunId::new_random(), &mut registry, &mut sink)
        .await
        .unwrap();

    // Two gaps between three repositories; none after the last.
    assert_eq!(started.elapsed(), Duration::from_millis(1000));
}
