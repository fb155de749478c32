//! Contributor identity unification.
//!
//! Commit history names people by free-text `(email, name)` pairs. Pull
//! requests and reviews name them by account login. The [`IdentityRegistry`]
//! merges both namespaces into one directory keyed by email:
//!
//! - commit authors are registered directly, with no network access;
//! - logins are resolved to an address on first sight through a
//!   [`HandleResolver`], and the answer is cached for the rest of the run;
//! - a login that cannot be resolved gets a deterministic fallback address
//!   (`{login}@users.noreply.github.com`), cached like a real answer, so every
//!   row that mentions it still points at a user.
//!
//! Two addresses belonging to the same person (a commit address and a fallback
//! for a login with no public address) stay two users. There is no heuristic
//! merging.
//!
//! ## Concurrency
//!
//! Every mutating method takes `&mut self`. Two first-time lookups of the same
//! login can therefore never race: the second one always sees the cached
//! answer of the first. A parallel driver must keep a single owner (or wrap
//! the registry in an async mutex) to preserve that.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{CollectionEvent, EmailAddress, EventSink, HandleResolver, Login, UserRow};

/// Domain appended to a login to build its fallback address.
pub const FALLBACK_EMAIL_DOMAIN: &str = "users.noreply.github.com";

/// Primary name exported for an identity with no name variants and no login.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Separator between name variants in the exported `all_names` column.
pub const NAME_SEPARATOR: &str = "; ";

/// The synthetic address used when `login` cannot be resolved.
pub fn fallback_address(login: &Login) -> EmailAddress {
    EmailAddress::at_domain(login, FALLBACK_EMAIL_DOMAIN)
}

// ---------------------------------------------------------------------------
// UserIdentity
// ---------------------------------------------------------------------------

/// One unified contributor, keyed by email.
///
/// The email never changes after creation. Names only accumulate and keep
/// their insertion order. The account handle is set at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    email: EmailAddress,
    names: Vec<String>,
    account_handle: Option<Login>,
}

impl UserIdentity {
    fn new(email: EmailAddress) -> Self {
        Self {
            email,
            names: Vec::new(),
            account_handle: None,
        }
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Name variants in the order they were first seen.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn account_handle(&self) -> Option<&Login> {
        self.account_handle.as_ref()
    }

    /// Adds a name variant. Empty names and repeats are ignored.
    fn add_name(&mut self, name: &str) {
        if !name.is_empty() && !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
    }

    /// Records the account handle unless one is already known.
    fn claim_handle(&mut self, login: &Login) {
        if self.account_handle.is_none() {
            self.account_handle = Some(login.clone());
        }
    }

    /// The longest name variant by character count.
    ///
    /// Among names of equal maximal length the one inserted first wins. With
    /// no names at all, the account handle is used, then [`UNKNOWN_NAME`].
    pub fn primary_name(&self) -> &str {
        let mut best: Option<&str> = None;
        for name in &self.names {
            let longer = match best {
                Some(current) => name.chars().count() > current.chars().count(),
                None => true,
            };
            if longer {
                best = Some(name.as_str());
            }
        }

        best.or_else(|| self.account_handle.as_ref().map(Login::as_str))
            .unwrap_or(UNKNOWN_NAME)
    }

    /// Renders the identity as a row of the user table.
    pub fn to_row(&self) -> UserRow {
        UserRow {
            email: self.email.to_string(),
            primary_name: self.primary_name().to_string(),
            account_handle: self
                .account_handle
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            all_names: self.names.join(NAME_SEPARATOR),
        }
    }
}

// ---------------------------------------------------------------------------
// IdentityRegistry
// ---------------------------------------------------------------------------

/// Accumulates and deduplicates contributor identities for one run.
pub struct IdentityRegistry {
    /// Identities in first-registration order.
    users: Vec<UserIdentity>,
    by_email: HashMap<EmailAddress, usize>,
    /// Every login ever resolved, including fallback answers.
    resolution_cache: HashMap<Login, EmailAddress>,
    /// Logins known to belong to a real address, from successful lookups or
    /// from commits carrying both an address and an account.
    login_to_email: HashMap<Login, EmailAddress>,
    resolver: Arc<dyn HandleResolver>,
    events: Arc<dyn EventSink>,
    lookups: usize,
}

impl std::fmt::Debug for IdentityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityRegistry")
            .field("users", &self.users.len())
            .field("cached_logins", &self.resolution_cache.len())
            .field("lookups", &self.lookups)
            .finish()
    }
}

impl IdentityRegistry {
    /// Creates an empty registry that resolves logins through `resolver` and
    /// reports lookup failures to `events`.
    pub fn new(resolver: Arc<dyn HandleResolver>, events: Arc<dyn EventSink>) -> Self {
        Self {
            users: Vec::new(),
            by_email: HashMap::new(),
            resolution_cache: HashMap::new(),
            login_to_email: HashMap::new(),
            resolver,
            events,
            lookups: 0,
        }
    }

    /// Number of distinct identities.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Number of lookups sent to the resolver so far.
    pub fn resolution_count(&self) -> usize {
        self.lookups
    }

    /// Looks up an identity by address.
    pub fn get(&self, email: &str) -> Option<&UserIdentity> {
        let email = EmailAddress::new(email)?;
        self.by_email.get(&email).map(|&i| &self.users[i])
    }

    fn get_or_create(&mut self, email: &EmailAddress) -> &mut UserIdentity {
        let index = match self.by_email.get(email) {
            Some(&index) => index,
            None => {
                self.users.push(UserIdentity::new(email.clone()));
                let index = self.users.len() - 1;
                self.by_email.insert(email.clone(), index);
                index
            }
        };
        &mut self.users[index]
    }

    /// Registers a commit author or committer. Never touches the network.
    ///
    /// An empty `email` is ignored. Repeating the same pair is a no-op.
    pub fn register_from_commit(&mut self, email: &str, name: &str) {
        let Some(email) = EmailAddress::new(email) else {
            return;
        };
        self.get_or_create(&email).add_name(name);
    }

    /// Records that `login` owns `email`, as reported by commit metadata.
    /// Never touches the network.
    ///
    /// The identity's account handle is set if it has none. The login is
    /// mapped to `email` for later [`resolve_handle`](Self::resolve_handle)
    /// calls, unless it already has an answer: a login resolves to the same
    /// address for the whole run.
    pub fn link_account(&mut self, email: &str, login: &str) {
        let (Some(email), Some(login)) = (EmailAddress::new(email), Login::new(login)) else {
            return;
        };

        self.get_or_create(&email).claim_handle(&login);
        if !self.resolution_cache.contains_key(&login) {
            self.login_to_email.entry(login).or_insert(email);
        }
    }

    /// Resolves an account handle to an address.
    ///
    /// Returns `None` only for an empty handle. A login already answered
    /// (directly, by fallback, or through [`link_account`](Self::link_account))
    /// is returned without contacting the resolver. Otherwise exactly one
    /// lookup is made; its answer, or the fallback address if it fails, is
    /// cached and registered as an identity carrying `handle` as its account
    /// handle and as a name variant.
    pub async fn resolve_handle(&mut self, handle: &str) -> Option<EmailAddress> {
        let login = Login::new(handle)?;

        if let Some(email) = self.login_to_email.get(&login) {
            return Some(email.clone());
        }
        if let Some(email) = self.resolution_cache.get(&login) {
            return Some(email.clone());
        }

        self.lookups += 1;
        let email = match self.resolver.resolve(&login).await {
            Ok(Some(email)) => {
                self.login_to_email.insert(login.clone(), email.clone());
                email
            }
            Ok(None) => {
                tracing::debug!(login = %login, "Account has no public address, using fallback");
                fallback_address(&login)
            }
            Err(error) => {
                self.events.emit(CollectionEvent::HandleResolutionFailed {
                    login: login.clone(),
                    error,
                });
                fallback_address(&login)
            }
        };

        self.resolution_cache.insert(login.clone(), email.clone());
        let user = self.get_or_create(&email);
        user.claim_handle(&login);
        user.add_name(login.as_str());

        Some(email)
    }

    /// One user-table row per distinct email, in first-registration order.
    pub fn export_users(&self) -> Vec<UserRow> {
        self.users.iter().map(UserIdentity::to_row).collect()
    }
}
