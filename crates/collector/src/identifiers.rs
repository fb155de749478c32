//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive, so a [`Login`] can never be passed where an
//! [`EmailAddress`] is expected even though both are strings under the
//! hood. The two namespaces meet only through an explicit resolution step in
//! the identity registry.

use serde::Serialize;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier, returning the owned string.
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// ---------------------------------------------------------------------------
// String-backed identifiers (GitHub names and opaque tokens)
// ---------------------------------------------------------------------------

string_id! {
    /// The login of the GitHub organization being exported (e.g. `"duckdb"`).
    OrganizationName
}

string_id! {
    /// A repository name within the organization, without the owner prefix.
    RepositoryName
}

string_id! {
    /// A GitHub account handle.
    ///
    /// Pull-request and review activity identify people only by login; the
    /// identity registry resolves a login to an [`EmailAddress`] on demand.
    Login
}

string_id! {
    /// A contact address. Primary key of the exported user table.
    ///
    /// Either taken verbatim from commit metadata, returned by an account
    /// lookup, or synthesised as a fallback for an unresolvable login.
    EmailAddress
}

string_id! {
    /// Opaque pagination cursor handed back by the query source.
    ///
    /// The absence of a cursor (`None`) denotes the start of a sequence.
    Cursor
}

string_id! {
    /// A Git commit SHA (40-character lowercase hex string).
    CommitSha
}

impl EmailAddress {
    /// Builds `{login}@{domain}`. Never empty, because a [`Login`] never is.
    pub fn at_domain(login: &Login, domain: &str) -> Self {
        Self(format!("{login}@{domain}"))
    }
}

// ---------------------------------------------------------------------------
// UUID-backed identifiers (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single export run (one invocation of the CLI).
///
/// Generated fresh for every run and recorded on the root tracing span so all
/// activity from a single run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
