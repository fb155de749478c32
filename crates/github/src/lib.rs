//! GitHub infrastructure adapter for the organization exporter.
//!
//! Implements the query-side ports defined in the [`collector`] crate
//! (`OrganizationSource`, `HandleResolver`) over GitHub's GraphQL and REST
//! APIs using [`reqwest`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! All GitHub API details (query text, wire shapes, authentication, status
//! handling) live here; the [`collector`] crate never sees them. Pagination is
//! delegated to [`collector::walk`] so the failure-tolerance rules stay in the
//! domain.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`client`] | `GithubClient`: authenticated GraphQL and REST transport |
//! | [`queries`] | GraphQL documents |
//! | [`wire`] | Response shapes and their conversion into domain nodes |
//! | `source` | Port implementations |

pub mod client;
pub mod queries;
pub mod wire;

mod source;

pub use client::{GithubClient, GithubConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT};
