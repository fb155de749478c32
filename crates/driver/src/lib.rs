//! Collection driver for the organization exporter.
//!
//! Sequences one run: list repositories, then for each repository fetch
//! commits and pull requests, map every node to a row through the shared
//! [`collector::IdentityRegistry`], stream the rows into a
//! [`collector::RowSink`], pause, and move on. The user table is written last,
//! once every identity has been seen.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The driver sequences calls between business logic
//! in the [`collector`] crate and infrastructure traits (query source, handle
//! resolver, row sink). It contains no domain rules of its own.
//!
//! ## Failure boundaries
//!
//! | Failure | Handled by | Effect |
//! |---------|------------|--------|
//! | Page *k > 1* of a resource | driver | `PaginationInterrupted` event, partial result kept |
//! | First page of commits / pull requests | driver | `ResourceFailed` event, no rows for that repository |
//! | Handle lookup | identity registry | fallback address |
//! | Repository listing | caller | run fails |
//! | Output write | caller | run fails |

mod executor;
mod summary;

pub use executor::{CollectionDriver, CollectionSettings, DEFAULT_PACING};
pub use summary::RunSummary;
