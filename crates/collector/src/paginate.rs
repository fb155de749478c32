//! Generic cursor-walk over a paginated source.
//!
//! The paginator knows nothing about what it fetches. It calls `fetch_page`
//! with `None` first, then with each page's `end_cursor`, strictly one request
//! at a time, until a page reports `has_next_page == false`.
//!
//! A failed page ends the walk without failing it: everything collected so far
//! is kept alongside the cause. A transient failure on page *k* still yields
//! pages *1..k-1*; the caller decides how to report it. The source is trusted
//! not to repeat items across pages and to terminate.

use std::future::Future;

use crate::{Cursor, FetchError, Page};

/// Outcome of walking a paginated source.
///
/// `error` with `pages == 0` means the very first request failed and nothing
/// was fetched. `error` with `pages > 0` means the walk was cut short and
/// `items` is a partial result.
#[derive(Debug, Clone, PartialEq)]
pub struct PageWalk<T> {
    /// Items from every successfully fetched page, in page order.
    pub items: Vec<T>,
    /// Number of pages fetched successfully.
    pub pages: usize,
    /// The failure that ended the walk early, if any.
    pub error: Option<FetchError>,
}

/// Walks `fetch_page` to exhaustion, reporting how the walk ended.
pub async fn walk<T, F, Fut>(mut fetch_page: F) -> PageWalk<T>
where
    F: FnMut(Option<Cursor>) -> Fut,
    Fut: Future<Output = Result<Page<T>, FetchError>>,
{
    let mut items = Vec::new();
    let mut pages = 0;
    let mut cursor: Option<Cursor> = None;

    loop {
        let page = match fetch_page(cursor.take()).await {
            Ok(page) => page,
            Err(error) => {
                return PageWalk {
                    items,
                    pages,
                    error: Some(error),
                };
            }
        };

        pages += 1;
        items.extend(page.data);

        if !page.page_info.has_next_page {
            break;
        }

        match page.page_info.end_cursor {
            Some(next) => cursor = Some(next),
            None => {
                // Continuing with no cursor would restart from the first page.
                tracing::warn!(pages, "Source reported another page but no cursor; stopping");
                break;
            }
        }
    }

    PageWalk {
        items,
        pages,
        error: None,
    }
}

/// Walks `fetch_page` to exhaustion and returns every item collected.
///
/// Never fails: if a page request fails, the items gathered before it are
/// returned and the error is logged.
pub async fn fetch_all<T, F, Fut>(fetch_page: F) -> Vec<T>
where
    F: FnMut(Option<Cursor>) -> Fut,
    Fut: Future<Output = Result<Page<T>, FetchError>>,
{
    let outcome = walk(fetch_page).await;
    if let Some(error) = &outcome.error {
        tracing::warn!(
            pages = outcome.pages,
            items = outcome.items.len(),
            error = %error,
            "Pagination stopped early, keeping partial result"
        );
    }
    outcome.items
}
