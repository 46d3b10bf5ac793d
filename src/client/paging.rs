//! Continuation-token pagination.
//!
//! Listing and search endpoints return one page at a time plus an opaque
//! token; [`collect_all_pages`] walks the token chain to exhaustion and
//! buffers everything in memory. Callers needing true streaming should drive
//! the page calls themselves.

use std::future::Future;

use crate::error::Result;
use crate::types::Page;

/// Collect every item of a paginated listing.
///
/// `fetch` is invoked with `None` first, then with each continuation token
/// the server hands back, until a page arrives without one. A page that
/// carries a token but no items continues the walk — only the token's absence
/// terminates it. If a page call fails mid-stream the failure is logged and
/// whatever was gathered so far is returned; there is no restart.
pub(crate) async fn collect_all_pages<T, F, Fut>(mut fetch: F) -> Vec<T>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut token: Option<String> = None;

    loop {
        match fetch(token.take()).await {
            Ok(page) => {
                items.extend(page.items);
                match page.continuation_token {
                    Some(next) => token = Some(next),
                    None => break,
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    gathered = items.len(),
                    "listing failed mid-pagination, returning what was gathered"
                );
                break;
            }
        }
    }

    items
}
