//! Continuation-token pagination.

use std::fmt;
use std::future::Future;

use driveaudit_core::AuditError;
use tokio_util::sync::CancellationToken;

use crate::api::Page;

/// Why a paginated listing stopped before the last page
#[derive(Debug, thiserror::Error)]
pub enum FetchError<T: fmt::Debug> {
    /// Cancellation was observed before a page fetch. Items already
    /// received are kept.
    #[error("listing cancelled after {} items", .partial.len())]
    Cancelled { partial: Vec<T> },

    /// A page fetch failed. Nothing received so far is returned.
    #[error(transparent)]
    Failed(#[from] AuditError),
}

impl<T: fmt::Debug> FetchError<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled { .. })
    }
}

/// Drain a paginated listing into one ordered `Vec`.
///
/// `fetch_page` receives the continuation token (`None` on the first call)
/// and returns one page. The loop ends when a page comes back without a
/// token (or with an empty one). `cancel` is checked before every call.
/// A failed call is wrapped as `AuditError::Api` with `operation` and
/// `target` for context.
pub async fn fetch_all<T, F, Fut>(
    cancel: &CancellationToken,
    operation: &str,
    target: &str,
    mut fetch_page: F,
) -> Result<Vec<T>, FetchError<T>>
where
    T: fmt::Debug,
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = anyhow::Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut page_token: Option<String> = None;
    let mut page_number = 0usize;

    loop {
        if cancel.is_cancelled() {
            tracing::debug!(
                operation,
                target,
                items = items.len(),
                "Listing cancelled"
            );
            return Err(FetchError::Cancelled { partial: items });
        }

        page_number += 1;
        let page = fetch_page(page_token.take())
            .await
            .map_err(|e| AuditError::api(operation, target, e))?;

        tracing::debug!(
            operation,
            target,
            page = page_number,
            received = page.items.len(),
            "Fetched page"
        );

        items.extend(page.items);

        match page.next_page_token.filter(|t| !t.is_empty()) {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(items)
}
