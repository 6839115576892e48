//! This module contains the `OrderPaginator`, which walks a paginated order
//! query from the first page to the last.

use std::sync::Arc;

use thiserror::Error;

use super::{
    filter::OrderFilter,
    traits::{OrderPage, OrderSelection, OrderSource, PageRequest, SourceError},
};
use crate::{config::FetchConfig, models::Order};

/// Number of orders requested per page.
pub const PAGE_SIZE: u32 = 250;

/// Custom error type for paginated walks.
#[derive(Error, Debug)]
pub enum FetchError {
    /// A page request kept failing until the retry budget ran out.
    #[error("Page {page} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Zero-based page index.
        page: usize,
        /// Number of attempts made.
        attempts: u32,
        /// The error of the final attempt.
        #[source]
        source: SourceError,
    },
}

/// Walks every page of an order query with per-page retries.
///
/// Nothing is cached between walks; every call starts from the first page.
#[derive(Clone)]
pub struct OrderPaginator {
    source: Arc<dyn OrderSource>,
    retry: FetchConfig,
}

impl OrderPaginator {
    /// Creates a new `OrderPaginator`.
    pub fn new(source: Arc<dyn OrderSource>, retry: FetchConfig) -> Self {
        Self { source, retry }
    }

    /// The underlying order source.
    pub fn source(&self) -> &Arc<dyn OrderSource> {
        &self.source
    }

    /// Fetches every order matching `filter`, following continuation cursors
    /// until the upstream reports no further pages.
    ///
    /// Fails without partial results if any page exhausts its retries.
    #[tracing::instrument(skip(self, filter), fields(tagged = filter.is_tagged()), level = "debug")]
    pub async fn fetch_all(
        &self,
        filter: &OrderFilter,
        selection: OrderSelection,
    ) -> Result<Vec<Order>, FetchError> {
        let mut request =
            PageRequest { filter: filter.to_string(), selection, cursor: None, page_size: PAGE_SIZE };
        let mut orders = Vec::new();
        let mut page_index = 0;

        loop {
            let page = self.fetch_page_with_retry(&request, page_index).await?;
            orders.extend(page.orders);

            if !page.has_next_page {
                break;
            }
            match page.end_cursor {
                Some(cursor) => request.cursor = Some(cursor),
                None => {
                    tracing::warn!(
                        page = page_index,
                        "Upstream reported another page without a cursor. Stopping walk."
                    );
                    break;
                }
            }
            page_index += 1;
        }

        tracing::debug!(pages = page_index + 1, order_count = orders.len(), "Pagination complete.");
        Ok(orders)
    }

    async fn fetch_page_with_retry(
        &self,
        request: &PageRequest,
        page: usize,
    ) -> Result<OrderPage, FetchError> {
        let attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match self.source.fetch_orders_page(request).await {
                Ok(page) => return Ok(page),
                Err(source) if attempt + 1 >= attempts => {
                    tracing::error!(page, attempts, error = %source, "Page request failed, giving up.");
                    return Err(FetchError::RetriesExhausted { page, attempts, source });
                }
                Err(e) => {
                    let delay = self.retry.backoff_after(attempt);
                    tracing::warn!(
                        page,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Page request failed, retrying."
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
