use crate::adapters::geodb::dto::CountryDto;
use crate::adapters::geodb::processor::PageProcessor;
use crate::utils::context::SyncContext;
use crate::utils::error::{Result, SyncError};

/// Offset cursor over the countries endpoint.
///
/// One fetch is in flight at a time. Once `has_next` turns false it stays
/// false and `next_page` returns an empty page without touching the network.
pub struct Paginator {
    processor: PageProcessor,
    endpoint: String,
    offset: usize,
    limit: usize,
    total_count: Option<usize>,
    has_next: bool,
}

impl Paginator {
    pub fn new(processor: PageProcessor, endpoint: impl Into<String>, limit: usize) -> Self {
        Self {
            processor,
            endpoint: endpoint.into(),
            offset: 0,
            limit: limit.max(1),
            total_count: None,
            has_next: true,
        }
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    /// Known after the first non-empty page; later pages never change it.
    pub fn total_count(&self) -> Option<usize> {
        self.total_count
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub async fn next_page(&mut self, ctx: &SyncContext) -> Result<Vec<CountryDto>> {
        if !self.has_next {
            return Ok(Vec::new());
        }

        tracing::debug!(
            endpoint = %self.endpoint,
            offset = self.offset,
            limit = self.limit,
            "Requesting next page"
        );

        let receiver = self
            .processor
            .execute(ctx, &self.endpoint, self.offset, self.limit);

        let outcome = tokio::select! {
            biased;
            reason = ctx.done() => Err(SyncError::cancelled(reason)),
            received = receiver => received.unwrap_or(Err(SyncError::WorkerDropped)),
        };

        let page = match outcome {
            Ok(page) => page,
            Err(err) => {
                self.has_next = false;
                return Err(err.at_page(&self.endpoint, self.offset));
            }
        };

        if page.is_empty() {
            tracing::debug!(offset = self.offset, "Empty page, no more data");
            self.has_next = false;
            return Ok(Vec::new());
        }

        match (self.total_count, page.total_count) {
            (None, Some(total)) => {
                tracing::info!(endpoint = %self.endpoint, total, "Discovered total count");
                self.total_count = Some(total);
            }
            (None, None) => {
                tracing::warn!(
                    offset = self.offset,
                    "Page carries no total count, paging until an empty page"
                );
            }
            (Some(known), Some(reported)) if known != reported => {
                tracing::debug!(reported, known, "Ignoring changed total count");
            }
            _ => {}
        }

        self.offset += page.records.len();
        if let Some(total) = self.total_count {
            if self.offset >= total {
                self.has_next = false;
            }
        }

        Ok(page.records)
    }
}
