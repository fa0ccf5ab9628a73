use crate::adapters::geodb::dto::CountriesPage;
use crate::adapters::geodb::http_client::PageSource;
use crate::utils::context::SyncContext;
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Runs page fetches on their own task. Each call hands back a one-shot
/// receiver that yields exactly one outcome; dropping it abandons the page.
#[derive(Clone)]
pub struct PageProcessor {
    source: Arc<dyn PageSource>,
}

impl PageProcessor {
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self { source }
    }

    pub fn execute(
        &self,
        ctx: &SyncContext,
        endpoint: &str,
        offset: usize,
        limit: usize,
    ) -> oneshot::Receiver<Result<CountriesPage>> {
        let (tx, rx) = oneshot::channel();
        let source = Arc::clone(&self.source);
        let ctx = ctx.clone();
        let endpoint = endpoint.to_string();

        tokio::spawn(async move {
            tracing::debug!(%endpoint, offset, limit, "Page task starting");
            let outcome = source.fetch_page(&ctx, &endpoint, offset, limit).await;

            // The caller may have stopped waiting; the outcome is simply dropped then.
            if tx.send(outcome).is_err() {
                tracing::debug!(%endpoint, offset, "Page outcome discarded, receiver gone");
            }
        });

        rx
    }
}
