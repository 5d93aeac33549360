use tokio::sync::mpsc::{self, Sender};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::{debug, error, info};

use crate::api::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::paging::{CategoryEntry, PageStream};

pub type ApiStream = PageStream<Vec<CategoryEntry>>;

type EntrySender = Sender<ApiResult<Vec<CategoryEntry>>>;

/// Why the walk over categories stopped early
enum Halt {
    Fatal(ApiError),
    ReceiverDropped,
}

impl ApiClient {
    /// Every entry page of every category, category by category.
    ///
    /// Ends with a single `Err(ApiError::NoMoreData)` once all categories are
    /// exhausted. A fatal error is emitted once and closes the stream; entries
    /// already emitted stay valid. Single pass, not restartable.
    pub fn get_apis(&self) -> ApiStream {
        let (tx, rx) = mpsc::channel(1);
        let client = self.clone();

        tokio::spawn(async move {
            match client.forward_all_categories(&tx).await {
                Ok(()) => {
                    info!("all categories exhausted");
                    let _ = tx.send(Err(ApiError::NoMoreData)).await;
                }
                Err(Halt::Fatal(e)) => {
                    error!("fetching apis aborted: {}", e);
                    let _ = tx.send(Err(e)).await;
                }
                Err(Halt::ReceiverDropped) => {
                    debug!("apis stream dropped by consumer");
                }
            }
        });

        Box::pin(ReceiverStream::new(rx))
    }

    async fn forward_all_categories(&self, tx: &EntrySender) -> Result<(), Halt> {
        let mut categories = self.get_categories();

        while let Some(page) = categories.next().await {
            let page = page.map_err(Halt::Fatal)?;
            debug!("received {} categories", page.len());

            for category in page {
                self.forward_category(&category, tx).await?;
            }
        }
        Ok(())
    }

    // a closed entry stream means the category ran out of pages;
    // the next page is pulled only once the consumer freed the slot
    async fn forward_category(&self, category: &str, tx: &EntrySender) -> Result<(), Halt> {
        let mut entries = self.get_entries(category);
        let mut pages = 0usize;

        loop {
            let permit = tx.reserve().await.map_err(|_| Halt::ReceiverDropped)?;
            let Some(page) = entries.next().await else {
                break;
            };
            let page = page.map_err(Halt::Fatal)?;
            pages += 1;
            permit.send(Ok(page));
        }

        debug!("category '{}' exhausted after {} pages", category, pages);
        Ok(())
    }
}
