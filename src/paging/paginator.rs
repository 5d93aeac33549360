use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::observability::metrics::get_metrics;
use crate::sources::fetch::AuthenticatedFetcher;

/// At most one page is fetched ahead of the consumer
const PAGE_BUFFER: usize = 1;

pub const PAGE_PARAM: &str = "page";

/// Stream of converted pages, in page order
pub type PageStream<T> = Pin<Box<dyn Stream<Item = ApiResult<T>> + Send>>;

/// Turns one raw page payload into a typed value.
///
/// An empty page must come back as [`ApiError::NoMoreData`]: the paginator
/// has no other way to know the sequence ended.
pub trait PayloadConverter<T>: Send + Sync + 'static {
    fn convert(&self, payload: &[u8]) -> ApiResult<T>;
}

impl<T, F> PayloadConverter<T> for F
where
    F: Fn(&[u8]) -> ApiResult<T> + Send + Sync + 'static,
{
    fn convert(&self, payload: &[u8]) -> ApiResult<T> {
        self(payload)
    }
}

/// Copy of `base` with the `page` query parameter set, other parameters kept
pub fn with_page(base: &Url, page: u32) -> Url {
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(PAGE_PARAM, &page.to_string());
    url
}

/// Fetch `base` page by page (1, 2, 3, ...) on a background task.
///
/// The stream ends without an item once the converter reports
/// [`ApiError::NoMoreData`]. A fetch failure or any other converter error is
/// pushed as the last item. A page is fetched only once the previous one
/// has been taken off the stream. Dropping the stream stops the task.
pub fn paginate<T, C>(fetcher: Arc<AuthenticatedFetcher>, base: Url, converter: C) -> PageStream<T>
where
    T: Send + 'static,
    C: PayloadConverter<T>,
{
    let (tx, rx) = mpsc::channel(PAGE_BUFFER);

    tokio::spawn(async move {
        let metrics = get_metrics().await;
        let path = base.path().to_owned();
        let mut page: u32 = 1;

        loop {
            // hold the slot before fetching so at most one page waits unread
            let permit = match tx.reserve().await {
                Ok(permit) => permit,
                Err(_) => {
                    debug!("page stream for {} dropped at page {}", path, page);
                    return;
                }
            };

            let url = with_page(&base, page);
            let payload = match fetcher.fetch(&url).await {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("fetching {} failed, closing page stream: {}", url, e);
                    permit.send(Err(e));
                    return;
                }
            };

            match converter.convert(&payload) {
                Ok(value) => {
                    permit.send(Ok(value));
                    metrics.pages_emitted.with_label_values(&[path.as_str()]).inc();
                    page += 1;
                }
                Err(ApiError::NoMoreData) => {
                    debug!("{} exhausted after {} pages", path, page - 1);
                    return;
                }
                Err(e) => {
                    warn!("page {} of {} could not be converted: {}", page, path, e);
                    permit.send(Err(e));
                    return;
                }
            }
        }
    });

    Box::pin(ReceiverStream::new(rx))
}
