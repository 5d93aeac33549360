use std::sync::Arc;

use url::Url;

use crate::config::settings::ClientConfig;
use crate::error::ApiResult;
use crate::paging::payload::{convert_categories, entries_converter, CategoryEntry};
use crate::paging::{paginate, PageStream};
use crate::sources::fetch::AuthenticatedFetcher;

/// Client for the categories/entries API.
///
/// Cloning is cheap; clones share the fetcher and therefore the token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) fetcher: Arc<AuthenticatedFetcher>,
    categories_url: Url,
    entry_url: Url,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let fetcher = AuthenticatedFetcher::from_config(&config)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Use an existing fetcher, e.g. to share one token between clients.
    pub fn with_fetcher(config: ClientConfig, fetcher: Arc<AuthenticatedFetcher>) -> ApiResult<Self> {
        let categories_url = config.endpoint_url(&config.endpoints.categories)?;
        let entry_url = config.endpoint_url(&config.endpoints.entry)?;
        Ok(Self {
            config: Arc::new(config),
            fetcher,
            categories_url,
            entry_url,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &Arc<AuthenticatedFetcher> {
        &self.fetcher
    }

    pub fn categories_url(&self) -> &Url {
        &self.categories_url
    }

    /// Entry endpoint with `category=<name>` set
    pub fn entry_url(&self, category: &str) -> Url {
        let mut url = self.entry_url.clone();
        url.query_pairs_mut().append_pair("category", category);
        url
    }

    /// Pages of category names; ends when a page comes back empty
    pub fn get_categories(&self) -> PageStream<Vec<String>> {
        paginate(
            self.fetcher.clone(),
            self.categories_url.clone(),
            convert_categories,
        )
    }

    /// Pages of entries for one category; ends when a page comes back empty
    pub fn get_entries(&self, category: &str) -> PageStream<Vec<CategoryEntry>> {
        paginate(
            self.fetcher.clone(),
            self.entry_url(category),
            entries_converter(category.to_owned()),
        )
    }
}
