//! JSON converters for the categories and entries pages.
//! An empty collection is reported as [`ApiError::NoMoreData`].

use std::fmt;

use serde::Deserialize;

use crate::error::{ApiError, ApiResult};

/// One linked record of a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub category: String,
    pub link: String,
}

impl CategoryEntry {
    pub fn new(category: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            link: link.into(),
        }
    }
}

impl fmt::Display for CategoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.link)
    }
}

#[derive(Debug, Deserialize)]
struct CategoriesPage {
    categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EntryProperty {
    #[serde(rename = "Link")]
    link: String,
}

// the entries endpoint reuses the `categories` key for its records
#[derive(Debug, Deserialize)]
struct EntriesPage {
    #[serde(rename = "categories")]
    properties: Vec<EntryProperty>,
}

fn non_empty<T>(items: Vec<T>) -> ApiResult<Vec<T>> {
    if items.is_empty() {
        Err(ApiError::NoMoreData)
    } else {
        Ok(items)
    }
}

pub fn convert_categories(payload: &[u8]) -> ApiResult<Vec<String>> {
    let page: CategoriesPage = serde_json::from_slice(payload)?;
    non_empty(page.categories)
}

/// Converter for the entry pages of `category`
pub fn entries_converter(
    category: String,
) -> impl Fn(&[u8]) -> ApiResult<Vec<CategoryEntry>> + Send + Sync + 'static {
    move |payload: &[u8]| {
        let page: EntriesPage = serde_json::from_slice(payload)?;
        let entries = page
            .properties
            .into_iter()
            .map(|p| CategoryEntry::new(category.clone(), p.link))
            .collect();
        non_empty(entries)
    }
}
