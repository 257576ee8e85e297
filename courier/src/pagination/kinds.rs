//! Page shapes shared by many list endpoints.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use super::{PageInfo, Pagination};

/// A page addressed by number.
///
/// The next page is requested with `page = page + 1` until `page` reaches
/// `total_pages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberedPage<T> {
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// 1-based page number.
    pub page: u64,
    /// Items across all pages.
    #[serde(default)]
    pub total_entries: u64,
    /// Number of pages.
    #[serde(default)]
    pub total_pages: u64,
}

impl<T> Pagination for NumberedPage<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Item = T;

    fn paginated_items(&self) -> &[T] {
        &self.data
    }

    fn next_page_info(&self) -> Option<PageInfo> {
        if self.page >= self.total_pages {
            return None;
        }
        let mut params = Map::new();
        params.insert("page".to_string(), Value::from(self.page + 1));
        Some(PageInfo::Params(params))
    }
}

/// A page that links to its successor by URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorPage<T> {
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// Absolute URL of the next page, absent on the last one.
    #[serde(default)]
    pub next_url: Option<Url>,
}

impl<T> Pagination for CursorPage<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Item = T;

    fn paginated_items(&self) -> &[T] {
        &self.data
    }

    fn next_page_info(&self) -> Option<PageInfo> {
        self.next_url.clone().map(PageInfo::Url)
    }
}
