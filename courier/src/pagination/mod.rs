//! Auto-pagination over list endpoints.
//!
//! Every list response type implements [`Pagination`]: it hands out the
//! items of the current page and says where the next page lives. The engine
//! is generic over that trait and never looks at concrete page shapes.
//!
//! A list call returns a [`PagePromise`]. Awaiting it yields the first
//! [`Page`]; alternatively [`PagePromise::into_items`] walks every item of
//! every page, fetching the next page only when the current one is
//! exhausted.
//!
//! ## Examples
//!
//! ```rust,ignore
//! use courier::pagination::NumberedPage;
//! use courier::RequestOptions;
//! use futures::TryStreamExt;
//! use serde_json::Value;
//!
//! // One page at a time.
//! let page = client
//!     .get_api_list::<NumberedPage<Value>>("/auth_rules", RequestOptions::new())
//!     .await?;
//! if page.has_next_page() {
//!     let second = page.get_next_page().await?;
//! }
//!
//! // Every item across all pages.
//! let rules: Vec<Value> = client
//!     .get_api_list::<NumberedPage<Value>>("/auth_rules", RequestOptions::new())
//!     .into_items()
//!     .try_collect()
//!     .await?;
//! ```

mod kinds;

use std::future::IntoFuture;
use std::marker::PhantomData;

use futures::future::BoxFuture;
use futures::{stream, Stream, TryStreamExt};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;
use url::form_urlencoded;
use url::Url;

pub use kinds::{CursorPage, NumberedPage};

use crate::client::ApiClient;
use crate::error::{ApiError, PaginationError};
use crate::headers::Headers;
use crate::options::FinalRequestOptions;
use crate::query::to_query_string;
use crate::response::ApiResponse;

/// Where the next page lives.
#[derive(Debug, Clone, PartialEq)]
pub enum PageInfo {
    /// Query parameters merged over the previous request's query.
    Params(Map<String, Value>),
    /// A full URL; its query parameters win over the previous request's.
    Url(Url),
}

/// A decoded list response.
pub trait Pagination: DeserializeOwned + Send + Sync + 'static {
    /// The element type of the list.
    type Item: Clone + Send + 'static;

    /// Items on this page, possibly none.
    fn paginated_items(&self) -> &[Self::Item];

    /// Where the next page lives, or `None` on the last page.
    fn next_page_info(&self) -> Option<PageInfo>;
}

/// One page of a list, able to fetch its successor.
#[derive(Debug, Clone)]
pub struct Page<P> {
    client: ApiClient,
    options: FinalRequestOptions,
    response: ApiResponse<P>,
}

impl<P: Pagination> Page<P> {
    /// Items on this page.
    pub fn items(&self) -> &[P::Item] {
        self.response.paginated_items()
    }

    /// The decoded page body.
    pub fn body(&self) -> &P {
        self.response.data()
    }

    /// Response headers of this page.
    pub fn headers(&self) -> &Headers {
        self.response.headers()
    }

    /// The options that produced this page.
    pub fn options(&self) -> &FinalRequestOptions {
        &self.options
    }

    /// Where the next page lives, as reported by the page body.
    pub fn next_page_info(&self) -> Option<PageInfo> {
        self.response.next_page_info()
    }

    /// Returns `true` if another page should be fetched.
    ///
    /// An empty page is always terminal, whatever it says about a successor.
    pub fn has_next_page(&self) -> bool {
        !self.items().is_empty() && self.next_page_info().is_some()
    }

    /// The options for the next page's request.
    ///
    /// Parameter patches are merged over the previous query. For a next-page
    /// URL the previous query parameters and the URL's own are combined into
    /// the URL, the URL's values winning on conflicts.
    pub fn next_page_options(&self) -> Option<FinalRequestOptions> {
        let info = self.next_page_info()?;
        let mut next = self.options.clone();
        match info {
            PageInfo::Params(params) => {
                let mut query = match next.query.take() {
                    Some(Value::Object(query)) => query,
                    _ => Map::new(),
                };
                query.extend(params);
                next.query = Some(Value::Object(query));
            }
            PageInfo::Url(mut url) => {
                let mut pairs: Vec<(String, String)> = next
                    .query
                    .take()
                    .map(|query| {
                        form_urlencoded::parse(to_query_string(&query).as_bytes())
                            .into_owned()
                            .collect()
                    })
                    .unwrap_or_default();
                for (key, value) in url.query_pairs().into_owned() {
                    match pairs.iter_mut().find(|(existing, _)| *existing == key) {
                        Some(slot) => slot.1 = value,
                        None => pairs.push((key, value)),
                    }
                }
                if pairs.is_empty() {
                    url.set_query(None);
                } else {
                    url.query_pairs_mut().clear().extend_pairs(&pairs);
                }
                next.path = url.to_string();
            }
        }
        Some(next)
    }

    /// Fetches the next page.
    ///
    /// ## Errors
    ///
    /// Returns [`PaginationError::NoNextPage`] when
    /// [`has_next_page`](Self::has_next_page) is `false`, and any request
    /// error otherwise.
    pub async fn get_next_page(&self) -> Result<Page<P>, ApiError> {
        if !self.has_next_page() {
            return Err(PaginationError::NoNextPage.into());
        }
        let options = self.next_page_options().ok_or(PaginationError::NoNextPage)?;
        fetch_page(&self.client, options).await
    }

    /// This page followed by every later page, each fetched on demand.
    pub fn iter_pages(self) -> impl Stream<Item = Result<Page<P>, ApiError>> + Send + 'static {
        let client = self.client.clone();
        stream::try_unfold(
            (Some(self), None::<FinalRequestOptions>, client),
            |(current, next, client)| async move {
                let page = match (current, next) {
                    (Some(page), _) => page,
                    (None, Some(options)) => fetch_page(&client, options).await?,
                    (None, None) => return Ok(None),
                };
                let following = if page.has_next_page() {
                    page.next_page_options()
                } else {
                    None
                };
                Ok::<_, ApiError>(Some((page, (None, following, client))))
            },
        )
    }

    /// Every item of this page and of every later page, in order.
    pub fn into_items(self) -> impl Stream<Item = Result<P::Item, ApiError>> + Send + 'static {
        self.iter_pages()
            .map_ok(|page| stream::iter(page.items().to_vec().into_iter().map(Ok)))
            .try_flatten()
    }
}

async fn fetch_page<P: Pagination>(
    client: &ApiClient,
    options: FinalRequestOptions,
) -> Result<Page<P>, ApiError> {
    debug!(path = %options.path, "Fetching page");
    let response = client.request::<P>(options.clone()).await?;
    Ok(Page {
        client: client.clone(),
        options,
        response,
    })
}

/// A pending first page that can also be consumed as a sequence.
///
/// Awaiting it yields the first [`Page`]; [`into_items`](Self::into_items)
/// and [`into_pages`](Self::into_pages) skip straight to iteration.
#[must_use = "a page promise does nothing until awaited or iterated"]
pub struct PagePromise<P> {
    client: ApiClient,
    options: FinalRequestOptions,
    _page: PhantomData<fn() -> P>,
}

impl<P> std::fmt::Debug for PagePromise<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagePromise")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<P: Pagination> PagePromise<P> {
    pub(crate) fn new(client: ApiClient, options: FinalRequestOptions) -> Self {
        Self {
            client,
            options,
            _page: PhantomData,
        }
    }

    /// The options of the first request.
    pub fn options(&self) -> &FinalRequestOptions {
        &self.options
    }

    /// Every page, starting with the first.
    pub fn into_pages(self) -> impl Stream<Item = Result<Page<P>, ApiError>> + Send + 'static {
        stream::once(self.into_future())
            .map_ok(Page::iter_pages)
            .try_flatten()
    }

    /// Every item of every page.
    pub fn into_items(self) -> impl Stream<Item = Result<P::Item, ApiError>> + Send + 'static {
        stream::once(self.into_future())
            .map_ok(Page::into_items)
            .try_flatten()
    }
}

impl<P: Pagination> IntoFuture for PagePromise<P> {
    type Output = Result<Page<P>, ApiError>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let PagePromise {
            client, options, ..
        } = self;
        Box::pin(async move { fetch_page(&client, options).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::HttpMethod;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, Deserialize)]
    struct LinkPage {
        data: Vec<u32>,
        next: Option<Url>,
    }

    impl Pagination for LinkPage {
        type Item = u32;

        fn paginated_items(&self) -> &[u32] {
            &self.data
        }

        fn next_page_info(&self) -> Option<PageInfo> {
            self.next.clone().map(PageInfo::Url)
        }
    }

    fn page<P>(body: P, query: Option<Value>) -> Page<P> {
        let mut options = FinalRequestOptions::new(HttpMethod::Get, "/items");
        options.query = query;
        Page {
            client: ApiClient::builder("https://api.example.com").build().unwrap(),
            options,
            response: ApiResponse::new(body, Headers::new()),
        }
    }

    #[test]
    fn test_empty_page_is_terminal() {
        let page = page(
            LinkPage {
                data: vec![],
                next: Some(Url::parse("https://api.example.com/items?cursor=x").unwrap()),
            },
            None,
        );
        assert!(page.next_page_info().is_some());
        assert!(!page.has_next_page());
    }

    #[test]
    fn test_url_merge_prefers_url_values() {
        let page = page(
            LinkPage {
                data: vec![1],
                next: Some(Url::parse("https://api.example.com/items?b=3&c=4").unwrap()),
            },
            Some(json!({"a": 1, "b": 2})),
        );
        let next = page.next_page_options().unwrap();
        assert!(next.query.is_none());

        let url = Url::parse(&next.path).unwrap();
        let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "3".to_string()),
                ("c".to_string(), "4".to_string()),
            ]
        );
        assert_eq!(url.path(), "/items");
    }

    #[test]
    fn test_params_merge_over_query() {
        let page = page(
            NumberedPage::<u32> {
                data: vec![1],
                page: 1,
                total_entries: 4,
                total_pages: 2,
            },
            Some(json!({"page_size": 2, "page": 1})),
        );
        let next = page.next_page_options().unwrap();
        assert_eq!(next.query, Some(json!({"page_size": 2, "page": 2})));
        assert_eq!(next.path, "/items");
    }

    #[tokio::test]
    async fn test_get_next_page_on_last_page_is_usage_error() {
        let page = page(
            LinkPage {
                data: vec![1],
                next: None,
            },
            None,
        );
        let err = page.get_next_page().await.unwrap_err();
        assert!(matches!(err, ApiError::Pagination(PaginationError::NoNextPage)));
    }

    #[tokio::test]
    async fn test_single_page_iteration() {
        let page = page(
            LinkPage {
                data: vec![7, 8],
                next: None,
            },
            None,
        );
        let items: Vec<u32> = page.into_items().try_collect().await.unwrap();
        assert_eq!(items, vec![7, 8]);
    }
}
