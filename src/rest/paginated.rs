//! Paginated collections and the client seam used to follow their links.
//!
//! A JSON array response becomes a [`PaginatedResponse`]. Once the response
//! headers are attached and a paging client is set, it can navigate to the
//! first/previous/next/last page and iterate across all pages.
//!
//! Pages are always fetched one at a time, strictly forward, and only when
//! the caller asks for an element or page that is not yet loaded.
//!
//! # Example
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//! use gitlab_api::{Client, RequestOptions};
//!
//! let projects = client
//!     .get("/projects", RequestOptions::new().query_param("per_page", "100"))
//!     .await?
//!     .into_collection()
//!     .unwrap();
//!
//! // The first 250 projects, fetching only the pages needed
//! let some = projects.clone().paginate_with_limit(250).await?;
//!
//! // Or stream every project lazily
//! let mut stream = projects.lazy_paginate();
//! while let Some(project) = stream.try_next().await? {
//!     println!("{}", project["path_with_namespace"].as_str().unwrap_or_default());
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::ops::{ControlFlow, Index};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

use crate::clients::HttpError;
use crate::config::Endpoint;
use crate::rest::{PageLinks, ResponseBody, Value};

/// A client able to GET a page by its request path.
///
/// [`Client`](crate::Client) implements this; tests and alternative
/// transports can provide their own. Collections returned without a paging
/// client inherit the one that fetched them when iterated.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// The endpoint that request paths are relative to.
    fn endpoint(&self) -> &Endpoint;

    /// Issues a GET for `path` (relative to [`endpoint`](Self::endpoint)).
    async fn fetch_page(&self, path: &str) -> Result<ResponseBody, HttpError>;
}

/// One page of a JSON array response.
///
/// Elements are accessible by index and iteration. Pagination links are
/// absent until [`attach_headers`](Self::attach_headers) is called, and page
/// navigation returns `Ok(None)` until a paging client is set.
#[derive(Clone, Default)]
pub struct PaginatedResponse {
    items: Vec<Value>,
    links: Option<PageLinks>,
    client: Option<Arc<dyn PageFetcher>>,
}

impl PaginatedResponse {
    /// Creates a collection with no links and no paging client.
    #[must_use]
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items,
            links: None,
            client: None,
        }
    }

    /// Parses the `Link` header from response headers and stores the result.
    ///
    /// Calling this again replaces the previous links.
    pub fn attach_headers(&mut self, headers: &HashMap<String, Vec<String>>) {
        self.links = Some(PageLinks::from_headers(headers));
    }

    /// Sets the client used to fetch further pages.
    pub fn set_client(&mut self, client: Arc<dyn PageFetcher>) {
        self.client = Some(client);
    }

    /// Returns the parsed pagination links, if headers were attached.
    #[must_use]
    pub const fn links(&self) -> Option<&PageLinks> {
        self.links.as_ref()
    }

    /// Returns `true` if a first-page link is present.
    #[must_use]
    pub fn has_first_page(&self) -> bool {
        self.link(|l| &l.first).is_some()
    }

    /// Returns `true` if a previous-page link is present.
    #[must_use]
    pub fn has_prev_page(&self) -> bool {
        self.link(|l| &l.prev).is_some()
    }

    /// Returns `true` if a next-page link is present.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.link(|l| &l.next).is_some()
    }

    /// Returns `true` if a last-page link is present.
    #[must_use]
    pub fn has_last_page(&self) -> bool {
        self.link(|l| &l.last).is_some()
    }

    /// Fetches the first page.
    ///
    /// Returns `Ok(None)` without a paging client or a first-page link.
    ///
    /// # Errors
    ///
    /// Returns any [`HttpError`] raised by the request.
    pub async fn first_page(&self) -> Result<Option<ResponseBody>, HttpError> {
        self.follow(self.link(|l| &l.first)).await
    }

    /// Fetches the previous page.
    ///
    /// # Errors
    ///
    /// Returns any [`HttpError`] raised by the request.
    pub async fn prev_page(&self) -> Result<Option<ResponseBody>, HttpError> {
        self.follow(self.link(|l| &l.prev)).await
    }

    /// Fetches the next page.
    ///
    /// # Errors
    ///
    /// Returns any [`HttpError`] raised by the request.
    pub async fn next_page(&self) -> Result<Option<ResponseBody>, HttpError> {
        self.follow(self.link(|l| &l.next)).await
    }

    /// Fetches the last page.
    ///
    /// # Errors
    ///
    /// Returns any [`HttpError`] raised by the request.
    pub async fn last_page(&self) -> Result<Option<ResponseBody>, HttpError> {
        self.follow(self.link(|l| &l.last)).await
    }

    /// Calls `visitor` with this page and then with every following page.
    ///
    /// Each next page is requested only after the visitor returned for the
    /// previous one. Returning [`ControlFlow::Break`] stops without issuing
    /// another request.
    ///
    /// # Errors
    ///
    /// Returns the first [`HttpError`] raised while fetching a page.
    pub async fn each_page<F>(self, mut visitor: F) -> Result<(), HttpError>
    where
        F: FnMut(&Self) -> ControlFlow<()>,
    {
        let mut current = self;
        loop {
            if visitor(&current).is_break() {
                return Ok(());
            }
            match current.fetch_next().await? {
                Some(next) => current = next,
                None => return Ok(()),
            }
        }
    }

    /// Streams elements across all pages, fetching each page on demand.
    ///
    /// The stream is forward-only: pulling element *k* fetches at most the
    /// page that contains it. Dropping the stream stops pagination.
    #[must_use]
    pub fn lazy_paginate(self) -> BoxStream<'static, Result<Value, HttpError>> {
        stream::try_unfold(PageCursor::Start(self), advance)
            .map_ok(|items| stream::iter(items.into_iter().map(Ok)))
            .try_flatten()
            .boxed()
    }

    /// Collects every element of every page.
    ///
    /// This issues one request per page until the last page; on large result
    /// sets that can be many requests.
    ///
    /// # Errors
    ///
    /// Returns the first [`HttpError`] raised while fetching a page.
    pub async fn auto_paginate(self) -> Result<Vec<Value>, HttpError> {
        self.lazy_paginate().try_collect().await
    }

    /// Calls `visitor` on every element of every page without collecting them.
    ///
    /// Returning [`ControlFlow::Break`] stops before the next element, so no
    /// further page is requested.
    ///
    /// # Errors
    ///
    /// Returns the first [`HttpError`] raised while fetching a page.
    pub async fn auto_paginate_each<F>(self, visitor: F) -> Result<(), HttpError>
    where
        F: FnMut(Value) -> ControlFlow<()>,
    {
        visit(self.lazy_paginate(), visitor).await
    }

    /// Collects at most `limit` elements across pages.
    ///
    /// Pages beyond the one holding element `limit` are never requested.
    ///
    /// # Errors
    ///
    /// Returns the first [`HttpError`] raised while fetching a page.
    pub async fn paginate_with_limit(self, limit: usize) -> Result<Vec<Value>, HttpError> {
        self.lazy_paginate().take(limit).try_collect().await
    }

    /// Calls `visitor` on at most `limit` elements across pages.
    ///
    /// The visitor can stop earlier by returning [`ControlFlow::Break`].
    ///
    /// # Errors
    ///
    /// Returns the first [`HttpError`] raised while fetching a page.
    pub async fn paginate_with_limit_each<F>(self, limit: usize, visitor: F) -> Result<(), HttpError>
    where
        F: FnMut(Value) -> ControlFlow<()>,
    {
        visit(self.lazy_paginate().take(limit).boxed(), visitor).await
    }

    /// Returns the number of elements on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if this page has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the element at `index` on this page.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// Iterates over the elements of this page.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    /// Returns the elements of this page.
    #[must_use]
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Takes the elements of this page, dropping links and client.
    #[must_use]
    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    fn link(&self, slot: impl Fn(&PageLinks) -> &Option<String>) -> Option<&str> {
        self.links.as_ref().and_then(|l| slot(l).as_deref())
    }

    async fn follow(&self, link: Option<&str>) -> Result<Option<ResponseBody>, HttpError> {
        let (Some(client), Some(link)) = (self.client.as_ref(), link) else {
            return Ok(None);
        };
        let path = request_path(client.endpoint(), link);
        tracing::debug!(path, "Following pagination link");
        client.fetch_page(path).await.map(Some)
    }

    /// Fetches the next page as a collection.
    ///
    /// A page returned without a paging client inherits this one.
    async fn fetch_next(&self) -> Result<Option<Self>, HttpError> {
        match self.next_page().await? {
            None => Ok(None),
            Some(ResponseBody::Collection(mut page)) => {
                if page.client.is_none() {
                    page.client = self.client.clone();
                }
                Ok(Some(page))
            }
            Some(_) => Err(HttpError::UnexpectedPageBody {
                path: self.link(|l| &l.next).unwrap_or_default().to_string(),
            }),
        }
    }
}

impl fmt::Debug for PaginatedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginatedResponse")
            .field("items", &self.items)
            .field("links", &self.links)
            .field("has_client", &self.client.is_some())
            .finish()
    }
}

impl Index<usize> for PaginatedResponse {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.items[index]
    }
}

impl IntoIterator for PaginatedResponse {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a PaginatedResponse {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Feeds stream elements to `visitor` until it breaks or the stream ends.
async fn visit<F>(
    mut values: BoxStream<'static, Result<Value, HttpError>>,
    mut visitor: F,
) -> Result<(), HttpError>
where
    F: FnMut(Value) -> ControlFlow<()>,
{
    while let Some(value) = values.try_next().await? {
        if visitor(value).is_break() {
            break;
        }
    }
    Ok(())
}

enum PageCursor {
    Start(PaginatedResponse),
    After(PaginatedResponse),
}

/// Yields the current page's elements and remembers the page for the next step.
async fn advance(
    cursor: PageCursor,
) -> Result<Option<(Vec<Value>, PageCursor)>, HttpError> {
    let mut page = match cursor {
        PageCursor::Start(page) => page,
        PageCursor::After(previous) => match previous.fetch_next().await? {
            Some(page) => page,
            None => return Ok(None),
        },
    };
    let items = std::mem::take(&mut page.items);
    Ok(Some((items, PageCursor::After(page))))
}

/// Reduces an absolute link to a path relative to `endpoint`.
///
/// The link is matched on its request path rather than its full authority,
/// so a link whose scheme or port differs from the endpoint still resolves.
fn request_path<'a>(endpoint: &Endpoint, link: &'a str) -> &'a str {
    if let Some(rest) = strip_base(link, endpoint.as_ref()) {
        return rest;
    }

    let without_scheme = link.find("://").map_or(link, |i| &link[i + 3..]);
    let path = if link.contains("://") {
        without_scheme
            .find(['/', '?'])
            .map_or("", |i| &without_scheme[i..])
    } else {
        link
    };

    strip_base(path, endpoint.path()).unwrap_or(path)
}

/// Strips `base` from `value` only on a path boundary.
fn strip_base<'a>(value: &'a str, base: &str) -> Option<&'a str> {
    let rest = value.strip_prefix(base)?;
    (rest.is_empty() || rest.starts_with(['/', '?'])).then_some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serves canned pages keyed by request path and records every request.
    struct FakeClient {
        endpoint: Endpoint,
        pages: HashMap<String, (serde_json::Value, Option<String>)>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeClient {
        fn new(endpoint: &str) -> Self {
            Self {
                endpoint: Endpoint::new(endpoint).unwrap(),
                pages: HashMap::new(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn page(mut self, path: &str, body: serde_json::Value, link: Option<&str>) -> Self {
            self.pages
                .insert(path.to_string(), (body, link.map(ToString::to_string)));
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for FakeClient {
        fn endpoint(&self) -> &Endpoint {
            &self.endpoint
        }

        async fn fetch_page(&self, path: &str) -> Result<ResponseBody, HttpError> {
            self.requests.lock().unwrap().push(path.to_string());
            let (body, link) = self.pages.get(path).cloned().unwrap_or_default();
            let mut response = ResponseBody::from_decoded(Some(body));
            if let ResponseBody::Collection(page) = &mut response {
                let mut headers = HashMap::new();
                if let Some(link) = link {
                    headers.insert("link".to_string(), vec![link]);
                }
                page.attach_headers(&headers);
            }
            Ok(response)
        }
    }

    const ENDPOINT: &str = "http://host/api/v3";

    fn next_link(page: u32) -> String {
        format!(r#"<{ENDPOINT}/projects?page={page}>; rel="next""#)
    }

    fn numbers(values: &[Value]) -> Vec<i64> {
        values.iter().filter_map(Value::as_i64).collect()
    }

    /// `[1,2,3,4]` with a next link to `[5,6,7,8]`, which has none.
    fn two_pages() -> (PaginatedResponse, Arc<FakeClient>) {
        let fake = Arc::new(FakeClient::new(ENDPOINT).page(
            "/projects?page=2",
            serde_json::json!([5, 6, 7, 8]),
            None,
        ));
        let mut first = ResponseBody::from_decoded(Some(serde_json::json!([1, 2, 3, 4])))
            .into_collection()
            .unwrap();
        let mut headers = HashMap::new();
        headers.insert("link".to_string(), vec![next_link(2)]);
        first.attach_headers(&headers);
        first.set_client(fake.clone());
        (first, fake)
    }

    #[test]
    fn test_request_path_strips_endpoint() {
        let endpoint = Endpoint::new("http://host/api/v3").unwrap();
        assert_eq!(
            request_path(&endpoint, "http://host/api/v3/projects?page=2"),
            "/projects?page=2"
        );
    }

    #[test]
    fn test_request_path_matches_by_path_not_authority() {
        let endpoint = Endpoint::new("https://host/api/v3").unwrap();
        assert_eq!(
            request_path(&endpoint, "http://host:8080/api/v3/projects?page=2"),
            "/projects?page=2"
        );
    }

    #[test]
    fn test_request_path_respects_path_boundaries() {
        let endpoint = Endpoint::new("http://host/api/v3").unwrap();
        assert_eq!(
            request_path(&endpoint, "http://other/api/v30/projects"),
            "/api/v30/projects"
        );
    }

    #[test]
    fn test_request_path_with_bare_host_endpoint() {
        let endpoint = Endpoint::new("http://127.0.0.1:4000").unwrap();
        assert_eq!(
            request_path(&endpoint, "http://localhost:4000/items?page=3"),
            "/items?page=3"
        );
    }

    #[test]
    fn test_has_predicates_without_links() {
        let page = PaginatedResponse::new(vec![Value::Null]);
        assert!(!page.has_first_page());
        assert!(!page.has_prev_page());
        assert!(!page.has_next_page());
        assert!(!page.has_last_page());
        assert!(page.links().is_none());
    }

    #[tokio::test]
    async fn test_navigation_without_client_returns_none() {
        let mut page = PaginatedResponse::new(vec![]);
        let mut headers = HashMap::new();
        headers.insert("link".to_string(), vec![next_link(2)]);
        page.attach_headers(&headers);

        assert!(page.has_next_page());
        assert!(page.next_page().await.unwrap().is_none());
        assert!(page.first_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_navigation_without_link_returns_none() {
        let (page, fake) = two_pages();
        assert!(page.prev_page().await.unwrap().is_none());
        assert!(page.last_page().await.unwrap().is_none());
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_next_page_fetches_through_client() {
        let (page, fake) = two_pages();
        let next = page.next_page().await.unwrap().unwrap();
        let next = next.into_collection().unwrap();

        assert_eq!(numbers(next.items()), vec![5, 6, 7, 8]);
        assert_eq!(fake.requests(), vec!["/projects?page=2"]);
    }

    #[tokio::test]
    async fn test_attach_headers_replaces_links() {
        let (mut page, _fake) = two_pages();
        page.attach_headers(&HashMap::new());
        assert!(!page.has_next_page());
    }

    #[tokio::test]
    async fn test_auto_paginate_collects_all_pages() {
        let (page, fake) = two_pages();
        let all = page.auto_paginate().await.unwrap();
        assert_eq!(numbers(&all), vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(fake.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_paginate_with_limit_within_first_page() {
        let (page, fake) = two_pages();
        let some = page.paginate_with_limit(3).await.unwrap();
        assert_eq!(numbers(&some), vec![1, 2, 3]);
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_paginate_with_limit_exactly_one_page() {
        let (page, fake) = two_pages();
        let some = page.paginate_with_limit(4).await.unwrap();
        assert_eq!(numbers(&some), vec![1, 2, 3, 4]);
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_paginate_with_limit_fetches_second_page_once() {
        let (page, fake) = two_pages();
        let some = page.paginate_with_limit(5).await.unwrap();
        assert_eq!(numbers(&some), vec![1, 2, 3, 4, 5]);
        assert_eq!(fake.requests(), vec!["/projects?page=2"]);
    }

    #[tokio::test]
    async fn test_paginate_with_limit_beyond_end() {
        let (page, _fake) = two_pages();
        let all = page.paginate_with_limit(100).await.unwrap();
        assert_eq!(all.len(), 8);
    }

    #[tokio::test]
    async fn test_visitor_variants() {
        let (page, _fake) = two_pages();
        let mut seen = Vec::new();
        page.auto_paginate_each(|v| {
            seen.extend(v.as_i64());
            ControlFlow::Continue(())
        })
        .await
        .unwrap();
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6, 7, 8]);

        let (page, _fake) = two_pages();
        let mut seen = Vec::new();
        page.paginate_with_limit_each(6, |v| {
            seen.extend(v.as_i64());
            ControlFlow::Continue(())
        })
        .await
        .unwrap();
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn test_element_visitors_stop_on_break() {
        let (page, fake) = two_pages();
        let mut seen = Vec::new();
        page.auto_paginate_each(|v| {
            seen.extend(v.as_i64());
            ControlFlow::Break(())
        })
        .await
        .unwrap();
        assert_eq!(seen, vec![1]);
        assert!(fake.requests().is_empty());

        let (page, fake) = two_pages();
        let mut seen = Vec::new();
        page.paginate_with_limit_each(8, |v| {
            seen.extend(v.as_i64());
            if seen.len() == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .await
        .unwrap();
        assert_eq!(seen, vec![1, 2]);
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_each_page_visits_in_order() {
        let (page, _fake) = two_pages();
        let mut sizes = Vec::new();
        page.each_page(|p| {
            sizes.push(numbers(p.items()));
            ControlFlow::Continue(())
        })
        .await
        .unwrap();
        assert_eq!(sizes, vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8]]);
    }

    #[tokio::test]
    async fn test_each_page_stops_on_break() {
        let (page, fake) = two_pages();
        let mut visits = 0;
        page.each_page(|_| {
            visits += 1;
            ControlFlow::Break(())
        })
        .await
        .unwrap();
        assert_eq!(visits, 1);
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_lazy_stream_fetches_on_demand() {
        let (page, fake) = two_pages();
        let mut stream = page.lazy_paginate();

        for expected in 1..=4 {
            let value = stream.try_next().await.unwrap().unwrap();
            assert_eq!(value.as_i64(), Some(expected));
        }
        assert!(fake.requests().is_empty());

        assert_eq!(stream.try_next().await.unwrap().unwrap().as_i64(), Some(5));
        assert_eq!(fake.requests().len(), 1);

        drop(stream);
        assert_eq!(fake.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_pages_are_skipped() {
        let fake = Arc::new(
            FakeClient::new(ENDPOINT)
                .page("/projects?page=2", serde_json::json!([]), Some(&next_link(3)))
                .page("/projects?page=3", serde_json::json!([9]), None),
        );
        let mut page = PaginatedResponse::new(vec![]);
        let mut headers = HashMap::new();
        headers.insert("link".to_string(), vec![next_link(2)]);
        page.attach_headers(&headers);
        page.set_client(fake.clone());

        let all = page.auto_paginate().await.unwrap();
        assert_eq!(numbers(&all), vec![9]);
        assert_eq!(fake.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_non_array_page_is_an_error() {
        let fake = Arc::new(FakeClient::new(ENDPOINT).page(
            "/projects?page=2",
            serde_json::json!({"message": "not a list"}),
            None,
        ));
        let mut page = PaginatedResponse::new(vec![Value::from(serde_json::json!(1))]);
        let mut headers = HashMap::new();
        headers.insert("link".to_string(), vec![next_link(2)]);
        page.attach_headers(&headers);
        page.set_client(fake);

        let result = page.auto_paginate().await;
        assert!(matches!(result, Err(HttpError::UnexpectedPageBody { .. })));
    }

    #[test]
    fn test_element_access() {
        let page = ResponseBody::from_decoded(Some(serde_json::json!([{"id": 1}, {"id": 2}])))
            .into_collection()
            .unwrap();
        assert_eq!(page.len(), 2);
        assert!(!page.is_empty());
        assert_eq!(page[1]["id"].as_i64(), Some(2));
        assert!(page.get(2).is_none());
        assert_eq!(page.iter().count(), 2);
        assert_eq!((&page).into_iter().count(), 2);
        assert_eq!(page.into_items().len(), 2);
    }

    #[test]
    fn test_debug_hides_client() {
        let (page, _fake) = two_pages();
        let debug = format!("{page:?}");
        assert!(debug.contains("has_client: true"));
    }
}
