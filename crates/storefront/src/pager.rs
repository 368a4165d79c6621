//! Async driver for cursor pagination.
//!
//! [`Pager`] pairs a [`PageSource`] with the core [`Paginator`] state
//! machine. The paginator lock is never held across the fetch, so while a
//! load is awaiting the API, further triggers see the Loading state and are
//! rejected, and a [`Pager::reset`] makes the in-flight response stale.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shopfront_core::{
    Connection, Direction, PageRequest, PageTicket, Paginator, Product, Resolution,
};
use thiserror::Error;

use crate::shopify::{PageSource, ShopifyError};

/// Why a page load did not replace the current page.
#[derive(Debug, Error)]
pub enum PaginationError {
    /// Another load is still in flight.
    #[error("a page load is already in progress")]
    Busy,

    /// The current page reports no page in that direction.
    #[error("there is no {0} page")]
    NoPage(&'static str),

    /// The listing was reset while this load was in flight.
    #[error("page load was superseded")]
    Superseded,

    /// The API request failed; the current page is unchanged.
    #[error(transparent)]
    Upstream(#[from] ShopifyError),
}

/// Paginated view over a product source.
pub struct Pager<S> {
    source: Arc<S>,
    state: Arc<Mutex<Paginator<Product>>>,
}

impl<S> Clone for Pager<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: PageSource> Pager<S> {
    /// Fetch the first page described by `request`.
    ///
    /// # Errors
    ///
    /// Returns the API error if the first page cannot be loaded.
    pub async fn start(source: S, request: &PageRequest) -> Result<Self, ShopifyError> {
        let page = source.fetch(request).await?;
        Ok(Self::with_page(source, page, request.count()))
    }

    /// Wrap a page that was already fetched.
    #[must_use]
    pub fn with_page(source: S, page: Connection<Product>, page_size: u32) -> Self {
        Self {
            source: Arc::new(source),
            state: Arc::new(Mutex::new(Paginator::new(page, page_size))),
        }
    }

    fn state(&self) -> MutexGuard<'_, Paginator<Product>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Products on the current page.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.state().nodes().to_vec()
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.state().has_next()
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.state().has_previous()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().is_loading()
    }

    /// Message from the last failed load, cleared by the next trigger.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state().error().map(str::to_string)
    }

    /// Request for the page after the current one, for building links.
    #[must_use]
    pub fn next_request(&self) -> Option<PageRequest> {
        self.state().next_request()
    }

    /// Request for the page before the current one, for building links.
    #[must_use]
    pub fn previous_request(&self) -> Option<PageRequest> {
        self.state().previous_request()
    }

    /// Load the next page.
    ///
    /// # Errors
    ///
    /// See [`Pager::load`].
    pub async fn next(&self) -> Result<(), PaginationError> {
        self.load(Direction::Next).await
    }

    /// Load the previous page.
    ///
    /// # Errors
    ///
    /// See [`Pager::load`].
    pub async fn previous(&self) -> Result<(), PaginationError> {
        self.load(Direction::Previous).await
    }

    /// Load the page in `direction` and make it current.
    ///
    /// # Errors
    ///
    /// - `Busy` if another load is in flight (the trigger is ignored)
    /// - `NoPage` if there is nothing in that direction
    /// - `Superseded` if the pager was reset while loading
    /// - `Upstream` if the API request failed
    pub async fn load(&self, direction: Direction) -> Result<(), PaginationError> {
        let ticket = {
            let mut state = self.state();
            if state.is_loading() {
                tracing::debug!(?direction, "Ignoring page trigger while loading");
                return Err(PaginationError::Busy);
            }
            state
                .request(direction)
                .ok_or(PaginationError::NoPage(direction.as_str()))?
        };

        let result = self.source.fetch(&ticket.request).await;
        self.finish(&ticket, result)
    }

    /// Replace the current page, e.g. after the visitor changed the sort.
    ///
    /// A load still in flight will be discarded when it returns.
    pub fn reset(&self, page: Connection<Product>) {
        self.state().reset(page);
    }

    /// Fetch `request` and make it current, superseding any in-flight load.
    ///
    /// Next/previous triggers issued while the restart is loading are
    /// ignored, and a later restart or reset makes this one stale.
    ///
    /// # Errors
    ///
    /// - `Superseded` if another restart or reset happened while loading
    /// - `Upstream` if the API request failed; the current page is unchanged
    pub async fn restart(&self, request: &PageRequest) -> Result<(), PaginationError> {
        let ticket = self.state().restart(request.clone());
        let result = self.source.fetch(&ticket.request).await;
        self.finish(&ticket, result)
    }

    fn finish(
        &self,
        ticket: &PageTicket,
        result: Result<Connection<Product>, ShopifyError>,
    ) -> Result<(), PaginationError> {
        let mut state = self.state();
        match result {
            Ok(page) => match state.resolve(ticket, Ok::<_, ShopifyError>(page)) {
                Resolution::Stale => {
                    tracing::debug!(generation = ticket.generation(), "Discarding stale page");
                    Err(PaginationError::Superseded)
                }
                Resolution::Applied | Resolution::Failed => Ok(()),
            },
            Err(e) => match state.resolve(ticket, Err::<Connection<Product>, _>(&e)) {
                Resolution::Stale => Err(PaginationError::Superseded),
                Resolution::Applied | Resolution::Failed => {
                    tracing::warn!(error = %e, direction = ?ticket.direction, "Page load failed");
                    Err(PaginationError::Upstream(e))
                }
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;
    use shopfront_core::{Cursor, PageInfo};
    use tokio::sync::Notify;

    fn product(handle: &str) -> Product {
        serde_json::from_value(json!({
            "id": format!("gid://shopify/Product/{handle}"),
            "handle": handle,
            "title": handle,
            "available_for_sale": true,
        }))
        .unwrap()
    }

    fn page(handles: &[&str], has_next: bool, has_previous: bool) -> Connection<Product> {
        Connection::new(
            handles.iter().map(|h| product(h)).collect(),
            PageInfo {
                has_next_page: has_next,
                has_previous_page: has_previous,
                start_cursor: handles.first().map(|h| Cursor::new(format!("s-{h}"))),
                end_cursor: handles.last().map(|h| Cursor::new(format!("e-{h}"))),
            },
        )
    }

    /// Serves canned pages by cache key, optionally waiting on a gate.
    struct ScriptedSource {
        pages: HashMap<String, Connection<Product>>,
        gate: Option<Arc<Notify>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(pages: Vec<(PageRequest, Connection<Product>)>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|(req, page)| (req.cache_key(), page))
                    .collect(),
                gate: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }
    }

    impl PageSource for ScriptedSource {
        async fn fetch(&self, request: &PageRequest) -> Result<Connection<Product>, ShopifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.pages
                .get(&request.cache_key())
                .cloned()
                .ok_or_else(|| ShopifyError::NotFound(request.cache_key()))
        }
    }

    fn after(cursor: &str) -> PageRequest {
        PageRequest::After {
            count: 2,
            cursor: Cursor::new(cursor),
        }
    }

    fn handles(pager: &Pager<ScriptedSource>) -> Vec<String> {
        pager.products().into_iter().map(|p| p.handle).collect()
    }

    #[tokio::test]
    async fn test_start_and_next() {
        let first = PageRequest::First { count: 2 };
        let source = ScriptedSource::new(vec![
            (first.clone(), page(&["a", "b"], true, false)),
            (after("e-b"), page(&["c", "d"], false, true)),
        ]);

        let pager = Pager::start(source, &first).await.unwrap();
        assert_eq!(handles(&pager), vec!["a", "b"]);
        assert_eq!(pager.next_request(), Some(after("e-b")));

        pager.next().await.unwrap();
        assert_eq!(handles(&pager), vec!["c", "d"]);
        assert!(!pager.has_next());
        assert!(pager.has_previous());
    }

    #[tokio::test]
    async fn test_no_next_page() {
        let source = ScriptedSource::new(vec![]);
        let pager = Pager::with_page(source, page(&["a"], false, false), 2);
        assert!(matches!(
            pager.next().await,
            Err(PaginationError::NoPage("next"))
        ));
        assert_eq!(pager.source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_page() {
        let source = ScriptedSource::new(vec![]);
        let pager = Pager::with_page(source, page(&["a"], true, false), 2);

        let err = pager.next().await.unwrap_err();
        assert!(matches!(err, PaginationError::Upstream(ShopifyError::NotFound(_))));
        assert_eq!(handles(&pager), vec!["a"]);
        assert!(pager.error().is_some());
        assert!(!pager.is_loading());
    }

    #[tokio::test]
    async fn test_trigger_while_loading_is_ignored() {
        let gate = Arc::new(Notify::new());
        let source = ScriptedSource::new(vec![(after("e-a"), page(&["b"], false, true))])
            .gated(Arc::clone(&gate));
        let pager = Pager::with_page(source, page(&["a"], true, false), 2);

        let background = pager.clone();
        let inflight = tokio::spawn(async move { background.next().await });
        while !pager.is_loading() {
            tokio::task::yield_now().await;
        }

        assert!(matches!(pager.next().await, Err(PaginationError::Busy)));

        gate.notify_one();
        inflight.await.unwrap().unwrap();
        assert_eq!(handles(&pager), vec!["b"]);
        assert_eq!(pager.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reset_makes_inflight_load_stale() {
        let gate = Arc::new(Notify::new());
        let source = ScriptedSource::new(vec![(after("e-a"), page(&["stale"], false, true))])
            .gated(Arc::clone(&gate));
        let pager = Pager::with_page(source, page(&["a"], true, false), 2);

        let background = pager.clone();
        let inflight = tokio::spawn(async move { background.next().await });
        while !pager.is_loading() {
            tokio::task::yield_now().await;
        }

        pager.reset(page(&["fresh"], false, false));
        gate.notify_one();

        assert!(matches!(
            inflight.await.unwrap(),
            Err(PaginationError::Superseded)
        ));
        assert_eq!(handles(&pager), vec!["fresh"]);
    }

    #[tokio::test]
    async fn test_next_ignored_while_restart_loads() {
        let gate = Arc::new(Notify::new());
        let first = PageRequest::First { count: 2 };
        let source = ScriptedSource::new(vec![
            (first.clone(), page(&["restarted"], true, false)),
            (after("e-a"), page(&["next"], false, true)),
        ])
        .gated(Arc::clone(&gate));
        let pager = Pager::with_page(source, page(&["a"], true, false), 2);

        let background = pager.clone();
        let restart = tokio::spawn(async move { background.restart(&first).await });
        while !pager.is_loading() {
            tokio::task::yield_now().await;
        }

        assert!(matches!(pager.next().await, Err(PaginationError::Busy)));

        gate.notify_one();
        restart.await.unwrap().unwrap();
        assert_eq!(handles(&pager), vec!["restarted"]);
        assert_eq!(pager.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reset_makes_inflight_restart_stale() {
        let gate = Arc::new(Notify::new());
        let first = PageRequest::First { count: 2 };
        let source = ScriptedSource::new(vec![(first.clone(), page(&["old"], false, false))])
            .gated(Arc::clone(&gate));
        let pager = Pager::with_page(source, page(&["a"], true, false), 2);

        let background = pager.clone();
        let restart = tokio::spawn(async move { background.restart(&first).await });
        while !pager.is_loading() {
            tokio::task::yield_now().await;
        }

        pager.reset(page(&["newer"], false, false));
        gate.notify_one();

        assert!(matches!(
            restart.await.unwrap(),
            Err(PaginationError::Superseded)
        ));
        assert_eq!(handles(&pager), vec!["newer"]);
    }
}
