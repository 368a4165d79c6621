//! Cursor pagination adapter.
//!
//! [`Paginator`] owns the currently displayed page of a connection and
//! hands out [`PageTicket`]s for follow-up loads. Each ticket carries the
//! generation it was issued in; a response whose ticket is older than the
//! current generation is discarded rather than applied, so a slow request
//! can never overwrite a page the visitor has already moved past.
//!
//! Only one load is in flight at a time. Triggers that arrive while a load
//! is pending are ignored.

use std::fmt;

use crate::connection::{Connection, PageInfo, PageRequest};

/// Direction of a page load relative to the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
    /// Reload from an explicit request, e.g. the first page after a sort
    /// change. Started with [`Paginator::restart`].
    Restart,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Restart => "restart",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadState {
    Idle,
    Loading { direction: Direction, generation: u64 },
    Failed(String),
}

/// Permission to resolve one page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket {
    pub direction: Direction,
    pub request: PageRequest,
    generation: u64,
}

impl PageTicket {
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Outcome of resolving a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The new page replaced the current one.
    Applied,
    /// The load failed; the current page is unchanged.
    Failed,
    /// The ticket belonged to an earlier generation and was discarded.
    Stale,
}

/// Page state for one paginated connection.
#[derive(Debug, Clone)]
pub struct Paginator<T> {
    page: Connection<T>,
    page_size: u32,
    generation: u64,
    state: LoadState,
}

impl<T> Paginator<T> {
    /// Start from an already loaded page.
    #[must_use]
    pub const fn new(page: Connection<T>, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            generation: 0,
            state: LoadState::Idle,
        }
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page.page_info.has_next_page
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page.page_info.has_previous_page
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading { .. })
    }

    /// Direction of the pending load, if any.
    #[must_use]
    pub const fn loading_direction(&self) -> Option<Direction> {
        match self.state {
            LoadState::Loading { direction, .. } => Some(direction),
            _ => None,
        }
    }

    /// Message from the most recent failed load.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub fn nodes(&self) -> &[T] {
        &self.page.nodes
    }

    #[must_use]
    pub const fn page_info(&self) -> &PageInfo {
        &self.page.page_info
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Request for the following page, without starting a load.
    #[must_use]
    pub fn next_request(&self) -> Option<PageRequest> {
        self.page.next_page(self.page_size)
    }

    /// Request for the preceding page, without starting a load.
    #[must_use]
    pub fn previous_request(&self) -> Option<PageRequest> {
        self.page.previous_page(self.page_size)
    }

    /// Begin a load in `direction`.
    ///
    /// Returns `None` while another load is pending or when the current
    /// page reports no page in that direction. A new trigger clears a
    /// previous error. [`Direction::Restart`] always returns `None` here;
    /// it needs an explicit request, see [`Paginator::restart`].
    pub fn request(&mut self, direction: Direction) -> Option<PageTicket> {
        if self.is_loading() {
            return None;
        }
        let request = match direction {
            Direction::Next => self.next_request(),
            Direction::Previous => self.previous_request(),
            Direction::Restart => None,
        }?;

        Some(self.issue(direction, request))
    }

    /// Begin loading `request` as the new current page.
    ///
    /// Unlike [`Paginator::request`] this is never refused: any load still
    /// in flight becomes stale, and next/previous triggers are ignored
    /// until the returned ticket is resolved.
    pub fn restart(&mut self, request: PageRequest) -> PageTicket {
        self.issue(Direction::Restart, request)
    }

    fn issue(&mut self, direction: Direction, request: PageRequest) -> PageTicket {
        self.generation += 1;
        self.state = LoadState::Loading {
            direction,
            generation: self.generation,
        };
        PageTicket {
            direction,
            request,
            generation: self.generation,
        }
    }

    pub fn request_next(&mut self) -> Option<PageTicket> {
        self.request(Direction::Next)
    }

    pub fn request_previous(&mut self) -> Option<PageTicket> {
        self.request(Direction::Previous)
    }

    /// Apply the result of a load started with `ticket`.
    pub fn resolve<E: fmt::Display>(
        &mut self,
        ticket: &PageTicket,
        result: Result<Connection<T>, E>,
    ) -> Resolution {
        let current = matches!(
            self.state,
            LoadState::Loading { generation, .. } if generation == ticket.generation
        );
        if !current {
            return Resolution::Stale;
        }

        match result {
            Ok(page) => {
                self.page = page;
                self.state = LoadState::Idle;
                Resolution::Applied
            }
            Err(error) => {
                self.state = LoadState::Failed(error.to_string());
                Resolution::Failed
            }
        }
    }

    /// Replace the current page, e.g. after the filter or sort changed.
    ///
    /// Any load still in flight becomes stale.
    pub fn reset(&mut self, page: Connection<T>) {
        self.generation += 1;
        self.page = page;
        self.state = LoadState::Idle;
    }

    #[must_use]
    pub fn into_page(self) -> Connection<T> {
        self.page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Cursor;

    fn page(nodes: &[&'static str], has_next: bool, has_previous: bool) -> Connection<&'static str> {
        let start = nodes.first().map(|n| Cursor::new(format!("c-{n}")));
        let end = nodes.last().map(|n| Cursor::new(format!("c-{n}")));
        Connection::new(
            nodes.to_vec(),
            PageInfo {
                has_next_page: has_next,
                has_previous_page: has_previous,
                start_cursor: start,
                end_cursor: end,
            },
        )
    }

    #[test]
    fn test_next_page_applied() {
        let mut pager = Paginator::new(page(&["a", "b"], true, false), 2);
        let ticket = pager.request_next().expect("next page available");
        assert_eq!(
            ticket.request,
            PageRequest::After {
                count: 2,
                cursor: Cursor::new("c-b")
            }
        );
        assert!(pager.is_loading());

        let outcome = pager.resolve::<String>(&ticket, Ok(page(&["c", "d"], false, true)));
        assert_eq!(outcome, Resolution::Applied);
        assert_eq!(pager.nodes(), &["c", "d"]);
        assert!(!pager.has_next());
        assert!(pager.has_previous());
    }

    #[test]
    fn test_no_request_without_page() {
        let mut pager = Paginator::new(page(&["a"], false, false), 1);
        assert!(pager.request_next().is_none());
        assert!(pager.request_previous().is_none());
        assert!(!pager.is_loading());
        assert_eq!(pager.generation(), 0);
    }

    #[test]
    fn test_trigger_ignored_while_loading() {
        let mut pager = Paginator::new(page(&["a"], true, true), 1);
        let first = pager.request_next();
        assert!(first.is_some());
        assert!(pager.request_next().is_none());
        assert!(pager.request_previous().is_none());
        assert_eq!(pager.loading_direction(), Some(Direction::Next));
    }

    #[test]
    fn test_failure_keeps_page_and_clears_on_retry() {
        let mut pager = Paginator::new(page(&["a"], true, false), 1);
        let ticket = pager.request_next().expect("next page available");
        let outcome = pager.resolve(&ticket, Err("upstream timeout"));

        assert_eq!(outcome, Resolution::Failed);
        assert_eq!(pager.error(), Some("upstream timeout"));
        assert_eq!(pager.nodes(), &["a"]);

        let retry = pager.request_next();
        assert!(retry.is_some());
        assert!(pager.error().is_none());
    }

    #[test]
    fn test_stale_response_discarded_after_reset() {
        let mut pager = Paginator::new(page(&["a"], true, false), 1);
        let ticket = pager.request_next().expect("next page available");

        // Filter changed while the load was in flight.
        pager.reset(page(&["x"], false, false));
        let outcome = pager.resolve::<String>(&ticket, Ok(page(&["b"], false, true)));

        assert_eq!(outcome, Resolution::Stale);
        assert_eq!(pager.nodes(), &["x"]);
        assert!(!pager.is_loading());
    }

    #[test]
    fn test_old_ticket_stale_after_new_load() {
        let mut pager = Paginator::new(page(&["a"], true, false), 1);
        let old = pager.request_next().expect("next page available");
        pager.reset(page(&["a"], true, false));
        let fresh = pager.request_next().expect("next page available");

        assert_eq!(
            pager.resolve::<String>(&old, Ok(page(&["stale"], false, false))),
            Resolution::Stale
        );
        assert_eq!(
            pager.resolve::<String>(&fresh, Ok(page(&["b"], false, true))),
            Resolution::Applied
        );
        assert_eq!(pager.nodes(), &["b"]);
    }

    #[test]
    fn test_restart_blocks_triggers_until_resolved() {
        let mut pager = Paginator::new(page(&["a"], true, false), 1);
        let restart = pager.restart(PageRequest::First { count: 1 });

        assert!(pager.is_loading());
        assert_eq!(pager.loading_direction(), Some(Direction::Restart));
        assert!(pager.request_next().is_none());

        let outcome = pager.resolve::<String>(&restart, Ok(page(&["r"], true, false)));
        assert_eq!(outcome, Resolution::Applied);
        assert_eq!(pager.nodes(), &["r"]);
        assert!(pager.request_next().is_some());
    }

    #[test]
    fn test_restart_supersedes_inflight_load() {
        let mut pager = Paginator::new(page(&["a"], true, false), 1);
        let next = pager.request_next().expect("next page available");
        let restart = pager.restart(PageRequest::First { count: 1 });

        assert_eq!(
            pager.resolve::<String>(&next, Ok(page(&["old-next"], false, true))),
            Resolution::Stale
        );
        assert_eq!(
            pager.resolve::<String>(&restart, Ok(page(&["first"], true, false))),
            Resolution::Applied
        );
        assert_eq!(pager.nodes(), &["first"]);
    }

    #[test]
    fn test_restart_is_not_a_trigger_direction() {
        let mut pager = Paginator::new(page(&["a"], true, true), 1);
        assert!(pager.request(Direction::Restart).is_none());
        assert!(!pager.is_loading());
    }
}
