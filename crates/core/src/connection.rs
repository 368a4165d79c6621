//! Cursor-based page shape shared by every Storefront API list.
//!
//! Cursors are opaque tokens minted by the API. Nothing in this crate
//! builds or inspects one; a [`PageRequest`] only ever forwards the start or
//! end cursor of a page the API already returned.

use serde::{Deserialize, Serialize};

/// Opaque pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a cursor string received from the API or echoed back by a client.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Pagination information.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Whether there are items before this page.
    pub has_previous_page: bool,
    /// Cursor for the first item.
    pub start_cursor: Option<Cursor>,
    /// Cursor for the last item.
    pub end_cursor: Option<Cursor>,
}

/// A page of items plus its page info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection<T> {
    /// Items in this page, in API order.
    pub nodes: Vec<T>,
    /// Pagination info.
    pub page_info: PageInfo,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Connection<T> {
    #[must_use]
    pub const fn new(nodes: Vec<T>, page_info: PageInfo) -> Self {
        Self { nodes, page_info }
    }

    /// A connection with no items and no neighbouring pages.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            page_info: PageInfo {
                has_next_page: false,
                has_previous_page: false,
                start_cursor: None,
                end_cursor: None,
            },
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Convert the nodes, keeping page info.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Connection<U> {
        Connection {
            nodes: self.nodes.into_iter().map(f).collect(),
            page_info: self.page_info,
        }
    }

    /// Request for the page after this one, if the API reported one.
    #[must_use]
    pub fn next_page(&self, count: u32) -> Option<PageRequest> {
        if !self.page_info.has_next_page {
            return None;
        }
        self.page_info
            .end_cursor
            .clone()
            .map(|cursor| PageRequest::After { count, cursor })
    }

    /// Request for the page before this one, if the API reported one.
    #[must_use]
    pub fn previous_page(&self, count: u32) -> Option<PageRequest> {
        if !self.page_info.has_previous_page {
            return None;
        }
        self.page_info
            .start_cursor
            .clone()
            .map(|cursor| PageRequest::Before { count, cursor })
    }
}

/// Which page of a connection to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageRequest {
    /// The first `count` items.
    First { count: u32 },
    /// `count` items after `cursor`.
    After { count: u32, cursor: Cursor },
    /// `count` items before `cursor`.
    Before { count: u32, cursor: Cursor },
}

impl PageRequest {
    /// Build a request from `?after=` / `?before=` query parameters.
    ///
    /// `after` wins when both are present; empty strings are ignored.
    #[must_use]
    pub fn from_cursors(count: u32, after: Option<&str>, before: Option<&str>) -> Self {
        fn non_empty(s: Option<&str>) -> Option<&str> {
            s.map(str::trim).filter(|s| !s.is_empty())
        }

        if let Some(after) = non_empty(after) {
            return Self::After {
                count,
                cursor: Cursor::new(after),
            };
        }
        if let Some(before) = non_empty(before) {
            return Self::Before {
                count,
                cursor: Cursor::new(before),
            };
        }
        Self::First { count }
    }

    /// Number of items requested.
    #[must_use]
    pub const fn count(&self) -> u32 {
        match self {
            Self::First { count } | Self::After { count, .. } | Self::Before { count, .. } => {
                *count
            }
        }
    }

    /// GraphQL `first` argument.
    #[must_use]
    pub const fn first(&self) -> Option<u32> {
        match self {
            Self::First { count } | Self::After { count, .. } => Some(*count),
            Self::Before { .. } => None,
        }
    }

    /// GraphQL `after` argument.
    #[must_use]
    pub fn after(&self) -> Option<&str> {
        match self {
            Self::After { cursor, .. } => Some(cursor.as_str()),
            _ => None,
        }
    }

    /// GraphQL `last` argument.
    #[must_use]
    pub const fn last(&self) -> Option<u32> {
        match self {
            Self::Before { count, .. } => Some(*count),
            _ => None,
        }
    }

    /// GraphQL `before` argument.
    #[must_use]
    pub fn before(&self) -> Option<&str> {
        match self {
            Self::Before { cursor, .. } => Some(cursor.as_str()),
            _ => None,
        }
    }

    /// Cache key fragment identifying this page.
    #[must_use]
    pub fn cache_key(&self) -> String {
        match self {
            Self::First { count } => format!("first:{count}"),
            Self::After { count, cursor } => format!("after:{count}:{}", cursor.as_str()),
            Self::Before { count, cursor } => format!("before:{count}:{}", cursor.as_str()),
        }
    }
}
