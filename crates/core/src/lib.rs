//! Shopfront Core - catalog types and the product listing pipeline.
//!
//! This crate provides the types shared by every Shopfront component:
//! - `storefront` - Public-facing e-commerce site
//! - `cli` - Command-line tools for migrations and catalog browsing
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. Products arrive here already fetched
//! from the Storefront API; everything below runs over that in-memory page.
//!
//! ```text
//! products ─► facets::extract_facets ─► FilterState::prune_to
//!          └─────────────► FilterState::matches ─► sort::sort_products ─► Listing
//! ```
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for Shopify IDs and money
//! - [`catalog`] - Products, variants and options
//! - [`connection`] - Cursor-based page shape (`Connection<T>`)
//! - [`facets`] - Facet extraction over a product page
//! - [`filter`] - Filter state, predicate evaluation and the filter panel
//! - [`sort`] - Named sort criteria
//! - [`pipeline`] - The consolidated facet → filter → sort pipeline
//! - [`pagination`] - Cursor pagination adapter with stale-response protection
//! - [`wishlist`] - Visitor wishlist of product IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod connection;
pub mod facets;
pub mod filter;
pub mod pagination;
pub mod pipeline;
pub mod sort;
pub mod types;
pub mod wishlist;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalog::{
    Image, OptionValue, PriceRange, Product, ProductOption, ProductVariant, SelectedOption,
};
pub use connection::{Connection, Cursor, PageInfo, PageRequest};
pub use facets::{Availability, FacetSet, OptionKind, PriceBounds, extract_facets};
pub use filter::{FilterPanel, FilterState, PriceFilter};
pub use pagination::{Direction, PageTicket, Paginator, Resolution};
pub use pipeline::Listing;
pub use sort::{SortKey, sort_products};
pub use types::*;
pub use wishlist::{WISHLIST_KEY, Wishlist};
