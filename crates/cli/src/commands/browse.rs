//! Page through a collection or search result the way a listing page does.
//!
//! Each page runs through the same pipeline as the storefront: facets are
//! extracted from the page, the requested filters are pruned to them, and
//! the remaining products are filtered and sorted. The walk stops at the
//! last page or after `--pages` pages.

use shopfront_core::filter::params;
use shopfront_core::{FilterState, Listing, PageRequest, SortKey};
use shopfront_storefront::config::{ConfigError, ShopifyStorefrontConfig};
use shopfront_storefront::pager::{PaginationError, Pager};
use shopfront_storefront::shopify::{
    CollectionSource, PageSource, SearchSource, ShopifyError, StorefrontClient,
};
use thiserror::Error;

/// Largest page the Storefront API accepts.
const MAX_PAGE_SIZE: u32 = 250;

#[derive(Debug, Error)]
pub enum BrowseError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Shopify(#[from] ShopifyError),

    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

/// What to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Collection(String),
    Search(String),
}

impl Target {
    /// Sort used when none is given.
    const fn default_sort(&self) -> SortKey {
        match self {
            Self::Collection(_) => SortKey::Featured,
            Self::Search(_) => SortKey::Relevance,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BrowseOptions {
    pub sort: Option<SortKey>,
    pub filters: Vec<(String, String)>,
    pub pages: u32,
    pub page_size: u32,
}

/// Parse a `--filter param=value` argument.
///
/// Short names (`color`, `size`, `tag`, `availability`, `price_min`,
/// `price_max`) expand to the storefront's query parameters; anything else
/// is passed through unchanged.
///
/// # Errors
///
/// Returns a message if there is no `=` or the name is empty.
pub fn parse_filter(arg: &str) -> Result<(String, String), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected param=value, got `{arg}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing filter name in `{arg}`"));
    }
    Ok((expand_param(key).to_string(), value.trim().to_string()))
}

fn expand_param(key: &str) -> &str {
    match key.to_lowercase().as_str() {
        "color" | "colour" => params::COLOR,
        "size" => params::SIZE,
        "tag" => params::TAG,
        "availability" | "available" => params::AVAILABILITY,
        "price_min" | "min" => params::PRICE_MIN,
        "price_max" | "max" => params::PRICE_MAX,
        _ => key,
    }
}

/// Walk the listing and print each page.
///
/// # Errors
///
/// Returns an error if the Shopify settings are missing or a page fails to
/// load.
pub async fn run(target: Target, options: BrowseOptions) -> Result<(), BrowseError> {
    let config = ShopifyStorefrontConfig::from_env()?;
    let client = StorefrontClient::new(&config);
    let sort = options.sort.unwrap_or_else(|| target.default_sort());
    let request = PageRequest::First {
        count: options.page_size.clamp(1, MAX_PAGE_SIZE),
    };
    let filter = FilterState::from_query_pairs(options.filters);

    tracing::info!(?target, %sort, "Browsing catalog");
    match target {
        Target::Collection(handle) => {
            let pager = Pager::start(CollectionSource::new(client, handle), &request).await?;
            walk(&pager, &filter, sort, options.pages).await
        }
        Target::Search(term) => {
            let pager = Pager::start(SearchSource::new(client, term), &request).await?;
            walk(&pager, &filter, sort, options.pages).await
        }
    }
}

async fn walk<S: PageSource>(
    pager: &Pager<S>,
    filter: &FilterState,
    sort: SortKey,
    max_pages: u32,
) -> Result<(), BrowseError> {
    let mut number = 1;
    loop {
        let products = pager.products();
        let listing = Listing::build(&products, filter.clone(), sort);
        print_page(number, &listing);

        if number >= max_pages || !pager.has_next() {
            return Ok(());
        }
        pager.next().await?;
        number += 1;
    }
}

#[allow(clippy::print_stdout)]
fn print_page(number: u32, listing: &Listing<'_>) {
    print!("{}", render_page(number, listing));
}

fn render_page(number: u32, listing: &Listing<'_>) -> String {
    use std::fmt::Write;

    let mut out = format!(
        "Page {number}: {} of {} products ({})\n",
        listing.visible(),
        listing.total(),
        listing.sort().label(),
    );
    if listing.was_pruned() {
        out.push_str("  (some filters are not offered on this page and were dropped)\n");
    }
    for product in listing.products() {
        let stock = if product.is_available() {
            ""
        } else {
            " [sold out]"
        };
        let _ = writeln!(
            out,
            "  {:<40} {:>10}{stock}",
            product.title, product.price_range.min_variant_price
        );
    }
    out
}
