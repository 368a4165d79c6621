//! Request parsing and view models for product listing pages.
//!
//! Collection, search and home pages all render the output of
//! [`shopfront_core::Listing`]. This module turns URL query pairs into a
//! [`ListingQuery`], and a built listing back into links and template data.
//! Every link that changes the filter or sort drops the cursors, so the
//! visitor lands on the first page of the new listing.

use std::collections::BTreeSet;

use shopfront_core::filter::params;
use shopfront_core::{
    Availability, Connection, FacetSet, FilterState, Image, Listing, PageRequest,
    Product, SortKey, Wishlist,
};

pub const SORT_PARAM: &str = "sort";
pub const AFTER_PARAM: &str = "after";
pub const BEFORE_PARAM: &str = "before";
pub const SEARCH_PARAM: &str = "q";

/// Sort menu for collection pages; the first entry is the default.
pub const COLLECTION_SORTS: [SortKey; 5] = [
    SortKey::Featured,
    SortKey::Newest,
    SortKey::BestSelling,
    SortKey::PriceLowHigh,
    SortKey::PriceHighLow,
];

/// Sort menu for search results; the first entry is the default.
pub const SEARCH_SORTS: [SortKey; 5] = [
    SortKey::Relevance,
    SortKey::Newest,
    SortKey::BestSelling,
    SortKey::PriceLowHigh,
    SortKey::PriceHighLow,
];

/// Everything a listing URL can carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub filter: FilterState,
    pub sort: SortKey,
    pub after: Option<String>,
    pub before: Option<String>,
    /// Search term, only used by the search page.
    pub term: Option<String>,
}

impl ListingQuery {
    /// Parse raw query pairs. Unknown keys are ignored.
    #[must_use]
    pub fn from_pairs(pairs: &[(String, String)], default_sort: SortKey) -> Self {
        let value = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            filter: FilterState::from_query_pairs(pairs.iter().map(|(k, v)| (k, v))),
            sort: value(SORT_PARAM).map_or(default_sort, |s| SortKey::parse(&s)),
            after: value(AFTER_PARAM),
            before: value(BEFORE_PARAM),
            term: value(SEARCH_PARAM),
        }
    }

    /// The page to fetch; cursors are forwarded verbatim.
    #[must_use]
    pub fn page_request(&self, page_size: u32) -> PageRequest {
        PageRequest::from_cursors(page_size, self.after.as_deref(), self.before.as_deref())
    }

    /// Query pairs for a link with `filter` and `sort`, without cursors.
    fn pairs_for(&self, filter: &FilterState, sort: SortKey, default_sort: SortKey) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(term) = &self.term {
            pairs.push((SEARCH_PARAM.to_string(), term.clone()));
        }
        pairs.extend(
            filter
                .to_query_pairs()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v)),
        );
        if sort != default_sort {
            pairs.push((SORT_PARAM.to_string(), sort.as_str().to_string()));
        }
        pairs
    }
}

/// Build `path?k=v&...` with every key and value percent-encoded.
#[must_use]
pub fn href<K: AsRef<str>, V: AsRef<str>>(path: &str, pairs: &[(K, V)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let query = pairs
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                urlencoding::encode(k.as_ref()),
                urlencoding::encode(v.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{query}")
}

// =============================================================================
// View Models
// =============================================================================

/// Image display data for templates.
#[derive(Debug, Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

impl ImageView {
    /// Image with `fallback_alt` when the API has no alt text.
    #[must_use]
    pub fn new(image: &Image, fallback_alt: &str) -> Self {
        Self {
            url: image.url.clone(),
            alt: image
                .alt_text
                .clone()
                .unwrap_or_else(|| fallback_alt.to_string()),
        }
    }
}

/// Product tile on listing pages.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub vendor: String,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub image: Option<ImageView>,
    pub available: bool,
    pub on_sale: bool,
    pub in_wishlist: bool,
}

impl ProductCardView {
    #[must_use]
    pub fn new(product: &Product, wishlist: &Wishlist) -> Self {
        let primary = product.primary_variant();
        Self {
            id: product.id.to_string(),
            handle: product.handle.clone(),
            title: product.title.clone(),
            vendor: product.vendor.clone(),
            price: product.min_price().to_string(),
            compare_at_price: primary
                .filter(|v| v.is_on_sale())
                .and_then(|v| v.compare_at_price.as_ref())
                .map(ToString::to_string),
            image: product
                .featured_image
                .as_ref()
                .map(|img| ImageView::new(img, &product.title)),
            available: product.is_available(),
            on_sale: primary.is_some_and(shopfront_core::ProductVariant::is_on_sale),
            in_wishlist: wishlist.contains(&product.id),
        }
    }
}

/// One selectable value in a facet group.
#[derive(Debug, Clone)]
pub struct FacetOptionView {
    pub label: String,
    /// Value submitted by the filter form.
    pub value: String,
    pub count: usize,
    pub selected: bool,
    /// Link that toggles this value.
    pub href: String,
}

/// A facet group (Availability, Color, Size, Tag).
#[derive(Debug, Clone)]
pub struct FacetGroupView {
    pub title: &'static str,
    pub param: &'static str,
    pub options: Vec<FacetOptionView>,
}

/// A chip for an active selection, linking to the listing without it.
#[derive(Debug, Clone)]
pub struct ActiveFilterView {
    pub label: String,
    pub href: String,
}

/// Sort menu entry.
#[derive(Debug, Clone)]
pub struct SortOptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
    pub href: String,
}

/// Price inputs for the filter form.
#[derive(Debug, Clone, Default)]
pub struct PriceRangeView {
    pub lowest: String,
    pub highest: String,
    pub min: String,
    pub max: String,
}

/// Everything a listing template renders.
#[derive(Debug, Clone)]
pub struct ListingView {
    pub path: String,
    pub products: Vec<ProductCardView>,
    pub facet_groups: Vec<FacetGroupView>,
    pub active_filters: Vec<ActiveFilterView>,
    pub sort_options: Vec<SortOptionView>,
    pub price: PriceRangeView,
    /// Products on the fetched page.
    pub total: usize,
    /// Products left after filtering.
    pub visible: usize,
    /// Selections were dropped because the page no longer offers them.
    pub pruned: bool,
    /// Hidden form fields carried through filter submissions.
    pub hidden_fields: Vec<(String, String)>,
    /// Link with every filter removed.
    pub clear_href: String,
    /// Link that closes the filter panel without applying the draft.
    pub cancel_href: String,
    pub next_href: Option<String>,
    pub previous_href: Option<String>,
    /// Endpoint counting products for a draft filter, when the page has one.
    pub preview_path: Option<String>,
}

/// Inputs for [`ListingView::build`] that come from the page, not the URL.
pub struct ListingPage<'a> {
    /// Path of the listing, without query.
    pub path: &'a str,
    pub next: Option<PageRequest>,
    pub previous: Option<PageRequest>,
    /// Sort keys offered in the menu.
    pub sorts: &'a [SortKey],
    /// Sort used when the URL carries none.
    pub default_sort: SortKey,
}

impl ListingView {
    /// Render a listing into template data.
    #[must_use]
    pub fn build(
        query: &ListingQuery,
        listing: &Listing<'_>,
        page: &ListingPage<'_>,
        wishlist: &Wishlist,
    ) -> Self {
        let filter = listing.filter();
        let sort = listing.sort();
        let link = |filter: &FilterState, sort: SortKey| {
            href(page.path, &query.pairs_for(filter, sort, page.default_sort))
        };

        let facet_groups = facet_groups(listing.facets(), filter, |f| link(f, sort));
        let active_filters = active_filters(filter, |f| link(f, sort));

        let sort_options = page
            .sorts
            .iter()
            .map(|&key| SortOptionView {
                value: key.as_str(),
                label: key.label(),
                selected: key == sort,
                href: link(filter, key),
            })
            .collect();

        let cancel_href = link(filter, sort);
        let clear_href = link(&FilterState::default(), sort);

        let mut hidden_fields = Vec::new();
        if let Some(term) = &query.term {
            hidden_fields.push((SEARCH_PARAM.to_string(), term.clone()));
        }
        if sort != page.default_sort {
            hidden_fields.push((SORT_PARAM.to_string(), sort.as_str().to_string()));
        }

        let cursor_link = |request: &PageRequest| {
            let mut pairs = query.pairs_for(filter, sort, page.default_sort);
            if let Some(after) = request.after() {
                pairs.push((AFTER_PARAM.to_string(), after.to_string()));
            }
            if let Some(before) = request.before() {
                pairs.push((BEFORE_PARAM.to_string(), before.to_string()));
            }
            href(page.path, &pairs)
        };

        Self {
            path: page.path.to_string(),
            products: listing
                .products()
                .iter()
                .map(|p| ProductCardView::new(p, wishlist))
                .collect(),
            facet_groups,
            active_filters,
            sort_options,
            price: PriceRangeView {
                lowest: listing.facets().price.min.round_dp(2).to_string(),
                highest: listing.facets().price.max.round_dp(2).to_string(),
                min: filter.price.min.map(|m| m.to_string()).unwrap_or_default(),
                max: filter.price.max.map(|m| m.to_string()).unwrap_or_default(),
            },
            total: listing.total(),
            visible: listing.visible(),
            pruned: listing.was_pruned(),
            hidden_fields,
            clear_href,
            cancel_href,
            next_href: page.next.as_ref().map(cursor_link),
            previous_href: page.previous.as_ref().map(cursor_link),
            preview_path: None,
        }
    }

    /// Run one fetched page through the listing pipeline and render it.
    ///
    /// Neighbouring page links come from the page info of `page`.
    #[must_use]
    pub fn for_page(
        query: &ListingQuery,
        page: &Connection<Product>,
        path: &str,
        page_size: u32,
        sorts: &[SortKey],
        wishlist: &Wishlist,
    ) -> Self {
        let listing = Listing::build(&page.nodes, query.filter.clone(), query.sort);
        let default_sort = sorts.first().copied().unwrap_or_default();
        let links = ListingPage {
            path,
            next: page.next_page(page_size),
            previous: page.previous_page(page_size),
            sorts,
            default_sort,
        };
        Self::build(query, &listing, &links, wishlist)
    }

    #[must_use]
    pub fn has_filters(&self) -> bool {
        !self.active_filters.is_empty()
    }
}

/// Find the stored spelling of `value` in `set`, ignoring case.
fn stored_value(set: &BTreeSet<String>, value: &str) -> Option<String> {
    set.iter().find(|s| s.eq_ignore_ascii_case(value)).cloned()
}

fn facet_groups(
    facets: &FacetSet,
    filter: &FilterState,
    link: impl Fn(&FilterState) -> String,
) -> Vec<FacetGroupView> {
    let mut groups = Vec::new();

    if !facets.availability.is_empty() {
        groups.push(FacetGroupView {
            title: "Availability",
            param: params::AVAILABILITY,
            options: facets
                .availability
                .iter()
                .map(|(&availability, &count)| FacetOptionView {
                    label: availability.label().to_string(),
                    value: availability.as_param().to_string(),
                    count,
                    selected: filter.availability.contains(&availability),
                    href: link(&filter.toggled(params::AVAILABILITY, availability.as_param())),
                })
                .collect(),
        });
    }

    let string_groups = [
        ("Color", params::COLOR, &facets.colors, &filter.colors),
        ("Size", params::SIZE, &facets.sizes, &filter.sizes),
        ("Tag", params::TAG, &facets.tags, &filter.tags),
    ];
    for (title, param, values, selected) in string_groups {
        if values.is_empty() {
            continue;
        }
        groups.push(FacetGroupView {
            title,
            param,
            options: values
                .iter()
                .map(|(value, &count)| {
                    let stored = stored_value(selected, value);
                    let toggle = stored.as_deref().unwrap_or(value);
                    FacetOptionView {
                        label: value.clone(),
                        value: value.clone(),
                        count,
                        selected: stored.is_some(),
                        href: link(&filter.toggled(param, toggle)),
                    }
                })
                .collect(),
        });
    }

    groups
}

fn active_filters(
    filter: &FilterState,
    link: impl Fn(&FilterState) -> String,
) -> Vec<ActiveFilterView> {
    let mut chips: Vec<ActiveFilterView> = filter
        .availability
        .iter()
        .map(|a: &Availability| ActiveFilterView {
            label: a.label().to_string(),
            href: link(&filter.toggled(params::AVAILABILITY, a.as_param())),
        })
        .collect();

    for (param, values) in [
        (params::COLOR, &filter.colors),
        (params::SIZE, &filter.sizes),
        (params::TAG, &filter.tags),
    ] {
        chips.extend(values.iter().map(|value| ActiveFilterView {
            label: value.clone(),
            href: link(&filter.toggled(param, value)),
        }));
    }

    if !filter.price.is_unbounded() {
        let mut without_price = filter.clone();
        without_price.price = shopfront_core::PriceFilter::default();
        let label = match (filter.price.min, filter.price.max) {
            (Some(min), Some(max)) => format!("{min} - {max}"),
            (Some(min), None) => format!("From {min}"),
            (None, Some(max)) => format!("Up to {max}"),
            (None, None) => String::new(),
        };
        chips.push(ActiveFilterView {
            label,
            href: link(&without_price),
        });
    }

    chips
}
