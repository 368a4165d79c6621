//! The consolidated listing pipeline.
//!
//! Collection pages, search results and the trending section all run the
//! same steps over the page of products they fetched:
//!
//! 1. extract the facets present in the page,
//! 2. prune the requested filter to those facets,
//! 3. keep the products the pruned filter matches,
//! 4. order them by the requested sort key.

use crate::catalog::Product;
use crate::facets::{FacetSet, extract_facets};
use crate::filter::FilterState;
use crate::sort::{SortKey, sort_refs};

/// Result of running the pipeline over one product page.
#[derive(Debug, Clone)]
pub struct Listing<'a> {
    facets: FacetSet,
    filter: FilterState,
    sort: SortKey,
    products: Vec<&'a Product>,
    total: usize,
    pruned: bool,
}

impl<'a> Listing<'a> {
    /// Run facet extraction, pruning, filtering and sorting.
    #[must_use]
    pub fn build(products: &'a [Product], mut filter: FilterState, sort: SortKey) -> Self {
        let facets = extract_facets(products);
        let pruned = filter.prune_to(&facets);
        let mut visible = filter.apply(products);
        sort_refs(&mut visible, sort);

        Self {
            facets,
            filter,
            sort,
            products: visible,
            total: products.len(),
            pruned,
        }
    }

    /// Facets available in the unfiltered page.
    #[must_use]
    pub const fn facets(&self) -> &FacetSet {
        &self.facets
    }

    /// The filter actually applied, after pruning.
    #[must_use]
    pub const fn filter(&self) -> &FilterState {
        &self.filter
    }

    #[must_use]
    pub const fn sort(&self) -> SortKey {
        self.sort
    }

    /// Visible products, filtered and sorted.
    #[must_use]
    pub fn products(&self) -> &[&'a Product] {
        &self.products
    }

    /// Number of products in the page before filtering.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Number of products after filtering.
    #[must_use]
    pub fn visible(&self) -> usize {
        self.products.len()
    }

    /// Whether pruning removed selections the page no longer offers.
    #[must_use]
    pub const fn was_pruned(&self) -> bool {
        self.pruned
    }

    /// A bounded slice of the visible products for rendering.
    #[must_use]
    pub fn window(&self, offset: usize, limit: usize) -> &[&'a Product] {
        let start = offset.min(self.products.len());
        let end = start.saturating_add(limit).min(self.products.len());
        self.products.get(start..end).unwrap_or_default()
    }

    /// Owned copies of the visible products.
    #[must_use]
    pub fn into_products(self) -> Vec<Product> {
        self.products.into_iter().cloned().collect()
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::filter::PriceFilter;
    use crate::sort::sort_products;
    use crate::test_support::{ProductBuilder, variant};
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    const COLORS: [&str; 4] = ["Red", "Blue", "Green", "Black"];
    const TAGS: [&str; 3] = ["sale", "new", "summer"];

    fn arb_product(index: usize) -> impl Strategy<Value = Product> {
        (
            1u32..500,
            0u32..200,
            any::<bool>(),
            0usize..COLORS.len(),
            proptest::collection::vec(0usize..TAGS.len(), 0..3),
            proptest::option::of(0u64..1000),
        )
            .prop_map(move |(min, spread, available, color, tags, sold)| {
                let min_price = format!("{min}.00");
                let max_price = format!("{}.00", min + spread);
                let tags: Vec<&str> = tags
                    .into_iter()
                    .filter_map(|i| TAGS.get(i).copied())
                    .collect();
                let color = COLORS.get(color).copied().unwrap_or("Red");
                let mut builder = ProductBuilder::new(&format!("p{index}"))
                    .variant(variant(&index.to_string(), &min_price, available).option("Color", color))
                    .price(&min_price, &max_price)
                    .tags(&tags);
                if let Some(sold) = sold {
                    builder = builder.sold(sold);
                }
                builder.build()
            })
    }

    fn arb_products() -> impl Strategy<Value = Vec<Product>> {
        (0usize..12).prop_flat_map(|n| {
            (0..n).map(arb_product).collect::<Vec<_>>()
        })
    }

    fn arb_filter() -> impl Strategy<Value = FilterState> {
        (
            proptest::collection::btree_set(0usize..COLORS.len(), 0..3),
            proptest::collection::btree_set(0usize..TAGS.len(), 0..2),
            proptest::option::of(0u32..600),
            proptest::option::of(0u32..600),
            proptest::option::of(any::<bool>()),
        )
            .prop_map(|(colors, tags, min, max, available)| {
                let mut filter = FilterState::default();
                filter.colors = colors
                    .into_iter()
                    .filter_map(|i| COLORS.get(i).map(|c| (*c).to_string()))
                    .collect();
                filter.tags = tags
                    .into_iter()
                    .filter_map(|i| TAGS.get(i).map(|t| (*t).to_string()))
                    .collect();
                filter.price = PriceFilter {
                    min: min.map(Decimal::from),
                    max: max.map(Decimal::from),
                };
                if let Some(available) = available {
                    filter
                        .availability
                        .insert(crate::facets::Availability::from_available(available));
                }
                filter
            })
    }

    fn arb_sort() -> impl Strategy<Value = SortKey> {
        proptest::sample::select(SortKey::ALL.to_vec())
    }

    fn ids(products: &[&Product]) -> Vec<String> {
        let mut ids: Vec<String> = products.iter().map(|p| p.id.to_string()).collect();
        ids.sort();
        ids
    }

    proptest! {
        /// Property: sorting is a permutation of the filtered set.
        #[test]
        fn sort_is_permutation_of_filter(
            products in arb_products(),
            filter in arb_filter(),
            sort in arb_sort(),
        ) {
            let filtered = filter.apply(&products);
            let listing = Listing::build(&products, filter.clone(), sort);
            // Listing prunes first; compare against the pruned filter.
            let expected = listing.filter().apply(&products);

            prop_assert_eq!(ids(listing.products()), ids(&expected));
            for product in listing.products() {
                prop_assert!(listing.filter().matches(product));
            }
            // Pruning only ever widens the result.
            prop_assert!(expected.len() >= filtered.len());
        }

        /// Property: filtering twice gives the same set as filtering once.
        #[test]
        fn filter_is_idempotent(products in arb_products(), filter in arb_filter()) {
            let once: Vec<Product> = filter.apply(&products).into_iter().cloned().collect();
            let twice = filter.apply(&once);
            prop_assert_eq!(twice.len(), once.len());
        }

        /// Property: re-sorting a sorted list is a no-op.
        #[test]
        fn sort_is_stable_fixpoint(products in arb_products(), sort in arb_sort()) {
            let sorted = sort_products(&products, sort);
            let again = sort_products(&sorted, sort);
            prop_assert_eq!(sorted, again);
        }

        /// Property: the empty filter is the identity.
        #[test]
        fn empty_filter_is_identity(products in arb_products()) {
            let visible = FilterState::default().apply(&products);
            prop_assert_eq!(visible.len(), products.len());
        }

        /// Property: an inverted price range matches nothing.
        #[test]
        fn inverted_price_range_is_empty(
            products in arb_products(),
            low in 0u32..300,
            gap in 1u32..300,
        ) {
            let mut filter = FilterState::default();
            filter.price = PriceFilter {
                min: Some(Decimal::from(low + gap)),
                max: Some(Decimal::from(low)),
            };
            prop_assert!(filter.apply(&products).is_empty());
        }
    }
}
