//! Named sort criteria for product listings.
//!
//! Every sort is stable and works on a copy, so products with equal keys
//! keep the order the Storefront API returned them in.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::Product;

/// Sort criteria offered on listing pages.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Merchant-defined collection order.
    #[default]
    Featured,
    /// Search relevance, as ranked upstream.
    Relevance,
    /// Most recently published first.
    Newest,
    /// Highest `total_sold` first.
    BestSelling,
    /// Ascending by minimum variant price.
    PriceLowHigh,
    /// Descending by maximum variant price.
    PriceHighLow,
}

impl SortKey {
    /// Every key, in the order the sort menu lists them.
    pub const ALL: [Self; 6] = [
        Self::Featured,
        Self::Relevance,
        Self::Newest,
        Self::BestSelling,
        Self::PriceLowHigh,
        Self::PriceHighLow,
    ];

    /// Parse from URL parameter value. Unknown values fall back to the default.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "relevance" => Self::Relevance,
            "newest" | "created-descending" | "created_desc" => Self::Newest,
            "best-selling" | "best_selling" | "bestselling" => Self::BestSelling,
            "price-low-high" | "price-ascending" | "price_asc" => Self::PriceLowHigh,
            "price-high-low" | "price-descending" | "price_desc" => Self::PriceHighLow,
            _ => Self::Featured,
        }
    }

    /// Convert to URL parameter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::Relevance => "relevance",
            Self::Newest => "newest",
            Self::BestSelling => "best-selling",
            Self::PriceLowHigh => "price-low-high",
            Self::PriceHighLow => "price-high-low",
        }
    }

    /// Label for the sort menu.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Featured => "Featured",
            Self::Relevance => "Relevance",
            Self::Newest => "Newest",
            Self::BestSelling => "Best selling",
            Self::PriceLowHigh => "Price: low - high",
            Self::PriceHighLow => "Price: high - low",
        }
    }

    /// Whether this key keeps the upstream order.
    #[must_use]
    pub const fn is_identity(self) -> bool {
        matches!(self, Self::Featured | Self::Relevance)
    }

    /// Compare two products under this key.
    ///
    /// Price high-low ranks by the maximum variant price while low-high
    /// ranks by the minimum; listings have always behaved this way.
    #[must_use]
    pub fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Featured | Self::Relevance => Ordering::Equal,
            Self::Newest => b.recency().cmp(&a.recency()),
            Self::BestSelling => b.total_sold.unwrap_or(0).cmp(&a.total_sold.unwrap_or(0)),
            Self::PriceLowHigh => a.min_price().cmp_amount(b.min_price()),
            Self::PriceHighLow => b.max_price().cmp_amount(a.max_price()),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Return a sorted copy of `products`; the input is left untouched.
#[must_use]
pub fn sort_products(products: &[Product], key: SortKey) -> Vec<Product> {
    let mut sorted = products.to_vec();
    if !key.is_identity() {
        sorted.sort_by(|a, b| key.compare(a, b));
    }
    sorted
}

/// Sort a list of borrowed products in place. The products themselves are
/// not touched; only the order of the references changes.
pub fn sort_refs(products: &mut [&Product], key: SortKey) {
    if !key.is_identity() {
        products.sort_by(|a, b| key.compare(a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ProductBuilder;

    fn handles(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.handle.as_str()).collect()
    }

    #[test]
    fn test_price_high_low_uses_max_price() {
        let products = vec![
            ProductBuilder::new("ten").price("10.00", "10.00").build(),
            ProductBuilder::new("twenty").price("20.00", "20.00").build(),
        ];
        let sorted = sort_products(&products, SortKey::PriceHighLow);
        assert_eq!(handles(&sorted), vec!["twenty", "ten"]);
    }

    #[test]
    fn test_price_sort_asymmetry() {
        // a: 5..50, b: 10..20
        let products = vec![
            ProductBuilder::new("a").price("5.00", "50.00").build(),
            ProductBuilder::new("b").price("10.00", "20.00").build(),
        ];
        assert_eq!(
            handles(&sort_products(&products, SortKey::PriceLowHigh)),
            vec!["a", "b"]
        );
        assert_eq!(
            handles(&sort_products(&products, SortKey::PriceHighLow)),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_input_not_mutated() {
        let products = vec![
            ProductBuilder::new("cheap").price("1.00", "1.00").build(),
            ProductBuilder::new("dear").price("9.00", "9.00").build(),
        ];
        let before = products.clone();
        let _ = sort_products(&products, SortKey::PriceHighLow);
        assert_eq!(products, before);
    }

    #[test]
    fn test_newest_uses_recency_and_missing_sorts_last() {
        let mut undated = ProductBuilder::new("undated").build();
        undated.created_at = None;
        let mut updated = ProductBuilder::new("updated").build();
        updated.updated_at = "2024-06-01T00:00:00Z".parse().ok();
        let products = vec![
            undated,
            ProductBuilder::new("old").published("2023-01-01T00:00:00Z").build(),
            updated,
            ProductBuilder::new("new").published("2024-09-01T00:00:00Z").build(),
        ];

        let sorted = sort_products(&products, SortKey::Newest);
        assert_eq!(handles(&sorted), vec!["new", "updated", "old", "undated"]);
    }

    #[test]
    fn test_best_selling_missing_counter_is_zero() {
        let products = vec![
            ProductBuilder::new("unknown").build(),
            ProductBuilder::new("hit").sold(120).build(),
            ProductBuilder::new("zero").sold(0).build(),
            ProductBuilder::new("some").sold(4).build(),
        ];
        let sorted = sort_products(&products, SortKey::BestSelling);
        assert_eq!(handles(&sorted), vec!["hit", "some", "unknown", "zero"]);
    }

    #[test]
    fn test_featured_is_identity() {
        let products = vec![
            ProductBuilder::new("b").price("2.00", "2.00").build(),
            ProductBuilder::new("a").price("1.00", "1.00").build(),
        ];
        assert_eq!(handles(&sort_products(&products, SortKey::Featured)), vec!["b", "a"]);
        assert_eq!(handles(&sort_products(&products, SortKey::Relevance)), vec!["b", "a"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let products = vec![
            ProductBuilder::new("first").price("5.00", "5.00").build(),
            ProductBuilder::new("second").price("5.00", "5.00").build(),
            ProductBuilder::new("third").price("5.00", "5.00").build(),
        ];
        let sorted = sort_products(&products, SortKey::PriceLowHigh);
        assert_eq!(handles(&sorted), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_parse_round_trip() {
        for key in SortKey::ALL {
            assert_eq!(SortKey::parse(key.as_str()), key);
        }
        assert_eq!(SortKey::parse("price-ascending"), SortKey::PriceLowHigh);
        assert_eq!(SortKey::parse("garbage"), SortKey::Featured);
    }
}
