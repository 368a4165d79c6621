//! Facet extraction over an already-fetched page of products.
//!
//! The filter panel only offers values that actually occur in the page the
//! visitor is looking at. [`extract_facets`] derives those values; it is a
//! pure function and is simply re-run whenever the product list changes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;

/// Option names treated as the color facet.
const COLOR_OPTION_NAMES: &[&str] = &["color", "colour"];

/// Option names treated as the size facet, including localized terms.
const SIZE_OPTION_NAMES: &[&str] = &[
    "size",
    "shoe size",
    "größe",
    "grösse",
    "taille",
    "talla",
    "maat",
    "storlek",
];

/// The option-backed facet an option name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Color,
    Size,
}

impl OptionKind {
    /// Classify a merchant-defined option name, case-insensitively.
    #[must_use]
    pub fn classify(option_name: &str) -> Option<Self> {
        let name = option_name.trim().to_lowercase();
        if COLOR_OPTION_NAMES.contains(&name.as_str()) {
            Some(Self::Color)
        } else if SIZE_OPTION_NAMES.contains(&name.as_str()) {
            Some(Self::Size)
        } else {
            None
        }
    }

    /// Whether an option name belongs to this facet.
    #[must_use]
    pub fn matches(self, option_name: &str) -> bool {
        Self::classify(option_name) == Some(self)
    }
}

/// Stock state a visitor can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Availability {
    InStock,
    OutOfStock,
}

impl Availability {
    /// The `available_for_sale` value this state selects.
    #[must_use]
    pub const fn is_available(self) -> bool {
        matches!(self, Self::InStock)
    }

    #[must_use]
    pub const fn from_available(available: bool) -> Self {
        if available {
            Self::InStock
        } else {
            Self::OutOfStock
        }
    }

    /// Label shown in the filter panel.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InStock => "In stock",
            Self::OutOfStock => "Out of stock",
        }
    }

    /// URL parameter value.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::InStock => "1",
            Self::OutOfStock => "0",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Availability {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in stock" | "in-stock" | "in_stock" | "1" | "true" => Ok(Self::InStock),
            "out of stock" | "out-of-stock" | "out_of_stock" | "0" | "false" => {
                Ok(Self::OutOfStock)
            }
            _ => Err(()),
        }
    }
}

/// Lowest and highest minimum-variant price observed on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceBounds {
    pub min: Decimal,
    pub max: Decimal,
}

/// Filterable values present in a product page, with product counts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FacetSet {
    pub colors: BTreeMap<String, usize>,
    pub sizes: BTreeMap<String, usize>,
    pub tags: BTreeMap<String, usize>,
    pub availability: BTreeMap<Availability, usize>,
    pub price: PriceBounds,
}

impl FacetSet {
    /// Whether the page offers the color (case-insensitive).
    #[must_use]
    pub fn has_color(&self, color: &str) -> bool {
        contains_ignore_case(&self.colors, color)
    }

    /// Whether the page offers the size (case-insensitive).
    #[must_use]
    pub fn has_size(&self, size: &str) -> bool {
        contains_ignore_case(&self.sizes, size)
    }

    /// Whether the page offers the tag (case-insensitive).
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        contains_ignore_case(&self.tags, tag)
    }

    /// Whether there is nothing to filter on.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
            && self.sizes.is_empty()
            && self.tags.is_empty()
            && self.availability.is_empty()
    }
}

fn contains_ignore_case(values: &BTreeMap<String, usize>, wanted: &str) -> bool {
    let wanted = wanted.trim().to_lowercase();
    values.keys().any(|value| value.to_lowercase() == wanted)
}

/// Values one product contributes to the option-backed facets.
///
/// Values are collected from the product's option list and from its
/// variants' selected options, deduplicated case-insensitively so that a
/// product counts once per value.
fn product_option_values(product: &Product, kind: OptionKind) -> Vec<&str> {
    let from_options = product
        .options
        .iter()
        .filter(|option| kind.matches(&option.name))
        .flat_map(|option| option.values());
    let from_variants = product
        .variants
        .iter()
        .flat_map(|variant| variant.selected_options.iter())
        .filter(|selected| kind.matches(&selected.name))
        .map(|selected| selected.value.trim())
        .filter(|value| !value.is_empty());

    let mut seen: Vec<&str> = Vec::new();
    for value in from_options.chain(from_variants) {
        if !seen.iter().any(|s| s.to_lowercase() == value.to_lowercase()) {
            seen.push(value);
        }
    }
    seen
}

/// Record a value under the first spelling seen for it.
fn bump(values: &mut BTreeMap<String, usize>, value: &str) {
    let lower = value.to_lowercase();
    if let Some(count) = values
        .iter_mut()
        .find_map(|(k, count)| (k.to_lowercase() == lower).then_some(count))
    {
        *count += 1;
    } else {
        values.insert(value.to_string(), 1);
    }
}

/// Derive the filterable values present in a product page.
///
/// Missing options, variants or tags contribute nothing. An empty page
/// yields zero price bounds.
#[must_use]
pub fn extract_facets(products: &[Product]) -> FacetSet {
    let mut facets = FacetSet::default();
    let mut price: Option<PriceBounds> = None;

    for product in products {
        for color in product_option_values(product, OptionKind::Color) {
            bump(&mut facets.colors, color);
        }
        for size in product_option_values(product, OptionKind::Size) {
            bump(&mut facets.sizes, size);
        }

        let mut product_tags: Vec<&str> = Vec::new();
        for tag in product.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            if !product_tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                product_tags.push(tag);
                bump(&mut facets.tags, tag);
            }
        }

        *facets
            .availability
            .entry(Availability::from_available(product.is_available()))
            .or_insert(0) += 1;

        let amount = product.min_price().amount;
        price = Some(price.map_or(
            PriceBounds {
                min: amount,
                max: amount,
            },
            |bounds| PriceBounds {
                min: bounds.min.min(amount),
                max: bounds.max.max(amount),
            },
        ));
    }

    facets.price = price.unwrap_or_default();
    facets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ProductBuilder, variant};

    #[test]
    fn test_color_from_option_values() {
        let products = vec![
            ProductBuilder::new("tee")
                .option("Color", &["Red"])
                .variant(variant("1", "10.00", true))
                .build(),
        ];

        let facets = extract_facets(&products);
        assert_eq!(facets.colors.keys().collect::<Vec<_>>(), vec!["Red"]);
    }

    #[test]
    fn test_size_option_name_variants() {
        let products = vec![
            ProductBuilder::new("sneaker")
                .option("Shoe Size", &["9", "10"])
                .build(),
            ProductBuilder::new("dress").option("Taille", &["M"]).build(),
            ProductBuilder::new("cap").option("Material", &["Wool"]).build(),
        ];

        let facets = extract_facets(&products);
        assert_eq!(
            facets.sizes.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["10", "9", "M"]
        );
        assert!(facets.colors.is_empty());
    }

    #[test]
    fn test_variant_selected_options_contribute() {
        let products = vec![
            ProductBuilder::new("hoodie")
                .variant(variant("1", "40.00", true).option("colour", "Navy"))
                .variant(variant("2", "40.00", true).option("Colour", "navy"))
                .build(),
        ];

        let facets = extract_facets(&products);
        assert_eq!(facets.colors.get("Navy"), Some(&1));
        assert!(facets.has_color("NAVY"));
    }

    #[test]
    fn test_counts_products_per_value() {
        let products = vec![
            ProductBuilder::new("a").option("Color", &["Red", "Blue"]).build(),
            ProductBuilder::new("b").option("Color", &["red"]).build(),
        ];

        let facets = extract_facets(&products);
        assert_eq!(facets.colors.get("Red"), Some(&2));
        assert_eq!(facets.colors.get("Blue"), Some(&1));
    }

    #[test]
    fn test_tags_ignore_blank_and_duplicates() {
        let products = vec![
            ProductBuilder::new("a").tags(&["sale", " ", "Sale", "new"]).build(),
            ProductBuilder::new("b").build(),
        ];

        let facets = extract_facets(&products);
        assert_eq!(facets.tags.get("sale"), Some(&1));
        assert_eq!(facets.tags.get("new"), Some(&1));
        assert_eq!(facets.tags.len(), 2);
    }

    #[test]
    fn test_price_bounds_use_minimum_variant_price() {
        let products = vec![
            ProductBuilder::new("a").price("10.00", "80.00").build(),
            ProductBuilder::new("b").price("25.00", "30.00").build(),
        ];

        let facets = extract_facets(&products);
        assert_eq!(facets.price.min, Decimal::new(10, 0));
        assert_eq!(facets.price.max, Decimal::new(25, 0));
    }

    #[test]
    fn test_empty_page_has_zero_bounds() {
        let facets = extract_facets(&[]);
        assert_eq!(facets.price, PriceBounds::default());
        assert!(facets.is_empty());
    }

    #[test]
    fn test_availability_counts() {
        let products = vec![
            ProductBuilder::new("a").variant(variant("1", "5.00", true)).build(),
            ProductBuilder::new("b").variant(variant("2", "5.00", false)).build(),
            ProductBuilder::new("c").variant(variant("3", "5.00", true)).build(),
        ];

        let facets = extract_facets(&products);
        assert_eq!(facets.availability.get(&Availability::InStock), Some(&2));
        assert_eq!(facets.availability.get(&Availability::OutOfStock), Some(&1));
    }

    #[test]
    fn test_availability_parse() {
        assert_eq!("In stock".parse::<Availability>(), Ok(Availability::InStock));
        assert_eq!("out-of-stock".parse::<Availability>(), Ok(Availability::OutOfStock));
        assert_eq!("1".parse::<Availability>(), Ok(Availability::InStock));
        assert!("maybe".parse::<Availability>().is_err());
    }

    #[test]
    fn test_classify_option_names() {
        assert_eq!(OptionKind::classify(" COLOR "), Some(OptionKind::Color));
        assert_eq!(OptionKind::classify("Größe"), Some(OptionKind::Size));
        assert_eq!(OptionKind::classify("Material"), None);
    }
}
