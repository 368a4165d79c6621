//! Catalog types: products, variants and their options.
//!
//! These mirror the parts of the Storefront API `Product` object that the
//! listing pages use. Every field the API may omit is optional or defaults
//! to empty, so partially-populated query fragments still deserialize and
//! simply contribute nothing to facets or sorting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Money, ProductId, VariantId};

/// Product or variant image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
    /// Image width in pixels.
    pub width: Option<u32>,
    /// Image height in pixels.
    pub height: Option<u32>,
}

/// One possible value of a product option (e.g., "Red").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValue {
    pub name: String,
}

/// Product option definition (e.g., "Color" with Red/Blue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option name as configured by the merchant (e.g., "Size").
    pub name: String,
    /// Values offered for this option.
    #[serde(default)]
    pub option_values: Vec<OptionValue>,
}

impl ProductOption {
    /// Iterate the non-empty value names.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.option_values
            .iter()
            .map(|v| v.name.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Selected option on a product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Size", "Color").
    pub name: String,
    /// Selected value (e.g., "Large", "Blue").
    pub value: String,
}

/// Price range for a product.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceRange {
    /// Minimum price among all variants.
    pub min_variant_price: Money,
    /// Maximum price among all variants.
    pub max_variant_price: Money,
}

/// A product variant (specific combination of options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID.
    pub id: VariantId,
    /// Variant title (combination of option values).
    pub title: String,
    /// Whether this variant is available for sale.
    pub available_for_sale: bool,
    /// Selected options for this variant.
    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
    /// Current price.
    pub price: Money,
    /// Compare-at price (original price if on sale).
    pub compare_at_price: Option<Money>,
    /// Variant image.
    pub image: Option<Image>,
}

impl ProductVariant {
    /// Value of the selected option with the given name (case-insensitive).
    #[must_use]
    pub fn option_value(&self, name: &str) -> Option<&str> {
        self.selected_options
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(name))
            .map(|o| o.value.as_str())
    }

    /// Whether the variant is discounted against its compare-at price.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.compare_at_price
            .as_ref()
            .is_some_and(|compare| compare.amount > self.price.amount)
    }
}

/// A product in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Plain text description.
    #[serde(default)]
    pub description: String,
    /// Vendor name.
    #[serde(default)]
    pub vendor: String,
    /// Whether any variant is available.
    pub available_for_sale: bool,
    /// Product tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Price range across variants.
    #[serde(default)]
    pub price_range: PriceRange,
    /// Featured image.
    pub featured_image: Option<Image>,
    /// Product options.
    #[serde(default)]
    pub options: Vec<ProductOption>,
    /// Product variants, in API order.
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    /// When the product was published to the online store.
    pub published_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Units sold, from the `custom.total_sold` metafield when the shop has it.
    pub total_sold: Option<u64>,
}

impl Product {
    /// The variant whose price and availability the product displays.
    #[must_use]
    pub fn primary_variant(&self) -> Option<&ProductVariant> {
        self.variants.first()
    }

    /// Find a variant by ID.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| &v.id == id)
    }

    /// Find the variant matching every given option selection.
    ///
    /// Falls back to the primary variant when nothing matches.
    #[must_use]
    pub fn variant_for_options(&self, selection: &[SelectedOption]) -> Option<&ProductVariant> {
        self.variants
            .iter()
            .find(|variant| {
                selection.iter().all(|wanted| {
                    variant
                        .option_value(&wanted.name)
                        .is_some_and(|value| value.eq_ignore_ascii_case(&wanted.value))
                })
            })
            .or_else(|| self.primary_variant())
    }

    /// Availability as displayed: the primary variant's flag, or the
    /// product-level flag when the page carries no variants.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.primary_variant()
            .map_or(self.available_for_sale, |v| v.available_for_sale)
    }

    /// Minimum variant price.
    #[must_use]
    pub const fn min_price(&self) -> &Money {
        &self.price_range.min_variant_price
    }

    /// Maximum variant price.
    #[must_use]
    pub const fn max_price(&self) -> &Money {
        &self.price_range.max_variant_price
    }

    /// First non-null of published, updated and created timestamps.
    #[must_use]
    pub fn recency(&self) -> Option<DateTime<Utc>> {
        self.published_at.or(self.updated_at).or(self.created_at)
    }

    /// Whether the product carries the given tag (case-insensitive).
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.trim().eq_ignore_ascii_case(tag.trim()))
    }
}
