//! Builders for catalog fixtures used across unit tests.

#![allow(clippy::unwrap_used)]

use crate::catalog::{
    OptionValue, PriceRange, Product, ProductOption, ProductVariant, SelectedOption,
};
use crate::types::{Money, ProductId, VariantId};

pub struct VariantBuilder {
    variant: ProductVariant,
}

/// Start a variant with a numeric ID suffix, price and availability.
pub fn variant(id: &str, price: &str, available: bool) -> VariantBuilder {
    VariantBuilder {
        variant: ProductVariant {
            id: VariantId::new(format!("gid://shopify/ProductVariant/{id}")),
            title: format!("Variant {id}"),
            available_for_sale: available,
            selected_options: Vec::new(),
            price: Money::parse_lossy(price, "USD"),
            compare_at_price: None,
            image: None,
        },
    }
}

impl VariantBuilder {
    pub fn option(mut self, name: &str, value: &str) -> Self {
        self.variant.selected_options.push(SelectedOption {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn build(self) -> ProductVariant {
        self.variant
    }
}

pub struct ProductBuilder {
    product: Product,
    explicit_price: bool,
}

impl ProductBuilder {
    pub fn new(handle: &str) -> Self {
        Self {
            product: Product {
                id: ProductId::new(format!("gid://shopify/Product/{handle}")),
                handle: handle.to_string(),
                title: handle.to_string(),
                description: String::new(),
                vendor: String::new(),
                available_for_sale: false,
                tags: Vec::new(),
                price_range: PriceRange::default(),
                featured_image: None,
                options: Vec::new(),
                variants: Vec::new(),
                published_at: None,
                updated_at: None,
                created_at: None,
                total_sold: None,
            },
            explicit_price: false,
        }
    }

    pub fn variant(mut self, variant: VariantBuilder) -> Self {
        self.product.variants.push(variant.build());
        self
    }

    pub fn option(mut self, name: &str, values: &[&str]) -> Self {
        self.product.options.push(ProductOption {
            name: name.to_string(),
            option_values: values
                .iter()
                .map(|v| OptionValue {
                    name: (*v).to_string(),
                })
                .collect(),
        });
        self
    }

    pub fn price(mut self, min: &str, max: &str) -> Self {
        self.product.price_range = PriceRange {
            min_variant_price: Money::parse_lossy(min, "USD"),
            max_variant_price: Money::parse_lossy(max, "USD"),
        };
        self.explicit_price = true;
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.product.tags = tags.iter().map(|t| (*t).to_string()).collect();
        self
    }

    pub const fn available(mut self, available: bool) -> Self {
        self.product.available_for_sale = available;
        self
    }

    pub const fn sold(mut self, total: u64) -> Self {
        self.product.total_sold = Some(total);
        self
    }

    pub fn published(mut self, at: &str) -> Self {
        self.product.published_at = Some(at.parse().unwrap());
        self
    }

    pub fn build(mut self) -> Product {
        if !self.explicit_price {
            let prices = self.product.variants.iter().map(|v| &v.price);
            let min = prices.clone().min_by(|a, b| a.cmp_amount(b)).cloned();
            let max = prices.max_by(|a, b| a.cmp_amount(b)).cloned();
            if let (Some(min), Some(max)) = (min, max) {
                self.product.price_range = PriceRange {
                    min_variant_price: min,
                    max_variant_price: max,
                };
            }
        }
        if self.product.variants.iter().any(|v| v.available_for_sale) {
            self.product.available_for_sale = true;
        }
        self.product
    }
}
