//! Storefront API types that are not part of the listing pipeline.
//!
//! Products, variants and connections live in `shopfront_core`; this module
//! adds collections, carts, blog content and shop policies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopfront_core::{
    ArticleId, CartId, CartLineId, CollectionId, Connection, Image, Money, Product, VariantId,
};

// =============================================================================
// Collection Types
// =============================================================================

/// Collection without its products, for the collection list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub id: CollectionId,
    pub handle: String,
    pub title: String,
    pub description: String,
    pub image: Option<Image>,
}

/// A collection with one page of its products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub handle: String,
    pub title: String,
    pub description: String,
    pub image: Option<Image>,
    /// The requested page of products, in the merchant's collection order.
    pub products: Connection<Product>,
}

impl Collection {
    #[must_use]
    pub fn summary(&self) -> CollectionSummary {
        CollectionSummary {
            id: self.id.clone(),
            handle: self.handle.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
        }
    }
}

// =============================================================================
// Cart Types
// =============================================================================

/// A line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub quantity: u32,
    pub variant_id: VariantId,
    /// Variant title, `None` for single-variant products.
    pub variant_title: Option<String>,
    pub product_handle: String,
    pub product_title: String,
    pub image: Option<Image>,
    pub unit_price: Money,
    pub line_total: Money,
}

/// A shopping cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    /// Shopify-hosted checkout for this cart.
    pub checkout_url: String,
    pub total_quantity: u32,
    pub subtotal: Money,
    pub total: Money,
    pub lines: Vec<CartLine>,
}

/// Input for adding a line to a cart.
#[derive(Debug, Clone)]
pub struct CartLineInput {
    pub merchandise_id: VariantId,
    pub quantity: u32,
}

/// Input for changing the quantity of an existing line.
#[derive(Debug, Clone)]
pub struct CartLineUpdateInput {
    pub id: CartLineId,
    pub quantity: u32,
}

// =============================================================================
// Content Types
// =============================================================================

/// Article as listed on a blog page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: ArticleId,
    pub handle: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub image: Option<Image>,
}

/// A blog with one page of its articles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    pub handle: String,
    pub title: String,
    pub articles: Connection<ArticleSummary>,
}

/// A full article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub handle: String,
    pub title: String,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub image: Option<Image>,
    /// Sanitized HTML from the Storefront API.
    pub content_html: String,
    pub blog_handle: String,
    pub blog_title: String,
}

/// A shop policy (privacy, refund, shipping, terms).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopPolicy {
    pub handle: String,
    pub title: String,
    /// Policy HTML.
    pub body: String,
    pub url: String,
}

// =============================================================================
// Sort Keys
// =============================================================================

/// Upstream `ProductSortKeys` used for catalog-wide queries.
///
/// Only the home page trending row and the CLI send a sort upstream; listing
/// pages sort the fetched page in process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductSortKey {
    BestSelling,
    CreatedAt,
    Price,
    Relevance,
    Title,
}

impl ProductSortKey {
    /// Upstream key and `reverse` flag for a listing sort.
    #[must_use]
    pub const fn for_sort(sort: shopfront_core::SortKey) -> (Self, bool) {
        use shopfront_core::SortKey;
        match sort {
            SortKey::Featured | SortKey::Relevance => (Self::Relevance, false),
            SortKey::Newest => (Self::CreatedAt, true),
            SortKey::BestSelling => (Self::BestSelling, false),
            SortKey::PriceLowHigh => (Self::Price, false),
            SortKey::PriceHighLow => (Self::Price, true),
        }
    }
}

// =============================================================================
// Product Detail
// =============================================================================

/// A product with the fields only the detail page needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    pub product: Product,
    /// Sanitized description HTML.
    pub description_html: String,
    /// Gallery images, featured image first.
    pub images: Vec<Image>,
}
