//! Cache types for Storefront API responses.
//!
//! Carts and search results are never cached; everything else is keyed by
//! handle plus the page request so cursor pages do not collide.

use shopfront_core::{Connection, PageRequest, Product};

use crate::shopify::types::{Article, Blog, Collection, CollectionSummary, ProductDetail, ShopPolicy};

/// Cache key for Storefront API responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(String),
    Products { page: PageRequest, sort: String },
    Collection { handle: String, page: PageRequest },
    Collections,
    Policies,
    Blog { handle: String, page: PageRequest },
    Article { blog: String, article: String },
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<ProductDetail>),
    Products(Connection<Product>),
    Collection(Box<Collection>),
    Collections(Vec<CollectionSummary>),
    Policies(Vec<ShopPolicy>),
    Blog(Box<Blog>),
    Article(Box<Article>),
}
