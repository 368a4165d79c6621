//! Paged product sources.
//!
//! A [`PageSource`] fetches one page of products for a [`PageRequest`];
//! the pager drives it without caring which query backs the listing.

use std::future::Future;

use shopfront_core::{Connection, PageRequest, Product, SortKey};

use super::{ShopifyError, StorefrontClient};

/// Something that can fetch a page of products.
pub trait PageSource {
    /// Fetch the page described by `request`.
    fn fetch(
        &self,
        request: &PageRequest,
    ) -> impl Future<Output = Result<Connection<Product>, ShopifyError>> + Send;
}

/// Products of one collection, in collection order.
#[derive(Clone)]
pub struct CollectionSource {
    client: StorefrontClient,
    handle: String,
}

impl CollectionSource {
    #[must_use]
    pub fn new(client: StorefrontClient, handle: impl Into<String>) -> Self {
        Self {
            client,
            handle: handle.into(),
        }
    }
}

impl PageSource for CollectionSource {
    async fn fetch(&self, request: &PageRequest) -> Result<Connection<Product>, ShopifyError> {
        let collection = self.client.get_collection(&self.handle, request).await?;
        Ok(collection.products)
    }
}

/// Products matching a search term, in relevance order.
#[derive(Clone)]
pub struct SearchSource {
    client: StorefrontClient,
    term: String,
}

impl SearchSource {
    #[must_use]
    pub fn new(client: StorefrontClient, term: impl Into<String>) -> Self {
        Self {
            client,
            term: term.into(),
        }
    }
}

impl PageSource for SearchSource {
    async fn fetch(&self, request: &PageRequest) -> Result<Connection<Product>, ShopifyError> {
        self.client.search_products(&self.term, request).await
    }
}

/// The whole catalog with an upstream sort.
#[derive(Clone)]
pub struct CatalogSource {
    client: StorefrontClient,
    sort: SortKey,
}

impl CatalogSource {
    #[must_use]
    pub const fn new(client: StorefrontClient, sort: SortKey) -> Self {
        Self { client, sort }
    }
}

impl PageSource for CatalogSource {
    async fn fetch(&self, request: &PageRequest) -> Result<Connection<Product>, ShopifyError> {
        self.client.get_products(request, self.sort, None).await
    }
}
