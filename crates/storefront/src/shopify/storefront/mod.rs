//! Shopify Storefront API client implementation.
//!
//! Posts hand-written GraphQL documents with `reqwest` 0.13. Catalog reads
//! are cached using `moka` (5-minute TTL); cart mutations and search are not.

mod cache;
mod conversions;
pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use graphql_client::Response;
use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use shopfront_core::{CartId, CartLineId, Connection, PageRequest, Product, ProductId, SortKey};
use tracing::{debug, instrument};

use crate::config::ShopifyStorefrontConfig;
use crate::shopify::types::{
    Article, Blog, Cart, CartLineInput, CartLineUpdateInput, Collection, CollectionSummary,
    ProductDetail, ProductSortKey, ShopPolicy,
};
use crate::shopify::{GraphQLError, ShopifyError};

use cache::{CacheKey, CacheValue};
use conversions::{
    convert_article, convert_blog, convert_cart, convert_collection, convert_collection_summary,
    convert_connection, convert_policies, convert_product, convert_product_detail,
};
use queries::CartPayload;

/// Collections shown on the collection list page.
const COLLECTION_LIST_LIMIT: u32 = 100;

/// Most IDs a single `nodes(ids:)` query may request.
const MAX_NODE_IDS: usize = 250;

/// Header for server-side private access tokens.
const PRIVATE_TOKEN_HEADER: &str = "Shopify-Storefront-Private-Token";

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyStorefrontConfig) -> Self {
        Self::with_endpoint(config.endpoint(), config.storefront_private_token.expose_secret())
    }

    /// Create a client for an explicit GraphQL endpoint.
    #[must_use]
    pub fn with_endpoint(endpoint: impl Into<String>, access_token: &str) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300))
            .build();

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint: endpoint.into(),
                access_token: access_token.to_string(),
                cache,
            }),
        }
    }

    /// Execute a GraphQL document and decode its `data`.
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, ShopifyError> {
        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(PRIVATE_TOKEN_HEADER, &self.inner.access_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Storefront API returned non-success status"
            );
            return Err(ShopifyError::graphql(format!(
                "HTTP {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let envelope: Response<T> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse Storefront API response"
            );
            ShopifyError::Parse(e)
        })?;

        if let Some(errors) = envelope.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(
                errors.into_iter().map(GraphQLError::from).collect(),
            ));
        }

        envelope
            .data
            .ok_or_else(|| ShopifyError::graphql("response contained no data"))
    }

    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        let hit = self.inner.cache.get(key).await;
        if hit.is_some() {
            debug!(?key, "Cache hit");
        }
        hit
    }

    async fn store(&self, key: CacheKey, value: CacheValue) {
        self.inner.cache.insert(key, value).await;
    }

    /// Drop every cached response.
    pub fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a page of the whole catalog, sorted upstream.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(page = %page.cache_key(), sort = %sort))]
    pub async fn get_products(
        &self,
        page: &PageRequest,
        sort: SortKey,
        query: Option<&str>,
    ) -> Result<Connection<Product>, ShopifyError> {
        let key = CacheKey::Products {
            page: page.clone(),
            sort: format!("{sort}:{}", query.unwrap_or_default()),
        };
        if let Some(CacheValue::Products(products)) = self.cached(&key).await {
            return Ok(products);
        }

        let (sort_key, reverse) = ProductSortKey::for_sort(sort);
        let mut variables = page_variables(page);
        variables.insert("sortKey".to_string(), json!(sort_key));
        variables.insert("reverse".to_string(), json!(reverse));
        if let Some(query) = query.filter(|q| !q.trim().is_empty()) {
            variables.insert("query".to_string(), json!(query));
        }

        let data: queries::GetProductsData = self
            .execute(queries::GET_PRODUCTS, Value::Object(variables))
            .await?;
        let products = convert_connection(data.products, convert_product);

        self.store(key, CacheValue::Products(products.clone())).await;
        Ok(products)
    }

    /// Get a product by its handle.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no product has this handle, or an error if the
    /// API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product(&self, handle: &str) -> Result<ProductDetail, ShopifyError> {
        let key = CacheKey::Product(handle.to_string());
        if let Some(CacheValue::Product(product)) = self.cached(&key).await {
            return Ok(*product);
        }

        let data: queries::GetProductData = self
            .execute(queries::GET_PRODUCT, json!({ "handle": handle }))
            .await?;
        let product = data
            .product
            .map(convert_product_detail)
            .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {handle}")))?;

        self.store(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Get products related to `product_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product_recommendations(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<Product>, ShopifyError> {
        let data: queries::GetProductRecommendationsData = self
            .execute(
                queries::GET_PRODUCT_RECOMMENDATIONS,
                json!({ "productId": product_id.as_str() }),
            )
            .await?;

        Ok(data
            .product_recommendations
            .unwrap_or_default()
            .into_iter()
            .map(convert_product)
            .collect())
    }

    /// Full-text product search.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(term = %term, page = %page.cache_key()))]
    pub async fn search_products(
        &self,
        term: &str,
        page: &PageRequest,
    ) -> Result<Connection<Product>, ShopifyError> {
        let mut variables = page_variables(page);
        variables.insert("query".to_string(), json!(term));

        let data: queries::SearchProductsData = self
            .execute(queries::SEARCH_PRODUCTS, Value::Object(variables))
            .await?;
        Ok(convert_connection(data.search, convert_product))
    }

    /// Resolve product IDs, skipping any that no longer exist.
    ///
    /// Results keep the order of `ids`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn get_nodes(&self, ids: &[ProductId]) -> Result<Vec<Product>, ShopifyError> {
        let mut products = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_NODE_IDS) {
            let ids: Vec<&str> = chunk.iter().map(ProductId::as_str).collect();
            let data: queries::GetNodesData = self
                .execute(queries::GET_NODES, json!({ "ids": ids }))
                .await?;
            products.extend(data.nodes.into_iter().flatten().map(convert_product));
        }
        Ok(products)
    }

    // =========================================================================
    // Collection Methods
    // =========================================================================

    /// Get a collection by its handle with one page of products.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the collection does not exist, or an error if
    /// the API request fails.
    #[instrument(skip(self), fields(handle = %handle, page = %page.cache_key()))]
    pub async fn get_collection(
        &self,
        handle: &str,
        page: &PageRequest,
    ) -> Result<Collection, ShopifyError> {
        let key = CacheKey::Collection {
            handle: handle.to_string(),
            page: page.clone(),
        };
        if let Some(CacheValue::Collection(collection)) = self.cached(&key).await {
            return Ok(*collection);
        }

        let mut variables = page_variables(page);
        variables.insert("handle".to_string(), json!(handle));

        let data: queries::GetCollectionData = self
            .execute(queries::GET_COLLECTION, Value::Object(variables))
            .await?;
        let collection = data
            .collection
            .map(convert_collection)
            .ok_or_else(|| ShopifyError::NotFound(format!("Collection not found: {handle}")))?;

        self.store(key, CacheValue::Collection(Box::new(collection.clone())))
            .await;
        Ok(collection)
    }

    /// List collections by title.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_collections(&self) -> Result<Vec<CollectionSummary>, ShopifyError> {
        let key = CacheKey::Collections;
        if let Some(CacheValue::Collections(collections)) = self.cached(&key).await {
            return Ok(collections);
        }

        let data: queries::GetCollectionsData = self
            .execute(
                queries::GET_COLLECTIONS,
                json!({ "first": COLLECTION_LIST_LIMIT }),
            )
            .await?;
        let collections: Vec<CollectionSummary> = data
            .collections
            .nodes
            .into_iter()
            .map(convert_collection_summary)
            .collect();

        self.store(key, CacheValue::Collections(collections.clone()))
            .await;
        Ok(collections)
    }

    // =========================================================================
    // Content Methods
    // =========================================================================

    /// Get the shop's published policies.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_policies(&self) -> Result<Vec<ShopPolicy>, ShopifyError> {
        let key = CacheKey::Policies;
        if let Some(CacheValue::Policies(policies)) = self.cached(&key).await {
            return Ok(policies);
        }

        let data: queries::GetPoliciesData =
            self.execute(queries::GET_POLICIES, json!({})).await?;
        let policies = convert_policies(data.shop);

        self.store(key, CacheValue::Policies(policies.clone())).await;
        Ok(policies)
    }

    /// Get a blog with one page of articles, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the blog does not exist, or an error if the API
    /// request fails.
    #[instrument(skip(self), fields(handle = %handle, page = %page.cache_key()))]
    pub async fn get_blog_articles(
        &self,
        handle: &str,
        page: &PageRequest,
    ) -> Result<Blog, ShopifyError> {
        let key = CacheKey::Blog {
            handle: handle.to_string(),
            page: page.clone(),
        };
        if let Some(CacheValue::Blog(blog)) = self.cached(&key).await {
            return Ok(*blog);
        }

        let mut variables = page_variables(page);
        variables.insert("handle".to_string(), json!(handle));

        let data: queries::GetBlogData = self
            .execute(queries::GET_BLOG, Value::Object(variables))
            .await?;
        let blog = data
            .blog
            .map(convert_blog)
            .ok_or_else(|| ShopifyError::NotFound(format!("Blog not found: {handle}")))?;

        self.store(key, CacheValue::Blog(Box::new(blog.clone()))).await;
        Ok(blog)
    }

    /// Get a single article.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the blog or article does not exist, or an error
    /// if the API request fails.
    #[instrument(skip(self), fields(blog = %blog, article = %article))]
    pub async fn get_article(&self, blog: &str, article: &str) -> Result<Article, ShopifyError> {
        let key = CacheKey::Article {
            blog: blog.to_string(),
            article: article.to_string(),
        };
        if let Some(CacheValue::Article(cached)) = self.cached(&key).await {
            return Ok(*cached);
        }

        let data: queries::GetArticleData = self
            .execute(
                queries::GET_ARTICLE,
                json!({ "blog": blog, "article": article }),
            )
            .await?;
        let not_found = || ShopifyError::NotFound(format!("Article not found: {blog}/{article}"));
        let mut blog_fields = data.blog.ok_or_else(not_found)?;
        let article_fields = blog_fields.article_by_handle.take().ok_or_else(not_found)?;
        let article = convert_article(blog_fields, article_fields);

        self.store(key, CacheValue::Article(Box::new(article.clone())))
            .await;
        Ok(article)
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Create a new cart, optionally with initial lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart creation fails or user errors are returned.
    #[instrument(skip(self, lines))]
    pub async fn create_cart(&self, lines: &[CartLineInput]) -> Result<Cart, ShopifyError> {
        let data: queries::CreateCartData = self
            .execute(
                queries::CREATE_CART,
                json!({ "input": { "lines": line_inputs(lines) } }),
            )
            .await?;
        cart_from_payload(data.cart_create, "create cart")
    }

    /// Get an existing cart.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the cart expired or never existed, or an error
    /// if the API request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &CartId) -> Result<Cart, ShopifyError> {
        let data: queries::GetCartData = self
            .execute(queries::GET_CART, json!({ "cartId": cart_id.as_str() }))
            .await?;

        data.cart
            .map(convert_cart)
            .ok_or_else(|| ShopifyError::NotFound(format!("Cart not found: {cart_id}")))
    }

    /// Add lines to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn add_to_cart(
        &self,
        cart_id: &CartId,
        lines: &[CartLineInput],
    ) -> Result<Cart, ShopifyError> {
        let data: queries::AddToCartData = self
            .execute(
                queries::ADD_TO_CART,
                json!({ "cartId": cart_id.as_str(), "lines": line_inputs(lines) }),
            )
            .await?;
        cart_from_payload(data.cart_lines_add, "add to cart")
    }

    /// Change line quantities. A quantity of zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn update_cart_lines(
        &self,
        cart_id: &CartId,
        lines: &[CartLineUpdateInput],
    ) -> Result<Cart, ShopifyError> {
        let lines: Vec<Value> = lines
            .iter()
            .map(|l| json!({ "id": l.id.as_str(), "quantity": l.quantity }))
            .collect();
        let data: queries::UpdateCartLinesData = self
            .execute(
                queries::UPDATE_CART_LINES,
                json!({ "cartId": cart_id.as_str(), "lines": lines }),
            )
            .await?;
        cart_from_payload(data.cart_lines_update, "update cart")
    }

    /// Remove lines from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, line_ids), fields(cart_id = %cart_id))]
    pub async fn remove_from_cart(
        &self,
        cart_id: &CartId,
        line_ids: &[CartLineId],
    ) -> Result<Cart, ShopifyError> {
        let line_ids: Vec<&str> = line_ids.iter().map(CartLineId::as_str).collect();
        let data: queries::RemoveFromCartData = self
            .execute(
                queries::REMOVE_FROM_CART,
                json!({ "cartId": cart_id.as_str(), "lineIds": line_ids }),
            )
            .await?;
        cart_from_payload(data.cart_lines_remove, "remove from cart")
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Connection arguments for a page request. Cursors are forwarded verbatim.
fn page_variables(page: &PageRequest) -> Map<String, Value> {
    let mut variables = Map::new();
    if let Some(first) = page.first() {
        variables.insert("first".to_string(), json!(first));
    }
    if let Some(after) = page.after() {
        variables.insert("after".to_string(), json!(after));
    }
    if let Some(last) = page.last() {
        variables.insert("last".to_string(), json!(last));
    }
    if let Some(before) = page.before() {
        variables.insert("before".to_string(), json!(before));
    }
    variables
}

fn line_inputs(lines: &[CartLineInput]) -> Vec<Value> {
    lines
        .iter()
        .map(|l| json!({ "merchandiseId": l.merchandise_id.as_str(), "quantity": l.quantity }))
        .collect()
}

/// Unwrap a cart mutation payload, surfacing user errors.
fn cart_from_payload(payload: Option<CartPayload>, action: &str) -> Result<Cart, ShopifyError> {
    let payload = payload.ok_or_else(|| ShopifyError::graphql(format!("Failed to {action}")))?;

    if !payload.user_errors.is_empty() {
        return Err(ShopifyError::UserError(
            payload
                .user_errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; "),
        ));
    }

    payload
        .cart
        .map(convert_cart)
        .ok_or_else(|| ShopifyError::graphql(format!("Failed to {action}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfront_core::Cursor;

    #[test]
    fn test_page_variables_first() {
        let vars = page_variables(&PageRequest::First { count: 24 });
        assert_eq!(vars.get("first"), Some(&json!(24)));
        assert!(vars.get("after").is_none());
        assert!(vars.get("last").is_none());
    }

    #[test]
    fn test_page_variables_before_uses_last() {
        let vars = page_variables(&PageRequest::Before {
            count: 12,
            cursor: Cursor::new("opaque=="),
        });
        assert_eq!(vars.get("last"), Some(&json!(12)));
        assert_eq!(vars.get("before"), Some(&json!("opaque==")));
        assert!(vars.get("first").is_none());
    }

    #[test]
    fn test_user_errors_surface() {
        let payload: CartPayload = serde_json::from_value(json!({
            "cart": null,
            "userErrors": [
                {"field": ["lines", "0", "quantity"], "message": "Quantity must be positive"}
            ]
        }))
        .expect("valid payload");
        let err = cart_from_payload(Some(payload), "add to cart").expect_err("user error");
        assert_eq!(err.to_string(), "User error: Quantity must be positive");
    }

    #[test]
    fn test_missing_payload_is_graphql_error() {
        let err = cart_from_payload(None, "create cart").expect_err("missing payload");
        assert!(matches!(err, ShopifyError::GraphQL(_)));
    }
}
