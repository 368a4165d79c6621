//! GraphQL documents and response shapes for the Storefront API.
//!
//! Each document is assembled from `graphql/storefront/queries/*.graphql`
//! plus exactly the fragments it spreads; the API rejects documents with
//! unused fragments.

use serde::Deserialize;

macro_rules! graphql {
    ($query:literal $(, $fragment:literal)* $(,)?) => {
        concat!(
            include_str!(concat!("../../../graphql/storefront/queries/", $query, ".graphql")),
            $(
                "\n",
                include_str!(concat!("../../../graphql/storefront/fragments/", $fragment, ".graphql")),
            )*
        )
    };
}

pub const GET_PRODUCTS: &str = graphql!("products", "product_card", "money", "image", "page_info");
pub const GET_PRODUCT: &str = graphql!("product", "product_card", "money", "image");
pub const GET_PRODUCT_RECOMMENDATIONS: &str =
    graphql!("recommendations", "product_card", "money", "image");
pub const GET_COLLECTION: &str =
    graphql!("collection", "product_card", "money", "image", "page_info");
pub const GET_COLLECTIONS: &str = graphql!("collections", "image");
pub const SEARCH_PRODUCTS: &str = graphql!("search", "product_card", "money", "image", "page_info");
pub const GET_NODES: &str = graphql!("nodes", "product_card", "money", "image");
pub const GET_POLICIES: &str = graphql!("policies");
pub const GET_BLOG: &str = graphql!("blog", "image", "page_info");
pub const GET_ARTICLE: &str = graphql!("article", "image");
pub const GET_CART: &str = graphql!("cart", "cart", "money", "image");
pub const CREATE_CART: &str = graphql!("cart_create", "cart", "money", "image");
pub const ADD_TO_CART: &str = graphql!("cart_lines_add", "cart", "money", "image");
pub const UPDATE_CART_LINES: &str = graphql!("cart_lines_update", "cart", "money", "image");
pub const REMOVE_FROM_CART: &str = graphql!("cart_lines_remove", "cart", "money", "image");

// =============================================================================
// Shared Fragments
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyFields {
    pub amount: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFields {
    pub url: String,
    pub alt_text: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfoFields {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Nodes<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedNodes<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
    #[serde(default)]
    pub page_info: PageInfoFields,
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeFields {
    pub min_variant_price: MoneyFields,
    pub max_variant_price: MoneyFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionValueFields {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionFields {
    pub name: String,
    #[serde(default)]
    pub option_values: Vec<OptionValueFields>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectedOptionFields {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantFields {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub available_for_sale: bool,
    #[serde(default)]
    pub selected_options: Vec<SelectedOptionFields>,
    pub price: MoneyFields,
    pub compare_at_price: Option<MoneyFields>,
    pub image: Option<ImageFields>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetafieldValue {
    pub value: String,
}

/// The `ProductCard` fragment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    pub id: String,
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub available_for_sale: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    pub published_at: Option<String>,
    pub updated_at: Option<String>,
    pub created_at: Option<String>,
    pub price_range: Option<PriceRangeFields>,
    pub featured_image: Option<ImageFields>,
    #[serde(default)]
    pub options: Vec<OptionFields>,
    pub variants: Option<Nodes<VariantFields>>,
    pub total_sold: Option<MetafieldValue>,
}

/// `ProductCard` plus the detail-page fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailFields {
    #[serde(flatten)]
    pub card: ProductCard,
    #[serde(default)]
    pub description_html: String,
    pub images: Option<Nodes<ImageFields>>,
}

#[derive(Debug, Deserialize)]
pub struct GetProductsData {
    pub products: PagedNodes<ProductCard>,
}

#[derive(Debug, Deserialize)]
pub struct GetProductData {
    pub product: Option<ProductDetailFields>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProductRecommendationsData {
    pub product_recommendations: Option<Vec<ProductCard>>,
}

#[derive(Debug, Deserialize)]
pub struct SearchProductsData {
    pub search: PagedNodes<ProductCard>,
}

#[derive(Debug, Deserialize)]
pub struct GetNodesData {
    /// `null` for IDs that no longer resolve to a product.
    #[serde(default)]
    pub nodes: Vec<Option<ProductCard>>,
}

// =============================================================================
// Collections
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSummaryFields {
    pub id: String,
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image: Option<ImageFields>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionFields {
    #[serde(flatten)]
    pub summary: CollectionSummaryFields,
    pub products: PagedNodes<ProductCard>,
}

#[derive(Debug, Deserialize)]
pub struct GetCollectionData {
    pub collection: Option<CollectionFields>,
}

#[derive(Debug, Deserialize)]
pub struct GetCollectionsData {
    pub collections: Nodes<CollectionSummaryFields>,
}

// =============================================================================
// Content
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyFields {
    pub handle: String,
    pub title: String,
    pub body: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopPolicies {
    pub privacy_policy: Option<PolicyFields>,
    pub refund_policy: Option<PolicyFields>,
    pub shipping_policy: Option<PolicyFields>,
    pub terms_of_service: Option<PolicyFields>,
}

#[derive(Debug, Deserialize)]
pub struct GetPoliciesData {
    pub shop: ShopPolicies,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorFields {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleCard {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub published_at: Option<String>,
    #[serde(rename = "authorV2")]
    pub author: Option<AuthorFields>,
    pub image: Option<ImageFields>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlogFields {
    pub handle: String,
    pub title: String,
    pub articles: PagedNodes<ArticleCard>,
}

#[derive(Debug, Deserialize)]
pub struct GetBlogData {
    pub blog: Option<BlogFields>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleFields {
    pub id: String,
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub content_html: String,
    pub published_at: Option<String>,
    #[serde(rename = "authorV2")]
    pub author: Option<AuthorFields>,
    pub image: Option<ImageFields>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleBlogFields {
    pub handle: String,
    pub title: String,
    pub article_by_handle: Option<ArticleFields>,
}

#[derive(Debug, Deserialize)]
pub struct GetArticleData {
    pub blog: Option<ArticleBlogFields>,
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCostFields {
    pub subtotal_amount: MoneyFields,
    pub total_amount: MoneyFields,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineCostFields {
    pub amount_per_quantity: MoneyFields,
    pub total_amount: MoneyFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MerchandiseProduct {
    pub handle: String,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MerchandiseFields {
    pub id: String,
    pub title: String,
    pub image: Option<ImageFields>,
    pub product: MerchandiseProduct,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartLineFields {
    pub id: String,
    pub quantity: u32,
    pub cost: CartLineCostFields,
    pub merchandise: MerchandiseFields,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartFields {
    pub id: String,
    pub checkout_url: String,
    #[serde(default)]
    pub total_quantity: u32,
    pub cost: CartCostFields,
    pub lines: Nodes<CartLineFields>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserErrorFields {
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// Payload shared by every cart mutation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPayload {
    pub cart: Option<CartFields>,
    #[serde(default)]
    pub user_errors: Vec<UserErrorFields>,
}

#[derive(Debug, Deserialize)]
pub struct GetCartData {
    pub cart: Option<CartFields>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCartData {
    pub cart_create: Option<CartPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartData {
    pub cart_lines_add: Option<CartPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartLinesData {
    pub cart_lines_update: Option<CartPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartData {
    pub cart_lines_remove: Option<CartPayload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_include_spread_fragments() {
        assert!(GET_COLLECTION.contains("query GetCollection("));
        assert!(GET_COLLECTION.contains("fragment ProductCard on Product"));
        assert!(GET_COLLECTION.contains("fragment PageInfoFields on PageInfo"));
        assert!(GET_COLLECTIONS.contains("fragment ImageFields on Image"));
        assert!(!GET_COLLECTIONS.contains("fragment ProductCard"));
        assert!(ADD_TO_CART.contains("fragment CartFields on Cart"));
    }

    #[test]
    fn test_search_nodes_decode() {
        let json = r#"{
            "search": {
                "nodes": [{
                    "id": "gid://shopify/Product/1",
                    "handle": "tee",
                    "title": "Tee",
                    "availableForSale": true,
                    "priceRange": {
                        "minVariantPrice": {"amount": "10.0", "currencyCode": "USD"},
                        "maxVariantPrice": {"amount": "12.0", "currencyCode": "USD"}
                    },
                    "variants": {"nodes": []},
                    "totalSold": {"value": "42"}
                }],
                "pageInfo": {"hasNextPage": true, "hasPreviousPage": false, "endCursor": "abc"}
            }
        }"#;
        let data: SearchProductsData = serde_json::from_str(json).expect("valid search payload");
        assert_eq!(data.search.nodes.len(), 1);
        assert!(data.search.page_info.has_next_page);
        assert_eq!(data.search.page_info.end_cursor.as_deref(), Some("abc"));
        assert_eq!(
            data.search.nodes[0].total_sold.as_ref().map(|m| m.value.as_str()),
            Some("42")
        );
    }

    #[test]
    fn test_missing_nodes_are_null() {
        let json = r#"{"nodes": [null]}"#;
        let data: GetNodesData = serde_json::from_str(json).expect("valid nodes payload");
        assert_eq!(data.nodes.len(), 1);
        assert!(data.nodes[0].is_none());
    }
}
