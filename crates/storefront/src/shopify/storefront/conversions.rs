//! Conversions from Storefront API response shapes to domain types.

use chrono::{DateTime, Utc};
use shopfront_core::{
    ArticleId, CartId, CartLineId, CollectionId, Connection, Cursor, Image, Money, OptionValue,
    PageInfo, PriceRange, Product, ProductId, ProductOption, ProductVariant, SelectedOption,
    VariantId,
};

use super::queries::{
    ArticleBlogFields, ArticleCard, ArticleFields, BlogFields, CartFields, CartLineFields,
    CollectionFields, CollectionSummaryFields, ImageFields, MoneyFields, PageInfoFields,
    PagedNodes, PolicyFields, ProductCard, ProductDetailFields, ShopPolicies, VariantFields,
};
use crate::shopify::types::{
    Article, ArticleSummary, Blog, Cart, CartLine, Collection, CollectionSummary, ProductDetail,
    ShopPolicy,
};

const DEFAULT_VARIANT_TITLE: &str = "Default Title";

pub fn convert_money(money: &MoneyFields) -> Money {
    Money::parse_lossy(&money.amount, &money.currency_code)
}

pub fn convert_image(image: ImageFields) -> Image {
    Image {
        url: image.url,
        alt_text: image.alt_text.filter(|alt| !alt.is_empty()),
        width: image.width,
        height: image.height,
    }
}

/// Parse an ISO 8601 timestamp, dropping values the API formatted oddly.
pub fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn convert_page_info(page_info: PageInfoFields) -> PageInfo {
    PageInfo {
        has_next_page: page_info.has_next_page,
        has_previous_page: page_info.has_previous_page,
        start_cursor: page_info.start_cursor.map(Cursor::new),
        end_cursor: page_info.end_cursor.map(Cursor::new),
    }
}

pub fn convert_connection<W, T>(paged: PagedNodes<W>, f: impl FnMut(W) -> T) -> Connection<T> {
    Connection::new(
        paged.nodes.into_iter().map(f).collect(),
        convert_page_info(paged.page_info),
    )
}

// =============================================================================
// Products
// =============================================================================

fn convert_variant(variant: VariantFields) -> ProductVariant {
    ProductVariant {
        id: VariantId::new(variant.id),
        title: variant.title,
        available_for_sale: variant.available_for_sale,
        selected_options: variant
            .selected_options
            .into_iter()
            .map(|o| SelectedOption {
                name: o.name,
                value: o.value,
            })
            .collect(),
        price: convert_money(&variant.price),
        compare_at_price: variant.compare_at_price.as_ref().map(convert_money),
        image: variant.image.map(convert_image),
    }
}

pub fn convert_product(card: ProductCard) -> Product {
    let price_range = card
        .price_range
        .map(|range| PriceRange {
            min_variant_price: convert_money(&range.min_variant_price),
            max_variant_price: convert_money(&range.max_variant_price),
        })
        .unwrap_or_default();

    Product {
        id: ProductId::new(card.id),
        handle: card.handle,
        title: card.title,
        description: card.description,
        vendor: card.vendor,
        available_for_sale: card.available_for_sale,
        tags: card.tags,
        price_range,
        featured_image: card.featured_image.map(convert_image),
        options: card
            .options
            .into_iter()
            .map(|option| ProductOption {
                name: option.name,
                option_values: option
                    .option_values
                    .into_iter()
                    .map(|v| OptionValue { name: v.name })
                    .collect(),
            })
            .collect(),
        variants: card
            .variants
            .map(|v| v.nodes.into_iter().map(convert_variant).collect())
            .unwrap_or_default(),
        published_at: parse_timestamp(card.published_at.as_deref()),
        updated_at: parse_timestamp(card.updated_at.as_deref()),
        created_at: parse_timestamp(card.created_at.as_deref()),
        total_sold: card
            .total_sold
            .and_then(|field| field.value.trim().parse::<u64>().ok()),
    }
}

pub fn convert_product_detail(detail: ProductDetailFields) -> ProductDetail {
    let product = convert_product(detail.card);

    let mut images: Vec<Image> = detail
        .images
        .map(|i| i.nodes.into_iter().map(convert_image).collect())
        .unwrap_or_default();
    if let Some(featured) = &product.featured_image
        && !images.iter().any(|i| i.url == featured.url)
    {
        images.insert(0, featured.clone());
    }

    ProductDetail {
        product,
        description_html: detail.description_html,
        images,
    }
}

// =============================================================================
// Collections
// =============================================================================

pub fn convert_collection_summary(summary: CollectionSummaryFields) -> CollectionSummary {
    CollectionSummary {
        id: CollectionId::new(summary.id),
        handle: summary.handle,
        title: summary.title,
        description: summary.description,
        image: summary.image.map(convert_image),
    }
}

pub fn convert_collection(collection: CollectionFields) -> Collection {
    let summary = convert_collection_summary(collection.summary);
    Collection {
        id: summary.id,
        handle: summary.handle,
        title: summary.title,
        description: summary.description,
        image: summary.image,
        products: convert_connection(collection.products, convert_product),
    }
}

// =============================================================================
// Content
// =============================================================================

pub fn convert_policies(shop: ShopPolicies) -> Vec<ShopPolicy> {
    [
        shop.privacy_policy,
        shop.refund_policy,
        shop.shipping_policy,
        shop.terms_of_service,
    ]
    .into_iter()
    .flatten()
    .map(|p: PolicyFields| ShopPolicy {
        handle: p.handle,
        title: p.title,
        body: p.body,
        url: p.url,
    })
    .collect()
}

fn convert_article_summary(article: ArticleCard) -> ArticleSummary {
    ArticleSummary {
        id: ArticleId::new(article.id),
        handle: article.handle,
        title: article.title,
        excerpt: article.excerpt.filter(|e| !e.trim().is_empty()),
        author: article.author.map(|a| a.name),
        published_at: parse_timestamp(article.published_at.as_deref()),
        image: article.image.map(convert_image),
    }
}

pub fn convert_blog(blog: BlogFields) -> Blog {
    Blog {
        handle: blog.handle,
        title: blog.title,
        articles: convert_connection(blog.articles, convert_article_summary),
    }
}

pub fn convert_article(blog: ArticleBlogFields, article: ArticleFields) -> Article {
    Article {
        id: ArticleId::new(article.id),
        handle: article.handle,
        title: article.title,
        author: article.author.map(|a| a.name),
        published_at: parse_timestamp(article.published_at.as_deref()),
        image: article.image.map(convert_image),
        content_html: article.content_html,
        blog_handle: blog.handle,
        blog_title: blog.title,
    }
}

// =============================================================================
// Cart
// =============================================================================

fn convert_cart_line(line: CartLineFields) -> CartLine {
    let variant_title = Some(line.merchandise.title)
        .filter(|t| t != DEFAULT_VARIANT_TITLE && !t.is_empty());

    CartLine {
        id: CartLineId::new(line.id),
        quantity: line.quantity,
        variant_id: VariantId::new(line.merchandise.id),
        variant_title,
        product_handle: line.merchandise.product.handle,
        product_title: line.merchandise.product.title,
        image: line.merchandise.image.map(convert_image),
        unit_price: convert_money(&line.cost.amount_per_quantity),
        line_total: convert_money(&line.cost.total_amount),
    }
}

pub fn convert_cart(cart: CartFields) -> Cart {
    Cart {
        id: CartId::new(cart.id),
        checkout_url: cart.checkout_url,
        total_quantity: cart.total_quantity,
        subtotal: convert_money(&cart.cost.subtotal_amount),
        total: convert_money(&cart.cost.total_amount),
        lines: cart.lines.nodes.into_iter().map(convert_cart_line).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn card_json() -> &'static str {
        r#"{
            "id": "gid://shopify/Product/7",
            "handle": "linen-shirt",
            "title": "Linen Shirt",
            "availableForSale": true,
            "tags": ["summer"],
            "publishedAt": "2024-05-01T10:00:00Z",
            "priceRange": {
                "minVariantPrice": {"amount": "39.0", "currencyCode": "EUR"},
                "maxVariantPrice": {"amount": "45.0", "currencyCode": "EUR"}
            },
            "options": [{"name": "Color", "optionValues": [{"name": "Sand"}]}],
            "variants": {"nodes": [{
                "id": "gid://shopify/ProductVariant/70",
                "title": "Sand / M",
                "availableForSale": true,
                "selectedOptions": [{"name": "Color", "value": "Sand"}, {"name": "Size", "value": "M"}],
                "price": {"amount": "39.0", "currencyCode": "EUR"},
                "compareAtPrice": null,
                "image": null
            }]},
            "totalSold": {"value": " 128 "}
        }"#
    }

    #[test]
    fn test_convert_product_card() {
        let card: ProductCard = serde_json::from_str(card_json()).expect("valid card");
        let product = convert_product(card);

        assert_eq!(product.handle, "linen-shirt");
        assert_eq!(product.min_price().amount, Decimal::new(39, 0));
        assert_eq!(product.max_price().amount, Decimal::new(45, 0));
        assert_eq!(product.total_sold, Some(128));
        assert!(product.published_at.is_some());
        assert_eq!(product.variants.len(), 1);
        assert_eq!(
            product.variants.first().and_then(|v| v.option_value("size")),
            Some("M")
        );
    }

    #[test]
    fn test_unparsable_total_sold_is_none() {
        let json = card_json().replace("\" 128 \"", "\"many\"");
        let card: ProductCard = serde_json::from_str(&json).expect("valid card");
        assert_eq!(convert_product(card).total_sold, None);
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp(Some("2024-01-02T03:04:05-05:00")).is_some());
        assert!(parse_timestamp(Some("yesterday")).is_none());
        assert!(parse_timestamp(None).is_none());
    }

    #[test]
    fn test_page_info_cursors_forwarded_verbatim() {
        let info = convert_page_info(PageInfoFields {
            has_next_page: true,
            has_previous_page: true,
            start_cursor: Some("eyJzdGFydCI6MX0=".to_string()),
            end_cursor: Some("eyJsYXN0IjoyNH0=".to_string()),
        });
        assert_eq!(
            info.end_cursor.as_ref().map(Cursor::as_str),
            Some("eyJsYXN0IjoyNH0=")
        );
        assert_eq!(
            info.start_cursor.as_ref().map(Cursor::as_str),
            Some("eyJzdGFydCI6MX0=")
        );
    }

    #[test]
    fn test_default_variant_title_hidden_in_cart() {
        let json = r#"{
            "id": "gid://shopify/Cart/c1",
            "checkoutUrl": "https://shop.test/checkout/c1",
            "totalQuantity": 2,
            "cost": {
                "subtotalAmount": {"amount": "20.0", "currencyCode": "USD"},
                "totalAmount": {"amount": "21.5", "currencyCode": "USD"}
            },
            "lines": {"nodes": [{
                "id": "gid://shopify/CartLine/1",
                "quantity": 2,
                "cost": {
                    "amountPerQuantity": {"amount": "10.0", "currencyCode": "USD"},
                    "totalAmount": {"amount": "20.0", "currencyCode": "USD"}
                },
                "merchandise": {
                    "id": "gid://shopify/ProductVariant/5",
                    "title": "Default Title",
                    "image": null,
                    "product": {"handle": "mug", "title": "Mug"}
                }
            }]}
        }"#;
        let cart = convert_cart(serde_json::from_str(json).expect("valid cart"));
        assert_eq!(cart.total_quantity, 2);
        assert_eq!(cart.lines.len(), 1);
        assert!(cart.lines.iter().all(|l| l.variant_title.is_none()));
    }
}
