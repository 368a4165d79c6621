//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use shopfront_core::{Product, ProductVariant, VariantId, Wishlist};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::listing::{ImageView, ProductCardView};
use crate::models::load_wishlist;
use crate::shopify::types::ProductDetail;
use crate::state::AppState;

/// Most recommendations shown under a product.
const MAX_RECOMMENDATIONS: usize = 4;

/// Variant display data for templates.
#[derive(Clone)]
pub struct VariantView {
    pub id: String,
    pub title: String,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub available: bool,
    pub selected: bool,
    /// Link selecting this variant.
    pub href: String,
}

/// Product detail display data for templates.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub vendor: String,
    pub description_html: String,
    pub images: Vec<ImageView>,
    pub variants: Vec<VariantView>,
    pub selected: Option<VariantView>,
    pub tags: Vec<String>,
    pub in_wishlist: bool,
}

/// `?variant=` accepts a full variant GID or its numeric ID.
#[derive(Debug, Default, Deserialize)]
pub struct VariantQuery {
    pub variant: Option<String>,
}

/// Pick the variant named by `?variant=`, else the first available one,
/// else the primary variant.
fn select_variant<'a>(product: &'a Product, requested: Option<&str>) -> Option<&'a ProductVariant> {
    let requested = requested.map(str::trim).filter(|v| !v.is_empty());
    if let Some(wanted) = requested {
        let by_gid = product.variant(&VariantId::new(wanted));
        let by_legacy = || {
            let legacy = wanted.parse::<u64>().ok()?;
            product
                .variants
                .iter()
                .find(|v| v.id.legacy_id() == Some(legacy))
        };
        if let Some(variant) = by_gid.or_else(by_legacy) {
            return Some(variant);
        }
    }
    product
        .variants
        .iter()
        .find(|v| v.available_for_sale)
        .or_else(|| product.primary_variant())
}

/// `?variant=` value for a variant: its numeric ID when it has one.
fn variant_param(id: &VariantId) -> String {
    id.legacy_id().map_or_else(
        || urlencoding::encode(id.as_str()).into_owned(),
        |legacy| legacy.to_string(),
    )
}

impl ProductDetailView {
    fn new(detail: &ProductDetail, requested: Option<&str>, wishlist: &Wishlist) -> Self {
        let product = &detail.product;
        let selected_id = select_variant(product, requested).map(|v| v.id.clone());

        let variants: Vec<VariantView> = product
            .variants
            .iter()
            .map(|variant| VariantView {
                id: variant.id.to_string(),
                title: variant.title.clone(),
                price: variant.price.to_string(),
                compare_at_price: variant
                    .compare_at_price
                    .as_ref()
                    .filter(|_| variant.is_on_sale())
                    .map(ToString::to_string),
                available: variant.available_for_sale,
                selected: selected_id.as_ref() == Some(&variant.id),
                href: format!(
                    "/products/{}?variant={}",
                    product.handle,
                    variant_param(&variant.id)
                ),
            })
            .collect();

        let mut images: Vec<ImageView> = detail
            .images
            .iter()
            .map(|img| ImageView::new(img, &product.title))
            .collect();
        if images.is_empty()
            && let Some(featured) = &product.featured_image
        {
            images.push(ImageView::new(featured, &product.title));
        }

        Self {
            id: product.id.to_string(),
            handle: product.handle.clone(),
            title: product.title.clone(),
            vendor: product.vendor.clone(),
            description_html: detail.description_html.clone(),
            images,
            selected: variants.iter().find(|v| v.selected).cloned(),
            variants,
            tags: product.tags.clone(),
            in_wishlist: wishlist.contains(&product.id),
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductDetailView,
    pub recommendations: Vec<ProductCardView>,
}

/// Display product detail page.
///
/// Recommendations are non-critical: a failed request is logged and the
/// page renders without them.
///
/// # Errors
///
/// Returns 404 if the product does not exist, or an error if the API
/// request fails.
#[instrument(skip(state, session, query), fields(handle = %handle))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(handle): Path<String>,
    Query(query): Query<VariantQuery>,
) -> Result<impl IntoResponse> {
    let detail = state.storefront().get_product(&handle).await?;
    let wishlist = load_wishlist(&session).await;

    let recommendations = match state
        .storefront()
        .get_product_recommendations(&detail.product.id)
        .await
    {
        Ok(products) => products
            .iter()
            .filter(|p| p.id != detail.product.id)
            .take(MAX_RECOMMENDATIONS)
            .map(|p| ProductCardView::new(p, &wishlist))
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to fetch recommendations for {handle}: {e}");
            Vec::new()
        }
    };

    Ok(ProductShowTemplate {
        product: ProductDetailView::new(&detail, query.variant.as_deref(), &wishlist),
        recommendations,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product() -> Product {
        let variant = |id: u64, available: bool| {
            json!({
                "id": format!("gid://shopify/ProductVariant/{id}"),
                "title": format!("Size {id}"),
                "available_for_sale": available,
                "selected_options": [],
                "price": {"amount": "12.00", "currency_code": "USD"},
                "compare_at_price": null,
                "image": null
            })
        };
        serde_json::from_value(json!({
            "id": "gid://shopify/Product/1",
            "handle": "tee",
            "title": "Tee",
            "available_for_sale": true,
            "featured_image": null,
            "variants": [variant(10, false), variant(11, true), variant(12, true)],
            "published_at": null,
            "updated_at": null,
            "created_at": null,
            "total_sold": null
        }))
        .unwrap()
    }

    #[test]
    fn test_select_variant_by_gid_and_legacy_id() {
        let product = product();
        let by_gid = select_variant(&product, Some("gid://shopify/ProductVariant/12")).unwrap();
        assert_eq!(by_gid.id.legacy_id(), Some(12));
        let by_legacy = select_variant(&product, Some("10")).unwrap();
        assert_eq!(by_legacy.id.legacy_id(), Some(10));
    }

    #[test]
    fn test_select_variant_defaults_to_first_available() {
        let product = product();
        assert_eq!(
            select_variant(&product, None).unwrap().id.legacy_id(),
            Some(11)
        );
        assert_eq!(
            select_variant(&product, Some("999")).unwrap().id.legacy_id(),
            Some(11)
        );
    }

    #[test]
    fn test_detail_view_marks_selection() {
        let detail = ProductDetail {
            product: product(),
            description_html: "<p>Soft</p>".to_string(),
            images: Vec::new(),
        };
        let view = ProductDetailView::new(&detail, Some("12"), &Wishlist::new());
        assert_eq!(view.variants.iter().filter(|v| v.selected).count(), 1);
        assert_eq!(view.selected.unwrap().title, "Size 12");
        assert_eq!(view.variants[0].href, "/products/tee?variant=10");
    }
}
