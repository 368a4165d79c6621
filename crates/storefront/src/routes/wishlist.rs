//! Wishlist route handlers.
//!
//! The wishlist is a list of product IDs in the session. The page
//! re-hydrates it from the API; IDs that no longer resolve are dropped from
//! the stored list.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use shopfront_core::{ProductId, Wishlist};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::listing::ProductCardView;
use crate::models::{load_wishlist, store_wishlist};
use crate::state::AppState;

const PRODUCT_GID_PREFIX: &str = "gid://shopify/Product/";

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist.html")]
pub struct WishlistTemplate {
    pub products: Vec<ProductCardView>,
}

/// Wishlist heart button (HTMX fragment).
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_button.html")]
pub struct WishlistButtonTemplate {
    pub product_id: String,
    pub in_wishlist: bool,
}

/// Toggle form data.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub product_id: String,
}

/// Display the wishlist.
///
/// Hydration is non-critical: if the API fails the page renders empty and
/// the stored list is left untouched.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let mut wishlist = load_wishlist(&session).await;
    let stored = wishlist.len();
    wishlist = well_formed(&wishlist);
    if wishlist.len() < stored {
        tracing::info!(
            dropped = stored - wishlist.len(),
            "Dropping malformed wishlist entries"
        );
        if let Err(e) = store_wishlist(&session, &wishlist).await {
            tracing::warn!("Failed to store pruned wishlist: {e}");
        }
    }
    if wishlist.is_empty() {
        return WishlistTemplate {
            products: Vec::new(),
        };
    }

    let products = match state.storefront().get_nodes(wishlist.ids()).await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!("Failed to hydrate wishlist: {e}");
            return WishlistTemplate {
                products: Vec::new(),
            };
        }
    };

    if products.len() < wishlist.len() {
        let mut resolved = Wishlist::new();
        for product in &products {
            resolved.add(product.id.clone());
        }
        tracing::info!(
            dropped = wishlist.len() - resolved.len(),
            "Dropping wishlist entries that no longer resolve"
        );
        if let Err(e) = store_wishlist(&session, &resolved).await {
            tracing::warn!("Failed to store pruned wishlist: {e}");
        }
    }

    WishlistTemplate {
        products: products
            .iter()
            .map(|p| ProductCardView::new(p, &wishlist))
            .collect(),
    }
}

/// Parse a product GID from form input.
///
/// Only `gid://shopify/Product/<digits>` is accepted; the Storefront API
/// rejects the whole `nodes` query on any other shape.
fn parse_product_id(raw: &str) -> Option<ProductId> {
    let raw = raw.trim();
    let suffix = raw.strip_prefix(PRODUCT_GID_PREFIX)?;
    (!suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()))
        .then(|| ProductId::new(raw))
}

/// The stored list without entries `parse_product_id` would reject.
fn well_formed(wishlist: &Wishlist) -> Wishlist {
    let mut kept = Wishlist::new();
    for id in wishlist.ids() {
        if let Some(id) = parse_product_id(id.as_str()) {
            kept.add(id);
        }
    }
    kept
}

/// Add or remove a product.
///
/// HTMX requests get the updated button back; plain form posts are
/// redirected to the wishlist page.
///
/// # Errors
///
/// Returns 400 for a malformed product ID, or an error if the session
/// cannot be written.
#[instrument(skip(session, headers))]
pub async fn toggle(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<ToggleForm>,
) -> Result<Response> {
    let Some(product_id) = parse_product_id(&form.product_id) else {
        return Err(AppError::BadRequest(format!(
            "Invalid product ID: {}",
            form.product_id.trim()
        )));
    };

    let mut wishlist = load_wishlist(&session).await;
    let in_wishlist = wishlist.toggle(product_id.clone());
    store_wishlist(&session, &wishlist).await?;

    add_breadcrumb(
        "wishlist",
        if in_wishlist { "Added product" } else { "Removed product" },
        Some(&[("product_id", product_id.as_str())]),
    );

    if headers.contains_key("hx-request") {
        Ok((
            AppendHeaders([("HX-Trigger", "wishlist-updated")]),
            WishlistButtonTemplate {
                product_id: product_id.to_string(),
                in_wishlist,
            },
        )
            .into_response())
    } else {
        Ok(Redirect::to("/wishlist").into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_product_id_accepts_numeric_gid() {
        let id = parse_product_id(" gid://shopify/Product/8571234567 ").map(|id| id.to_string());
        assert_eq!(id.as_deref(), Some("gid://shopify/Product/8571234567"));
    }

    #[test]
    fn test_parse_product_id_rejects_malformed_suffix() {
        assert!(parse_product_id("gid://shopify/Product/abc").is_none());
        assert!(parse_product_id("gid://shopify/Product/").is_none());
        assert!(parse_product_id("gid://shopify/Product/12x").is_none());
        assert!(parse_product_id("gid://shopify/Product/1/2").is_none());
        assert!(parse_product_id("gid://shopify/Collection/1").is_none());
    }

    #[test]
    fn test_well_formed_drops_rejected_ids() {
        let mut wishlist = Wishlist::new();
        wishlist.add(ProductId::new("gid://shopify/Product/1"));
        wishlist.add(ProductId::new("gid://shopify/Product/abc"));
        wishlist.add(ProductId::new("gid://shopify/Product/2"));

        let kept = well_formed(&wishlist);
        let ids: Vec<&str> = kept.ids().iter().map(ProductId::as_str).collect();
        assert_eq!(ids, ["gid://shopify/Product/1", "gid://shopify/Product/2"]);
    }
}
