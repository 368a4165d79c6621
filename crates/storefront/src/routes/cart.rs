//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Cart IDs are stored in the session and mapped to Shopify carts.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use shopfront_core::{CartId, CartLineId, VariantId};
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::listing::ImageView;
use crate::models::session_keys;
use crate::shopify::ShopifyError;
use crate::shopify::types::{Cart, CartLine, CartLineInput, CartLineUpdateInput};
use crate::state::AppState;

/// Largest quantity accepted for one line.
const MAX_LINE_QUANTITY: u32 = 99;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub variant_title: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: Option<ImageView>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub total: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            total: "$0.00".to_string(),
            item_count: 0,
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines.iter().map(CartItemView::from).collect(),
            subtotal: cart.subtotal.to_string(),
            total: cart.total.to_string(),
            item_count: cart.total_quantity,
        }
    }
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.to_string(),
            handle: line.product_handle.clone(),
            title: line.product_title.clone(),
            variant_title: line.variant_title.clone(),
            quantity: line.quantity,
            price: line.unit_price.to_string(),
            line_price: line.line_total.to_string(),
            image: line
                .image
                .as_ref()
                .map(|img| ImageView::new(img, &line.product_title)),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart ID from the session.
async fn get_cart_id(session: &Session) -> Option<CartId> {
    session
        .get::<CartId>(session_keys::CART_ID)
        .await
        .ok()
        .flatten()
}

/// Set the cart ID in the session.
async fn set_cart_id(
    session: &Session,
    cart_id: &CartId,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART_ID, cart_id).await
}

/// Fetch the session's cart, forgetting IDs of carts that expired upstream.
async fn load_cart(state: &AppState, session: &Session) -> Option<Cart> {
    let cart_id = get_cart_id(session).await?;
    match state.storefront().get_cart(&cart_id).await {
        Ok(cart) => Some(cart),
        Err(ShopifyError::NotFound(_)) => {
            tracing::info!("Cart {cart_id} expired, clearing it from the session");
            if let Err(e) = session.remove::<CartId>(session_keys::CART_ID).await {
                tracing::warn!("Failed to clear expired cart ID: {e}");
            }
            None
        }
        Err(e) => {
            tracing::warn!("Failed to fetch cart {cart_id}: {e}");
            None
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub variant_id: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = load_cart(&state, &session)
        .await
        .map_or_else(CartView::empty, |cart| CartView::from(&cart));

    CartShowTemplate { cart }
}

/// Add item to cart (HTMX).
///
/// Creates a new cart if one doesn't exist, or adds to existing cart.
/// Returns an HTMX trigger to update the cart count badge.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let line = CartLineInput {
        merchandise_id: VariantId::new(form.variant_id),
        quantity: form.quantity.unwrap_or(1).clamp(1, MAX_LINE_QUANTITY),
    };

    let result = match get_cart_id(&session).await {
        Some(cart_id) => match state.storefront().add_to_cart(&cart_id, &[line.clone()]).await {
            // Expired cart: start a fresh one with this line
            Err(ShopifyError::NotFound(_)) => state.storefront().create_cart(&[line]).await,
            other => other,
        },
        None => state.storefront().create_cart(&[line]).await,
    };

    match result {
        Ok(cart) => {
            if let Err(e) = set_cart_id(&session, &cart.id).await {
                tracing::error!("Failed to save cart ID to session: {e}");
            }

            (
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                CartCountTemplate {
                    count: cart.total_quantity,
                },
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to add item to cart: {e}");
            (
                StatusCode::BAD_GATEWAY,
                Html("<span class=\"cart-error\">Error adding to cart</span>"),
            )
                .into_response()
        }
    }
}

/// Update cart item quantity (HTMX). A quantity of zero removes the line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let Some(cart_id) = get_cart_id(&session).await else {
        return CartItemsTemplate {
            cart: CartView::empty(),
        }
        .into_response();
    };

    let line = CartLineUpdateInput {
        id: CartLineId::new(form.line_id),
        quantity: form.quantity.min(MAX_LINE_QUANTITY),
    };

    match state.storefront().update_cart_lines(&cart_id, &[line]).await {
        Ok(cart) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate {
                cart: CartView::from(&cart),
            },
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to update cart: {e}");
            cart_items_fallback(&state, &session).await
        }
    }
}

/// Remove item from cart (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let Some(cart_id) = get_cart_id(&session).await else {
        return CartItemsTemplate {
            cart: CartView::empty(),
        }
        .into_response();
    };

    match state
        .storefront()
        .remove_from_cart(&cart_id, &[CartLineId::new(form.line_id)])
        .await
    {
        Ok(cart) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate {
                cart: CartView::from(&cart),
            },
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to remove from cart: {e}");
            cart_items_fallback(&state, &session).await
        }
    }
}

/// Re-render the cart as it stands after a failed mutation.
async fn cart_items_fallback(state: &AppState, session: &Session) -> Response {
    let cart = load_cart(state, session)
        .await
        .map_or_else(CartView::empty, |cart| CartView::from(&cart));
    CartItemsTemplate { cart }.into_response()
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let count = load_cart(&state, &session)
        .await
        .map_or(0, |cart| cart.total_quantity);

    CartCountTemplate { count }
}

/// Redirect to Shopify checkout.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Response {
    match load_cart(&state, &session).await {
        Some(cart) if cart.total_quantity > 0 => Redirect::to(&cart.checkout_url).into_response(),
        _ => Redirect::to("/cart").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use shopfront_core::Money;

    use super::*;

    fn line(quantity: u32) -> CartLine {
        CartLine {
            id: CartLineId::new("gid://shopify/CartLine/1"),
            quantity,
            variant_id: VariantId::new("gid://shopify/ProductVariant/9"),
            variant_title: Some("Large".to_string()),
            product_handle: "tee".to_string(),
            product_title: "Tee".to_string(),
            image: None,
            unit_price: Money::parse_lossy("12.5", "USD"),
            line_total: Money::parse_lossy("25", "USD"),
        }
    }

    #[test]
    fn test_cart_view_formats_money() {
        let cart = Cart {
            id: CartId::new("gid://shopify/Cart/abc"),
            checkout_url: "https://shop.example/checkout".to_string(),
            total_quantity: 2,
            subtotal: Money::parse_lossy("25", "USD"),
            total: Money::parse_lossy("27.5", "USD"),
            lines: vec![line(2)],
        };
        let view = CartView::from(&cart);
        assert_eq!(view.item_count, 2);
        assert_eq!(view.subtotal, "$25.00");
        assert_eq!(view.total, "$27.50");
        assert_eq!(view.items[0].price, "$12.50");
        assert_eq!(view.items[0].line_price, "$25.00");
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::empty();
        assert!(view.items.is_empty());
        assert_eq!(view.item_count, 0);
    }
}
