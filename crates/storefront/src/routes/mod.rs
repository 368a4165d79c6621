//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                 - Home page (trending products)
//! GET  /health                           - Liveness check
//! GET  /health/ready                     - Readiness check (database)
//!
//! # Catalog
//! GET  /collections                      - Collection list
//! GET  /collections/{handle}             - Collection listing with facets and sort
//! GET  /collections/{handle}/preview     - Draft filter count (HTMX)
//! GET  /products/{handle}                - Product detail (?variant=)
//! GET  /search                           - Search results (?q=)
//!
//! # Wishlist
//! GET  /wishlist                         - Wishlist page
//! POST /wishlist/toggle                  - Add or remove a product
//!
//! # Cart (HTMX fragments)
//! GET  /cart                             - Cart page
//! POST /cart/add                         - Add to cart (returns count, triggers cart-updated)
//! POST /cart/update                      - Update quantity (returns cart_items fragment)
//! POST /cart/remove                      - Remove item (returns cart_items fragment)
//! GET  /cart/count                       - Cart count badge (fragment)
//! GET  /checkout                         - Redirect to Shopify checkout
//!
//! # Content
//! GET  /blogs/{blog}                     - Article list
//! GET  /blogs/{blog}/{article}           - Article
//! GET  /policies/{handle}                - Shop policy
//! ```
//!
//! Listing pages read filters and sort from the query string (see
//! [`crate::listing`]); `?after=`/`?before=` cursors are forwarded verbatim.

pub mod blog;
pub mod cart;
pub mod collections;
pub mod home;
pub mod policies;
pub mod products;
pub mod search;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::mutation_rate_limiter;
use crate::state::AppState;

/// Create the collection routes router.
pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(collections::index))
        .route("/{handle}", get(collections::show))
        .route("/{handle}/preview", get(collections::preview))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    let mutations = Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route_layer(mutation_rate_limiter());

    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .merge(mutations)
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    let mutations = Router::new()
        .route("/toggle", post(wishlist::toggle))
        .route_layer(mutation_rate_limiter());

    Router::new()
        .route("/", get(wishlist::show))
        .merge(mutations)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .nest("/collections", collection_routes())
        .route("/products/{handle}", get(products::show))
        .route("/search", get(search::show))
        // Visitor state
        .nest("/wishlist", wishlist_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", get(cart::checkout))
        // Content
        .nest("/blogs", blog::router())
        .route("/policies/{handle}", get(policies::show))
}
