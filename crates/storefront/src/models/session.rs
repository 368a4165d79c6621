//! Session-related types.
//!
//! The visitor's cart ID and wishlist live in the server-side session. The
//! wishlist is stored as a bare JSON array of product IDs and rewritten in
//! full on every change; concurrent tabs resolve as last writer wins.

use shopfront_core::Wishlist;
use tower_sessions::Session;

/// Session keys for visitor data.
pub mod keys {
    /// Key for storing the Shopify cart ID.
    pub const CART_ID: &str = "cart_id";

    /// Key for the wishlist array.
    pub const WISHLIST: &str = shopfront_core::WISHLIST_KEY;
}

/// Read the wishlist from the session.
///
/// A missing or unreadable value is an empty wishlist.
pub async fn load_wishlist(session: &Session) -> Wishlist {
    match session.get::<serde_json::Value>(keys::WISHLIST).await {
        Ok(Some(value)) => Wishlist::from_json(&value.to_string()),
        Ok(None) => Wishlist::new(),
        Err(e) => {
            tracing::warn!("Failed to read wishlist from session: {e}");
            Wishlist::new()
        }
    }
}

/// Replace the stored wishlist.
///
/// # Errors
///
/// Returns the session store error if the write fails.
pub async fn store_wishlist(
    session: &Session,
    wishlist: &Wishlist,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::WISHLIST, wishlist).await
}
