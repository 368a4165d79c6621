//! Visitor wishlist.
//!
//! An ordered set of product IDs, stored in the visitor's session under
//! [`WISHLIST_KEY`]. Newest additions come last.

use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Session key the wishlist is stored under.
pub const WISHLIST_KEY: &str = "wishlist";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist(Vec<ProductId>);

impl Wishlist {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a product. Returns `false` if it was already present.
    pub fn add(&mut self, id: ProductId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    /// Remove a product. Returns `false` if it was not present.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.0.len();
        self.0.retain(|existing| existing != id);
        self.0.len() != before
    }

    /// Add the product if absent, otherwise remove it.
    ///
    /// Returns whether the product is in the wishlist afterwards.
    pub fn toggle(&mut self, id: ProductId) -> bool {
        if self.remove(&id) {
            false
        } else {
            self.0.push(id);
            true
        }
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.0.iter().any(|existing| existing == id)
    }

    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a stored wishlist.
    ///
    /// Corrupt data yields an empty wishlist; duplicates are dropped.
    #[must_use]
    pub fn from_json(raw: &str) -> Self {
        let ids: Vec<ProductId> = serde_json::from_str(raw).unwrap_or_default();
        let mut wishlist = Self::new();
        for id in ids {
            wishlist.add(id);
        }
        wishlist
    }

    /// Serialize for storage.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string())
    }
}
