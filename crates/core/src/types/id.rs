//! Newtype IDs for type-safe Shopify entity references.
//!
//! Shopify identifies every object with a global ID string such as
//! `gid://shopify/Product/8571234567`. Use the `define_id!` macro to create
//! wrappers that prevent accidentally mixing IDs from different entity types.

/// Macro to define a type-safe Shopify global ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `legacy_id()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use shopfront_core::define_id;
/// define_id!(ProductId);
/// define_id!(VariantId);
///
/// let product_id = ProductId::new("gid://shopify/Product/1");
/// let variant_id = VariantId::new("gid://shopify/ProductVariant/1");
///
/// // These are different types, so this won't compile:
/// // let _: ProductId = variant_id;
/// assert_eq!(product_id.legacy_id(), Some(1));
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a Shopify global ID string.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying global ID string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Numeric resource ID at the end of the global ID, if present.
            ///
            /// `gid://shopify/Product/123?variant=4` yields `123`.
            #[must_use]
            pub fn legacy_id(&self) -> Option<u64> {
                let tail = self.0.rsplit('/').next()?;
                let tail = tail.split('?').next()?;
                tail.parse().ok()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Shopify entity IDs
define_id!(ProductId);
define_id!(VariantId);
define_id!(CollectionId);
define_id!(CartId);
define_id!(CartLineId);
define_id!(ArticleId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_id_from_gid() {
        let id = ProductId::new("gid://shopify/Product/8571234567");
        assert_eq!(id.legacy_id(), Some(8_571_234_567));
    }

    #[test]
    fn test_legacy_id_strips_query() {
        let id = CartId::new("gid://shopify/Cart/42?key=abc");
        assert_eq!(id.legacy_id(), Some(42));
    }

    #[test]
    fn test_legacy_id_non_numeric() {
        let id = CartId::new("gid://shopify/Cart/c1-abcdef");
        assert_eq!(id.legacy_id(), None);
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = VariantId::new("gid://shopify/ProductVariant/7");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"gid://shopify/ProductVariant/7\"");
    }
}
