//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a count as "1 product" / "12 products".
///
/// Usage in templates: `{{ listing.visible|product_count }}`
#[askama::filter_fn]
pub fn product_count(count: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(count_label(&count.to_string()))
}

/// Trailing numeric part of a Shopify GID, for use in element IDs.
///
/// Usage in templates: `id="wishlist-{{ card.id|gid_suffix }}"`
#[askama::filter_fn]
pub fn gid_suffix(gid: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(suffix(&gid.to_string()).to_string())
}

fn count_label(count: &str) -> String {
    if count == "1" {
        "1 product".to_string()
    } else {
        format!("{count} products")
    }
}

fn suffix(gid: &str) -> &str {
    let tail = gid.rsplit('/').next().unwrap_or(gid);
    tail.split('?').next().unwrap_or(tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_label() {
        assert_eq!(count_label("0"), "0 products");
        assert_eq!(count_label("1"), "1 product");
        assert_eq!(count_label("24"), "24 products");
    }

    #[test]
    fn test_gid_suffix() {
        assert_eq!(suffix("gid://shopify/Product/8123"), "8123");
        assert_eq!(suffix("gid://shopify/Cart/abc?key=def"), "abc");
        assert_eq!(suffix("plain"), "plain");
    }
}
