//! Print the facets a collection page offers.

use std::fmt::Write;

use shopfront_core::{FacetSet, PageRequest, extract_facets};
use shopfront_storefront::config::ShopifyStorefrontConfig;
use shopfront_storefront::shopify::StorefrontClient;

use super::browse::BrowseError;

/// Fetch the first page of `handle` and print its facet counts.
///
/// # Errors
///
/// Returns an error if the Shopify settings are missing or the collection
/// cannot be fetched.
pub async fn run(handle: &str, page_size: u32) -> Result<(), BrowseError> {
    let config = ShopifyStorefrontConfig::from_env()?;
    let client = StorefrontClient::new(&config);
    let request = PageRequest::First {
        count: page_size.clamp(1, 250),
    };

    let collection = client.get_collection(handle, &request).await?;
    let facets = extract_facets(&collection.products.nodes);

    print_facets(&collection.title, collection.products.len(), &facets);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_facets(title: &str, products: usize, facets: &FacetSet) {
    println!("{title} ({products} products on this page)");
    print!("{}", render_facets(facets));
}

fn render_facets(facets: &FacetSet) -> String {
    if facets.is_empty() {
        return "No facets\n".to_string();
    }

    let mut out = String::new();
    let mut group = |title: &str, values: Vec<(String, usize)>| {
        if values.is_empty() {
            return;
        }
        let _ = writeln!(out, "{title}:");
        for (value, count) in values {
            let _ = writeln!(out, "  {value} ({count})");
        }
    };

    group(
        "Availability",
        facets
            .availability
            .iter()
            .map(|(a, n)| (a.label().to_string(), *n))
            .collect(),
    );
    for (title, values) in [
        ("Color", &facets.colors),
        ("Size", &facets.sizes),
        ("Tag", &facets.tags),
    ] {
        group(title, values.iter().map(|(v, n)| (v.clone(), *n)).collect());
    }
    let _ = writeln!(out, "Price: {} - {}", facets.price.min, facets.price.max);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shopfront_core::{Availability, PriceBounds};

    #[test]
    fn test_render_empty_facets() {
        assert_eq!(render_facets(&FacetSet::default()), "No facets\n");
    }

    #[test]
    fn test_render_groups_skip_empty() {
        let mut facets = FacetSet::default();
        facets.colors.insert("Red".into(), 2);
        facets.availability.insert(Availability::InStock, 3);
        facets.price = PriceBounds {
            min: Decimal::new(1000, 2),
            max: Decimal::new(2500, 2),
        };

        let out = render_facets(&facets);
        assert_eq!(
            out,
            "Availability:\n  In stock (3)\nColor:\n  Red (2)\nPrice: 10.00 - 25.00\n"
        );
    }
}
