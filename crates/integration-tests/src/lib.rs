//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! # Pipeline tests run against the JSON fixture, no services needed
//! cargo test -p shopfront-integration-tests
//!
//! # HTTP tests need a running storefront
//! STOREFRONT_TEST_URL=http://localhost:3000 \
//!     cargo test -p shopfront-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `listing_pipeline` - Facets, filters, sort and listing views over a fixture page
//! - `storefront_http` - Requests against a live storefront (ignored by default)

use shopfront_core::{Connection, PageInfo, Product};

/// Default address of the storefront under test.
pub const DEFAULT_STOREFRONT_URL: &str = "http://localhost:3000";

const CATALOG_JSON: &str = include_str!("../fixtures/catalog.json");

/// Products from the fixture catalog, in API order.
///
/// # Panics
///
/// Panics if the fixture does not match the catalog types.
#[must_use]
#[allow(clippy::expect_used)]
pub fn fixture_products() -> Vec<Product> {
    serde_json::from_str(CATALOG_JSON).expect("fixture catalog should deserialize")
}

/// The fixture catalog as a single page with no neighbours.
#[must_use]
pub fn fixture_page() -> Connection<Product> {
    Connection::new(fixture_products(), PageInfo::default())
}

/// HTTP client and base URL for a running storefront.
pub struct TestContext {
    pub client: reqwest::Client,
    pub storefront_url: String,
}

impl TestContext {
    /// Build a context from `STOREFRONT_TEST_URL`.
    ///
    /// The client keeps cookies so session-backed state (wishlist, cart)
    /// survives between requests, and does not follow redirects.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let storefront_url = std::env::var("STOREFRONT_TEST_URL")
            .unwrap_or_else(|_| DEFAULT_STOREFRONT_URL.to_string());
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            storefront_url: storefront_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
