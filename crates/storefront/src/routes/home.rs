//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use shopfront_core::{FilterState, Listing, PageRequest, SortKey};
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::listing::ProductCardView;
use crate::models::load_wishlist;
use crate::routes::collections::CollectionView;
use crate::shopify::{CatalogSource, PageSource};
use crate::state::AppState;

/// Collections featured on the home page.
const FEATURED_COLLECTIONS: usize = 6;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub trending: Vec<ProductCardView>,
    pub collections: Vec<CollectionView>,
}

/// Display the home page.
///
/// Both sections are non-critical: failures are logged and the section is
/// left out.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let wishlist = load_wishlist(&session).await;
    let source = CatalogSource::new(state.storefront().clone(), SortKey::BestSelling);
    let request = PageRequest::First {
        count: state.config().listing.trending_count,
    };

    let trending = match source.fetch(&request).await {
        Ok(page) => {
            let listing = Listing::build(&page.nodes, FilterState::default(), SortKey::BestSelling);
            listing
                .products()
                .iter()
                .map(|p| ProductCardView::new(p, &wishlist))
                .collect()
        }
        Err(e) => {
            tracing::warn!("Failed to fetch trending products: {e}");
            Vec::new()
        }
    };

    let collections = match state.storefront().get_collections().await {
        Ok(collections) => collections
            .iter()
            .take(FEATURED_COLLECTIONS)
            .map(CollectionView::from)
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to fetch collections: {e}");
            Vec::new()
        }
    };

    HomeTemplate {
        trending,
        collections,
    }
}
