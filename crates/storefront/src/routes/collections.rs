//! Collection route handlers.
//!
//! A collection page fetches one cursor page of products and runs it through
//! the listing pipeline; facets, filters and sort never change the upstream
//! query.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use shopfront_core::{FilterPanel, FilterState, extract_facets};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::listing::{COLLECTION_SORTS, ImageView, ListingQuery, ListingView};
use crate::models::load_wishlist;
use crate::shopify::types::CollectionSummary;
use crate::state::AppState;

/// Collection display data for templates.
#[derive(Clone)]
pub struct CollectionView {
    pub handle: String,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<ImageView>,
}

impl From<&CollectionSummary> for CollectionView {
    fn from(collection: &CollectionSummary) -> Self {
        Self {
            handle: collection.handle.clone(),
            title: collection.title.clone(),
            description: Some(collection.description.trim())
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            image: collection
                .image
                .as_ref()
                .map(|img| ImageView::new(img, &collection.title)),
        }
    }
}

/// Collection listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/index.html")]
pub struct CollectionsIndexTemplate {
    pub collections: Vec<CollectionView>,
}

/// Collection detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/show.html")]
pub struct CollectionShowTemplate {
    pub collection: CollectionView,
    pub listing: ListingView,
}

/// Filter panel "Show N products" button (HTMX fragment).
#[derive(Template, WebTemplate)]
#[template(path = "partials/filter_preview.html")]
pub struct FilterPreviewTemplate {
    pub count: usize,
}

/// Display collection listing page.
///
/// # Errors
///
/// Returns an error if the collection list cannot be fetched.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let collections = state.storefront().get_collections().await?;

    Ok(CollectionsIndexTemplate {
        collections: collections.iter().map(CollectionView::from).collect(),
    })
}

/// Display a collection page with facets, filters, sort and cursor links.
///
/// # Errors
///
/// Returns 404 if the collection does not exist, or an error if the API
/// request fails.
#[instrument(skip(state, session, params), fields(handle = %handle))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(handle): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse> {
    let query = ListingQuery::from_pairs(&params, COLLECTION_SORTS[0]);
    let page_size = state.page_size();
    let collection = state
        .storefront()
        .get_collection(&handle, &query.page_request(page_size))
        .await?;
    let wishlist = load_wishlist(&session).await;

    let path = format!("/collections/{}", collection.handle);
    let mut listing = ListingView::for_page(
        &query,
        &collection.products,
        &path,
        page_size,
        &COLLECTION_SORTS,
        &wishlist,
    );
    listing.preview_path = Some(format!("{path}/preview"));
    if listing.pruned {
        tracing::debug!("Dropped filter selections not offered by this page");
    }

    Ok(CollectionShowTemplate {
        collection: CollectionView::from(&collection.summary()),
        listing,
    })
}

/// Count the products a draft filter would show on the current page.
///
/// The filter panel posts its draft here on every change; nothing is
/// committed until the visitor applies it.
///
/// # Errors
///
/// Returns 404 if the collection does not exist, or an error if the API
/// request fails.
#[instrument(skip(state, params), fields(handle = %handle))]
pub async fn preview(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse> {
    let query = ListingQuery::from_pairs(&params, COLLECTION_SORTS[0]);
    let collection = state
        .storefront()
        .get_collection(&handle, &query.page_request(state.page_size()))
        .await?;
    let products = &collection.products.nodes;

    let mut draft = query.filter;
    draft.prune_to(&extract_facets(products));

    let mut panel = FilterPanel::new(FilterState::default());
    *panel.draft_mut() = draft;

    Ok(FilterPreviewTemplate {
        count: panel.preview_count(products),
    })
}
