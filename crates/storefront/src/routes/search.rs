//! Search route handlers.
//!
//! Search results go through the same listing pipeline as collection pages;
//! only the upstream query and the default sort differ.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::listing::{ListingQuery, ListingView, SEARCH_SORTS};
use crate::models::load_wishlist;
use crate::state::AppState;

/// Search page template.
#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub term: String,
    /// `None` until the visitor has entered a term.
    pub listing: Option<ListingView>,
}

/// Display search results for `?q=`.
///
/// # Errors
///
/// Returns an error if the search request fails.
#[instrument(skip(state, session, params))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse> {
    let query = ListingQuery::from_pairs(&params, SEARCH_SORTS[0]);
    let Some(term) = query.term.clone() else {
        return Ok(SearchTemplate {
            term: String::new(),
            listing: None,
        });
    };

    let page_size = state.page_size();
    let page = state
        .storefront()
        .search_products(&term, &query.page_request(page_size))
        .await?;
    let wishlist = load_wishlist(&session).await;

    tracing::debug!(term = %term, results = page.len(), "Search page fetched");

    Ok(SearchTemplate {
        listing: Some(ListingView::for_page(
            &query,
            &page,
            "/search",
            page_size,
            &SEARCH_SORTS,
            &wishlist,
        )),
        term,
    })
}
