//! Shop policy pages (privacy, refund, shipping, terms of service).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Policy page template.
#[derive(Template, WebTemplate)]
#[template(path = "policies/show.html")]
pub struct PolicyTemplate {
    pub title: String,
    pub body: String,
}

/// Display a shop policy by handle, e.g. `/policies/refund-policy`.
///
/// # Errors
///
/// Returns 404 if the shop has no policy with this handle, or an error if
/// the API request fails.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<impl IntoResponse> {
    let policy = state
        .storefront()
        .get_policies()
        .await?
        .into_iter()
        .find(|p| p.handle == handle)
        .ok_or_else(|| AppError::NotFound(format!("Policy not found: {handle}")))?;

    Ok(PolicyTemplate {
        title: policy.title,
        body: policy.body,
    })
}
