//! Blog route handlers.
//!
//! Articles come from Shopify blogs. The index pages through articles with
//! the same `?after=`/`?before=` cursors as product listings.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use shopfront_core::PageRequest;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::listing::{AFTER_PARAM, BEFORE_PARAM, ImageView, href};
use crate::shopify::types::{Article, ArticleSummary};
use crate::state::AppState;

/// Articles per blog page.
const ARTICLES_PER_PAGE: u32 = 12;

/// One step of the breadcrumb trail.
#[derive(Clone)]
pub struct BreadcrumbItem {
    pub name: String,
    pub url: Option<String>,
}

/// Article card on the blog index.
#[derive(Clone)]
pub struct ArticleCardView {
    pub handle: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub published_on: Option<String>,
    pub image: Option<ImageView>,
}

/// Full article for the article page.
#[derive(Clone)]
pub struct ArticleView {
    pub title: String,
    pub author: Option<String>,
    pub published_on: Option<String>,
    pub image: Option<ImageView>,
    pub content_html: String,
}

fn format_date(date: Option<DateTime<Utc>>) -> Option<String> {
    date.map(|d| d.format("%B %-d, %Y").to_string())
}

impl From<&ArticleSummary> for ArticleCardView {
    fn from(article: &ArticleSummary) -> Self {
        Self {
            handle: article.handle.clone(),
            title: article.title.clone(),
            excerpt: article.excerpt.clone().filter(|e| !e.trim().is_empty()),
            author: article.author.clone(),
            published_on: format_date(article.published_at),
            image: article
                .image
                .as_ref()
                .map(|img| ImageView::new(img, &article.title)),
        }
    }
}

impl From<&Article> for ArticleView {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            author: article.author.clone(),
            published_on: format_date(article.published_at),
            image: article
                .image
                .as_ref()
                .map(|img| ImageView::new(img, &article.title)),
            content_html: article.content_html.clone(),
        }
    }
}

/// Cursor query parameters.
#[derive(Debug, Default, serde::Deserialize)]
pub struct CursorQuery {
    pub after: Option<String>,
    pub before: Option<String>,
}

/// Blog index page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub blog_handle: String,
    pub title: String,
    pub articles: Vec<ArticleCardView>,
    pub next_href: Option<String>,
    pub previous_href: Option<String>,
}

/// Article page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct ArticleTemplate {
    pub article: ArticleView,
    pub breadcrumbs: Vec<BreadcrumbItem>,
}

/// Display one page of a blog's articles.
///
/// # Errors
///
/// Returns 404 if the blog does not exist, or an error if the API request
/// fails.
#[instrument(skip(state, query), fields(blog = %blog))]
pub async fn index(
    State(state): State<AppState>,
    Path(blog): Path<String>,
    Query(query): Query<CursorQuery>,
) -> Result<impl IntoResponse> {
    let request = PageRequest::from_cursors(
        ARTICLES_PER_PAGE,
        query.after.as_deref(),
        query.before.as_deref(),
    );
    let blog = state.storefront().get_blog_articles(&blog, &request).await?;

    let path = format!("/blogs/{}", blog.handle);
    let cursor_href = |param: &str, request: &PageRequest| {
        let cursor = request.after().or_else(|| request.before()).unwrap_or_default();
        href(&path, &[(param, cursor)])
    };

    Ok(BlogIndexTemplate {
        next_href: blog
            .articles
            .next_page(ARTICLES_PER_PAGE)
            .map(|r| cursor_href(AFTER_PARAM, &r)),
        previous_href: blog
            .articles
            .previous_page(ARTICLES_PER_PAGE)
            .map(|r| cursor_href(BEFORE_PARAM, &r)),
        articles: blog.articles.nodes.iter().map(ArticleCardView::from).collect(),
        blog_handle: blog.handle,
        title: blog.title,
    })
}

/// Display a single article.
///
/// # Errors
///
/// Returns 404 if the blog or article does not exist, or an error if the
/// API request fails.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path((blog, article)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let article = state.storefront().get_article(&blog, &article).await?;

    let breadcrumbs = vec![
        BreadcrumbItem {
            name: "Home".to_string(),
            url: Some("/".to_string()),
        },
        BreadcrumbItem {
            name: article.blog_title.clone(),
            url: Some(format!("/blogs/{}", article.blog_handle)),
        },
        BreadcrumbItem {
            name: article.title.clone(),
            url: None,
        },
    ];

    Ok(ArticleTemplate {
        article: ArticleView::from(&article),
        breadcrumbs,
    })
}

/// Create the blog routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{blog}", get(index))
        .route("/{blog}/{article}", get(show))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).single();
        assert_eq!(format_date(date).as_deref(), Some("March 5, 2024"));
        assert_eq!(format_date(None), None);
    }
}
