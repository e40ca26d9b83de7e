use axum::extract::rejection::JsonRejection;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use blog_core::ApiError;
use blog_data::DocumentStore;
use serde::Serialize;

use crate::models::{ArticleView, CreateArticleRequest, ListArticlesQuery};
use crate::revalidate::Revalidator;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub success: bool,
    pub message: &'static str,
    pub article_id: String,
}

#[derive(Debug, Serialize)]
pub struct ArticleList {
    pub articles: Vec<ArticleView>,
    /// Number of articles in this response, after the limit.
    pub total: usize,
}

pub fn routes<S: DocumentStore, R: Revalidator>() -> Router<AppState<S, R>> {
    Router::new().route(
        "/articles",
        get(list_articles::<S, R>).post(create_article::<S, R>),
    )
}

async fn create_article<S: DocumentStore, R: Revalidator>(
    State(state): State<AppState<S, R>>,
    body: Result<Json<CreateArticleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let id = state.articles.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            success: true,
            message: "Article published",
            article_id: id.to_hex(),
        }),
    ))
}

async fn list_articles<S: DocumentStore, R: Revalidator>(
    State(state): State<AppState<S, R>>,
    RawQuery(raw): RawQuery,
) -> Result<Json<ArticleList>, ApiError> {
    let params = ListArticlesQuery::from_query_string(raw.as_deref().unwrap_or_default());
    let articles: Vec<ArticleView> = state
        .articles
        .list(&params)
        .await?
        .into_iter()
        .map(ArticleView::from)
        .collect();
    Ok(Json(ArticleList {
        total: articles.len(),
        articles,
    }))
}
