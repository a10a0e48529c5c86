use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{error::ApiError, state::AppState};

use super::catalog::{CatalogError, Category, ListKind};
use super::dto::{MovieDetails, MoviePage, MoviesQuery, PageQuery};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies))
        .route("/movies/:id", get(get_movie))
        .route("/movies/:id/similar", get(similar_movies))
        .route("/movies/:id/recommendations", get(recommended_movies))
}

/// Search takes precedence over genre, genre over category; the default
/// listing is weekly trending.
fn list_kind(q: &MoviesQuery) -> ListKind {
    if let Some(query) = q.query.as_deref() {
        let query = query.trim();
        if !query.is_empty() {
            return ListKind::Search(query.to_string());
        }
    }
    if let Some(genre_id) = q.genre {
        return ListKind::Genre(genre_id);
    }
    ListKind::Category(Category::from_query(q.category.as_deref().unwrap_or("trending")))
}

#[instrument(skip(state))]
pub async fn list_movies(
    State(state): State<AppState>,
    Query(q): Query<MoviesQuery>,
) -> Json<MoviePage> {
    let kind = list_kind(&q);
    match state.catalog.list(&kind, q.page).await {
        Ok(page) => Json(page),
        Err(e) => {
            warn!(error = %e, ?kind, "catalog listing failed, serving empty page");
            Json(MoviePage::empty())
        }
    }
}

#[instrument(skip(state))]
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MovieDetails>, ApiError> {
    match state.catalog.details(id).await {
        Ok(details) => Ok(Json(details)),
        Err(CatalogError::NotFound) => Err(ApiError::NotFound(format!("movie {id} not found"))),
        Err(e) => Err(ApiError::Upstream(e.to_string())),
    }
}

#[instrument(skip(state))]
pub async fn similar_movies(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(p): Query<PageQuery>,
) -> Json<MoviePage> {
    match state.catalog.similar(id, p.page).await {
        Ok(page) => Json(page),
        Err(e) => {
            warn!(error = %e, movie_id = id, "similar lookup failed, serving empty page");
            Json(MoviePage::empty())
        }
    }
}

#[instrument(skip(state))]
pub async fn recommended_movies(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(p): Query<PageQuery>,
) -> Json<MoviePage> {
    match state.catalog.recommendations(id, p.page).await {
        Ok(page) => Json(page),
        Err(e) => {
            warn!(error = %e, movie_id = id, "recommendations lookup failed, serving empty page");
            Json(MoviePage::empty())
        }
    }
}
