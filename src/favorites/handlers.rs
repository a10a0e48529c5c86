use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{auth::extractors::AuthUser, error::ApiError, state::AppState};

use super::dto::{ClearedResponse, FavoriteAction, FavoritesResponse, UpdateFavoritesRequest};

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/favorites",
        get(list_favorites)
            .post(update_favorites)
            .delete(clear_favorites),
    )
}

#[instrument(skip(state))]
pub async fn list_favorites(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<FavoritesResponse>, ApiError> {
    let favorites = state.favorites.list_ids(user_id).await?;
    Ok(Json(FavoritesResponse { favorites }))
}

#[instrument(skip(state))]
pub async fn update_favorites(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<UpdateFavoritesRequest>,
) -> Result<Json<FavoritesResponse>, ApiError> {
    match req.action {
        FavoriteAction::Add => state.favorites.add(user_id, req.movie_id).await?,
        FavoriteAction::Remove => state.favorites.remove(user_id, req.movie_id).await?,
    }
    info!(user_id = %user_id, movie_id = req.movie_id, action = ?req.action, "favorites updated");
    let favorites = state.favorites.list_ids(user_id).await?;
    Ok(Json(FavoritesResponse { favorites }))
}

#[instrument(skip(state))]
pub async fn clear_favorites(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ClearedResponse>, ApiError> {
    state.favorites.clear(user_id).await?;
    info!(user_id = %user_id, "favorites cleared");
    Ok(Json(ClearedResponse {
        message: "favorites cleared".into(),
    }))
}
