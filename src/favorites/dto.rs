use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteAction {
    Add,
    Remove,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateFavoritesRequest {
    pub movie_id: i64,
    pub action: FavoriteAction,
}

/// Favorite movie ids in insertion order.
#[derive(Debug, Serialize, Deserialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearedResponse {
    pub message: String,
}
