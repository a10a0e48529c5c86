use std::sync::Arc;

use tracing::warn;

use crate::movies::dto::Movie;

use super::api::{FavoritesApi, MovieLookup};
use super::ClientError;

/// Server-backed favorites: the server holds an id set, full records are
/// rehydrated per id through the catalog.
pub struct RemoteFavoritesStore {
    api: Arc<dyn FavoritesApi>,
    catalog: Arc<dyn MovieLookup>,
}

impl RemoteFavoritesStore {
    pub fn new(api: Arc<dyn FavoritesApi>, catalog: Arc<dyn MovieLookup>) -> Self {
        Self { api, catalog }
    }

    /// Fetch the id list and rehydrate each id in server order. Ids whose
    /// catalog fetch fails are omitted; partial results are acceptable.
    pub async fn load(&self, token: &str) -> Result<Vec<Movie>, ClientError> {
        let ids = self.api.list_ids(token).await?;
        let mut movies = Vec::with_capacity(ids.len());
        for id in ids {
            match self.catalog.movie_by_id(id).await {
                Ok(movie) => movies.push(movie),
                Err(e) => {
                    warn!(movie_id = id, error = %e, "skipping favorite that failed to rehydrate");
                }
            }
        }
        Ok(movies)
    }

    pub async fn add(&self, token: &str, movie_id: i64) -> Result<(), ClientError> {
        self.api.add(token, movie_id).await
    }

    pub async fn remove(&self, token: &str, movie_id: i64) -> Result<(), ClientError> {
        self.api.remove(token, movie_id).await
    }

    pub async fn clear(&self, token: &str) -> Result<(), ClientError> {
        self.api.clear(token).await
    }
}
