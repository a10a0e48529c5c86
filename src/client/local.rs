use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::movies::dto::Movie;

/// Durable favorites for anonymous sessions: the full movie records as one
/// JSON document, overwritten wholesale after every mutation.
pub struct LocalFavoritesStore {
    path: PathBuf,
}

impl LocalFavoritesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Missing or corrupt data reads as an empty list, never an error.
    pub fn load(&self) -> Vec<Movie> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no stored favorites");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(movies) => movies,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "stored favorites unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    pub fn save(&self, favorites: &[Movie]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_vec(favorites)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}
