use std::sync::Arc;

use tracing::warn;

use crate::movies::dto::Movie;

use super::local::LocalFavoritesStore;
use super::remote::RemoteFavoritesStore;
use super::session::Session;
use super::token_store::TokenStore;

/// Single owner of the visible favorites list. Picks the backing store from
/// the current session (local storage while anonymous, the server once
/// authenticated) and reloads wholesale on every session transition; the two
/// stores are never merged.
///
/// Remote failures are swallowed here: the in-memory list stays unchanged
/// and the mutation reports `false` instead of erroring.
pub struct FavoritesCoordinator {
    local: LocalFavoritesStore,
    remote: RemoteFavoritesStore,
    tokens: Arc<dyn TokenStore>,
    favorites: Vec<Movie>,
    authenticated: bool,
    loading: bool,
}

impl FavoritesCoordinator {
    pub fn new(
        local: LocalFavoritesStore,
        remote: RemoteFavoritesStore,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            local,
            remote,
            tokens,
            favorites: Vec::new(),
            authenticated: false,
            loading: true,
        }
    }

    pub fn favorites(&self) -> &[Movie] {
        &self.favorites
    }

    pub fn count(&self) -> usize {
        self.favorites.len()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Pure in-memory lookup; never touches either store.
    pub fn is_favorite(&self, movie_id: i64) -> bool {
        self.favorites.iter().any(|m| m.id == movie_id)
    }

    /// Replace the in-memory list from the store the session selects. Called
    /// on every session transition; does nothing while the session is still
    /// resolving.
    pub async fn reload(&mut self, session: &Session) {
        if session.loading {
            return;
        }
        self.loading = true;
        self.authenticated = session.authenticated;

        self.favorites = if session.authenticated {
            match self.tokens.get() {
                Some(token) => match self.remote.load(&token).await {
                    Ok(movies) => movies,
                    Err(e) => {
                        warn!(error = %e, "failed to load favorites from server");
                        Vec::new()
                    }
                },
                None => Vec::new(),
            }
        } else {
            self.local.load()
        };
        self.loading = false;
    }

    /// No-op if the movie is already favorited. Returns whether the list
    /// changed.
    pub async fn add_favorite(&mut self, movie: Movie) -> bool {
        if self.is_favorite(movie.id) {
            return false;
        }

        if self.authenticated {
            let Some(token) = self.tokens.get() else {
                return false;
            };
            if let Err(e) = self.remote.add(&token, movie.id).await {
                warn!(movie_id = movie.id, error = %e, "add favorite rejected, list unchanged");
                return false;
            }
            self.favorites.push(movie);
        } else {
            self.favorites.push(movie);
            self.persist_local();
        }
        true
    }

    /// Removing an id that is not favorited is a no-op.
    pub async fn remove_favorite(&mut self, movie_id: i64) -> bool {
        if !self.is_favorite(movie_id) {
            return false;
        }

        if self.authenticated {
            let Some(token) = self.tokens.get() else {
                return false;
            };
            if let Err(e) = self.remote.remove(&token, movie_id).await {
                warn!(movie_id, error = %e, "remove favorite rejected, list unchanged");
                return false;
            }
            self.favorites.retain(|m| m.id != movie_id);
        } else {
            self.favorites.retain(|m| m.id != movie_id);
            self.persist_local();
        }
        true
    }

    pub async fn clear_favorites(&mut self) -> bool {
        if self.authenticated {
            let Some(token) = self.tokens.get() else {
                return false;
            };
            if let Err(e) = self.remote.clear(&token).await {
                warn!(error = %e, "clear favorites rejected, list unchanged");
                return false;
            }
            self.favorites.clear();
        } else {
            self.favorites.clear();
            self.persist_local();
        }
        true
    }

    fn persist_local(&self) {
        if let Err(e) = self.local.save(&self.favorites) {
            warn!(error = %e, "failed to persist favorites locally");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::client::api::{FavoritesApi, MovieLookup};
    use crate::client::token_store::MemoryTokenStore;
    use crate::client::ClientError;

    const TOKEN: &str = "tok-valid";

    fn sample_movie(id: i64) -> Movie {
        Movie {
            id,
            title: format!("Movie {id}"),
            overview: String::new(),
            release_date: "2021-03-03".into(),
            poster_path: None,
            backdrop_path: None,
            popularity: 1.0,
            vote_average: 6.0,
            vote_count: 10,
            genre_ids: vec![35],
            adult: false,
            original_language: "en".into(),
            original_title: format!("Movie {id}"),
            video: false,
        }
    }

    /// Server-side favorites set with a kill switch for simulating outages.
    #[derive(Default)]
    struct FakeFavorites {
        ids: Mutex<Vec<i64>>,
        fail: AtomicBool,
    }

    impl FakeFavorites {
        fn with_ids(ids: Vec<i64>) -> Arc<Self> {
            Arc::new(Self {
                ids: Mutex::new(ids),
                fail: AtomicBool::new(false),
            })
        }

        fn check(&self, token: &str) -> Result<(), ClientError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ClientError::Upstream("simulated network error".into()));
            }
            if token != TOKEN {
                return Err(ClientError::Auth("invalid or expired token".into()));
            }
            Ok(())
        }

        fn snapshot(&self) -> Vec<i64> {
            self.ids.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FavoritesApi for FakeFavorites {
        async fn list_ids(&self, token: &str) -> Result<Vec<i64>, ClientError> {
            self.check(token)?;
            Ok(self.snapshot())
        }

        async fn add(&self, token: &str, movie_id: i64) -> Result<(), ClientError> {
            self.check(token)?;
            let mut ids = self.ids.lock().unwrap();
            if !ids.contains(&movie_id) {
                ids.push(movie_id);
            }
            Ok(())
        }

        async fn remove(&self, token: &str, movie_id: i64) -> Result<(), ClientError> {
            self.check(token)?;
            self.ids.lock().unwrap().retain(|id| *id != movie_id);
            Ok(())
        }

        async fn clear(&self, token: &str) -> Result<(), ClientError> {
            self.check(token)?;
            self.ids.lock().unwrap().clear();
            Ok(())
        }
    }

    struct FakeCatalog {
        movies: HashMap<i64, Movie>,
    }

    impl FakeCatalog {
        fn with_ids(ids: &[i64]) -> Arc<Self> {
            Arc::new(Self {
                movies: ids.iter().map(|&id| (id, sample_movie(id))).collect(),
            })
        }
    }

    #[async_trait]
    impl MovieLookup for FakeCatalog {
        async fn movie_by_id(&self, id: i64) -> Result<Movie, ClientError> {
            self.movies
                .get(&id)
                .cloned()
                .ok_or_else(|| ClientError::NotFound(format!("movie {id} not found")))
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "nexusmovies-coordinator-{}-{}.json",
            name,
            uuid::Uuid::new_v4()
        ))
    }

    fn anonymous_session() -> Session {
        Session {
            user: None,
            authenticated: false,
            loading: false,
        }
    }

    fn authenticated_session() -> Session {
        Session {
            user: None,
            authenticated: true,
            loading: false,
        }
    }

    fn coordinator(
        name: &str,
        server: Arc<FakeFavorites>,
        catalog: Arc<FakeCatalog>,
        with_token: bool,
    ) -> (FavoritesCoordinator, PathBuf) {
        let path = temp_path(name);
        let tokens = Arc::new(MemoryTokenStore::default());
        if with_token {
            tokens.set(TOKEN);
        }
        let coord = FavoritesCoordinator::new(
            LocalFavoritesStore::new(&path),
            RemoteFavoritesStore::new(server, catalog),
            tokens,
        );
        (coord, path)
    }

    #[tokio::test]
    async fn anonymous_reload_uses_local_store() {
        let server = FakeFavorites::with_ids(vec![999]);
        let catalog = FakeCatalog::with_ids(&[999]);
        let (mut coord, path) = coordinator("anon-reload", server, catalog, false);

        LocalFavoritesStore::new(&path)
            .save(&[sample_movie(5)])
            .unwrap();
        coord.reload(&anonymous_session()).await;
        assert_eq!(coord.count(), 1);
        assert!(coord.is_favorite(5));
        assert!(!coord.is_favorite(999));
    }

    #[tokio::test]
    async fn reload_ignores_unresolved_session() {
        let server = FakeFavorites::with_ids(vec![]);
        let catalog = FakeCatalog::with_ids(&[]);
        let (mut coord, _path) = coordinator("init", server, catalog, false);

        let initializing = Session {
            user: None,
            authenticated: false,
            loading: true,
        };
        coord.reload(&initializing).await;
        assert!(coord.loading());
    }

    #[tokio::test]
    async fn authenticated_reload_rehydrates_in_server_order() {
        let server = FakeFavorites::with_ids(vec![101, 202]);
        let catalog = FakeCatalog::with_ids(&[101, 202]);
        let (mut coord, _path) = coordinator("rehydrate", server, catalog, true);

        coord.reload(&authenticated_session()).await;
        let ids: Vec<i64> = coord.favorites().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![101, 202]);
    }

    #[tokio::test]
    async fn rehydration_omits_ids_the_catalog_cannot_serve() {
        let server = FakeFavorites::with_ids(vec![101, 404, 202]);
        let catalog = FakeCatalog::with_ids(&[101, 202]);
        let (mut coord, _path) = coordinator("partial", server, catalog, true);

        coord.reload(&authenticated_session()).await;
        let ids: Vec<i64> = coord.favorites().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![101, 202]);
    }

    #[tokio::test]
    async fn no_merge_when_switching_to_authenticated() {
        let server = FakeFavorites::with_ids(vec![202]);
        let catalog = FakeCatalog::with_ids(&[202]);
        let (mut coord, _path) = coordinator("no-merge", server.clone(), catalog, true);

        coord.reload(&anonymous_session()).await;
        coord.add_favorite(sample_movie(101)).await;
        assert!(coord.is_favorite(101));

        // logging in replaces the list wholesale; the local favorite is gone
        coord.reload(&authenticated_session()).await;
        let ids: Vec<i64> = coord.favorites().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![202]);
        assert_eq!(server.snapshot(), vec![202]);
    }

    #[tokio::test]
    async fn anonymous_mutations_persist_through_local_store() {
        let server = FakeFavorites::with_ids(vec![]);
        let catalog = FakeCatalog::with_ids(&[]);
        let (mut coord, path) = coordinator("anon-persist", server, catalog, false);

        coord.reload(&anonymous_session()).await;
        assert!(coord.add_favorite(sample_movie(1)).await);
        assert!(coord.add_favorite(sample_movie(2)).await);
        // duplicate add deduped by id
        assert!(!coord.add_favorite(sample_movie(1)).await);
        assert!(coord.remove_favorite(1).await);
        // removing an absent id is a no-op
        assert!(!coord.remove_favorite(999).await);

        let persisted = LocalFavoritesStore::new(&path).load();
        let ids: Vec<i64> = persisted.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[tokio::test]
    async fn authenticated_add_updates_server_then_memory() {
        let server = FakeFavorites::with_ids(vec![]);
        let catalog = FakeCatalog::with_ids(&[]);
        let (mut coord, _path) = coordinator("auth-add", server.clone(), catalog, true);

        coord.reload(&authenticated_session()).await;
        assert!(coord.add_favorite(sample_movie(303)).await);
        assert!(coord.is_favorite(303));
        assert_eq!(server.snapshot(), vec![303]);
    }

    #[tokio::test]
    async fn failed_remote_add_leaves_memory_unchanged() {
        let server = FakeFavorites::with_ids(vec![]);
        let catalog = FakeCatalog::with_ids(&[]);
        let (mut coord, _path) = coordinator("add-fail", server.clone(), catalog, true);

        coord.reload(&authenticated_session()).await;
        server.fail.store(true, Ordering::SeqCst);
        assert!(!coord.add_favorite(sample_movie(303)).await);
        assert!(!coord.is_favorite(303));
        assert!(server.snapshot().is_empty());
    }

    #[tokio::test]
    async fn failed_remote_remove_and_clear_leave_memory_unchanged() {
        let server = FakeFavorites::with_ids(vec![101, 202]);
        let catalog = FakeCatalog::with_ids(&[101, 202]);
        let (mut coord, _path) = coordinator("mut-fail", server.clone(), catalog, true);

        coord.reload(&authenticated_session()).await;
        server.fail.store(true, Ordering::SeqCst);

        assert!(!coord.remove_favorite(101).await);
        assert!(coord.is_favorite(101));

        assert!(!coord.clear_favorites().await);
        assert_eq!(coord.count(), 2);
        assert_eq!(server.snapshot(), vec![101, 202]);
    }

    #[tokio::test]
    async fn authenticated_clear_resets_server_and_memory() {
        let server = FakeFavorites::with_ids(vec![101, 202]);
        let catalog = FakeCatalog::with_ids(&[101, 202]);
        let (mut coord, _path) = coordinator("auth-clear", server.clone(), catalog, true);

        coord.reload(&authenticated_session()).await;
        assert!(coord.clear_favorites().await);
        assert_eq!(coord.count(), 0);
        assert!(server.snapshot().is_empty());
    }

    #[tokio::test]
    async fn logout_transition_switches_back_to_local() {
        let server = FakeFavorites::with_ids(vec![202]);
        let catalog = FakeCatalog::with_ids(&[202]);
        let (mut coord, path) = coordinator("logout", server, catalog, true);

        LocalFavoritesStore::new(&path)
            .save(&[sample_movie(7)])
            .unwrap();

        coord.reload(&authenticated_session()).await;
        assert!(coord.is_favorite(202));

        coord.reload(&anonymous_session()).await;
        assert!(coord.is_favorite(7));
        assert!(!coord.is_favorite(202));
    }
}
