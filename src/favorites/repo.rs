use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Server-side favorites set: movie ids per user, insertion order preserved.
/// Add and remove are idempotent.
#[async_trait]
pub trait FavoritesRepository: Send + Sync {
    async fn list_ids(&self, user_id: Uuid) -> anyhow::Result<Vec<i64>>;
    async fn add(&self, user_id: Uuid, movie_id: i64) -> anyhow::Result<()>;
    async fn remove(&self, user_id: Uuid, movie_id: i64) -> anyhow::Result<()>;
    async fn clear(&self, user_id: Uuid) -> anyhow::Result<()>;
}

pub struct PgFavoritesRepository {
    db: PgPool,
}

impl PgFavoritesRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FavoritesRepository for PgFavoritesRepository {
    async fn list_ids(&self, user_id: Uuid) -> anyhow::Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT movie_id
            FROM favorites
            WHERE user_id = $1
            ORDER BY position
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(ids)
    }

    async fn add(&self, user_id: Uuid, movie_id: i64) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO favorites (user_id, movie_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, movie_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn remove(&self, user_id: Uuid, movie_id: i64) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            DELETE FROM favorites
            WHERE user_id = $1 AND movie_id = $2
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn clear(&self, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            DELETE FROM favorites
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}

/// Used by `AppState::fake()` and unit tests.
#[derive(Default)]
pub struct InMemoryFavoritesRepository {
    sets: Mutex<HashMap<Uuid, Vec<i64>>>,
}

#[async_trait]
impl FavoritesRepository for InMemoryFavoritesRepository {
    async fn list_ids(&self, user_id: Uuid) -> anyhow::Result<Vec<i64>> {
        let sets = self.sets.lock().expect("favorites lock poisoned");
        Ok(sets.get(&user_id).cloned().unwrap_or_default())
    }

    async fn add(&self, user_id: Uuid, movie_id: i64) -> anyhow::Result<()> {
        let mut sets = self.sets.lock().expect("favorites lock poisoned");
        let ids = sets.entry(user_id).or_default();
        if !ids.contains(&movie_id) {
            ids.push(movie_id);
        }
        Ok(())
    }

    async fn remove(&self, user_id: Uuid, movie_id: i64) -> anyhow::Result<()> {
        let mut sets = self.sets.lock().expect("favorites lock poisoned");
        if let Some(ids) = sets.get_mut(&user_id) {
            ids.retain(|id| *id != movie_id);
        }
        Ok(())
    }

    async fn clear(&self, user_id: Uuid) -> anyhow::Result<()> {
        let mut sets = self.sets.lock().expect("favorites lock poisoned");
        sets.remove(&user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_is_idempotent_and_order_preserving() {
        let repo = InMemoryFavoritesRepository::default();
        let user = Uuid::new_v4();
        repo.add(user, 101).await.unwrap();
        repo.add(user, 202).await.unwrap();
        repo.add(user, 101).await.unwrap();
        assert_eq!(repo.list_ids(user).await.unwrap(), vec![101, 202]);
    }

    #[tokio::test]
    async fn remove_of_absent_id_is_a_noop() {
        let repo = InMemoryFavoritesRepository::default();
        let user = Uuid::new_v4();
        repo.add(user, 7).await.unwrap();
        repo.remove(user, 999).await.unwrap();
        assert_eq!(repo.list_ids(user).await.unwrap(), vec![7]);
        repo.remove(user, 7).await.unwrap();
        assert!(repo.list_ids(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_empties_only_that_user() {
        let repo = InMemoryFavoritesRepository::default();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        repo.add(alice, 1).await.unwrap();
        repo.add(bob, 2).await.unwrap();
        repo.clear(alice).await.unwrap();
        assert!(repo.list_ids(alice).await.unwrap().is_empty());
        assert_eq!(repo.list_ids(bob).await.unwrap(), vec![2]);
    }
}
