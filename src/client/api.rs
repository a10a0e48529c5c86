use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::auth::dto::{AuthResponse, UserProfile};
use crate::favorites::dto::FavoritesResponse;
use crate::movies::dto::Movie;

use super::ClientError;

/// Auth Service seam.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError>;
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError>;
    async fn whoami(&self, token: &str) -> Result<UserProfile, ClientError>;
}

/// Favorites Service seam (server side of the remote store).
#[async_trait]
pub trait FavoritesApi: Send + Sync {
    async fn list_ids(&self, token: &str) -> Result<Vec<i64>, ClientError>;
    async fn add(&self, token: &str, movie_id: i64) -> Result<(), ClientError>;
    async fn remove(&self, token: &str, movie_id: i64) -> Result<(), ClientError>;
    async fn clear(&self, token: &str) -> Result<(), ClientError>;
}

/// Catalog lookup used to rehydrate favorite ids into full records.
#[async_trait]
pub trait MovieLookup: Send + Sync {
    async fn movie_by_id(&self, id: i64) -> Result<Movie, ClientError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

async fn error_from(resp: reqwest::Response) -> ClientError {
    let status = resp.status();
    let message = resp
        .json::<ErrorBody>()
        .await
        .map(|b| b.message)
        .unwrap_or_else(|_| status.to_string());
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Auth(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        s if s.is_client_error() => ClientError::Validation(message),
        _ => ClientError::Upstream(message),
    }
}

async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    if resp.status().is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ClientError::Upstream(e.to_string()))
    } else {
        Err(error_from(resp).await)
    }
}

async fn expect_ok(resp: reqwest::Response) -> Result<(), ClientError> {
    if resp.status().is_success() {
        Ok(())
    } else {
        Err(error_from(resp).await)
    }
}

/// HTTP implementation of all three seams against the app's `/api` routes.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        parse_json(resp).await
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/auth/register"))
            .json(&serde_json::json!({ "name": name, "email": email, "password": password }))
            .send()
            .await?;
        parse_json(resp).await
    }

    async fn whoami(&self, token: &str) -> Result<UserProfile, ClientError> {
        let resp = self
            .http
            .get(self.url("/api/auth/me"))
            .bearer_auth(token)
            .send()
            .await?;
        parse_json(resp).await
    }
}

#[async_trait]
impl FavoritesApi for ApiClient {
    async fn list_ids(&self, token: &str) -> Result<Vec<i64>, ClientError> {
        let resp = self
            .http
            .get(self.url("/api/favorites"))
            .bearer_auth(token)
            .send()
            .await?;
        let body: FavoritesResponse = parse_json(resp).await?;
        Ok(body.favorites)
    }

    async fn add(&self, token: &str, movie_id: i64) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.url("/api/favorites"))
            .bearer_auth(token)
            .json(&serde_json::json!({ "movie_id": movie_id, "action": "add" }))
            .send()
            .await?;
        expect_ok(resp).await
    }

    async fn remove(&self, token: &str, movie_id: i64) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.url("/api/favorites"))
            .bearer_auth(token)
            .json(&serde_json::json!({ "movie_id": movie_id, "action": "remove" }))
            .send()
            .await?;
        expect_ok(resp).await
    }

    async fn clear(&self, token: &str) -> Result<(), ClientError> {
        let resp = self
            .http
            .delete(self.url("/api/favorites"))
            .bearer_auth(token)
            .send()
            .await?;
        expect_ok(resp).await
    }
}

#[async_trait]
impl MovieLookup for ApiClient {
    async fn movie_by_id(&self, id: i64) -> Result<Movie, ClientError> {
        let resp = self
            .http
            .get(self.url(&format!("/api/movies/{id}")))
            .send()
            .await?;
        // detail responses carry extra sections; the base record fields are
        // all the coordinator stores
        parse_json(resp).await
    }
}
