use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::config::CatalogConfig;

use super::dto::{MovieDetails, MoviePage};

const RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("movie not found")]
    NotFound,
    #[error("catalog request failed: {0}")]
    Upstream(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Trending,
    Popular,
    TopRated,
    NowPlaying,
}

impl Category {
    /// Unknown category names fall back to trending, matching the listing
    /// route's default.
    pub fn from_query(s: &str) -> Self {
        match s {
            "popular" => Category::Popular,
            "top_rated" => Category::TopRated,
            "now_playing" => Category::NowPlaying,
            _ => Category::Trending,
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            Category::Trending => "/trending/movie/week",
            Category::Popular => "/movie/popular",
            Category::TopRated => "/movie/top_rated",
            Category::NowPlaying => "/movie/now_playing",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ListKind {
    Category(Category),
    Search(String),
    Genre(i64),
}

#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn list(&self, kind: &ListKind, page: u32) -> Result<MoviePage, CatalogError>;
    async fn details(&self, id: i64) -> Result<MovieDetails, CatalogError>;
    async fn similar(&self, id: i64, page: u32) -> Result<MoviePage, CatalogError>;
    async fn recommendations(&self, id: i64, page: u32) -> Result<MoviePage, CatalogError>;
}

/// TMDB-backed catalog client with a bounded timeout and a small retry
/// budget for server-class and transport errors.
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retries: u32,
}

impl TmdbClient {
    pub fn new(cfg: &CatalogConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            retries: cfg.retries,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempts_left = self.retries;
        loop {
            let req = self
                .http
                .get(&url)
                .query(&[("api_key", self.api_key.as_str())])
                .query(&params);
            match req.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return resp
                            .json::<T>()
                            .await
                            .map_err(|e| CatalogError::Upstream(e.to_string()));
                    }
                    if status == StatusCode::NOT_FOUND {
                        return Err(CatalogError::NotFound);
                    }
                    if status.is_server_error() && attempts_left > 0 {
                        attempts_left -= 1;
                        debug!(%status, attempts_left, path, "retrying catalog request");
                        tokio::time::sleep(RETRY_DELAY).await;
                        continue;
                    }
                    return Err(CatalogError::Upstream(format!("catalog returned {status}")));
                }
                Err(e) if (e.is_timeout() || e.is_connect()) && attempts_left > 0 => {
                    attempts_left -= 1;
                    debug!(error = %e, attempts_left, path, "retrying catalog request");
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(e) => return Err(CatalogError::Upstream(e.to_string())),
            }
        }
    }
}

#[async_trait]
impl CatalogClient for TmdbClient {
    async fn list(&self, kind: &ListKind, page: u32) -> Result<MoviePage, CatalogError> {
        let mut params = vec![("page".to_string(), page.to_string())];
        let path = match kind {
            ListKind::Category(c) => c.endpoint().to_string(),
            ListKind::Search(query) => {
                params.push(("query".to_string(), query.clone()));
                params.push(("include_adult".to_string(), "false".to_string()));
                "/search/movie".to_string()
            }
            ListKind::Genre(genre_id) => {
                params.push(("with_genres".to_string(), genre_id.to_string()));
                params.push(("sort_by".to_string(), "popularity.desc".to_string()));
                "/discover/movie".to_string()
            }
        };
        self.get_json(&path, &params).await
    }

    async fn details(&self, id: i64) -> Result<MovieDetails, CatalogError> {
        let params = vec![(
            "append_to_response".to_string(),
            "credits,videos,similar,recommendations".to_string(),
        )];
        self.get_json(&format!("/movie/{id}"), &params).await
    }

    async fn similar(&self, id: i64, page: u32) -> Result<MoviePage, CatalogError> {
        let params = vec![("page".to_string(), page.to_string())];
        self.get_json(&format!("/movie/{id}/similar"), &params).await
    }

    async fn recommendations(&self, id: i64, page: u32) -> Result<MoviePage, CatalogError> {
        let params = vec![("page".to_string(), page.to_string())];
        self.get_json(&format!("/movie/{id}/recommendations"), &params)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parsing_defaults_to_trending() {
        assert_eq!(Category::from_query("popular"), Category::Popular);
        assert_eq!(Category::from_query("top_rated"), Category::TopRated);
        assert_eq!(Category::from_query("now_playing"), Category::NowPlaying);
        assert_eq!(Category::from_query("trending"), Category::Trending);
        assert_eq!(Category::from_query("anything-else"), Category::Trending);
    }

    #[test]
    fn category_endpoints() {
        assert_eq!(Category::Trending.endpoint(), "/trending/movie/week");
        assert_eq!(Category::NowPlaying.endpoint(), "/movie/now_playing");
    }
}
