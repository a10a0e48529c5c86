//! Client-side core: the session state machine and the favorites
//! coordinator that decides whether favorites live in local storage or on
//! the server, and keeps the two consistent across login/logout.

pub mod api;
pub mod coordinator;
pub mod local;
pub mod remote;
pub mod session;
pub mod token_store;

use thiserror::Error;

/// Errors surfaced by the client API layer, keyed by the server's response.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("service unavailable: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Upstream(e.to_string())
    }
}
