pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod favorites;
pub mod movies;
pub mod state;
