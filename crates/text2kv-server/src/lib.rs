pub mod auth;
pub mod decode;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod query;
pub mod response;
pub mod routes;
pub mod server;
pub mod store;

use std::sync::Arc;

/// Shared application state threaded through axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no key-value backend is bound; every request then fails.
    pub store: Option<store::ContentStore>,
    /// Shared token every request must present.
    pub secret: Arc<str>,
}

impl AppState {
    pub fn new(secret: &str, store: Option<store::ContentStore>) -> Self {
        Self {
            store,
            secret: Arc::from(secret),
        }
    }
}

pub use server::{
    read_token_file, resolve_data_dir, resolve_token, router, run, BackendKind, ServerConfig,
};
