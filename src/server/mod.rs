/*!
 * HTTP surface of the backend.
 *
 * Routes:
 * - `GET /translations/{term}`: containment search
 * - `POST /translations`: create and update a batch (login required)
 * - `DELETE /translations`: delete one entry or a list (login required)
 * - `GET /languages`, `GET /languages/{lang}`: UI language catalog
 * - `POST /login`: credential check
 */

pub mod error;
pub mod languages;
pub mod login;
pub mod translations;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use log::info;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::data_connection::DataConnection;
use crate::languages::LanguageCatalog;
use crate::login::LoginValidator;

pub use error::ApiError;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub data: DataConnection,
    pub login: Arc<dyn LoginValidator>,
    pub catalog: Arc<LanguageCatalog>,
}

impl AppState {
    pub fn new(
        data: DataConnection,
        login: Arc<dyn LoginValidator>,
        catalog: LanguageCatalog,
    ) -> Self {
        Self {
            data,
            login,
            catalog: Arc::new(catalog),
        }
    }
}

/// Credentials as sent by clients
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pass: String,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/translations/{term}", get(translations::search))
        .route(
            "/translations",
            post(translations::update).delete(translations::delete),
        )
        .route("/languages", get(languages::supported))
        .route("/languages/{lang}", get(languages::messages))
        .route("/login", post(login::login))
        .with_state(state)
}

/// Serve requests on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .context("Failed to read listener address")?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    info!("HTTP server stopped");
    Ok(())
}
