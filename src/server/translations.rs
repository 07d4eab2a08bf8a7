use axum::Json;
use axum::extract::{Path, State};
use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;

use super::{ApiError, AppState, Credentials};
use crate::data_connection::models::{BatchInput, TranslationEntry};
use crate::login::LoginGrant;

/// Body of a mutating translation request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
    #[serde(default)]
    pub data: Option<Value>,
}

async fn authorize(state: &AppState, credentials: &Credentials) -> Result<LoginGrant, ApiError> {
    state
        .login
        .validate(&credentials.user, &credentials.pass)
        .await
        .map_err(|e| ApiError::unauthorized(&credentials.user, e))
}

/// `GET /translations/{term}`
pub async fn search(
    State(state): State<AppState>,
    Path(term): Path<String>,
) -> Result<Json<Vec<TranslationEntry>>, ApiError> {
    debug!("Search request for '{}'", term);
    let found = state.data.search_translation(&term).await?;
    Ok(Json(found))
}

/// `POST /translations`
pub async fn update(
    State(state): State<AppState>,
    Json(request): Json<ChangeRequest>,
) -> Result<Json<Vec<TranslationEntry>>, ApiError> {
    let grant = authorize(&state, &request.credentials).await?;

    let input = BatchInput::from_optional(request.data);
    info!("User '{}' submitted a {} translation batch", grant.user, input.shape());
    let entries = state.data.update_translation(input).combined().await;
    Ok(Json(entries))
}

/// `DELETE /translations`
pub async fn delete(
    State(state): State<AppState>,
    Json(request): Json<ChangeRequest>,
) -> Result<Json<Vec<TranslationEntry>>, ApiError> {
    let grant = authorize(&state, &request.credentials).await?;

    let input = BatchInput::from_optional(request.data);
    info!("User '{}' requested deletion of {} input", grant.user, input.shape());
    let deleted = state.data.delete_translation(input).await?;
    Ok(Json(deleted))
}
