use axum::Json;
use axum::extract::State;

use super::{ApiError, AppState, Credentials};
use crate::login::LoginGrant;

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<LoginGrant>, ApiError> {
    let grant = state
        .login
        .validate(&credentials.user, &credentials.pass)
        .await
        .map_err(|e| ApiError::unauthorized(&credentials.user, e))?;
    Ok(Json(grant))
}
