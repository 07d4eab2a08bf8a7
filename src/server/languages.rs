use axum::Json;
use axum::extract::{Path, State};
use std::collections::BTreeMap;

use super::{ApiError, AppState};
use crate::languages::{LanguageInfo, MessageTable};

/// `GET /languages`
pub async fn supported(State(state): State<AppState>) -> Json<BTreeMap<String, LanguageInfo>> {
    Json(state.catalog.supported_languages().clone())
}

/// `GET /languages/{lang}`
pub async fn messages(
    State(state): State<AppState>,
    Path(lang): Path<String>,
) -> Result<Json<MessageTable>, ApiError> {
    let table = state.catalog.messages(&lang)?;
    Ok(Json(table.clone()))
}
