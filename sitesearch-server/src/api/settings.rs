use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use sitesearch_core::config::ConfigError;

use super::{log_api_issue, ApiError, ErrorResponse};
use crate::config::setting_value_string;
use crate::state::AppState;

const TARGET: &str = "sitesearch.api.settings";

#[derive(Deserialize)]
pub struct UpdateSettingBody {
    /// `null` removes the entry, restoring its default.
    #[serde(default)]
    value: serde_json::Value,
}

fn setting_error(status: StatusCode, error: String) -> ApiError {
    log_api_issue(status, TARGET, &error);
    (status, Json(ErrorResponse { error }))
}

fn store_error(key: &str, err: ConfigError) -> ApiError {
    setting_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Failed to update {}: {}", key, err),
    )
}

pub async fn list_settings(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "settings": state.config.entries() }))
}

pub async fn update_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(body): Json<UpdateSettingBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(setting_error(
            StatusCode::BAD_REQUEST,
            "Setting key must not be empty".to_string(),
        ));
    }

    if body.value.is_null() {
        state.config.remove(key).map_err(|e| store_error(key, e))?;
        log::info!(target: TARGET, "Cleared setting {}", key);
    } else {
        let value = setting_value_string(&body.value);
        state
            .config
            .set(key, value.as_str())
            .map_err(|e| store_error(key, e))?;
        log::info!(target: TARGET, "Set {} = {}", key, value);
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "settings": state.config.entries(),
    })))
}
