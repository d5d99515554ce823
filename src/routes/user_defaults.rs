use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    models::user_default::{UpdateUserDefault, UserDefault},
    services::user_defaults::UserDefaultService,
    AppState,
};

fn user_id_from(path: Result<Path<i32>, PathRejection>) -> Result<i32, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::bad_request("Invalid user_id. Must be an integer."))
}

/// GET /api/user-defaults/{user_id}
pub async fn get_user_defaults(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vec<UserDefault>>, ApiError> {
    let user_id = user_id_from(path)?;
    let defaults = UserDefaultService::list(state.store.as_ref(), user_id).await?;
    Ok(Json(defaults))
}

/// PUT /api/user-defaults/{user_id}
pub async fn update_user_defaults(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<Vec<UpdateUserDefault>>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let user_id = user_id_from(path)?;
    let Json(rows) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    UserDefaultService::update(state.store.as_ref(), user_id, &rows).await?;
    Ok(Json(json!({ "message": "User defaults updated" })))
}
