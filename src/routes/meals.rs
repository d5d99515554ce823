use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    models::meal::{MealReportQuery, MealUpdate, Report},
    services::meals::{MealService, ReportRange},
    AppState,
};

/// GET /api/meals?date=YYYY-MM-DD&days=N
pub async fn get_meals(
    State(state): State<AppState>,
    query: Result<Query<MealReportQuery>, QueryRejection>,
) -> Result<Json<Report>, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let range = ReportRange::parse(&params, state.config.report_max_days)?;
    let report = MealService::report(state.store.as_ref(), range).await?;
    Ok(Json(report))
}

/// PUT /api/meals/bulk-update — all-or-nothing.
pub async fn bulk_update_meals(
    State(state): State<AppState>,
    body: Result<Json<Vec<MealUpdate>>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(updates) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    MealService::bulk_update(state.store.as_ref(), &updates).await?;
    Ok(Json(json!({ "message": "Meals updated" })))
}
