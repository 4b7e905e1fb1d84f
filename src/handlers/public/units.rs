// handlers/public/units.rs - GET /api/units

use axum::extract::State;

use crate::database::models::Unit;
use crate::database::service;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/units - Every unit with its production group
pub async fn units_get(State(state): State<AppState>) -> ApiResult<Vec<Unit>> {
    let units = service::list_units(&state.pool).await?;
    Ok(ApiResponse::success(units))
}
