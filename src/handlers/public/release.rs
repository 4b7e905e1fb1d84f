// handlers/public/release.rs - Monthly release charts per production group
//
// GET /api/produksi/pabrik/rilis/:year
// GET /api/produksi/bks/rilis/:year
// GET /api/packing-plant/rilis/:year

use axum::extract::{Path, State};
use axum::Extension;
use serde_json::Value;

use crate::database::models::ReleaseSeries;
use crate::handlers::parse_path_int;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::monthly_release;
use crate::state::AppState;

/// One row per month with data: `{month, monthLabel, <nama_unit>: total}`
pub async fn release_get(
    State(state): State<AppState>,
    Extension(series): Extension<&'static ReleaseSeries>,
    Path(year): Path<String>,
) -> ApiResult<Vec<Value>> {
    let year = parse_path_int::<i32>(&year, "year")?;
    let rows = monthly_release(&state.pool, series, year).await?;
    Ok(ApiResponse::success(rows))
}
