// handlers/public/dashboard.rs - GET <kind>/dashboard/:unitId/:year/:month

use axum::extract::{Path, State};
use axum::Extension;

use crate::database::models::ReportKind;
use crate::handlers::{parse_month, parse_path_int};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{unit_dashboard, DashboardPayload};
use crate::state::AppState;

/// Daily series, monthly history and month-to-date total for one unit.
/// The report kind comes from the route the handler is mounted under.
pub async fn dashboard_get(
    State(state): State<AppState>,
    Extension(kind): Extension<&'static ReportKind>,
    Path((unit_id, year, month)): Path<(String, String, String)>,
) -> ApiResult<DashboardPayload> {
    let unit_id = parse_path_int::<i32>(&unit_id, "unitId")?;
    let year = parse_path_int::<i32>(&year, "year")?;
    let month = parse_month(&month)?;

    let payload = unit_dashboard(&state.reports(kind), unit_id, year, month).await?;
    Ok(ApiResponse::success(payload))
}
