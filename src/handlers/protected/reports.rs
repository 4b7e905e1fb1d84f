// handlers/protected/reports.rs - Report CRUD shared by all four report kinds
//
// GET    <prefix>/all   list every row (admin roles)
// POST   <prefix>       create
// PUT    <prefix>/:id   replace
// DELETE <prefix>/:id   delete

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::database::models::report::unit_id_from;
use crate::database::models::{ReportKind, ReportPayload};
use crate::handlers::parse_path_int;
use crate::middleware::{
    require_edit_permission, ApiResponse, ApiResult, AuthUser, EditTarget, MessageBody, PgUnitDirectory,
};
use crate::state::AppState;

pub async fn list_all(
    State(state): State<AppState>,
    Extension(kind): Extension<&'static ReportKind>,
) -> ApiResult<Vec<Value>> {
    let rows = state.reports(kind).list_all().await?;
    Ok(ApiResponse::success(rows))
}

/// A malformed `id_unit` is left to payload validation so the role check runs first
pub async fn create(
    State(state): State<AppState>,
    Extension(kind): Extension<&'static ReportKind>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<MessageBody> {
    let Json(body) = body?;

    let target = EditTarget {
        kind,
        unit_id: unit_id_from(body.get("id_unit")).ok().flatten(),
        report_id: None,
    };
    require_edit_permission(&user, target, &PgUnitDirectory::new(state.pool.clone())).await?;

    let payload = ReportPayload::from_json(kind, &body)?;
    let id = state.reports(kind).create(&payload).await?;

    tracing::info!(
        "User '{}' created {} report {} (unit {}, {})",
        user.username,
        kind.table,
        id,
        payload.id_unit,
        payload.tanggal
    );

    Ok(ApiResponse::created(MessageBody::with_id(
        format!("{} report saved", kind.label),
        id,
    )))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(kind): Extension<&'static ReportKind>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<MessageBody> {
    let id = parse_path_int::<i64>(&id, "id")?;
    let Json(body) = body?;

    let target = EditTarget {
        kind,
        unit_id: unit_id_from(body.get("id_unit")).ok().flatten(),
        report_id: Some(id),
    };
    require_edit_permission(&user, target, &PgUnitDirectory::new(state.pool.clone())).await?;

    let payload = ReportPayload::from_json(kind, &body)?;
    state.reports(kind).update(id, &payload).await?;

    tracing::info!("User '{}' updated {} report {}", user.username, kind.table, id);

    Ok(ApiResponse::success(MessageBody::new(format!(
        "{} report updated",
        kind.label
    ))))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(kind): Extension<&'static ReportKind>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<MessageBody> {
    let id = parse_path_int::<i64>(&id, "id")?;

    let target = EditTarget {
        kind,
        unit_id: None,
        report_id: Some(id),
    };
    require_edit_permission(&user, target, &PgUnitDirectory::new(state.pool.clone())).await?;

    state.reports(kind).delete(id).await?;

    tracing::info!("User '{}' deleted {} report {}", user.username, kind.table, id);

    Ok(ApiResponse::success(MessageBody::new(format!(
        "{} report deleted",
        kind.label
    ))))
}
