use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::models::ReportKind;
use crate::database::{service, DatabaseError, ReportRepository};
use crate::error::ApiError;

use super::auth::AuthUser;

/// Lookups the edit guard needs to resolve a target's production group
#[async_trait]
pub trait UnitDirectory: Send + Sync {
    /// Unit owning an existing report row of `kind`
    async fn report_unit(&self, kind: &'static ReportKind, report_id: i64) -> Result<Option<i32>, DatabaseError>;

    /// Production group name of a unit
    async fn unit_group(&self, unit_id: i32) -> Result<Option<String>, DatabaseError>;
}

/// Directory backed by the report and unit tables
pub struct PgUnitDirectory {
    pool: PgPool,
}

impl PgUnitDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitDirectory for PgUnitDirectory {
    async fn report_unit(&self, kind: &'static ReportKind, report_id: i64) -> Result<Option<i32>, DatabaseError> {
        ReportRepository::new(kind, self.pool.clone()).unit_of(report_id).await
    }

    async fn unit_group(&self, unit_id: i32) -> Result<Option<String>, DatabaseError> {
        service::find_unit_group(&self.pool, unit_id).await
    }
}

/// What a write request targets
#[derive(Debug, Clone, Copy)]
pub struct EditTarget {
    pub kind: &'static ReportKind,
    /// `id_unit` from the request body, when present
    pub unit_id: Option<i32>,
    /// Report id from the path (update/delete)
    pub report_id: Option<i64>,
}

/// Group-scoped write authorization.
///
/// Superusers pass. Entry admins pass only when the target unit belongs to one
/// of their allowed groups. Every other role is refused. A lookup failure is
/// treated as an unresolved unit, which never authorizes.
pub async fn require_edit_permission(
    user: &AuthUser,
    target: EditTarget,
    directory: &dyn UnitDirectory,
) -> Result<(), ApiError> {
    let caps = user.role.capabilities();

    if caps.can_bypass_group_scope {
        return Ok(());
    }

    if !caps.can_write_own_group {
        tracing::warn!("User '{}' ({}) denied write on {}", user.username, user.role, target.kind.table);
        return Err(ApiError::forbidden("Access denied: role is not permitted to enter data"));
    }

    let unit_id = match (target.unit_id, target.report_id) {
        (Some(unit_id), _) => Some(unit_id),
        (None, Some(report_id)) => match directory.report_unit(target.kind, report_id).await {
            Ok(unit_id) => unit_id,
            Err(e) => {
                tracing::error!(
                    "Unit lookup for report {} in {} failed: {}",
                    report_id,
                    target.kind.table,
                    e
                );
                None
            }
        },
        (None, None) => None,
    };

    let unit_id = match unit_id {
        Some(unit_id) if !user.allowed_groups.is_empty() => unit_id,
        _ => return Err(ApiError::bad_request("Incomplete payload: unit or group permission missing")),
    };

    let group = match directory.unit_group(unit_id).await {
        Ok(group) => group,
        Err(e) => {
            tracing::error!("Group lookup for unit {} failed: {}", unit_id, e);
            None
        }
    };

    let Some(group) = group else {
        return Err(ApiError::bad_request("Invalid or unregistered unit"));
    };

    if user.allowed_groups.contains(&group) {
        tracing::debug!("User '{}' may write unit {} in group '{}'", user.username, unit_id, group);
        return Ok(());
    }

    tracing::warn!(
        "User '{}' denied write on unit {} (group '{}')",
        user.username,
        unit_id,
        group
    );
    let allowed = user.allowed_groups.iter().cloned().collect::<Vec<_>>().join(", ");
    Err(ApiError::forbidden(format!(
        "Access denied: user may only enter data for groups: {}",
        allowed
    )))
}
