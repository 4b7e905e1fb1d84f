use chrono::NaiveDate;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{ReleaseSeries, Unit, UnitMonthTotal, User};

/// Look up a login account by username
pub async fn find_user_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password, role, allowed_groups
         FROM users
         WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::query("lookup", "users"))?;

    Ok(user)
}

/// All units with their production group name
pub async fn list_units(pool: &PgPool) -> Result<Vec<Unit>, DatabaseError> {
    let units = sqlx::query_as::<_, Unit>(
        "SELECT uk.id_unit, uk.nama_unit, pg.group_name
         FROM unit_kerja uk
         JOIN production_group pg ON uk.group_id = pg.group_id
         ORDER BY uk.id_unit",
    )
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::query("list", "unit_kerja"))?;

    Ok(units)
}

/// Production group name owning a unit
pub async fn find_unit_group(pool: &PgPool, unit_id: i32) -> Result<Option<String>, DatabaseError> {
    let group = sqlx::query_scalar::<_, String>(
        "SELECT pg.group_name
         FROM unit_kerja uk
         JOIN production_group pg ON uk.group_id = pg.group_id
         WHERE uk.id_unit = $1",
    )
    .bind(unit_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::query("lookup group", "unit_kerja"))?;

    Ok(group)
}

/// Per (unit, month) totals of a release series within [from, to), ascending by month
pub async fn release_totals(
    pool: &PgPool,
    series: &ReleaseSeries,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<UnitMonthTotal>, DatabaseError> {
    let sql = format!(
        "SELECT uk.nama_unit,
                EXTRACT(MONTH FROM r.tanggal)::int AS month,
                COALESCE(SUM(r.{metric}), 0)::float8 AS total
         FROM {table} r
         JOIN unit_kerja uk ON r.id_unit = uk.id_unit
         JOIN production_group pg ON uk.group_id = pg.group_id
         WHERE pg.group_name = $1 AND r.tanggal >= $2 AND r.tanggal < $3
         GROUP BY uk.nama_unit, 2
         ORDER BY 2 ASC, uk.nama_unit ASC",
        metric = series.metric,
        table = series.kind.table
    );

    let rows = sqlx::query_as::<_, UnitMonthTotal>(&sql)
        .bind(series.group_name)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::query("release totals", series.kind.table))?;

    Ok(rows)
}
