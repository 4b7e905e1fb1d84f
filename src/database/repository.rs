use chrono::NaiveDate;
use serde_json::Value;
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::database::manager::{is_unique_violation, DatabaseError};
use crate::database::models::{ReportKind, ReportPayload};

/// CRUD and dashboard reads over one report table, driven by its `ReportKind`
#[derive(Clone)]
pub struct ReportRepository {
    kind: &'static ReportKind,
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(kind: &'static ReportKind, pool: PgPool) -> Self {
        Self { kind, pool }
    }

    pub fn kind(&self) -> &'static ReportKind {
        self.kind
    }

    /// Insert a report and return its id. Duplicate (tanggal, id_unit) is a conflict.
    pub async fn create(&self, payload: &ReportPayload) -> Result<i64, DatabaseError> {
        let sql = insert_sql(self.kind);

        let mut q = sqlx::query(&sql).bind(payload.tanggal).bind(payload.id_unit);
        for value in &payload.values {
            q = q.bind(*value);
        }

        match q.fetch_one(&self.pool).await {
            Ok(row) => Ok(row.try_get::<i64, _>("id_laporan")?),
            Err(e) if is_unique_violation(&e) => Err(DatabaseError::Conflict(format!(
                "{} report for this date and unit already exists",
                self.kind.label
            ))),
            Err(e) => Err(DatabaseError::query("insert", self.kind.table)(e)),
        }
    }

    /// Every row with its unit name, newest first
    pub async fn list_all(&self) -> Result<Vec<Value>, DatabaseError> {
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (\
                SELECT r.*, uk.nama_unit FROM {table} r \
                LEFT JOIN unit_kerja uk ON r.id_unit = uk.id_unit\
             ) t ORDER BY t.tanggal DESC, t.id_laporan DESC",
            table = self.kind.table
        );

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::query("list", self.kind.table))?;

        json_rows(rows)
    }

    /// Replace all mutable fields of one report
    pub async fn update(&self, id: i64, payload: &ReportPayload) -> Result<(), DatabaseError> {
        let sql = update_sql(self.kind);

        let mut q = sqlx::query(&sql).bind(payload.tanggal).bind(payload.id_unit);
        for value in &payload.values {
            q = q.bind(*value);
        }
        q = q.bind(id);

        match q.execute(&self.pool).await {
            Ok(result) if result.rows_affected() == 0 => Err(self.not_found()),
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(DatabaseError::Conflict(format!(
                "Another {} report already exists for this date and unit",
                self.kind.label
            ))),
            Err(e) => Err(DatabaseError::query("update", self.kind.table)(e)),
        }
    }

    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id_laporan = $1", self.kind.table);

        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::query("delete", self.kind.table))?;

        if result.rows_affected() == 0 {
            return Err(self.not_found());
        }
        Ok(())
    }

    /// Unit owning an existing report, if the report exists
    pub async fn unit_of(&self, id: i64) -> Result<Option<i32>, DatabaseError> {
        let sql = format!("SELECT id_unit FROM {} WHERE id_laporan = $1", self.kind.table);

        let unit = sqlx::query_scalar::<_, i32>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::query("lookup unit", self.kind.table))?;

        Ok(unit)
    }

    /// Daily series for one unit within [from, to), ascending by date
    pub async fn daily_rows(
        &self,
        unit_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Value>, DatabaseError> {
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (\
                SELECT {columns} FROM {table} \
                WHERE id_unit = $1 AND tanggal >= $2 AND tanggal < $3\
             ) t ORDER BY t.tanggal ASC",
            columns = self.kind.daily_columns,
            table = self.kind.table
        );

        let rows = sqlx::query(&sql)
            .bind(unit_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::query("daily series", self.kind.table))?;

        json_rows(rows)
    }

    /// Sum of each downtime column within [from, to); None for kinds without downtime
    pub async fn downtime_summary(
        &self,
        unit_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Option<Value>, DatabaseError> {
        if self.kind.downtime_fields.is_empty() {
            return Ok(None);
        }

        let sums = self
            .kind
            .downtime_fields
            .iter()
            .map(|f| format!("COALESCE(SUM({f}), 0)::float8 AS {f}"))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (\
                SELECT {sums} FROM {table} \
                WHERE id_unit = $1 AND tanggal >= $2 AND tanggal < $3\
             ) t",
            table = self.kind.table
        );

        let row = sqlx::query(&sql)
            .bind(unit_id)
            .bind(from)
            .bind(to)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::query("downtime summary", self.kind.table))?;

        match row {
            Some(row) => Ok(Some(row.try_get::<Value, _>("row")?)),
            None => Ok(Some(Value::Object(Default::default()))),
        }
    }

    /// Latest 12 months with data for the unit, newest first
    pub async fn monthly_rows_desc(&self, unit_id: i32) -> Result<Vec<Value>, DatabaseError> {
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (\
                SELECT EXTRACT(YEAR FROM tanggal)::int AS year, \
                       EXTRACT(MONTH FROM tanggal)::int AS month, \
                       {aggregates} \
                FROM {table} WHERE id_unit = $1 \
                GROUP BY 1, 2 ORDER BY 1 DESC, 2 DESC LIMIT 12\
             ) t ORDER BY t.year DESC, t.month DESC",
            aggregates = self.kind.monthly_aggregates,
            table = self.kind.table
        );

        let rows = sqlx::query(&sql)
            .bind(unit_id)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::query("monthly series", self.kind.table))?;

        json_rows(rows)
    }

    /// Month-to-date total of the kind's tonnage column within [from, to)
    pub async fn month_total(
        &self,
        unit_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<f64, DatabaseError> {
        let sql = format!(
            "SELECT COALESCE(SUM({field}), 0)::float8 FROM {table} \
             WHERE id_unit = $1 AND tanggal >= $2 AND tanggal < $3",
            field = self.kind.mtd_field,
            table = self.kind.table
        );

        let total = sqlx::query_scalar::<_, f64>(&sql)
            .bind(unit_id)
            .bind(from)
            .bind(to)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::query("month total", self.kind.table))?;

        Ok(total)
    }

    fn not_found(&self) -> DatabaseError {
        DatabaseError::NotFound(format!("{} report not found", self.kind.label))
    }
}

fn json_rows(rows: Vec<PgRow>) -> Result<Vec<Value>, DatabaseError> {
    rows.iter()
        .map(|row| row.try_get::<Value, _>("row").map_err(DatabaseError::from))
        .collect()
}

fn insert_sql(kind: &ReportKind) -> String {
    let columns = kind.fields.join(", ");
    let placeholders = (1..=kind.fields.len() + 2)
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} (tanggal, id_unit, {}) VALUES ({}) RETURNING id_laporan",
        kind.table, columns, placeholders
    )
}

fn update_sql(kind: &ReportKind) -> String {
    let assignments = ["tanggal", "id_unit"]
        .iter()
        .chain(kind.fields.iter())
        .enumerate()
        .map(|(i, column)| format!("{} = ${}", column, i + 1))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "UPDATE {} SET {} WHERE id_laporan = ${}",
        kind.table,
        assignments,
        kind.fields.len() + 3
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::report::{DAILY, PEMUATAN};

    #[test]
    fn insert_binds_every_column_once() {
        assert_eq!(
            insert_sql(&PEMUATAN),
            "INSERT INTO laporan_pemuatan (tanggal, id_unit, jam_muat, ton_muat, target) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id_laporan"
        );
    }

    #[test]
    fn update_puts_id_last() {
        assert_eq!(
            update_sql(&PEMUATAN),
            "UPDATE laporan_pemuatan SET tanggal = $1, id_unit = $2, jam_muat = $3, \
             ton_muat = $4, target = $5 WHERE id_laporan = $6"
        );

        let sql = update_sql(&DAILY);
        assert!(sql.contains("h_pmc = $11"));
        assert!(sql.ends_with("WHERE id_laporan = $12"));
    }
}
