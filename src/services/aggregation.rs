use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::PgPool;
use std::collections::BTreeMap;

use crate::database::manager::DatabaseError;
use crate::database::models::{ReleaseSeries, ReportKind, UnitMonthTotal};
use crate::database::{service, ReportRepository};

pub const MONTH_LABELS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MEI", "JUN", "JUL", "AGU", "SEP", "OKT", "NOV", "DES",
];

#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Invalid period: year {year}, month {month}")]
    InvalidPeriod { year: i32, month: u32 },
}

/// Dashboard body for one unit and month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardPayload {
    #[serde(rename = "dailyReport")]
    pub daily_report: Vec<Value>,
    #[serde(rename = "hambatanSummary", skip_serializing_if = "Option::is_none")]
    pub hambatan_summary: Option<Value>,
    #[serde(rename = "monthlyReport")]
    pub monthly_report: Vec<Value>,
    #[serde(rename = "totalProductionMTD")]
    pub total_production_mtd: f64,
}

pub fn month_label(month: i32) -> Option<&'static str> {
    usize::try_from(month - 1).ok().and_then(|i| MONTH_LABELS.get(i)).copied()
}

/// Half-open date range `[first day of month, first day of next month)`
pub fn month_window(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AggregationError> {
    let invalid = || AggregationError::InvalidPeriod { year, month };

    let from = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let to = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;

    Ok((from, to))
}

/// Half-open date range covering a calendar year
pub fn year_window(year: i32) -> Result<(NaiveDate, NaiveDate), AggregationError> {
    let invalid = || AggregationError::InvalidPeriod { year, month: 1 };
    let from = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
    let to = NaiveDate::from_ymd_opt(year + 1, 1, 1).ok_or_else(invalid)?;
    Ok((from, to))
}

const PIVOT_HEADER_KEYS: [&str; 2] = ["month", "monthLabel"];

/// Pivot (unit, month) totals into one row per month:
/// `{month, monthLabel, <nama_unit>: total, ...}`, ascending by month.
/// A unit with no data in a month has no key in that row. Units named
/// like a header key are dropped so the header stays intact.
pub fn pivot_monthly(totals: Vec<UnitMonthTotal>) -> Vec<Value> {
    let mut by_month: BTreeMap<i32, Map<String, Value>> = BTreeMap::new();

    for total in totals {
        if PIVOT_HEADER_KEYS.contains(&total.nama_unit.as_str()) {
            tracing::warn!("Dropping release total for unit named '{}'", total.nama_unit);
            continue;
        }

        let Some(label) = month_label(total.month) else {
            tracing::warn!("Dropping release total for out-of-range month {}", total.month);
            continue;
        };

        let row = by_month.entry(total.month).or_insert_with(|| {
            let mut row = Map::new();
            row.insert("month".to_string(), Value::from(total.month));
            row.insert("monthLabel".to_string(), Value::from(label));
            row
        });
        row.insert(total.nama_unit, Value::from(total.total));
    }

    by_month.into_values().map(Value::Object).collect()
}

fn as_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Normalise the kind's numeric fields and append its running total.
/// Rows must already be in date order; the total starts at zero.
pub fn apply_running_total(rows: &mut [Value], kind: &ReportKind) {
    let Some(cumulative) = kind.cumulative else {
        return;
    };

    let mut running = 0.0;
    for row in rows.iter_mut() {
        let Some(object) = row.as_object_mut() else {
            continue;
        };

        running += as_number(object.get(cumulative.source));

        for field in kind.numeric_fields {
            let value = as_number(object.get(*field));
            object.insert(field.to_string(), Value::from(value));
        }
        object.insert(cumulative.target.to_string(), Value::from(running));
    }
}

/// Monthly rows arrive newest-first from the 12-month window
fn oldest_first(mut rows: Vec<Value>) -> Vec<Value> {
    rows.reverse();
    rows
}

/// Build the dashboard for one unit and month of a report kind
pub async fn unit_dashboard(
    repo: &ReportRepository,
    unit_id: i32,
    year: i32,
    month: u32,
) -> Result<DashboardPayload, AggregationError> {
    let (from, to) = month_window(year, month)?;

    let (mut daily_report, hambatan_summary, monthly_report, total_production_mtd) = tokio::try_join!(
        repo.daily_rows(unit_id, from, to),
        repo.downtime_summary(unit_id, from, to),
        repo.monthly_rows_desc(unit_id),
        repo.month_total(unit_id, from, to),
    )?;

    apply_running_total(&mut daily_report, repo.kind());
    let monthly_report = oldest_first(monthly_report);

    tracing::debug!(
        "Dashboard {} unit {} {}-{:02}: {} daily rows, {} months",
        repo.kind().table,
        unit_id,
        year,
        month,
        daily_report.len(),
        monthly_report.len()
    );

    Ok(DashboardPayload {
        daily_report,
        hambatan_summary,
        monthly_report,
        total_production_mtd,
    })
}

/// Monthly release chart for a production group and year
pub async fn monthly_release(
    pool: &PgPool,
    series: &ReleaseSeries,
    year: i32,
) -> Result<Vec<Value>, AggregationError> {
    let (from, to) = year_window(year)?;
    let totals = service::release_totals(pool, series, from, to).await?;
    Ok(pivot_monthly(totals))
}
