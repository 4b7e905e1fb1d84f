use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

/// Running total appended to each dashboard row, in date order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cumulative {
    /// Column summed row by row
    pub source: &'static str,
    /// Output field carrying the running total
    pub target: &'static str,
}

/// Static descriptor for one report table.
///
/// All four report kinds share the same CRUD and dashboard code paths; they
/// differ only in the columns listed here. Every string is a compile-time
/// constant and is interpolated into SQL, so nothing here may come from a
/// request.
#[derive(Debug, PartialEq)]
pub struct ReportKind {
    /// Human-readable name used in messages
    pub label: &'static str,
    pub table: &'static str,
    /// Mutable metric columns, in insert/update order (after tanggal, id_unit)
    pub fields: &'static [&'static str],
    /// Select list for the dashboard daily series
    pub daily_columns: &'static str,
    /// Aggregate select list for the 12-month series (year/month are added)
    pub monthly_aggregates: &'static str,
    /// Column summed for the month-to-date total
    pub mtd_field: &'static str,
    pub cumulative: Option<Cumulative>,
    /// Daily fields coerced to numbers (null -> 0) when a running total is computed
    pub numeric_fields: &'static [&'static str],
    /// Downtime columns summarised per month; empty when the kind has none
    pub downtime_fields: &'static [&'static str],
}

pub const DOWNTIME_FIELDS: &[&str] = &[
    "h_proses",
    "h_listrik",
    "h_mekanik",
    "h_operator",
    "h_hujan",
    "h_kapal",
    "h_pmc",
];

pub static DAILY: ReportKind = ReportKind {
    label: "Produksi",
    table: "laporan_harian",
    fields: &[
        "produksi_ton",
        "jam_operasi",
        "h_proses",
        "h_listrik",
        "h_mekanik",
        "h_operator",
        "h_hujan",
        "h_kapal",
        "h_pmc",
    ],
    daily_columns: "tanggal, produksi_ton, jam_operasi, total_hambatan, 900 AS target",
    monthly_aggregates: "COALESCE(SUM(produksi_ton), 0)::float8 AS total_produksi_ton, 26350 AS target_bulanan",
    mtd_field: "produksi_ton",
    cumulative: None,
    numeric_fields: &[],
    downtime_fields: DOWNTIME_FIELDS,
};

pub static PENJUMBOAN: ReportKind = ReportKind {
    label: "Penjumboan",
    table: "laporan_penjumboan",
    fields: &["shift_1_ton", "shift_2_ton", "shift_3_ton", "target"],
    daily_columns: "tanggal, shift_1_ton, shift_2_ton, shift_3_ton, total_produksi, target",
    monthly_aggregates: "COALESCE(SUM(total_produksi), 0)::float8 AS total_produksi_ton, \
                         COALESCE(SUM(target), 0)::float8 AS total_target_bulanan",
    mtd_field: "total_produksi",
    cumulative: None,
    numeric_fields: &[],
    downtime_fields: &[],
};

pub static PEMUATAN: ReportKind = ReportKind {
    label: "Pemuatan",
    table: "laporan_pemuatan",
    fields: &["jam_muat", "ton_muat", "target"],
    daily_columns: "tanggal, jam_muat, ton_muat, target",
    monthly_aggregates: "COALESCE(SUM(ton_muat), 0)::float8 AS total_ton_muat, \
                         COALESCE(SUM(target), 0)::float8 AS total_target_bulanan",
    mtd_field: "ton_muat",
    cumulative: Some(Cumulative { source: "ton_muat", target: "pemuatan_sd" }),
    numeric_fields: &["ton_muat", "target"],
    downtime_fields: &[],
};

pub static PACKING_PLANT: ReportKind = ReportKind {
    label: "Packing Plant",
    table: "laporan_packing_plant",
    fields: &["ton_muat", "target", "target_rkp"],
    daily_columns: "tanggal, ton_muat, target, target_rkp, target_rkp AS target_rkp_daily",
    monthly_aggregates: "COALESCE(SUM(ton_muat), 0)::float8 AS total_produksi, \
                         AVG(target_rkp)::float8 AS target_rkp_bulanan",
    mtd_field: "ton_muat",
    cumulative: Some(Cumulative { source: "ton_muat", target: "pemuatan_sd" }),
    numeric_fields: &["ton_muat", "target", "target_rkp_daily"],
    downtime_fields: &[],
};

/// Group-level monthly release chart: which report table and column feed it
#[derive(Debug, PartialEq)]
pub struct ReleaseSeries {
    pub group_name: &'static str,
    pub kind: &'static ReportKind,
    pub metric: &'static str,
}

pub static PABRIK_RELEASE: ReleaseSeries = ReleaseSeries {
    group_name: "Pabrik",
    kind: &DAILY,
    metric: "produksi_ton",
};

pub static BKS_RELEASE: ReleaseSeries = ReleaseSeries {
    group_name: "BKS",
    kind: &DAILY,
    metric: "produksi_ton",
};

pub static PACKING_PLANT_RELEASE: ReleaseSeries = ReleaseSeries {
    group_name: "Packing Plant",
    kind: &PACKING_PLANT,
    metric: "ton_muat",
};

#[derive(Debug, Error, PartialEq)]
pub enum PayloadError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Validated write payload for any report kind
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPayload {
    pub tanggal: NaiveDate,
    pub id_unit: i32,
    /// One entry per `ReportKind::fields`, same order
    pub values: Vec<Option<f64>>,
}

impl ReportPayload {
    /// Validate a JSON body against the kind's columns. Unknown keys are ignored.
    pub fn from_json(kind: &ReportKind, body: &Value) -> Result<Self, PayloadError> {
        let object = body.as_object().ok_or(PayloadError::NotAnObject)?;

        let tanggal = match object.get("tanggal") {
            None | Some(Value::Null) => return Err(PayloadError::MissingField("tanggal")),
            Some(v) => parse_date(v)?,
        };

        let id_unit = unit_id_from(object.get("id_unit"))?.ok_or(PayloadError::MissingField("id_unit"))?;

        let values = kind
            .fields
            .iter()
            .map(|field| parse_metric(field, object.get(*field)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { tanggal, id_unit, values })
    }
}

/// Read an optional `id_unit` from a request body (number or numeric string)
pub fn unit_id_from(value: Option<&Value>) -> Result<Option<i32>, PayloadError> {
    let invalid = |reason: &str| PayloadError::InvalidField {
        field: "id_unit",
        reason: reason.to_string(),
    };

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| invalid("expected an integer unit id")),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| invalid("expected an integer unit id")),
        Some(_) => Err(invalid("expected an integer unit id")),
    }
}

fn parse_date(value: &Value) -> Result<NaiveDate, PayloadError> {
    let invalid = || PayloadError::InvalidField {
        field: "tanggal",
        reason: "expected a date in YYYY-MM-DD format".to_string(),
    };

    let s = value.as_str().ok_or_else(invalid)?.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| {
            // ISO timestamps from date pickers: keep the calendar date
            s.get(..10)
                .filter(|_| s.as_bytes().get(10) == Some(&b'T'))
                .ok_or(())
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").map_err(|_| ()))
        })
        .map_err(|_| invalid())
}

fn parse_metric(field: &'static str, value: Option<&Value>) -> Result<Option<f64>, PayloadError> {
    let invalid = || PayloadError::InvalidField {
        field,
        reason: "expected a number".to_string(),
    };

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map(Some).ok_or_else(invalid),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(invalid),
        Some(_) => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_daily_payload() {
        let body = json!({
            "tanggal": "2024-03-05",
            "id_unit": 4,
            "produksi_ton": 850.5,
            "jam_operasi": 20,
            "h_proses": 1,
            "h_listrik": 0,
            "h_mekanik": 2,
            "h_operator": 0,
            "h_hujan": 1,
            "h_kapal": 0,
            "h_pmc": 0,
            "nama_unit": "ignored"
        });

        let payload = ReportPayload::from_json(&DAILY, &body).unwrap();
        assert_eq!(payload.tanggal, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(payload.id_unit, 4);
        assert_eq!(payload.values.len(), DAILY.fields.len());
        assert_eq!(payload.values[0], Some(850.5));
        assert_eq!(payload.values[2], Some(1.0));
    }

    #[test]
    fn missing_metrics_become_null() {
        let body = json!({ "tanggal": "2024-03-05", "id_unit": "7", "ton_muat": "" });
        let payload = ReportPayload::from_json(&PEMUATAN, &body).unwrap();
        assert_eq!(payload.id_unit, 7);
        assert_eq!(payload.values, vec![None, None, None]);
    }

    #[test]
    fn requires_date_and_unit() {
        let body = json!({ "id_unit": 1 });
        assert_eq!(
            ReportPayload::from_json(&PENJUMBOAN, &body),
            Err(PayloadError::MissingField("tanggal"))
        );

        let body = json!({ "tanggal": "2024-01-01" });
        assert_eq!(
            ReportPayload::from_json(&PENJUMBOAN, &body),
            Err(PayloadError::MissingField("id_unit"))
        );

        assert_eq!(
            ReportPayload::from_json(&PENJUMBOAN, &json!([1, 2])),
            Err(PayloadError::NotAnObject)
        );
    }

    #[test]
    fn rejects_malformed_values() {
        let body = json!({ "tanggal": "05/03/2024", "id_unit": 1 });
        assert!(matches!(
            ReportPayload::from_json(&PACKING_PLANT, &body),
            Err(PayloadError::InvalidField { field: "tanggal", .. })
        ));

        let body = json!({ "tanggal": "2024-03-05", "id_unit": 1, "ton_muat": "lots" });
        assert!(matches!(
            ReportPayload::from_json(&PACKING_PLANT, &body),
            Err(PayloadError::InvalidField { field: "ton_muat", .. })
        ));

        let body = json!({ "tanggal": "2024-03-05", "id_unit": 1.5 });
        assert!(matches!(
            ReportPayload::from_json(&PACKING_PLANT, &body),
            Err(PayloadError::InvalidField { field: "id_unit", .. })
        ));
    }

    #[test]
    fn accepts_iso_timestamp_dates() {
        let body = json!({ "tanggal": "2024-03-05T00:00:00.000Z", "id_unit": 1 });
        let payload = ReportPayload::from_json(&PENJUMBOAN, &body).unwrap();
        assert_eq!(payload.tanggal, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn only_loading_kinds_accumulate() {
        assert!(DAILY.cumulative.is_none());
        assert!(PENJUMBOAN.cumulative.is_none());
        assert_eq!(PEMUATAN.cumulative.map(|c| c.target), Some("pemuatan_sd"));
        assert_eq!(PACKING_PLANT.cumulative.map(|c| c.source), Some("ton_muat"));
        assert_eq!(DAILY.downtime_fields.len(), 7);
    }

    #[test]
    fn release_series_point_at_their_tables() {
        assert_eq!(PABRIK_RELEASE.kind.table, "laporan_harian");
        assert_eq!(BKS_RELEASE.metric, "produksi_ton");
        assert_eq!(PACKING_PLANT_RELEASE.kind.table, "laporan_packing_plant");
    }
}
