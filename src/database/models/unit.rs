use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Unit kerja joined with its production group
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Unit {
    pub id_unit: i32,
    pub nama_unit: String,
    pub group_name: String,
}

/// One (unit, month) bucket of a group release series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UnitMonthTotal {
    pub nama_unit: String,
    pub month: i32,
    pub total: f64,
}
