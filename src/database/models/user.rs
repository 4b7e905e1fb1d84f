use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// bcrypt digest
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    /// Comma-separated production group names
    pub allowed_groups: Option<String>,
}
