use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::config::AppConfig;
use crate::database::models::ReportKind;
use crate::database::ReportRepository;

/// Everything a handler needs, constructed once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: PgPool,
    pub jwt: JwtKeys,
}

impl AppState {
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let jwt = JwtKeys::from_config(&config.security);
        Self {
            config: Arc::new(config),
            pool,
            jwt,
        }
    }

    pub fn reports(&self, kind: &'static ReportKind) -> ReportRepository {
        ReportRepository::new(kind, self.pool.clone())
    }
}
