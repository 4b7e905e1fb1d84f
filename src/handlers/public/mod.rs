// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition plus the read-only reference and dashboard data shown on
// the public production screens.

pub mod auth;
pub mod dashboard;
pub mod release;
pub mod units;
