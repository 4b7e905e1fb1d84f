pub mod aggregation;

pub use aggregation::{monthly_release, unit_dashboard, AggregationError, DashboardPayload};
