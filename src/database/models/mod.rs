pub mod report;
pub mod unit;
pub mod user;

pub use report::{PayloadError, ReleaseSeries, ReportKind, ReportPayload};
pub use unit::{Unit, UnitMonthTotal};
pub use user::User;
