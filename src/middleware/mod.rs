pub mod auth;
pub mod permission;
pub mod response;

pub use auth::{jwt_auth_middleware, require_admin, AuthUser};
pub use permission::{require_edit_permission, EditTarget, PgUnitDirectory, UnitDirectory};
pub use response::{ApiResponse, ApiResult, MessageBody};
