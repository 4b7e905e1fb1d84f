// handlers/protected/mod.rs - Handlers behind `jwt_auth_middleware`
//
// Listing is further gated by `require_admin`; writes run the group-scoped
// edit check inside the handler once the target unit is known.

pub mod reports;
