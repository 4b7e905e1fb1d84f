// handlers/mod.rs - HTTP handlers by access tier
//
// Public (no auth) → Protected (JWT auth, role and group checks per route)

pub mod public;
pub mod protected;
mod params;

pub use params::{parse_month, parse_path_int};
