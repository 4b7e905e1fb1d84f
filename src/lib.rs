pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;

use axum::{
    extract::State,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::database::models::report::{
    BKS_RELEASE, DAILY, PABRIK_RELEASE, PACKING_PLANT, PACKING_PLANT_RELEASE, PEMUATAN, PENJUMBOAN,
};
use crate::database::models::{ReleaseSeries, ReportKind};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, require_admin};
use crate::state::AppState;

/// Full HTTP application
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/auth/login", post(public::auth::login_post))
        .route("/api/units", get(public::units::units_get))
        // Group release charts
        .nest("/api/produksi/pabrik/rilis", release_routes(&PABRIK_RELEASE))
        .nest("/api/produksi/bks/rilis", release_routes(&BKS_RELEASE))
        .nest("/api/packing-plant/rilis", release_routes(&PACKING_PLANT_RELEASE))
        // Unit dashboards
        .nest("/api/dashboard", dashboard_routes(&DAILY))
        .nest("/api/penjumboan/dashboard", dashboard_routes(&PENJUMBOAN))
        .nest("/api/pemuatan/dashboard", dashboard_routes(&PEMUATAN))
        .nest("/api/packing-plant/dashboard", dashboard_routes(&PACKING_PLANT))
        // Report CRUD
        .nest("/api/laporan", report_routes(&state, &DAILY))
        .nest("/api/penjumboan/laporan", report_routes(&state, &PENJUMBOAN))
        .nest("/api/pemuatan/laporan", report_routes(&state, &PEMUATAN))
        .nest("/api/packing-plant/laporan", report_routes(&state, &PACKING_PLANT));

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config.security));
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn release_routes(series: &'static ReleaseSeries) -> Router<AppState> {
    Router::new()
        .route("/:year", get(public::release::release_get))
        .layer(Extension(series))
}

fn dashboard_routes(kind: &'static ReportKind) -> Router<AppState> {
    Router::new()
        .route("/:unit_id/:year/:month", get(public::dashboard::dashboard_get))
        .layer(Extension(kind))
}

fn report_routes(state: &AppState, kind: &'static ReportKind) -> Router<AppState> {
    use protected::reports;

    Router::new()
        .route("/all", get(reports::list_all).route_layer(from_fn(require_admin)))
        .route("/", post(reports::create))
        .route("/:id", put(reports::update).delete(reports::delete))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
        .layer(Extension(kind))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "Produksi API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Production metrics reporting API",
        "endpoints": {
            "auth": "/api/auth/login (public)",
            "units": "/api/units (public)",
            "release": "/api/produksi/{pabrik,bks}/rilis/:year, /api/packing-plant/rilis/:year (public)",
            "dashboard": "/api/{,penjumboan/,pemuatan/,packing-plant/}dashboard/:unitId/:year/:month (public)",
            "reports": "/api/{,penjumboan/,pemuatan/,packing-plant/}laporan[/all|/:id] (protected)",
            "health": "/health (public)"
        }
    }))
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    DatabaseManager::health_check(&state.pool).await.map_err(|e| {
        tracing::warn!("Health check failed: {}", e);
        ApiError::service_unavailable("Database unavailable")
    })?;

    Ok(Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "database": "ok"
    })))
}
