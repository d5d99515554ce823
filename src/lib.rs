//! Meal attendance backend: per-user lunch/dinner choices by date, weekday
//! defaults, and a date-range report that overlays one on the other.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, put},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::MealStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MealStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn MealStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

fn cors_layer(allowed: Option<String>) -> CorsLayer {
    let origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let Ok(o) = origin.to_str() else {
            return false;
        };
        if o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") {
            return true;
        }
        allowed.as_deref() == Some(o)
    });

    CorsLayer::new()
        .allow_methods([Method::GET, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(origin)
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_allowed_origin.clone());

    Router::new()
        .route("/api/health", get(routes::health::health_check))
        .route("/api/metrics", get(routes::metrics::metrics_handler))
        .route("/api/meals", get(routes::meals::get_meals))
        .route("/api/meals/bulk-update", put(routes::meals::bulk_update_meals))
        .route(
            "/api/user-defaults/{user_id}",
            get(routes::user_defaults::get_user_defaults)
                .put(routes::user_defaults::update_user_defaults),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
