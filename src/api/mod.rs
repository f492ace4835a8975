use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::clients::media_store::MediaStoreClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::TokenService;

pub mod auth;
pub mod certificates;
pub mod contact;
mod error;
mod observability;
pub mod profile;
pub mod projects;
pub mod public;
pub mod rate_limit;
pub mod system;
mod types;
pub mod upload;
mod validation;

pub use error::ApiError;
pub use rate_limit::RateLimiter;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub store: Store,

    pub tokens: TokenService,

    pub media: Arc<MediaStoreClient>,

    pub api_limiter: RateLimiter,

    pub auth_limiter: RateLimiter,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

pub async fn create_app_state(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let tokens = TokenService::new(&config.auth.token_secret, config.auth.token_expiry_days);

    let media = Arc::new(MediaStoreClient::new(config.storage.clone())?);

    let api_limiter = RateLimiter::new(
        config.security.api_max_requests,
        config.security.rate_limit_window_seconds,
    );
    let auth_limiter = RateLimiter::new(
        config.security.auth_max_requests,
        config.security.rate_limit_window_seconds,
    );

    Ok(Arc::new(AppState {
        config: Arc::new(config),
        store,
        tokens,
        media,
        api_limiter,
        auth_limiter,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let public_routes = Router::new()
        .route("/health", get(system::get_health))
        .route("/data/all-public-data", get(public::get_public_data))
        .route("/profile", get(profile::get_profile))
        .route("/projects", get(projects::list_projects))
        .route("/certificates", get(certificates::list_certificates))
        .route("/contact", post(contact::submit_message))
        .route("/auth/logout", post(auth::logout));

    // Credential endpoints carry the stricter throttle on top of the
    // global one.
    let credential_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::throttle_auth,
        ));

    let authed_routes = Router::new()
        .route("/auth/me", get(auth::current_account))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    // Admin surface: `authenticate` is the outer layer, `require_admin`
    // inspects the identity it attached.
    let admin_routes = Router::new()
        .route("/admin/profile", put(profile::update_profile))
        .route("/admin/project", post(projects::create_project))
        .route("/admin/project/{id}", delete(projects::delete_project))
        .route("/admin/certificate", post(certificates::create_certificate))
        .route(
            "/admin/certificate/{id}",
            delete(certificates::delete_certificate),
        )
        .route("/admin/messages", get(contact::list_messages))
        .route("/admin/messages/{id}", delete(contact::delete_message))
        .route("/admin/metrics", get(observability::get_metrics))
        .route(
            "/upload",
            post(upload::upload_asset).layer(DefaultBodyLimit::max(upload::MAX_UPLOAD_BYTES)),
        )
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(credential_routes)
        .merge(authed_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::throttle_api,
        ))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::track_requests))
}
