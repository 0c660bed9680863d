pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    routing::{get, patch, post, put},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Blood request lifecycle (list is public, the rest authenticated)
    let request_routes = Router::new()
        .route("/", post(routes::request::create))
        .route("/", get(routes::request::list))
        .route("/refresh", post(routes::request::refresh))
        .route("/{id}", get(routes::request::get))
        .route("/{id}/book", post(routes::request::book))
        .route("/{id}/complete", post(routes::request::complete));

    // Own profile
    let user_routes = Router::new()
        .route("/me", put(routes::user::upsert_me))
        .route("/me", get(routes::user::get_me))
        .route("/me/device", put(routes::user::update_device));

    // Donor directory
    let donor_routes = Router::new()
        .route("/", get(routes::donor::list))
        .route("/search", get(routes::donor::search));

    // Notifications
    let notification_routes = Router::new()
        .route("/", get(routes::notification::list))
        .route("/{id}/read", patch(routes::notification::mark_read));

    let api = Router::new()
        .nest("/requests", request_routes)
        .nest("/users", user_routes)
        .nest("/donors", donor_routes)
        .nest("/notifications", notification_routes);

    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
