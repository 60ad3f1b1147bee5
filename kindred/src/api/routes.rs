use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let v1 = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/users/{userId}/clusters", post(handlers::ingest_clusters))
        .route(
            "/users/{userId}/traits",
            put(handlers::record_traits).get(handlers::get_traits),
        )
        .route("/users/{userId}/matches", get(handlers::list_matches))
        .route("/matches/{userA}/{userB}", get(handlers::get_match));

    Router::new()
        .nest("/api/v1", v1)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
