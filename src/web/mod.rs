use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;

pub mod middleware;
pub mod routes;

use routes::{hike, hikes};

/// The full API surface. Browsing (list, detail) is public; everything that
/// writes, plus the organizer views, sits behind the identity middleware.
pub fn api_router(pool: SqlitePool) -> Router {
    let protected = Router::new()
        .route("/api/hikes", post(hikes::create_hike_handler))
        .route("/api/hikes/my", get(hikes::my_hikes_handler))
        .route(
            "/api/hikes/:hike_id/membership",
            post(hike::membership_command_handler),
        )
        .route(
            "/api/hikes/:hike_id/requests",
            get(hike::list_requests_handler),
        )
        .route(
            "/api/hikes/:hike_id/requests/:request_id",
            post(hike::request_decision_handler),
        )
        .layer(axum_middleware::from_fn(middleware::auth::require_auth));

    Router::new()
        .route("/api/hikes", get(hikes::list_hikes_handler))
        .route("/api/hikes/:hike_id", get(hike::hike_detail_handler))
        .merge(protected)
        .with_state(pool)
}
