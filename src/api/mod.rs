//! API handlers for the rental REST endpoints

pub mod health;
pub mod openapi;
pub mod rentals;

use axum::{
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Rentals
        .route("/rentals", get(rentals::list_rentals).post(rentals::create_rental))
        .route(
            "/rentals/:id",
            get(rentals::get_rental)
                .patch(rentals::update_rental)
                .delete(rentals::delete_rental),
        )
        .route(
            "/rentals/:id/user-device-tokens",
            get(rentals::list_rental_device_tokens),
        )
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
