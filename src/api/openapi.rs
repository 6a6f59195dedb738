//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, rentals};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rental API",
        version = "0.1.0",
        description = "Equipment rental tracking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Rentals
        rentals::list_rentals,
        rentals::get_rental,
        rentals::create_rental,
        rentals::update_rental,
        rentals::delete_rental,
        rentals::list_rental_device_tokens,
    ),
    components(
        schemas(
            // Rentals
            crate::models::rental::Rental,
            crate::models::rental::RentalStatus,
            crate::models::rental::RentalPage,
            crate::models::rental::CreateRental,
            crate::models::rental::UpdateRental,
            crate::models::user_device_token::UserDeviceToken,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rentals", description = "Rental management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_rental_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/rentals"));
        assert!(doc.paths.paths.contains_key("/rentals/{id}"));
        assert!(doc.paths.paths.contains_key("/rentals/{id}/user-device-tokens"));
    }
}
