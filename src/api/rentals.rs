//! Rental endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::{
    error::AppResult,
    models::{
        rental::{CreateRental, Rental, RentalPage, RentalQuery, UpdateRental},
        user_device_token::UserDeviceToken,
    },
};

/// List rentals
#[utoipa::path(
    get,
    path = "/rentals",
    tag = "rentals",
    params(RentalQuery),
    responses(
        (status = 200, description = "Rental list", body = RentalPage)
    )
)]
pub async fn list_rentals(
    State(state): State<crate::AppState>,
    Query(query): Query<RentalQuery>,
) -> AppResult<Json<RentalPage>> {
    let page = state.services.rentals.list(&query).await?;
    Ok(Json(page))
}

/// Get rental by ID
#[utoipa::path(
    get,
    path = "/rentals/{id}",
    tag = "rentals",
    params(("id" = i32, Path, description = "Rental ID")),
    responses(
        (status = 200, description = "Rental details", body = Rental),
        (status = 404, description = "Rental not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_rental(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Rental>> {
    let rental = state.services.rentals.get_by_id(id).await?;
    Ok(Json(rental))
}

/// Create rental
#[utoipa::path(
    post,
    path = "/rentals",
    tag = "rentals",
    request_body = CreateRental,
    responses(
        (status = 201, description = "Rental created", body = Rental),
        (status = 400, description = "Schema validation failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_rental(
    State(state): State<crate::AppState>,
    Json(payload): Json<Value>,
) -> AppResult<(StatusCode, Json<Rental>)> {
    let data = state.services.rentals.parse_create(payload)?;
    let rental = state.services.rentals.create(&data).await?;
    Ok((StatusCode::CREATED, Json(rental)))
}

/// Update rental
#[utoipa::path(
    patch,
    path = "/rentals/{id}",
    tag = "rentals",
    params(("id" = i32, Path, description = "Rental ID")),
    request_body = UpdateRental,
    responses(
        (status = 200, description = "Rental updated", body = Rental),
        (status = 400, description = "Schema validation failed", body = crate::error::ErrorResponse),
        (status = 404, description = "Rental not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_rental(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<Value>,
) -> AppResult<Json<Rental>> {
    let data = state.services.rentals.parse_update(payload)?;
    let rental = state.services.rentals.update(id, &data).await?;
    Ok(Json(rental))
}

/// Soft-delete rental
#[utoipa::path(
    delete,
    path = "/rentals/{id}",
    tag = "rentals",
    params(("id" = i32, Path, description = "Rental ID")),
    responses(
        (status = 204, description = "Rental deleted"),
        (status = 404, description = "Rental not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_rental(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.rentals.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List device tokens attached to a rental
#[utoipa::path(
    get,
    path = "/rentals/{id}/user-device-tokens",
    tag = "rentals",
    params(("id" = i32, Path, description = "Rental ID")),
    responses(
        (status = 200, description = "Device tokens", body = Vec<UserDeviceToken>),
        (status = 404, description = "Rental not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_rental_device_tokens(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<UserDeviceToken>>> {
    let tokens = state.services.rentals.device_tokens(id).await?;
    Ok(Json(tokens))
}
