//! Rental management service

use std::sync::Arc;

use serde_json::Value;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        rental::{CreateRental, Rental, RentalPage, RentalQuery, UpdateRental, DEVICE_TOKENS_RELATION},
        timestamps::{Clock, LifecycleHooks, Timestamps},
        user_device_token::UserDeviceToken,
    },
    repository::{rentals::page_bounds, Repository},
    schema::{EntitySchema, ModelDescriptor, SchemaValidationError, ValidationMode},
};

#[derive(Clone)]
pub struct RentalsService {
    repository: Repository,
    model: Arc<ModelDescriptor>,
    clock: Arc<dyn Clock>,
}

impl RentalsService {
    pub fn new(repository: Repository, model: Arc<ModelDescriptor>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            model,
            clock,
        }
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.model.schema
    }

    /// Check a raw insert payload against the entity schema, then decode it
    pub fn parse_create(&self, payload: Value) -> AppResult<CreateRental> {
        self.schema().validate(&payload, ValidationMode::Insert)?;
        serde_json::from_value(payload).map_err(|e| AppError::BadRequest(e.to_string()))
    }

    /// Same as [`Self::parse_create`] for a partial update
    pub fn parse_update(&self, payload: Value) -> AppResult<UpdateRental> {
        self.schema().validate(&payload, ValidationMode::Patch)?;
        serde_json::from_value(payload).map_err(|e| AppError::BadRequest(e.to_string()))
    }

    pub async fn list(&self, query: &RentalQuery) -> AppResult<RentalPage> {
        let (page, per_page) = page_bounds(query);
        let (items, total) = self.repository.rentals.list(query).await?;
        Ok(RentalPage {
            items,
            total,
            page,
            per_page,
        })
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Rental> {
        self.repository.rentals.get_by_id(id).await
    }

    /// Create a rental; `createdAt` and `updatedAt` are both set to now
    pub async fn create(&self, data: &CreateRental) -> AppResult<Rental> {
        data.validate().map_err(SchemaValidationError::from)?;

        let mut timestamps = Timestamps::default();
        timestamps.before_insert(self.clock.now());

        let rental = self.repository.rentals.create(data, &timestamps).await?;
        tracing::info!(rental_id = rental.id, status = %rental.status, "Rental created");
        Ok(rental)
    }

    /// Update a rental; only `updatedAt` is re-stamped
    pub async fn update(&self, id: i32, data: &UpdateRental) -> AppResult<Rental> {
        data.validate().map_err(SchemaValidationError::from)?;

        let now = self.clock.now();
        let mut timestamps = self.repository.rentals.get_by_id(id).await?.timestamps();
        timestamps.before_update(now);

        self.repository
            .rentals
            .update(id, data, timestamps.updated_at.unwrap_or(now))
            .await
    }

    /// Soft delete
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.rentals.soft_delete(id, self.clock.now()).await?;
        tracing::info!(rental_id = id, "Rental soft-deleted");
        Ok(())
    }

    /// Device tokens attached to a rental through the has-many relation
    pub async fn device_tokens(&self, id: i32) -> AppResult<Vec<UserDeviceToken>> {
        let rental = self.repository.rentals.get_by_id(id).await?;
        let relation = self.model.relation(DEVICE_TOKENS_RELATION).ok_or_else(|| {
            AppError::Internal(format!("relation {} is not resolved", DEVICE_TOKENS_RELATION))
        })?;
        self.repository
            .device_tokens
            .list_related(relation, rental.id)
            .await
    }
}
