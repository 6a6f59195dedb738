//! Business logic services

pub mod rentals;

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{rental, timestamps::Clock},
    repository::Repository,
    schema::ResolvedRegistry,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub rentals: rentals::RentalsService,
    repository: Repository,
}

impl Services {
    /// Create all services from the repository and the resolved entity models
    pub fn new(repository: Repository, registry: &ResolvedRegistry, clock: Arc<dyn Clock>) -> AppResult<Self> {
        let rental_model = registry
            .model(rental::TABLE)
            .ok_or_else(|| AppError::Internal(format!("entity {} is not registered", rental::TABLE)))?;

        Ok(Self {
            rentals: rentals::RentalsService::new(repository.clone(), rental_model, clock),
            repository,
        })
    }

    /// Database readiness check
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
