//! Repository layer for database operations

pub mod device_tokens;
pub mod rentals;

use sqlx::{Pool, Postgres};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub rentals: rentals::RentalsRepository,
    pub device_tokens: device_tokens::DeviceTokensRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            rentals: rentals::RentalsRepository::new(pool.clone()),
            device_tokens: device_tokens::DeviceTokensRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round trip to the database
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
