//! Rentals repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        rental::{CreateRental, Rental, RentalQuery, UpdateRental},
        timestamps::Timestamps,
    },
};

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 200;

/// Normalised `(page, per_page)`, both at least 1
pub fn page_bounds(query: &RentalQuery) -> (i64, i64) {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    (page, per_page)
}

/// SET list for an update, with `"updatedAt"` bound at `$1`, plus the next
/// free placeholder index. Column order matches the binds in `update`.
fn update_set_clause(data: &UpdateRental) -> (String, usize) {
    let mut sets = vec![r#""updatedAt" = $1"#.to_string()];
    let mut idx = 2;

    macro_rules! add_field {
        ($field:expr, $name:expr) => {
            if $field.is_some() {
                sets.push(format!("{} = ${}", $name, idx));
                idx += 1;
            }
        };
    }

    add_field!(data.container_id, "container_id");
    add_field!(data.project_id, "project_id");
    add_field!(data.equipment_id, "equipment_id");
    add_field!(data.observation_id, "observation_id");
    add_field!(data.company, "company");
    add_field!(data.reference, "reference");
    add_field!(data.container_name, "container_name");
    add_field!(data.project_name, "project_name");
    add_field!(data.equipment_name, "equipment_name");
    add_field!(data.start_date, "start_date");
    add_field!(data.end_date, "end_date");
    add_field!(data.status, "status");

    (sets.join(", "), idx)
}

#[derive(Clone)]
pub struct RentalsRepository {
    pool: Pool<Postgres>,
}

impl RentalsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List rentals that are not soft-deleted
    pub async fn list(&self, query: &RentalQuery) -> AppResult<(Vec<Rental>, i64)> {
        let (page, per_page) = page_bounds(query);
        let status = query.status.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM rental
            WHERE "deletedAt" IS NULL AND ($1::text IS NULL OR status = $1)
            "#,
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, Rental>(
            r#"
            SELECT * FROM rental
            WHERE "deletedAt" IS NULL AND ($1::text IS NULL OR status = $1)
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    /// Get a rental by ID, ignoring soft-deleted rows
    pub async fn get_by_id(&self, id: i32) -> AppResult<Rental> {
        sqlx::query_as::<_, Rental>(r#"SELECT * FROM rental WHERE id = $1 AND "deletedAt" IS NULL"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rental {} not found", id)))
    }

    /// Insert a rental with timestamps already stamped by the insert hook
    pub async fn create(&self, data: &CreateRental, timestamps: &Timestamps) -> AppResult<Rental> {
        let row = sqlx::query_as::<_, Rental>(
            r#"
            INSERT INTO rental (
                container_id, project_id, equipment_id, observation_id,
                company, reference, container_name, project_name, equipment_name,
                start_date, end_date, status, "createdAt", "updatedAt"
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(data.container_id)
        .bind(data.project_id)
        .bind(data.equipment_id)
        .bind(data.observation_id)
        .bind(&data.company)
        .bind(&data.reference)
        .bind(&data.container_name)
        .bind(&data.project_name)
        .bind(&data.equipment_name)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.status)
        .bind(timestamps.created_at)
        .bind(timestamps.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update the given fields and `updatedAt`; `createdAt` is never written.
    ///
    /// A nullable field set to `Some(None)` is written as NULL.
    pub async fn update(&self, id: i32, data: &UpdateRental, updated_at: DateTime<Utc>) -> AppResult<Rental> {
        let (sets, idx) = update_set_clause(data);
        let query = format!(
            r#"UPDATE rental SET {} WHERE id = ${} AND "deletedAt" IS NULL RETURNING *"#,
            sets, idx
        );

        let mut builder = sqlx::query_as::<_, Rental>(&query).bind(updated_at);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.container_id);
        bind_field!(data.project_id);
        bind_field!(data.equipment_id);
        bind_field!(data.observation_id);
        bind_field!(data.company);
        bind_field!(data.reference);
        bind_field!(data.container_name);
        bind_field!(data.project_name);
        bind_field!(data.equipment_name);
        bind_field!(data.start_date);
        bind_field!(data.end_date);
        bind_field!(data.status);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rental {} not found", id)))
    }

    /// Mark a rental deleted; the row stays in the table
    pub async fn soft_delete(&self, id: i32, now: DateTime<Utc>) -> AppResult<()> {
        let result = sqlx::query(
            r#"UPDATE rental SET "deletedAt" = $1, "updatedAt" = $1 WHERE id = $2 AND "deletedAt" IS NULL"#,
        )
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Rental {} not found", id)));
        }
        Ok(())
    }
}
