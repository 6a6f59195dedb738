//! Best-effort table provisioning
//!
//! `ensure_table` checks whether an entity's table exists and creates it when
//! absent. The check and the create are separate round trips without a lock,
//! so two instances starting together may both attempt creation; the rendered
//! DDL uses `IF NOT EXISTS` so the slower one is a no-op. Any failure is
//! logged and reported as [`ProvisionOutcome::Failed`], never as an error.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::EntitySchema;

/// Storage engine handle used for introspection and DDL
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn has_table(&self, table: &str) -> Result<bool, sqlx::Error>;

    async fn create_table(&self, schema: &EntitySchema) -> Result<(), sqlx::Error>;
}

/// PostgreSQL implementation over a connection pool
#[derive(Clone)]
pub struct PgTableStore {
    pool: Pool<Postgres>,
}

impl PgTableStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TableStore for PgTableStore {
    async fn has_table(&self, table: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = current_schema() AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_table(&self, schema: &EntitySchema) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for statement in schema.create_table_statements() {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }
        tx.commit().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    AlreadyExists,
    Created,
    Failed,
}

/// Create the entity's table if it does not exist yet
pub async fn ensure_table(store: &dyn TableStore, schema: &EntitySchema) -> ProvisionOutcome {
    let table = schema.table;

    match store.has_table(table).await {
        Ok(true) => {
            tracing::debug!(table, "Table already exists");
            ProvisionOutcome::AlreadyExists
        }
        Ok(false) => match store.create_table(schema).await {
            Ok(()) => {
                tracing::info!(table, "Created {} table", table);
                ProvisionOutcome::Created
            }
            Err(e) => {
                tracing::error!(table, error = %e, "Error creating {} table", table);
                ProvisionOutcome::Failed
            }
        },
        Err(e) => {
            tracing::error!(table, error = %e, "Error checking {} table", table);
            ProvisionOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;

    fn schema() -> EntitySchema {
        EntitySchema::new("widgets").field(FieldSpec::serial("id"))
    }

    #[tokio::test]
    async fn test_existing_table_runs_no_ddl() {
        let mut store = MockTableStore::new();
        store
            .expect_has_table()
            .withf(|table| table == "widgets")
            .times(1)
            .returning(|_| Ok(true));
        store.expect_create_table().never();

        assert_eq!(ensure_table(&store, &schema()).await, ProvisionOutcome::AlreadyExists);
    }

    #[tokio::test]
    async fn test_missing_table_is_created() {
        let mut store = MockTableStore::new();
        store.expect_has_table().times(1).returning(|_| Ok(false));
        store
            .expect_create_table()
            .withf(|schema| schema.table == "widgets")
            .times(1)
            .returning(|_| Ok(()));

        assert_eq!(ensure_table(&store, &schema()).await, ProvisionOutcome::Created);
    }

    #[tokio::test]
    async fn test_create_failure_is_swallowed() {
        let mut store = MockTableStore::new();
        store.expect_has_table().returning(|_| Ok(false));
        store
            .expect_create_table()
            .times(1)
            .returning(|_| Err(sqlx::Error::Protocol("relation already exists".to_string())));

        assert_eq!(ensure_table(&store, &schema()).await, ProvisionOutcome::Failed);
    }

    #[tokio::test]
    async fn test_introspection_failure_is_swallowed() {
        let mut store = MockTableStore::new();
        store
            .expect_has_table()
            .returning(|_| Err(sqlx::Error::PoolTimedOut));
        store.expect_create_table().never();

        assert_eq!(ensure_table(&store, &schema()).await, ProvisionOutcome::Failed);
    }
}
