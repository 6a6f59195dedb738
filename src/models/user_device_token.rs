//! Device token model, the target of the rental has-many relation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::schema::{
    ensure_table, EntityRegistry, EntitySchema, FieldSpec, RegistryError, TableStore,
};

pub const TABLE: &str = "user_device_tokens";

/// Column holding the owning rental's id. The name is historical.
pub const RENTAL_JOIN_COLUMN: &str = "user_id";

/// Device token record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserDeviceToken {
    pub id: i32,
    pub user_id: i32,
    /// Push notification token
    pub token: String,
    pub platform: Option<String>,
    #[sqlx(rename = "createdAt")]
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "updatedAt")]
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

pub fn schema() -> EntitySchema {
    EntitySchema::new(TABLE)
        .field(FieldSpec::serial("id"))
        .field(FieldSpec::integer(RENTAL_JOIN_COLUMN).required())
        .field(FieldSpec::string("token", 1, 255).required())
        .field(FieldSpec::string("platform", 1, 50).nullable())
        .field(FieldSpec::date_time("createdAt").default_now())
        .field(FieldSpec::date_time("updatedAt").default_now())
        .index(&[RENTAL_JOIN_COLUMN])
}

/// Register the device token entity and provision its table
pub async fn model(
    registry: &mut EntityRegistry,
    store: Option<&dyn TableStore>,
) -> Result<EntitySchema, RegistryError> {
    let schema = schema();
    registry.register(schema.clone())?;

    if let Some(store) = store {
        ensure_table(store, &schema).await;
    }

    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_column_is_indexed() {
        let statements = schema().create_table_statements();
        assert!(statements[0].contains("\"user_id\" INTEGER NOT NULL"));
        assert_eq!(
            statements[1],
            "CREATE INDEX IF NOT EXISTS \"user_device_tokens_user_id_index\" ON \"user_device_tokens\" (\"user_id\")"
        );
    }
}
