//! Device token queries

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::user_device_token::UserDeviceToken,
    schema::{ddl::quote_ident, ResolvedRelation},
};

#[derive(Clone)]
pub struct DeviceTokensRepository {
    pool: Pool<Postgres>,
}

impl DeviceTokensRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Tokens on the far side of a resolved has-many relation, keyed by the
    /// source row's join value
    pub async fn list_related(&self, relation: &ResolvedRelation, source_value: i32) -> AppResult<Vec<UserDeviceToken>> {
        let query = format!(
            "SELECT * FROM {} WHERE {} = $1 ORDER BY id",
            quote_ident(relation.target_table),
            quote_ident(relation.target_column)
        );
        let rows = sqlx::query_as::<_, UserDeviceToken>(&query)
            .bind(source_value)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
