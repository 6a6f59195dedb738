//! Rental model, its entity schema and table provisioning

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

use super::timestamps::Timestamps;
use super::user_device_token;
use crate::schema::{
    ensure_table, Constraint, EntityRegistry, EntitySchema, FieldSpec, RegistryError,
    SchemaValidationError, TableStore,
};

pub const TABLE: &str = "rental";

/// Has-many relation to device tokens.
///
/// Joined on `user_device_tokens.user_id`, not a `rental_id` column.
pub const DEVICE_TOKENS_RELATION: &str = "user-device-tokens";

/// Rental lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    Active,
    Inactive,
}

impl RentalStatus {
    pub const VALUES: &'static [&'static str] = &["active", "inactive"];

    pub fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Active => "active",
            RentalStatus::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RentalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(RentalStatus::Active),
            "inactive" => Ok(RentalStatus::Inactive),
            _ => Err(format!("Invalid rental status: {}", s)),
        }
    }
}

// Stored as TEXT guarded by a CHECK constraint
impl sqlx::Type<Postgres> for RentalStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for RentalStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for RentalStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Rental record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Rental {
    pub id: i32,
    pub container_id: i32,
    pub project_id: i32,
    pub equipment_id: i32,
    pub observation_id: i32,
    /// Snapshot of the renting company name
    pub company: Option<String>,
    pub reference: Option<String>,
    /// Snapshots of the referenced entities' names at rental time
    pub container_name: Option<String>,
    pub project_name: Option<String>,
    pub equipment_name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: RentalStatus,
    #[sqlx(rename = "createdAt")]
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "updatedAt")]
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker
    #[sqlx(rename = "deletedAt")]
    #[serde(rename = "deletedAt")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Rental {
    pub fn timestamps(&self) -> Timestamps {
        Timestamps::new(self.created_at, self.updated_at)
    }
}

/// Create rental request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRental {
    pub container_id: i32,
    pub project_id: i32,
    pub equipment_id: i32,
    pub observation_id: i32,
    #[validate(length(min = 1, max = 255))]
    pub company: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub reference: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub container_name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub project_name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub equipment_name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: RentalStatus,
}

/// Update rental request.
///
/// Absent fields are left unchanged. Nullable columns use a double option so
/// that an explicit `null` (`Some(None)`) clears the column.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateRental {
    pub container_id: Option<i32>,
    pub project_id: Option<i32>,
    pub equipment_id: Option<i32>,
    pub observation_id: Option<i32>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    #[validate(length(min = 1, max = 255))]
    pub company: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    #[validate(length(min = 1, max = 255))]
    pub reference: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    #[validate(length(min = 1, max = 255))]
    pub container_name: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    #[validate(length(min = 1, max = 255))]
    pub project_name: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    #[validate(length(min = 1, max = 255))]
    pub equipment_name: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<DateTime<Utc>>, nullable)]
    pub start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<DateTime<Utc>>, nullable)]
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub status: Option<RentalStatus>,
}

/// Rental list query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct RentalQuery {
    /// Filter by status
    pub status: Option<RentalStatus>,
    /// Page number (default: 1)
    pub page: Option<i64>,
    /// Items per page (default: 20)
    pub per_page: Option<i64>,
}

/// Paginated rental list
#[derive(Debug, Serialize, ToSchema)]
pub struct RentalPage {
    pub items: Vec<Rental>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

fn constraint_for(error: &ValidationError) -> Constraint {
    if error.code != "length" {
        return Constraint::Type;
    }
    let len = error
        .params
        .get("value")
        .and_then(|v| v.as_str())
        .map(|s| s.chars().count() as u64);
    let min = error.params.get("min").and_then(|v| v.as_u64());
    match (len, min) {
        (Some(len), Some(min)) if len < min => Constraint::MinLength,
        _ => Constraint::MaxLength,
    }
}

impl From<ValidationErrors> for SchemaValidationError {
    /// Reports the alphabetically first failing field
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| (field.to_string(), errs.first().map(constraint_for)))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        match fields.into_iter().next() {
            Some((field, constraint)) => {
                SchemaValidationError::new(field, constraint.unwrap_or(Constraint::Type))
            }
            None => SchemaValidationError::new(crate::schema::ROOT_FIELD, Constraint::Type),
        }
    }
}

/// Structural schema of the `rental` table
pub fn schema() -> EntitySchema {
    EntitySchema::new(TABLE)
        .field(FieldSpec::serial("id"))
        .field(FieldSpec::integer("container_id").required())
        .field(FieldSpec::integer("project_id").required())
        .field(FieldSpec::integer("equipment_id").required())
        .field(FieldSpec::integer("observation_id").required())
        .field(FieldSpec::string("company", 1, 255).nullable())
        .field(FieldSpec::string("reference", 1, 255).nullable())
        .field(FieldSpec::string("container_name", 1, 255).nullable())
        .field(FieldSpec::string("project_name", 1, 255).nullable())
        .field(FieldSpec::string("equipment_name", 1, 255).nullable())
        .field(FieldSpec::date_time("start_date").default_null())
        .field(FieldSpec::date_time("end_date").default_null())
        .field(FieldSpec::enumeration("status", RentalStatus::VALUES).required())
        .field(FieldSpec::date_time("createdAt").default_now())
        .field(FieldSpec::date_time("updatedAt").default_now())
        .field(FieldSpec::date_time("deletedAt").nullable())
        .index(&["status"])
        .has_many(
            DEVICE_TOKENS_RELATION,
            "id",
            user_device_token::TABLE,
            user_device_token::RENTAL_JOIN_COLUMN,
        )
}

/// Register the rental entity and, when a store is given, make sure its
/// table exists.
///
/// Provisioning is best effort: failures are logged and startup continues.
/// The device-token relation is resolved later by
/// [`EntityRegistry::resolve`].
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
