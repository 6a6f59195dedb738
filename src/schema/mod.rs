//! Declarative entity schemas
//!
//! An [`EntitySchema`] describes a persisted record: its fields with their
//! types, nullability, length bounds and enum membership, its indexes and its
//! relations to other entities. The same description drives inbound payload
//! validation, DDL rendering and relation resolution.

pub mod ddl;
pub mod provision;
pub mod registry;

use chrono::DateTime;
use serde_json::{Map, Value};
use thiserror::Error;

pub use provision::{ensure_table, PgTableStore, ProvisionOutcome, TableStore};
pub use registry::{EntityRegistry, ModelDescriptor, RegistryError, ResolvedRegistry, ResolvedRelation};

/// Field name reported when the payload itself is not an object
pub const ROOT_FIELD: &str = "$root";

/// Constraint violated by an inbound value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Type,
    Required,
    Nullable,
    MinLength,
    MaxLength,
    Enum,
    Format,
}

impl Constraint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Constraint::Type => "type",
            Constraint::Required => "required",
            Constraint::Nullable => "nullable",
            Constraint::MinLength => "minLength",
            Constraint::MaxLength => "maxLength",
            Constraint::Enum => "enum",
            Constraint::Format => "format",
        }
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A payload field failed one of its schema constraints
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field `{field}` violates the {constraint} constraint")]
pub struct SchemaValidationError {
    pub field: String,
    pub constraint: Constraint,
}

impl SchemaValidationError {
    pub fn new(field: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            field: field.into(),
            constraint,
        }
    }
}

/// Value type of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Integer primary key generated on insert
    Serial,
    Integer,
    String { min_length: usize, max_length: usize },
    Enum(&'static [&'static str]),
    /// ISO-8601 / RFC 3339 instant
    DateTime,
}

/// Column default applied by the storage engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    None,
    Null,
    Now,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,
    /// Must be present on insert
    pub required: bool,
    pub default: ColumnDefault,
}

impl FieldSpec {
    fn of(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            required: false,
            default: ColumnDefault::None,
        }
    }

    pub fn serial(name: &'static str) -> Self {
        Self::of(name, FieldKind::Serial)
    }

    pub fn integer(name: &'static str) -> Self {
        Self::of(name, FieldKind::Integer)
    }

    pub fn string(name: &'static str, min_length: usize, max_length: usize) -> Self {
        Self::of(name, FieldKind::String { min_length, max_length })
    }

    pub fn enumeration(name: &'static str, values: &'static [&'static str]) -> Self {
        Self::of(name, FieldKind::Enum(values))
    }

    pub fn date_time(name: &'static str) -> Self {
        Self::of(name, FieldKind::DateTime)
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_null(mut self) -> Self {
        self.nullable = true;
        self.default = ColumnDefault::Null;
        self
    }

    pub fn default_now(mut self) -> Self {
        self.default = ColumnDefault::Now;
        self
    }

    /// Check a single present value against this field
    pub fn check(&self, value: &Value) -> Result<(), Constraint> {
        if value.is_null() {
            return if self.nullable { Ok(()) } else { Err(Constraint::Nullable) };
        }

        match &self.kind {
            // INTEGER / SERIAL columns are 32-bit
            FieldKind::Serial | FieldKind::Integer => value
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(|_| ())
                .ok_or(Constraint::Type),
            FieldKind::String { min_length, max_length } => {
                let s = value.as_str().ok_or(Constraint::Type)?;
                let len = s.chars().count();
                if len < *min_length {
                    Err(Constraint::MinLength)
                } else if len > *max_length {
                    Err(Constraint::MaxLength)
                } else {
                    Ok(())
                }
            }
            FieldKind::Enum(values) => {
                let s = value.as_str().ok_or(Constraint::Type)?;
                if values.contains(&s) {
                    Ok(())
                } else {
                    Err(Constraint::Enum)
                }
            }
            FieldKind::DateTime => {
                let s = value.as_str().ok_or(Constraint::Type)?;
                DateTime::parse_from_rfc3339(s)
                    .map(|_| ())
                    .map_err(|_| Constraint::Format)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub columns: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    HasMany,
}

/// Relation declared by an entity, resolved once every entity is registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSpec {
    pub name: &'static str,
    pub kind: RelationKind,
    pub from_column: &'static str,
    pub target_table: &'static str,
    pub target_column: &'static str,
}

/// Whether a payload is a full insert or a partial update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Insert,
    Patch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    pub table: &'static str,
    pub fields: Vec<FieldSpec>,
    pub indexes: Vec<IndexSpec>,
    pub relations: Vec<RelationSpec>,
}

impl EntitySchema {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            fields: Vec::new(),
            indexes: Vec::new(),
            relations: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn index(mut self, columns: &[&'static str]) -> Self {
        self.indexes.push(IndexSpec {
            columns: columns.to_vec(),
        });
        self
    }

    pub fn has_many(
        mut self,
        name: &'static str,
        from_column: &'static str,
        target_table: &'static str,
        target_column: &'static str,
    ) -> Self {
        self.relations.push(RelationSpec {
            name,
            kind: RelationKind::HasMany,
            from_column,
            target_table,
            target_column,
        });
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate a JSON payload before it reaches persistence.
    ///
    /// Fields are checked in declaration order, so the first failing field
    /// is the one reported. Unknown properties are ignored.
    pub fn validate(&self, payload: &Value, mode: ValidationMode) -> Result<(), SchemaValidationError> {
        let object: &Map<String, Value> = payload
            .as_object()
            .ok_or_else(|| SchemaValidationError::new(ROOT_FIELD, Constraint::Type))?;

        for field in &self.fields {
            match object.get(field.name) {
                None if mode == ValidationMode::Insert && field.required => {
                    return Err(SchemaValidationError::new(field.name, Constraint::Required));
                }
                Some(Value::Null) if mode == ValidationMode::Insert && field.required => {
                    return Err(SchemaValidationError::new(field.name, Constraint::Required));
                }
                None => {}
                Some(value) => field
                    .check(value)
                    .map_err(|constraint| SchemaValidationError::new(field.name, constraint))?,
            }
        }

        Ok(())
    }
}
