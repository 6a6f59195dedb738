//! Entity registry with two-phase initialisation
//!
//! Entities register their shape first; cross-entity relations are resolved
//! in a second pass once every entity is known. Entity modules therefore
//! never need each other at definition time.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use super::{EntitySchema, RelationKind};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("entity `{0}` is already registered")]
    Duplicate(String),

    #[error("relation `{relation}` on `{table}` cannot be resolved: {reason}")]
    UnresolvedRelation {
        table: String,
        relation: String,
        reason: String,
    },
}

/// Relation with both ends checked against registered entities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelation {
    pub name: &'static str,
    pub kind: RelationKind,
    pub source_table: &'static str,
    pub source_column: &'static str,
    pub target_table: &'static str,
    pub target_column: &'static str,
}

/// Entity schema together with its resolved relations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub schema: EntitySchema,
    pub relations: Vec<ResolvedRelation>,
}

impl ModelDescriptor {
    pub fn relation(&self, name: &str) -> Option<&ResolvedRelation> {
        self.relations.iter().find(|r| r.name == name)
    }
}

/// First phase: collects entity shapes
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: BTreeMap<&'static str, EntitySchema>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, schema: EntitySchema) -> Result<(), RegistryError> {
        if self.entities.contains_key(schema.table) {
            return Err(RegistryError::Duplicate(schema.table.to_string()));
        }
        tracing::debug!(table = schema.table, "Registered entity");
        self.entities.insert(schema.table, schema);
        Ok(())
    }

    pub fn contains(&self, table: &str) -> bool {
        self.entities.contains_key(table)
    }

    /// Second phase: resolve every declared relation and freeze the registry
    pub fn resolve(self) -> Result<ResolvedRegistry, RegistryError> {
        let mut models = BTreeMap::new();

        for (table, schema) in &self.entities {
            let mut relations = Vec::with_capacity(schema.relations.len());

            for relation in &schema.relations {
                let unresolved = |reason: String| RegistryError::UnresolvedRelation {
                    table: table.to_string(),
                    relation: relation.name.to_string(),
                    reason,
                };

                if schema.get_field(relation.from_column).is_none() {
                    return Err(unresolved(format!("no column `{}`", relation.from_column)));
                }

                let target = self.entities.get(relation.target_table).ok_or_else(|| {
                    unresolved(format!("entity `{}` is not registered", relation.target_table))
                })?;

                if target.get_field(relation.target_column).is_none() {
                    return Err(unresolved(format!(
                        "no column `{}` on `{}`",
                        relation.target_column, relation.target_table
                    )));
                }

                relations.push(ResolvedRelation {
                    name: relation.name,
                    kind: relation.kind,
                    source_table: schema.table,
                    source_column: relation.from_column,
                    target_table: relation.target_table,
                    target_column: relation.target_column,
                });
            }

            models.insert(
                *table,
                Arc::new(ModelDescriptor {
                    schema: schema.clone(),
                    relations,
                }),
            );
        }

        tracing::debug!(entities = models.len(), "Resolved entity relations");
        Ok(ResolvedRegistry { models })
    }
}

/// Second phase output: immutable model descriptors keyed by table
#[derive(Debug, Clone)]
pub struct ResolvedRegistry {
    models: BTreeMap<&'static str, Arc<ModelDescriptor>>,
}

impl ResolvedRegistry {
    pub fn model(&self, table: &str) -> Option<Arc<ModelDescriptor>> {
        self.models.get(table).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;

    fn parent() -> EntitySchema {
        EntitySchema::new("parent")
            .field(FieldSpec::serial("id"))
            .has_many("children", "id", "child", "parent_id")
    }

    fn child() -> EntitySchema {
        EntitySchema::new("child")
            .field(FieldSpec::serial("id"))
            .field(FieldSpec::integer("parent_id"))
    }

    #[test]
    fn test_resolve_in_any_registration_order() {
        for order in [[parent(), child()], [child(), parent()]] {
            let mut registry = EntityRegistry::new();
            for schema in order {
                registry.register(schema).unwrap();
            }
            let resolved = registry.resolve().unwrap();
            let model = resolved.model("parent").unwrap();
            let relation = model.relation("children").unwrap();
            assert_eq!(relation.source_column, "id");
            assert_eq!(relation.target_table, "child");
            assert_eq!(relation.target_column, "parent_id");
            assert!(resolved.model("child").unwrap().relations.is_empty());
        }
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = EntityRegistry::new();
        registry.register(child()).unwrap();
        assert_eq!(
            registry.register(child()),
            Err(RegistryError::Duplicate("child".to_string()))
        );
    }

    #[test]
    fn test_missing_target_entity() {
        let mut registry = EntityRegistry::new();
        registry.register(parent()).unwrap();
        let err = registry.resolve().unwrap_err();
        assert!(matches!(err, RegistryError::UnresolvedRelation { ref relation, .. } if relation == "children"));
    }

    #[test]
    fn test_missing_target_column() {
        let mut registry = EntityRegistry::new();
        registry.register(parent()).unwrap();
        registry
            .register(EntitySchema::new("child").field(FieldSpec::serial("id")))
            .unwrap();
        assert!(matches!(
            registry.resolve(),
            Err(RegistryError::UnresolvedRelation { .. })
        ));
    }
}
