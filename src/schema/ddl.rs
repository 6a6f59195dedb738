//! PostgreSQL DDL rendering for entity schemas

use super::{ColumnDefault, EntitySchema, FieldKind, FieldSpec, IndexSpec};

/// Quote an identifier, keeping camelCase column names intact
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn column_definition(field: &FieldSpec) -> String {
    let name = quote_ident(field.name);

    let mut def = match &field.kind {
        FieldKind::Serial => return format!("{} SERIAL PRIMARY KEY", name),
        FieldKind::Integer => format!("{} INTEGER", name),
        FieldKind::String { max_length, .. } => format!("{} VARCHAR({})", name, max_length),
        FieldKind::Enum(values) => {
            let allowed = values
                .iter()
                .map(|v| format!("'{}'", v.replace('\'', "''")))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} TEXT CHECK ({} IN ({}))", name, name, allowed)
        }
        FieldKind::DateTime => format!("{} TIMESTAMPTZ", name),
    };

    def.push_str(if field.nullable { " NULL" } else { " NOT NULL" });

    match field.default {
        ColumnDefault::None => {}
        ColumnDefault::Null => def.push_str(" DEFAULT NULL"),
        ColumnDefault::Now => def.push_str(" DEFAULT now()"),
    }

    def
}

/// Index name in the `<table>_<col>_index` form
pub fn index_name(table: &str, index: &IndexSpec) -> String {
    format!("{}_{}_index", table, index.columns.join("_"))
}

impl EntitySchema {
    /// Statements creating the table and its indexes.
    ///
    /// Both use `IF NOT EXISTS`, so a concurrent creator finishing first turns
    /// the later statements into no-ops.
    pub fn create_table_statements(&self) -> Vec<String> {
        let columns = self
            .fields
            .iter()
            .map(|f| format!("    {}", column_definition(f)))
            .collect::<Vec<_>>()
            .join(",\n");

        let mut statements = vec![format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
            quote_ident(self.table),
            columns
        )];

        for index in &self.indexes {
            let cols = index
                .columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ");
            statements.push(format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                quote_ident(&index_name(self.table, index)),
                quote_ident(self.table),
                cols
            ));
        }

        statements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("createdAt"), "\"createdAt\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_column_definitions() {
        assert_eq!(column_definition(&FieldSpec::serial("id")), "\"id\" SERIAL PRIMARY KEY");
        assert_eq!(
            column_definition(&FieldSpec::integer("project_id").required()),
            "\"project_id\" INTEGER NOT NULL"
        );
        assert_eq!(
            column_definition(&FieldSpec::string("company", 1, 255).nullable()),
            "\"company\" VARCHAR(255) NULL"
        );
        assert_eq!(
            column_definition(&FieldSpec::date_time("end_date").default_null()),
            "\"end_date\" TIMESTAMPTZ NULL DEFAULT NULL"
        );
        assert_eq!(
            column_definition(&FieldSpec::date_time("createdAt").default_now()),
            "\"createdAt\" TIMESTAMPTZ NOT NULL DEFAULT now()"
        );
        assert_eq!(
            column_definition(&FieldSpec::enumeration("status", &["on", "off"])),
            "\"status\" TEXT CHECK (\"status\" IN ('on', 'off')) NOT NULL"
        );
    }

    #[test]
    fn test_create_table_statements() {
        let schema = EntitySchema::new("things")
            .field(FieldSpec::serial("id"))
            .field(FieldSpec::enumeration("state", &["a", "b"]))
            .index(&["state"]);

        let statements = schema.create_table_statements();
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS \"things\" ("));
        assert!(statements[0].contains("\"id\" SERIAL PRIMARY KEY,\n"));
        assert_eq!(
            statements[1],
            "CREATE INDEX IF NOT EXISTS \"things_state_index\" ON \"things\" (\"state\")"
        );
    }
}
