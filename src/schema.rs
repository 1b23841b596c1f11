//! Model metadata catalog.
//!
//! Maps an entity model to its table and column names. Definitions are
//! plain data and can be built in code or loaded from JSON.
//!
//! # Example
//! ```
//! use exprsql::schema::ModelDefinition;
//!
//! let json = r#"{
//!     "name": "Person",
//!     "table_name": "Person",
//!     "fields": [
//!         { "name": "Id", "column_name": "Id", "column_type": "Int", "primary_key": true },
//!         { "name": "Name", "column_name": "Name", "column_type": "Text" },
//!         { "name": "Age", "column_name": "Age", "column_type": "Int" }
//!     ]
//! }"#;
//!
//! let model: ModelDefinition = serde_json::from_str(json).unwrap();
//! assert_eq!(model.field_named("age").unwrap().column_name, "Age");
//! ```

use serde::{Deserialize, Serialize};
use strsim::levenshtein;

use crate::ast::Value;

/// Semantic column type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Bool,
    Int,
    Float,
    Decimal,
    Text,
    DateTime,
    Uuid,
    Blob,
}

/// Declared enumerated type of a column, with its storage representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    /// Variant names in declaration order (ordinal = position).
    pub variants: Vec<String>,
    /// True when the column stores the variant name, false when it stores
    /// the ordinal.
    pub stored_as_text: bool,
}

impl EnumDef {
    /// Coerce a bare literal to the enum's storage representation, so it
    /// compares correctly against the tagged column.
    pub fn coerce(&self, value: &Value) -> Value {
        match (self.stored_as_text, value) {
            (true, Value::Int(n)) => {
                let idx = *n as usize;
                match self.variants.get(idx) {
                    Some(name) => Value::String(name.clone()),
                    None => value.clone(),
                }
            }
            (false, Value::String(s)) => {
                match self.variants.iter().position(|v| v.eq_ignore_ascii_case(s)) {
                    Some(idx) => Value::Int(idx as i64),
                    None => value.clone(),
                }
            }
            _ => value.clone(),
        }
    }
}

/// One column of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Model-side field name.
    pub name: String,
    /// Physical column name.
    pub column_name: String,
    pub column_type: ColumnType,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    /// Declared enum type, when the column is enumerated.
    #[serde(default)]
    pub enum_def: Option<EnumDef>,
    /// Custom per-column SQL override used in place of the quoted column.
    #[serde(default)]
    pub custom_select: Option<String>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        let name = name.into();
        Self {
            column_name: name.clone(),
            name,
            column_type,
            nullable: false,
            primary_key: false,
            enum_def: None,
            custom_select: None,
        }
    }

    pub fn column(mut self, column_name: impl Into<String>) -> Self {
        self.column_name = column_name.into();
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn enumerated(mut self, def: EnumDef) -> Self {
        self.enum_def = Some(def);
        self
    }

    pub fn custom_select(mut self, sql: impl Into<String>) -> Self {
        self.custom_select = Some(sql.into());
        self
    }
}

/// An entity model: table name plus ordered field definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    pub table_name: String,
    pub fields: Vec<FieldDefinition>,
}

impl ModelDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            table_name: name.clone(),
            name,
            fields: Vec::new(),
        }
    }

    pub fn table(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Exact case-insensitive field lookup.
    pub fn field_named(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Lookup by physical column name, case-insensitive.
    pub fn field_by_column(&self, column: &str) -> Option<&FieldDefinition> {
        self.fields
            .iter()
            .find(|f| f.column_name.eq_ignore_ascii_case(column))
    }

    /// The primary key field, defaulting to the first declared field.
    pub fn primary_field(&self) -> Option<&FieldDefinition> {
        self.fields
            .iter()
            .find(|f| f.primary_key)
            .or_else(|| self.fields.first())
    }

    /// Closest field name by edit distance, for error suggestions.
    pub fn suggest_field(&self, name: &str) -> Option<String> {
        self.fields
            .iter()
            .map(|f| (levenshtein(&name.to_lowercase(), &f.name.to_lowercase()), f))
            .filter(|(d, _)| *d <= 2)
            .min_by_key(|(d, _)| *d)
            .map(|(_, f)| f.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> ModelDefinition {
        ModelDefinition::new("Person")
            .field(FieldDefinition::new("Id", ColumnType::Int).primary_key())
            .field(FieldDefinition::new("Name", ColumnType::Text))
            .field(FieldDefinition::new("Age", ColumnType::Int))
    }

    #[test]
    fn test_field_lookup_case_insensitive() {
        let m = person();
        assert!(m.field_named("age").is_some());
        assert!(m.field_named("AGE").is_some());
        assert!(m.field_named("ages").is_none());
    }

    #[test]
    fn test_suggest_field() {
        let m = person();
        assert_eq!(m.suggest_field("Nmae"), Some("Name".to_string()));
        assert_eq!(m.suggest_field("zzzzzz"), None);
    }

    #[test]
    fn test_enum_coercion() {
        let def = EnumDef {
            name: "State".into(),
            variants: vec!["Draft".into(), "Active".into()],
            stored_as_text: true,
        };
        assert_eq!(def.coerce(&Value::Int(1)), Value::String("Active".into()));

        let ordinal = EnumDef {
            stored_as_text: false,
            ..def
        };
        assert_eq!(ordinal.coerce(&Value::String("active".into())), Value::Int(1));
    }

    #[test]
    fn test_primary_field_fallback() {
        let m = ModelDefinition::new("Bare").field(FieldDefinition::new("A", ColumnType::Text));
        assert_eq!(m.primary_field().map(|f| f.name.as_str()), Some("A"));
    }
}
