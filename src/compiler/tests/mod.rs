//! Compiler test modules.
//!
//! Tests are organized by category:
//! - `core`: statement assembly (SELECT, COUNT, UPDATE, DELETE, joins)
//! - `predicates`: operator compilation and boolean normalization
//! - `methods`: membership, string operators, `Sql` helper functions
//! - `projection`: select lists, anonymous objects, ordering
//! - `params`: parameter store, raw fragments, merged rendering

mod methods;
mod params;
mod predicates;
mod projection;

use crate::prelude::*;

pub(crate) fn person() -> ModelDefinition {
    ModelDefinition::new("Person")
        .field(FieldDefinition::new("Id", ColumnType::Int).primary_key())
        .field(FieldDefinition::new("Name", ColumnType::Text))
        .field(FieldDefinition::new("Age", ColumnType::Int))
        .field(FieldDefinition::new("Active", ColumnType::Bool))
        .field(FieldDefinition::new("Email", ColumnType::Text).nullable())
        .field(FieldDefinition::new("State", ColumnType::Text).enumerated(EnumDef {
            name: "State".to_string(),
            variants: vec!["Draft".to_string(), "Active".to_string()],
            stored_as_text: true,
        }))
}

pub(crate) fn department() -> ModelDefinition {
    ModelDefinition::new("Department")
        .field(FieldDefinition::new("Id", ColumnType::Int).primary_key())
        .field(FieldDefinition::new("Name", ColumnType::Text))
}

pub(crate) fn q() -> SqlExpression {
    SqlExpression::new(person())
}

pub(crate) const PERSON_COLS: &str =
    "\"Id\", \"Name\", \"Age\", \"Active\", \"Email\", \"State\"";
