use crate::ast::Value;

use super::traits::SqlDialect;

/// SQLite dialect.
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn bool_literal(&self, value: bool) -> String {
        if value { "1".to_string() } else { "0".to_string() }
    }

    fn string_concat(&self, parts: &[String]) -> String {
        format!("({})", parts.join(" || "))
    }

    fn substring_sql(&self, expr: &str, start: i64, length: Option<i64>) -> String {
        match length {
            Some(len) => format!("substr({},{},{})", expr, start, len),
            None => format!("substr({},{})", expr, start),
        }
    }

    fn to_db_value(&self, value: &Value) -> Value {
        match value {
            Value::Bool(b) => Value::Int(*b as i64),
            Value::Uuid(u) => Value::String(u.to_string()),
            other => other.clone(),
        }
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        match (limit, offset) {
            // SQLite requires LIMIT when OFFSET is present; -1 is unbounded.
            (None, Some(n)) => format!(" LIMIT -1 OFFSET {}", n),
            (Some(l), Some(n)) => format!(" LIMIT {} OFFSET {}", l, n),
            (Some(l), None) => format!(" LIMIT {}", l),
            (None, None) => String::new(),
        }
    }
}
