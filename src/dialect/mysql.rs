use crate::ast::Value;

use super::traits::SqlDialect;

/// MySQL dialect.
pub struct MysqlDialect;

impl SqlDialect for MysqlDialect {
    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn bool_literal(&self, value: bool) -> String {
        if value { "1".to_string() } else { "0".to_string() }
    }

    fn string_concat(&self, parts: &[String]) -> String {
        format!("CONCAT({})", parts.join(", "))
    }

    fn to_db_value(&self, value: &Value) -> Value {
        // MySQL has no native bool; comparisons go through tinyint.
        match value {
            Value::Bool(b) => Value::Int(*b as i64),
            other => other.clone(),
        }
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        match (limit, offset) {
            // MySQL requires LIMIT when OFFSET is present.
            (None, Some(n)) => format!(" LIMIT 18446744073709551615 OFFSET {}", n),
            (Some(l), Some(n)) => format!(" LIMIT {} OFFSET {}", l, n),
            (Some(l), None) => format!(" LIMIT {}", l),
            (None, None) => String::new(),
        }
    }
}
