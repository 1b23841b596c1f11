use super::traits::SqlDialect;

/// PostgreSQL dialect.
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn bool_literal(&self, value: bool) -> String {
        if value { "TRUE".to_string() } else { "FALSE".to_string() }
    }

    fn string_concat(&self, parts: &[String]) -> String {
        format!("({})", parts.join(" || "))
    }
}
