use crate::ast::Value;

/// Escape a single-quoted SQL string literal.
pub fn escape_string(s: &str) -> String {
    s.replace('\'', "''")
}

/// Dialect provider consumed by the compiler.
///
/// Implementations are stateless and thread-safe; the compiler treats the
/// provider as an immutable shared singleton.
pub trait SqlDialect: Sync {
    /// Quote a bare identifier.
    fn quote_identifier(&self, name: &str) -> String;

    fn quote_table(&self, table: &str) -> String {
        self.quote_identifier(table)
    }

    fn quote_column(&self, column: &str) -> String {
        self.quote_identifier(column)
    }

    fn qualified_column(&self, table: &str, column: &str) -> String {
        format!("{}.{}", self.quote_table(table), self.quote_column(column))
    }

    /// Parameter token for an ordinal name ("0" -> "@0").
    fn param_token(&self, name: &str) -> String {
        format!("@{}", name)
    }

    /// Boolean literal as the engine stores it.
    fn bool_literal(&self, value: bool) -> String;

    /// Format a value as a quoted SQL literal. Used for diagnostics
    /// (merged-params rendering) and for left-hand constant operands;
    /// bound parameters are always preferred for user values.
    fn quote_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => self.bool_literal(*b),
            Value::Int(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::String(s) => format!("'{}'", escape_string(s)),
            Value::DateTime(dt) => format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S%.f")),
            Value::Uuid(u) => format!("'{}'", u),
            Value::Array(items) => items
                .iter()
                .map(|v| self.quote_value(v))
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Escape LIKE wildcard characters with `^`.
    fn escape_wildcards(&self, s: &str) -> String {
        s.replace('^', "^^").replace('%', "^%").replace('_', "^_")
    }

    /// String concatenation template.
    fn string_concat(&self, parts: &[String]) -> String;

    /// 1-indexed substring template.
    fn substring_sql(&self, expr: &str, start: i64, length: Option<i64>) -> String {
        match length {
            Some(len) => format!("substring({} from {} for {})", expr, start, len),
            None => format!("substring({} from {})", expr, start),
        }
    }

    fn cast_sql(&self, expr: &str, type_name: &str) -> String {
        format!("CAST({} AS {})", expr, type_name)
    }

    /// Best-match value conversion for comparisons against non-string
    /// columns. Default keeps the value as-is.
    fn to_db_value(&self, value: &Value) -> Value {
        value.clone()
    }

    /// LIMIT/OFFSET clause with a leading space, empty when both absent.
    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        let mut sql = String::new();
        if let Some(n) = limit {
            sql.push_str(&format!(" LIMIT {}", n));
        }
        if let Some(n) = offset {
            sql.push_str(&format!(" OFFSET {}", n));
        }
        sql
    }
}
