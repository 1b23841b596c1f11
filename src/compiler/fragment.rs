use serde::{Deserialize, Serialize};

use crate::ast::Value;
use crate::dialect::SqlDialect;
use crate::schema::EnumDef;

/// One item of a projection list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectItem {
    /// A column reference; names are unquoted, the table prefix is already
    /// quoted when present.
    Column {
        quoted_table: Option<String>,
        column: String,
        alias: Option<String>,
    },
    /// An already-rendered SQL expression.
    Expr { sql: String, alias: Option<String> },
}

impl SelectItem {
    pub fn alias(&self) -> Option<&str> {
        match self {
            SelectItem::Column { alias, .. } | SelectItem::Expr { alias, .. } => alias.as_deref(),
        }
    }

    pub fn set_alias(&mut self, new_alias: Option<String>) {
        match self {
            SelectItem::Column { alias, .. } | SelectItem::Expr { alias, .. } => *alias = new_alias,
        }
    }

    pub fn render(&self, dialect: &dyn SqlDialect) -> String {
        match self {
            SelectItem::Column {
                quoted_table,
                column,
                alias,
            } => {
                let mut text = dialect.quote_column(column);
                if let Some(t) = quoted_table {
                    text = format!("{}.{}", t, text);
                }
                if let Some(a) = alias {
                    text = format!("{} AS {}", text, dialect.quote_identifier(a));
                }
                text
            }
            SelectItem::Expr { sql, alias } => match alias {
                Some(a) => format!("{} AS {}", sql, dialect.quote_identifier(a)),
                None => sql.clone(),
            },
        }
    }
}

/// The typed result of compiling a predicate node.
///
/// `Sql` text is trusted and never re-escaped or re-parameterized; a
/// `Value` is opaque and must cross through the parameter store (or the
/// dialect's literal quoting) before it may appear in output.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Syntactically valid SQL text, placeholders already substituted.
    Sql(String),
    /// A column reference tagged with its declared enumerated type.
    EnumColumn { sql: String, def: EnumDef },
    /// Ordered projection items; only SELECT/GROUP BY/ORDER BY targets.
    Projection(Vec<SelectItem>),
    /// A value not yet converted to SQL.
    Value(Value),
}

impl Fragment {
    /// Whether the fragment is already SQL text (projection lists count).
    pub fn is_sql(&self) -> bool {
        !matches!(self, Fragment::Value(_))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Fragment::Value(v) => Some(v),
            _ => None,
        }
    }

    /// The fragment's SQL text. A `Value` renders with its literal
    /// `Display` form; callers on the output path must parameterize
    /// values instead of using this.
    pub fn sql_text(&self, dialect: &dyn SqlDialect) -> String {
        match self {
            Fragment::Sql(s) => s.clone(),
            Fragment::EnumColumn { sql, .. } => sql.clone(),
            Fragment::Projection(items) => items
                .iter()
                .map(|i| i.render(dialect))
                .collect::<Vec<_>>()
                .join(", "),
            Fragment::Value(v) => v.to_string(),
        }
    }

    /// The compiled `null` literal marker.
    pub fn is_null_text(&self) -> bool {
        match self {
            Fragment::Sql(s) => s.eq_ignore_ascii_case("null"),
            _ => false,
        }
    }
}
