use serde::{Deserialize, Serialize};

use super::operators::{BinaryOp, UnaryOp};
use super::values::Value;

/// A fully compiled nested statement embedded in an outer predicate
/// (`Sql::in_select`). Carries its own parameter list so the outer compiler
/// can renumber and absorb it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubSelect {
    pub sql: String,
    pub params: Vec<crate::compiler::Param>,
}

/// Argument of the membership helper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InValues {
    /// Host passed a null collection; compiles to the false literal.
    Null,
    /// In-memory value set, parameterized element by element.
    Values(Vec<Value>),
    /// Nested compiled sub-statement, inlined with renumbered parameters.
    Select(SubSelect),
}

/// Instance methods recognized on a compiled column expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    Trim,
    TrimStart,
    TrimEnd,
    Upper,
    Lower,
    StartsWith,
    EndsWith,
    Contains,
    Substring,
    Equals,
    ToStr,
    Length,
}

/// Query helper functions with fixed SQL templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlFunc {
    /// `col IN (...)` over an in-memory set or a sub-select
    In { column: Box<Expr>, values: InValues },
    /// `expr DESC` (ORDER BY keys)
    Desc(Box<Expr>),
    /// `expr AS alias`
    As { expr: Box<Expr>, alias: String },
    /// Dialect cast template
    Cast { expr: Box<Expr>, type_name: String },
    Sum(Box<Expr>),
    Count(Box<Expr>),
    Min(Box<Expr>),
    Max(Box<Expr>),
    Avg(Box<Expr>),
    /// `COUNT(DISTINCT expr)`
    CountDistinct(Box<Expr>),
    /// `"Table".*` for the named row binding
    AllFields(String),
    /// Re-qualify a column under a join alias
    JoinAlias { expr: Box<Expr>, alias: String },
    /// Uninterpreted SQL text, trusted as-is (advanced callers)
    Custom(String),
}

impl SqlFunc {
    /// Helpers that already carry ordering/aliasing semantics and must not
    /// receive an extra projection alias.
    pub(crate) fn is_ordering_or_alias(&self) -> bool {
        matches!(
            self,
            SqlFunc::Desc(_) | SqlFunc::As { .. } | SqlFunc::AllFields(_)
        )
    }
}

/// One node of a predicate tree.
///
/// The tree is immutable once built; the compiler walks it and never
/// mutates it. Constant sub-expressions are embedded as [`Expr::Value`]
/// by the host's capture mechanism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A literal constant
    Value(Value),
    /// Access to a model field. `entity` names a joined model when the
    /// field does not belong to the primary one.
    Field {
        entity: Option<String>,
        name: String,
    },
    /// The whole row binding (whole-table projection)
    Row(String),
    /// Binary expression
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary expression
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Method call: instance form carries the receiver in `object`,
    /// static form leaves it `None`.
    Call {
        object: Option<Box<Expr>>,
        method: Method,
        args: Vec<Expr>,
    },
    /// Query helper function
    Func(SqlFunc),
    /// Conditional (test ? if_true : if_false)
    Cond {
        test: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },
    /// Anonymous named-field object construction (projections)
    Object(Vec<(String, Expr)>),
    /// Array construction from sub-expressions
    Array(Vec<Expr>),
    /// Indexer access into a constant collection
    Index { object: Box<Expr>, index: Box<Expr> },
    /// Function wrapper around a predicate body
    Lambda(Box<Expr>),
}

impl Expr {
    pub fn value(v: impl Into<Value>) -> Self {
        Expr::Value(v.into())
    }

    pub fn null() -> Self {
        Expr::Value(Value::Null)
    }

    pub fn field(name: impl Into<String>) -> Self {
        Expr::Field {
            entity: None,
            name: name.into(),
        }
    }

    pub fn joined_field(entity: impl Into<String>, name: impl Into<String>) -> Self {
        Expr::Field {
            entity: Some(entity.into()),
            name: name.into(),
        }
    }

    pub fn row(binding: impl Into<String>) -> Self {
        Expr::Row(binding.into())
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Eq, left, right)
    }

    pub fn ne(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Ne, left, right)
    }

    pub fn gt(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Gt, left, right)
    }

    pub fn ge(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Ge, left, right)
    }

    pub fn lt(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Lt, left, right)
    }

    pub fn le(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Le, left, right)
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::And, left, right)
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Or, left, right)
    }

    pub fn add(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Add, left, right)
    }

    pub fn not(operand: Expr) -> Self {
        Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        }
    }

    pub fn neg(operand: Expr) -> Self {
        Expr::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(operand),
        }
    }

    pub fn call(object: Expr, method: Method, args: Vec<Expr>) -> Self {
        Expr::Call {
            object: Some(Box::new(object)),
            method,
            args,
        }
    }

    pub fn static_call(method: Method, args: Vec<Expr>) -> Self {
        Expr::Call {
            object: None,
            method,
            args,
        }
    }

    pub fn cond(test: Expr, if_true: Expr, if_false: Expr) -> Self {
        Expr::Cond {
            test: Box::new(test),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        }
    }

    pub fn lambda(body: Expr) -> Self {
        Expr::Lambda(Box::new(body))
    }

    pub fn object<S: Into<String>>(fields: Vec<(S, Expr)>) -> Self {
        Expr::Object(fields.into_iter().map(|(n, e)| (n.into(), e)).collect())
    }

    /// Best-effort literal rendering of a node, used for diagnostics only.
    pub fn describe(&self) -> String {
        match self {
            Expr::Value(v) => v.to_string(),
            Expr::Field { entity, name } => match entity {
                Some(e) => format!("{}.{}", e, name),
                None => name.clone(),
            },
            Expr::Row(b) => b.clone(),
            Expr::Binary { op, left, right } => {
                format!("({} {} {})", left.describe(), op, right.describe())
            }
            Expr::Unary { op, operand } => format!("{:?}({})", op, operand.describe()),
            Expr::Call { method, .. } => format!("{:?}(..)", method),
            Expr::Func(f) => format!("{:?}", f),
            Expr::Cond { test, .. } => format!("({} ? .. : ..)", test.describe()),
            Expr::Object(fields) => format!("new {{ {} fields }}", fields.len()),
            Expr::Array(items) => format!("[{} items]", items.len()),
            Expr::Index { object, .. } => format!("{}[..]", object.describe()),
            Expr::Lambda(body) => body.describe(),
        }
    }
}

/// Builders for the query helper functions, namespaced the way hosts
/// write them: `Sql::count`, `Sql::in_values`, ...
pub struct Sql;

impl Sql {
    pub fn in_values(column: Expr, values: Vec<Value>) -> Expr {
        Expr::Func(SqlFunc::In {
            column: Box::new(column),
            values: InValues::Values(values),
        })
    }

    pub fn in_select(column: Expr, sub: SubSelect) -> Expr {
        Expr::Func(SqlFunc::In {
            column: Box::new(column),
            values: InValues::Select(sub),
        })
    }

    pub fn in_null(column: Expr) -> Expr {
        Expr::Func(SqlFunc::In {
            column: Box::new(column),
            values: InValues::Null,
        })
    }

    pub fn desc(expr: Expr) -> Expr {
        Expr::Func(SqlFunc::Desc(Box::new(expr)))
    }

    pub fn alias(expr: Expr, alias: impl Into<String>) -> Expr {
        Expr::Func(SqlFunc::As {
            expr: Box::new(expr),
            alias: alias.into(),
        })
    }

    pub fn cast(expr: Expr, type_name: impl Into<String>) -> Expr {
        Expr::Func(SqlFunc::Cast {
            expr: Box::new(expr),
            type_name: type_name.into(),
        })
    }

    pub fn sum(expr: Expr) -> Expr {
        Expr::Func(SqlFunc::Sum(Box::new(expr)))
    }

    pub fn count(expr: Expr) -> Expr {
        Expr::Func(SqlFunc::Count(Box::new(expr)))
    }

    pub fn count_star() -> Expr {
        Self::count(Expr::value("*"))
    }

    pub fn min(expr: Expr) -> Expr {
        Expr::Func(SqlFunc::Min(Box::new(expr)))
    }

    pub fn max(expr: Expr) -> Expr {
        Expr::Func(SqlFunc::Max(Box::new(expr)))
    }

    pub fn avg(expr: Expr) -> Expr {
        Expr::Func(SqlFunc::Avg(Box::new(expr)))
    }

    pub fn count_distinct(expr: Expr) -> Expr {
        Expr::Func(SqlFunc::CountDistinct(Box::new(expr)))
    }

    pub fn all_fields(binding: impl Into<String>) -> Expr {
        Expr::Func(SqlFunc::AllFields(binding.into()))
    }

    pub fn join_alias(expr: Expr, alias: impl Into<String>) -> Expr {
        Expr::Func(SqlFunc::JoinAlias {
            expr: Box::new(expr),
            alias: alias.into(),
        })
    }

    pub fn custom(sql: impl Into<String>) -> Expr {
        Expr::Func(SqlFunc::Custom(sql.into()))
    }
}
