//! Tree walk dispatch.
//!
//! Compilation threads an immutable [`VisitCtx`] through the walk: the
//! operand separator ("Age" > @0 vs "Age">@0 in list positions) and
//! whether member access resolves to column names or stays symbolic.

use crate::ast::{Expr, Value};
use crate::error::{SqlError, SqlResult};
use crate::schema::FieldDefinition;

use super::fragment::{Fragment, SelectItem};
use super::{FALSE_LITERAL, SqlExpression, TRUE_LITERAL};

/// Operand separator in rendered binary expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sep {
    /// Filter position: space around operators.
    Space,
    /// List position (SELECT/GROUP BY/ORDER BY): compact.
    None,
}

impl Sep {
    pub(crate) fn text(self) -> &'static str {
        match self {
            Sep::Space => " ",
            Sep::None => "",
        }
    }
}

/// Per-walk compile context, copied (never mutated) on descent.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VisitCtx {
    pub sep: Sep,
    /// Resolve members to quoted column names. Off only when extracting
    /// bare member names for field lists.
    pub use_field_name: bool,
}

impl VisitCtx {
    pub(crate) fn predicate() -> Self {
        Self {
            sep: Sep::Space,
            use_field_name: true,
        }
    }

    pub(crate) fn list() -> Self {
        Self {
            sep: Sep::None,
            use_field_name: true,
        }
    }

    pub(crate) fn names_only() -> Self {
        Self {
            sep: Sep::None,
            use_field_name: false,
        }
    }
}

impl SqlExpression {
    pub(crate) fn visit(&mut self, e: &Expr, ctx: VisitCtx) -> SqlResult<Fragment> {
        match e {
            Expr::Lambda(body) => self.visit_lambda(body, ctx),
            Expr::Value(Value::Null) => Ok(Fragment::Sql("null".to_string())),
            Expr::Value(v) => Ok(Fragment::Value(v.clone())),
            Expr::Field { entity, name } => self.visit_field(entity.as_deref(), name, ctx),
            Expr::Row(binding) => Ok(self.visit_row(binding)),
            Expr::Binary { op, left, right } => self.visit_binary(*op, left, right, ctx),
            Expr::Unary { op, operand } => self.visit_unary(*op, operand, ctx),
            Expr::Call {
                object,
                method,
                args,
            } => self.visit_call(object.as_deref(), *method, args, ctx),
            Expr::Func(f) => self.visit_sql_func(f, ctx),
            Expr::Cond {
                test,
                if_true,
                if_false,
            } => self.visit_conditional(test, if_true, if_false, ctx),
            Expr::Object(fields) => self.visit_object(fields, ctx),
            Expr::Array(items) => self.visit_array(items, ctx),
            Expr::Index { object, index } => self.visit_index(object, index),
        }
    }

    /// Lambda body in filter position. A bare boolean member becomes an
    /// explicit comparison; a boolean conditional gets one appended.
    pub(crate) fn visit_lambda(&mut self, body: &Expr, ctx: VisitCtx) -> SqlResult<Fragment> {
        if ctx.sep == Sep::Space {
            if self.is_bool_field(body) {
                let frag = self.visit(body, ctx)?;
                let text = frag.sql_text(self.provider());
                return Ok(Fragment::Sql(format!("{}={}", text, self.quoted_true())));
            }
            if matches!(body, Expr::Cond { .. }) && self.expr_is_bool(body) {
                let frag = self.visit(body, ctx)?;
                if let Fragment::Value(v) = &frag {
                    return Ok(match v.as_bool() {
                        Some(true) => Fragment::Sql(TRUE_LITERAL.to_string()),
                        Some(false) => Fragment::Sql(FALSE_LITERAL.to_string()),
                        None => frag,
                    });
                }
                let text = frag.sql_text(self.provider());
                return Ok(Fragment::Sql(format!("{}={}", text, self.quoted_true())));
            }
        }
        self.visit(body, ctx)
    }

    fn visit_field(&mut self, entity: Option<&str>, name: &str, ctx: VisitCtx) -> SqlResult<Fragment> {
        if !ctx.use_field_name {
            return Ok(Fragment::Sql(name.to_string()));
        }
        let d = self.provider();
        match self.resolve_field(entity, name) {
            Some((model, fd)) => {
                if let Some(custom) = &fd.custom_select {
                    return Ok(Fragment::Sql(custom.clone()));
                }
                let sql = if self.prefix_field_with_table_name {
                    d.qualified_column(&model.table_name, &fd.column_name)
                } else {
                    d.quote_column(&fd.column_name)
                };
                Ok(match &fd.enum_def {
                    Some(def) => Fragment::EnumColumn {
                        sql,
                        def: def.clone(),
                    },
                    None => Fragment::Sql(sql),
                })
            }
            None => Err(SqlError::UnknownField {
                model: entity.unwrap_or(&self.model.name).to_string(),
                field: name.to_string(),
                suggestion: self.suggest_across(name),
            }),
        }
    }

    /// A whole row binding projects every column of its model.
    fn visit_row(&self, binding: &str) -> Fragment {
        let model = self.model_for_binding(binding);
        let d = self.provider();
        let quoted_table = self
            .prefix_field_with_table_name
            .then(|| d.quote_table(&model.table_name));
        let items = model
            .fields
            .iter()
            .map(|fd: &FieldDefinition| match &fd.custom_select {
                Some(custom) => SelectItem::Expr {
                    sql: custom.clone(),
                    alias: Some(fd.name.clone()),
                },
                None => SelectItem::Column {
                    quoted_table: quoted_table.clone(),
                    column: fd.column_name.clone(),
                    alias: None,
                },
            })
            .collect();
        Fragment::Projection(items)
    }

    fn visit_conditional(
        &mut self,
        test: &Expr,
        if_true: &Expr,
        if_false: &Expr,
        ctx: VisitCtx,
    ) -> SqlResult<Fragment> {
        // A constant test folds to the taken branch.
        if let Some(b) = self.constant_value(test).and_then(|v| v.as_bool()) {
            let branch = if b { if_true } else { if_false };
            let frag = self.visit(branch, ctx)?;
            return Ok(match frag {
                Fragment::Value(v) if ctx.sep == Sep::Space => Fragment::Sql(self.add_param(v)),
                other => other,
            });
        }
        let test_sql = if self.is_bool_field(test) {
            let frag = self.visit(test, ctx)?;
            format!("{}={}", frag.sql_text(self.provider()), self.quoted_true())
        } else {
            let frag = self.visit(test, ctx)?;
            match frag {
                Fragment::Value(v) => self.add_param(v),
                f => f.sql_text(self.provider()),
            }
        };
        let when_true = self.branch_sql(if_true, ctx)?;
        let when_false = self.branch_sql(if_false, ctx)?;
        Ok(Fragment::Sql(format!(
            "(CASE WHEN {} THEN {} ELSE {} END)",
            test_sql, when_true, when_false
        )))
    }

    fn branch_sql(&mut self, e: &Expr, ctx: VisitCtx) -> SqlResult<String> {
        let frag = self.visit(e, ctx)?;
        Ok(match frag {
            Fragment::Value(v) => self.add_param(v),
            // A boolean sub-predicate is not a value; wrap it so the CASE
            // yields one.
            f if self.expr_is_bool(e) && !self.is_bool_field(e) => format!(
                "(CASE WHEN {} THEN {} ELSE {} END)",
                f.sql_text(self.provider()),
                self.quoted_true(),
                self.quoted_false()
            ),
            f => f.sql_text(self.provider()),
        })
    }

    fn visit_array(&mut self, items: &[Expr], ctx: VisitCtx) -> SqlResult<Fragment> {
        let d = self.provider();
        let mut values = Vec::with_capacity(items.len());
        let mut texts = Vec::with_capacity(items.len());
        let mut all_values = true;
        for item in items {
            match self.visit(item, ctx)? {
                Fragment::Value(v) => {
                    texts.push(d.quote_value(&v));
                    values.push(v);
                }
                f => {
                    all_values = false;
                    texts.push(f.sql_text(d));
                }
            }
        }
        if all_values {
            Ok(Fragment::Value(Value::Array(values)))
        } else {
            Ok(Fragment::Sql(texts.join(",")))
        }
    }

    fn visit_index(&mut self, object: &Expr, index: &Expr) -> SqlResult<Fragment> {
        let collection = self
            .constant_value(object)
            .ok_or_else(|| SqlError::Eval(object.describe()))?;
        let idx = self
            .constant_value(index)
            .and_then(|v| v.as_int())
            .ok_or_else(|| SqlError::Eval(index.describe()))?;
        match collection {
            Value::Array(items) => items
                .get(idx as usize)
                .cloned()
                .map(Fragment::Value)
                .ok_or_else(|| SqlError::Eval(format!("index {} out of bounds", idx))),
            other => Err(SqlError::Eval(format!("indexer into non-array {}", other))),
        }
    }

    /// Bare member names of a field-list expression (`x.Name`, or an
    /// anonymous object of members).
    pub(crate) fn member_names(&mut self, e: &Expr) -> SqlResult<Vec<String>> {
        let ctx = VisitCtx::names_only();
        match e {
            Expr::Lambda(body) => self.member_names(body),
            Expr::Object(fields) => {
                let mut names = Vec::with_capacity(fields.len());
                for (_, arg) in fields {
                    let frag = self.visit(arg, ctx)?;
                    names.push(frag.sql_text(self.provider()));
                }
                Ok(names)
            }
            other => {
                let frag = self.visit(other, ctx)?;
                Ok(vec![frag.sql_text(self.provider())])
            }
        }
    }
}
