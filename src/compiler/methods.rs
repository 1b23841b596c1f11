//! Method-call translation: membership tests, string operators, and the
//! `Sql` helper functions.
//!
//! `LIKE` comparisons are emitted without surrounding parentheses; the
//! enclosing logical operator, if any, supplies its own grouping.

use regex::Regex;

use crate::ast::{Expr, InValues, Method, SqlFunc, SubSelect, Value};
use crate::error::{SqlError, SqlResult};
use crate::schema::EnumDef;

use super::fragment::Fragment;
use super::{FALSE_LITERAL, Param, SqlExpression, VisitCtx};

impl SqlExpression {
    pub(crate) fn visit_call(
        &mut self,
        object: Option<&Expr>,
        method: Method,
        args: &[Expr],
        ctx: VisitCtx,
    ) -> SqlResult<Fragment> {
        // Contains over a constant collection is a membership test, in
        // both its static (set, item) and instance set.Contains(item)
        // shapes.
        if method == Method::Contains {
            if object.is_none() && args.len() == 2 {
                if let Some(set) = self.constant_value(&args[0]) {
                    return self.membership(&set, &args[1], ctx);
                }
            }
            if let Some(obj) = object {
                if args.len() == 1 {
                    if let Some(set @ (Value::Array(_) | Value::Null)) = self.constant_value(obj) {
                        return self.membership(&set, &args[0], ctx);
                    }
                }
            }
        }
        if let Some(obj) = object {
            let frag = self.visit(obj, ctx)?;
            if frag.is_sql() {
                return self.column_method(frag, method, args);
            }
        }
        // The receiver never reached a column: evaluate the whole call in
        // memory, via the host hook.
        let call = Expr::Call {
            object: object.map(|o| Box::new(o.clone())),
            method,
            args: args.to_vec(),
        };
        match self.constant_value(&call) {
            Some(v) => Ok(Fragment::Value(v)),
            None => Err(SqlError::unsupported(format!("method call {:?}", method))),
        }
    }

    fn membership(&mut self, set: &Value, item: &Expr, ctx: VisitCtx) -> SqlResult<Fragment> {
        let col = self.visit(item, ctx)?;
        let col_sql = col.sql_text(self.provider());
        let enum_def = match &col {
            Fragment::EnumColumn { def, .. } => Some(def.clone()),
            _ => None,
        };
        match set {
            Value::Null => Ok(Fragment::Sql(FALSE_LITERAL.to_string())),
            Value::Array(items) => Ok(self.in_list(&col_sql, items, enum_def.as_ref())),
            other => Err(SqlError::unsupported(format!(
                "membership over non-collection {}",
                other
            ))),
        }
    }

    /// `col IN (@n,...)`; an empty set can match nothing and collapses to
    /// the false literal.
    fn in_list(&mut self, column_sql: &str, items: &[Value], enum_def: Option<&EnumDef>) -> Fragment {
        let mut names = Vec::new();
        for v in flatten(items) {
            let v = match enum_def {
                Some(def) => def.coerce(&v),
                None => v,
            };
            names.push(self.add_param(v));
        }
        if names.is_empty() {
            return Fragment::Sql(FALSE_LITERAL.to_string());
        }
        Fragment::Sql(format!("{} IN ({})", column_sql, names.join(",")))
    }

    /// Inline a compiled sub-select, renumbering its parameters into the
    /// outer store. Renames run highest ordinal first so `@1` cannot
    /// rewrite the tail of `@10`.
    fn inline_sub_select(&mut self, column_sql: &str, sub: &SubSelect) -> SqlResult<Fragment> {
        let d = self.provider();
        let mut sql = sub.sql.clone();
        let mut renames = Vec::new();
        for p in &sub.params {
            let new_name = d.param_token(&self.params.len().to_string());
            if new_name != p.name {
                renames.push((p.name.clone(), new_name.clone()));
            }
            self.params.push(Param {
                name: new_name,
                value: p.value.clone(),
            });
        }
        for (old, new) in renames.iter().rev() {
            // Whole-token match: the old name must not be a prefix of a
            // longer ordinal.
            let re = Regex::new(&format!("{}([^0-9]|$)", regex::escape(old)))
                .map_err(|e| SqlError::Eval(e.to_string()))?;
            sql = re
                .replace_all(&sql, format!("{}${{1}}", new).as_str())
                .into_owned();
        }
        Ok(Fragment::Sql(format!("{} IN ({})", column_sql, sql)))
    }

    fn column_method(&mut self, col: Fragment, method: Method, args: &[Expr]) -> SqlResult<Fragment> {
        let d = self.provider();
        let col_sql = col.sql_text(d);
        let sql = match method {
            Method::Trim => format!("ltrim(rtrim({}))", col_sql),
            Method::TrimStart => format!("ltrim({})", col_sql),
            Method::TrimEnd => format!("rtrim({})", col_sql),
            Method::Upper => format!("upper({})", col_sql),
            Method::Lower => format!("lower({})", col_sql),
            Method::Length => format!("char_length({})", col_sql),
            Method::ToStr => d.cast_sql(&col_sql, "VARCHAR(1000)"),
            Method::StartsWith | Method::EndsWith | Method::Contains => {
                return self.like_method(&col_sql, method, args);
            }
            Method::Substring => {
                // Host substring indexes from 0, SQL from 1.
                let start = self.arg_int(args, 0)? + 1;
                let length = match args.get(1) {
                    Some(_) => Some(self.arg_int(args, 1)?),
                    None => None,
                };
                d.substring_sql(&col_sql, start, length)
            }
            Method::Equals => {
                let v = self.arg_value(args, 0)?;
                let v = match &col {
                    Fragment::EnumColumn { def, .. } => def.coerce(&v),
                    _ => v,
                };
                let name = self.add_param(v);
                format!("{}={}", col_sql, name)
            }
        };
        Ok(Fragment::Sql(sql))
    }

    fn like_method(&mut self, col_sql: &str, method: Method, args: &[Expr]) -> SqlResult<Fragment> {
        let d = self.provider();
        let raw = self.arg_value(args, 0)?.raw_text();
        let escaped = d.escape_wildcards(&raw);
        let needs_escape_clause = escaped.contains('^');
        let pattern = match method {
            Method::StartsWith => format!("{}%", escaped),
            Method::EndsWith => format!("%{}", escaped),
            _ => format!("%{}%", escaped),
        };
        let escape_clause = if needs_escape_clause { " escape '^'" } else { "" };
        let sql = if self.fold_like_case {
            let name = self.add_param(Value::String(pattern.to_uppercase()));
            format!("upper({}) like {}{}", col_sql, name, escape_clause)
        } else {
            let name = self.add_param(Value::String(pattern));
            format!("{} like {}{}", col_sql, name, escape_clause)
        };
        Ok(Fragment::Sql(sql))
    }

    fn arg_value(&mut self, args: &[Expr], index: usize) -> SqlResult<Value> {
        let arg = args
            .get(index)
            .ok_or_else(|| SqlError::unsupported(format!("missing argument {}", index)))?;
        self.constant_value(arg)
            .ok_or_else(|| SqlError::Eval(arg.describe()))
    }

    fn arg_int(&mut self, args: &[Expr], index: usize) -> SqlResult<i64> {
        let v = self.arg_value(args, index)?;
        v.as_int()
            .ok_or_else(|| SqlError::Eval(format!("expected integer, got {}", v)))
    }

    pub(crate) fn visit_sql_func(&mut self, func: &SqlFunc, ctx: VisitCtx) -> SqlResult<Fragment> {
        let d = self.provider();
        match func {
            SqlFunc::In { column, values } => {
                let col = self.visit(column, ctx)?;
                let col_sql = col.sql_text(d);
                let enum_def = match &col {
                    Fragment::EnumColumn { def, .. } => Some(def.clone()),
                    _ => None,
                };
                match values {
                    InValues::Null => Ok(Fragment::Sql(FALSE_LITERAL.to_string())),
                    InValues::Values(items) => Ok(self.in_list(&col_sql, items, enum_def.as_ref())),
                    InValues::Select(sub) => self.inline_sub_select(&col_sql, sub),
                }
            }
            SqlFunc::Desc(e) => {
                let text = self.func_arg(e, ctx)?;
                Ok(Fragment::Sql(format!("{} DESC", text)))
            }
            SqlFunc::As { expr, alias } => {
                let text = self.func_arg(expr, ctx)?;
                Ok(Fragment::Sql(format!(
                    "{} AS {}",
                    text,
                    d.quote_identifier(alias)
                )))
            }
            SqlFunc::Cast { expr, type_name } => {
                let text = self.func_arg(expr, ctx)?;
                Ok(Fragment::Sql(d.cast_sql(&text, type_name)))
            }
            SqlFunc::Sum(e) => self.aggregate("SUM", e, ctx),
            SqlFunc::Count(e) => self.aggregate("COUNT", e, ctx),
            SqlFunc::Min(e) => self.aggregate("MIN", e, ctx),
            SqlFunc::Max(e) => self.aggregate("MAX", e, ctx),
            SqlFunc::Avg(e) => self.aggregate("AVG", e, ctx),
            SqlFunc::CountDistinct(e) => {
                let text = self.func_arg(e, ctx)?;
                Ok(Fragment::Sql(format!("COUNT(DISTINCT {})", text)))
            }
            SqlFunc::AllFields(binding) => {
                let model = self.model_for_binding(binding);
                Ok(Fragment::Sql(format!(
                    "{}.*",
                    d.quote_table(&model.table_name)
                )))
            }
            SqlFunc::JoinAlias { expr, alias } => {
                let text = self.func_arg(expr, ctx)?;
                let column = text.rsplit('.').next().unwrap_or(&text).to_string();
                Ok(Fragment::Sql(format!(
                    "{}.{}",
                    d.quote_table(alias),
                    column
                )))
            }
            SqlFunc::Custom(sql) => Ok(Fragment::Sql(sql.clone())),
        }
    }

    fn aggregate(&mut self, name: &str, e: &Expr, ctx: VisitCtx) -> SqlResult<Fragment> {
        let text = self.func_arg(e, ctx)?;
        Ok(Fragment::Sql(format!("{}({})", name, text)))
    }

    /// Argument text inside a function template. A constant renders raw
    /// so `Count("*")` stays `COUNT(*)`.
    fn func_arg(&mut self, e: &Expr, ctx: VisitCtx) -> SqlResult<String> {
        let frag = self.visit(e, ctx)?;
        Ok(match frag {
            Fragment::Value(v) => v.raw_text(),
            f => f.sql_text(self.provider()),
        })
    }
}

fn flatten(items: &[Value]) -> Vec<Value> {
    let mut out = Vec::with_capacity(items.len());
    for v in items {
        match v {
            Value::Array(nested) => out.extend(flatten(nested)),
            other => out.push(other.clone()),
        }
    }
    out
}
