//! Predicate-to-SQL compiler.
//!
//! [`SqlExpression`] accumulates WHERE/SELECT/GROUP BY/HAVING/ORDER BY
//! clauses from predicate trees and raw fragments, owns the positional
//! parameter store, and assembles final statements. Builder operations
//! consume and return the expression; statement assembly borrows it and
//! never mutates, so repeated rendering is stable.

pub mod fragment;
pub mod safety;

mod methods;
mod operators;
mod projection;
mod visitor;

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ast::{BinaryOp, Expr, Method, SubSelect, UnaryOp, Value};
use crate::dialect::{Dialect, SqlDialect};
use crate::error::{SqlError, SqlResult};
use crate::schema::{ColumnType, FieldDefinition, ModelDefinition};

pub use fragment::{Fragment, SelectItem};
pub(crate) use visitor::VisitCtx;

/// Always-true filter, used where a predicate collapses to a constant.
pub(crate) const TRUE_LITERAL: &str = "(1=1)";
/// Always-false filter; also the result of membership over an empty set.
pub(crate) const FALSE_LITERAL: &str = "(1=0)";

/// One bound parameter: positional token plus captured value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub value: Value,
}

/// Host hook for evaluating opaque sub-expressions to constants.
///
/// The compiler folds value-only trees itself; anything it cannot fold is
/// offered to the hook before being rejected as unsupported.
pub type EvalHook = Arc<dyn Fn(&Expr) -> Option<Value> + Send + Sync>;

/// Builder that compiles predicate trees against one model (plus joined
/// models) into a SQL statement and its parameter list.
#[derive(Clone)]
pub struct SqlExpression {
    pub(crate) model: ModelDefinition,
    pub(crate) joined: Vec<ModelDefinition>,
    pub(crate) dialect: Dialect,

    pub(crate) select_expr: Option<String>,
    pub(crate) select_distinct: bool,
    pub(crate) from_expr: Option<String>,
    pub(crate) where_expr: Option<String>,
    pub(crate) group_by_expr_sql: Option<String>,
    pub(crate) having_expr_sql: Option<String>,
    pub(crate) order_by_sql: Option<String>,
    pub(crate) order_keys: Vec<String>,
    pub(crate) offset: Option<u64>,
    pub(crate) rows: Option<u64>,

    pub(crate) update_field_list: Vec<String>,
    pub(crate) insert_field_list: Vec<String>,

    pub(crate) prefix_field_with_table_name: bool,
    pub(crate) where_without_keyword: bool,
    pub(crate) fold_like_case: bool,

    pub(crate) params: Vec<Param>,
    pub(crate) eval_hook: Option<EvalHook>,
}

impl fmt::Debug for SqlExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlExpression")
            .field("model", &self.model.name)
            .field("dialect", &self.dialect)
            .field("where_expr", &self.where_expr)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl SqlExpression {
    pub fn new(model: ModelDefinition) -> Self {
        Self::with_dialect(model, Dialect::default())
    }

    pub fn with_dialect(model: ModelDefinition, dialect: Dialect) -> Self {
        Self {
            model,
            joined: Vec::new(),
            dialect,
            select_expr: None,
            select_distinct: false,
            from_expr: None,
            where_expr: None,
            group_by_expr_sql: None,
            having_expr_sql: None,
            order_by_sql: None,
            order_keys: Vec::new(),
            offset: None,
            rows: None,
            update_field_list: Vec::new(),
            insert_field_list: Vec::new(),
            prefix_field_with_table_name: false,
            where_without_keyword: false,
            fold_like_case: true,
            params: Vec::new(),
            eval_hook: None,
        }
    }

    pub fn model(&self) -> &ModelDefinition {
        &self.model
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Install a host hook consulted for sub-expressions the compiler
    /// cannot fold itself.
    pub fn eval_hook(mut self, hook: EvalHook) -> Self {
        self.eval_hook = Some(hook);
        self
    }

    /// Whether LIKE comparisons fold case with `upper()` on both sides.
    /// On by default.
    pub fn fold_like_case(mut self, enabled: bool) -> Self {
        self.fold_like_case = enabled;
        self
    }

    /// Qualify every column with its table name even without joins.
    pub fn prefix_fields_with_table_name(mut self, enabled: bool) -> Self {
        self.prefix_field_with_table_name = enabled;
        self
    }

    /// Emit the filter text without the leading `WHERE` keyword, for
    /// embedding in a host-assembled statement.
    pub fn where_without_keyword(mut self, enabled: bool) -> Self {
        self.where_without_keyword = enabled;
        self
    }

    // ---- SELECT ----

    /// Raw select list, verified for unsafe fragments. Empty text resets
    /// to the default column list.
    pub fn select(mut self, raw: &str) -> SqlResult<Self> {
        if raw.trim().is_empty() {
            self.select_expr = None;
            return Ok(self);
        }
        safety::verify_fragment(raw)?;
        Ok(self.unsafe_select(raw))
    }

    pub fn unsafe_select(mut self, raw: &str) -> Self {
        self.select_distinct = false;
        self.select_expr = Some(format!("SELECT {}", raw));
        self
    }

    /// Projection from an expression tree (field, anonymous object,
    /// aggregate call, whole row).
    pub fn select_expr(self, expr: &Expr) -> SqlResult<Self> {
        self.select_internal(expr, false)
    }

    pub fn select_distinct_expr(self, expr: &Expr) -> SqlResult<Self> {
        self.select_internal(expr, true)
    }

    /// DISTINCT over the default column list.
    pub fn distinct(mut self) -> Self {
        self.select_distinct = true;
        self
    }

    // ---- FROM / JOIN ----

    /// Raw FROM body, verified. Empty text resets to the model's table.
    pub fn from(mut self, raw: &str) -> SqlResult<Self> {
        if raw.trim().is_empty() {
            self.from_expr = None;
            return Ok(self);
        }
        safety::verify_fragment(raw)?;
        Ok(self.unsafe_from(raw))
    }

    pub fn unsafe_from(mut self, raw: &str) -> Self {
        self.from_expr = Some(format!(" FROM {}", raw));
        self
    }

    pub fn join(self, model: &ModelDefinition, on: &Expr) -> SqlResult<Self> {
        self.join_internal("INNER JOIN", model, on)
    }

    pub fn left_join(self, model: &ModelDefinition, on: &Expr) -> SqlResult<Self> {
        self.join_internal("LEFT JOIN", model, on)
    }

    fn join_internal(mut self, kind: &str, model: &ModelDefinition, on: &Expr) -> SqlResult<Self> {
        self.joined.push(model.clone());
        self.prefix_field_with_table_name = true;
        let frag = self.visit_predicate(on)?;
        let on_sql = self.predicate_text(&frag);
        let d = self.provider();
        let base = match self.from_expr.take() {
            Some(f) => f,
            None => format!(" FROM {}", d.quote_table(&self.model.table_name)),
        };
        self.from_expr = Some(format!(
            "{} {} {} ON ({})",
            base,
            kind,
            d.quote_table(&model.table_name),
            on_sql
        ));
        Ok(self)
    }

    // ---- WHERE ----

    pub fn where_(self, pred: &Expr) -> SqlResult<Self> {
        self.and_(pred)
    }

    pub fn and_(mut self, pred: &Expr) -> SqlResult<Self> {
        let frag = self.visit_predicate(pred)?;
        let text = self.predicate_text(&frag);
        self.append_to_where("AND", &text);
        Ok(self)
    }

    pub fn or_(mut self, pred: &Expr) -> SqlResult<Self> {
        let frag = self.visit_predicate(pred)?;
        let text = self.predicate_text(&frag);
        self.append_to_where("OR", &text);
        Ok(self)
    }

    /// Raw filter with `{0}`-style placeholders, verified then bound.
    /// An array value expands to a comma-joined parameter list.
    pub fn where_fmt(self, format: &str, values: &[Value]) -> SqlResult<Self> {
        self.append_raw("AND", format, values)
    }

    pub fn and_fmt(self, format: &str, values: &[Value]) -> SqlResult<Self> {
        self.append_raw("AND", format, values)
    }

    pub fn or_fmt(self, format: &str, values: &[Value]) -> SqlResult<Self> {
        self.append_raw("OR", format, values)
    }

    /// Raw filter that skips the safety check.
    pub fn unsafe_where(self, format: &str, values: &[Value]) -> Self {
        self.append_raw_unchecked("AND", format, values)
    }

    /// Drop the accumulated filter. Bound parameters are kept; positional
    /// tokens already issued stay stable.
    pub fn clear_where(mut self) -> Self {
        self.where_expr = None;
        self
    }

    fn append_raw(self, cond: &str, format: &str, values: &[Value]) -> SqlResult<Self> {
        safety::verify_fragment(format)?;
        Ok(self.append_raw_unchecked(cond, format, values))
    }

    fn append_raw_unchecked(mut self, cond: &str, format: &str, values: &[Value]) -> Self {
        let text = self.bind_placeholders(format, values);
        self.append_to_where(cond, &text);
        self
    }

    fn bind_placeholders(&mut self, format: &str, values: &[Value]) -> String {
        let mut text = format.to_string();
        for (i, v) in values.iter().enumerate() {
            let token = format!("{{{}}}", i);
            let replacement = match v {
                Value::Array(items) => items
                    .iter()
                    .map(|item| self.add_param(item.clone()))
                    .collect::<Vec<_>>()
                    .join(","),
                other => self.add_param(other.clone()),
            };
            text = text.replace(&token, &replacement);
        }
        text
    }

    pub(crate) fn append_to_where(&mut self, cond: &str, sql: &str) {
        if sql.is_empty() {
            return;
        }
        self.where_expr = Some(match self.where_expr.take() {
            Some(w) => format!("{} {} {}", w, cond, sql),
            None if self.where_without_keyword => sql.to_string(),
            None => format!("WHERE {}", sql),
        });
    }

    /// The accumulated filter clause, if any.
    pub fn where_clause(&self) -> Option<&str> {
        self.where_expr.as_deref()
    }

    // ---- GROUP BY / HAVING ----

    pub fn group_by(mut self, raw: &str) -> SqlResult<Self> {
        if raw.trim().is_empty() {
            self.group_by_expr_sql = None;
            return Ok(self);
        }
        safety::verify_fragment(raw)?;
        self.group_by_expr_sql = Some(format!("GROUP BY {}", raw));
        Ok(self)
    }

    /// GROUP BY from an expression; projection aliases are stripped.
    pub fn group_by_expr(mut self, expr: &Expr) -> SqlResult<Self> {
        let frag = self.visit(expr, VisitCtx::list())?;
        let d = self.provider();
        let text = match frag {
            Fragment::Projection(mut items) => {
                projection::strip_aliases(&mut items);
                Fragment::Projection(items).sql_text(d)
            }
            Fragment::Value(v) => d.quote_value(&v),
            f => f.sql_text(d),
        };
        self.group_by_expr_sql = Some(format!("GROUP BY {}", text));
        Ok(self)
    }

    pub fn having(mut self, format: &str, values: &[Value]) -> SqlResult<Self> {
        if format.trim().is_empty() {
            self.having_expr_sql = None;
            return Ok(self);
        }
        safety::verify_fragment(format)?;
        Ok(self.unsafe_having(format, values))
    }

    pub fn unsafe_having(mut self, format: &str, values: &[Value]) -> Self {
        let text = self.bind_placeholders(format, values);
        self.having_expr_sql = Some(format!("HAVING {}", text));
        self
    }

    pub fn having_expr(mut self, pred: &Expr) -> SqlResult<Self> {
        let frag = self.visit_predicate(pred)?;
        let text = self.predicate_text(&frag);
        self.having_expr_sql = Some(format!("HAVING {}", text));
        Ok(self)
    }

    // ---- ORDER BY ----

    /// Raw ORDER BY body, verified. Empty text clears the ordering.
    pub fn order_by(mut self, raw: &str) -> SqlResult<Self> {
        self.order_keys.clear();
        if !raw.trim().is_empty() {
            safety::verify_fragment(raw)?;
            self.order_keys.push(raw.to_string());
        }
        self.rebuild_order_by();
        Ok(self)
    }

    pub fn then_by(mut self, raw: &str) -> SqlResult<Self> {
        safety::verify_fragment(raw)?;
        self.order_keys.push(raw.to_string());
        self.rebuild_order_by();
        Ok(self)
    }

    pub fn order_by_expr(mut self, expr: &Expr) -> SqlResult<Self> {
        self.order_keys.clear();
        let keys = self.order_keys_for(expr, false)?;
        self.order_keys.extend(keys);
        self.rebuild_order_by();
        Ok(self)
    }

    pub fn order_by_descending_expr(mut self, expr: &Expr) -> SqlResult<Self> {
        self.order_keys.clear();
        let keys = self.order_keys_for(expr, true)?;
        self.order_keys.extend(keys);
        self.rebuild_order_by();
        Ok(self)
    }

    pub fn then_by_expr(mut self, expr: &Expr) -> SqlResult<Self> {
        let keys = self.order_keys_for(expr, false)?;
        self.order_keys.extend(keys);
        self.rebuild_order_by();
        Ok(self)
    }

    pub fn then_by_descending_expr(mut self, expr: &Expr) -> SqlResult<Self> {
        let keys = self.order_keys_for(expr, true)?;
        self.order_keys.extend(keys);
        self.rebuild_order_by();
        Ok(self)
    }

    /// Order by field names; a leading `-` flips the direction.
    pub fn order_by_fields(mut self, names: &[&str]) -> SqlResult<Self> {
        self.order_keys.clear();
        for raw in names {
            let (name, descending) = match raw.strip_prefix('-') {
                Some(rest) => (rest, true),
                None => (*raw, false),
            };
            let sql = self.resolve_order_field(name)?;
            self.order_keys.push(if descending {
                format!("{} DESC", sql)
            } else {
                sql
            });
        }
        self.rebuild_order_by();
        Ok(self)
    }

    fn order_keys_for(&mut self, expr: &Expr, descending: bool) -> SqlResult<Vec<String>> {
        let frag = self.visit(expr, VisitCtx::list())?;
        let d = self.provider();
        let text = match frag {
            Fragment::Value(v) => d.quote_value(&v),
            f => f.sql_text(d),
        };
        if descending {
            // Multi-key expressions split on top-level commas so DESC
            // applies to every key.
            Ok(projection::parse_tokens(&text)
                .into_iter()
                .map(|t| format!("{} DESC", t))
                .collect())
        } else {
            Ok(vec![text])
        }
    }

    fn resolve_order_field(&self, name: &str) -> SqlResult<String> {
        let d = self.provider();
        for m in self.models() {
            if let Some(fd) = m.field_named(name).or_else(|| m.field_by_column(name)) {
                return Ok(if self.prefix_field_with_table_name {
                    d.qualified_column(&m.table_name, &fd.column_name)
                } else {
                    d.quote_column(&fd.column_name)
                });
            }
        }
        Err(SqlError::UnknownField {
            model: self.model.name.clone(),
            field: name.to_string(),
            suggestion: self.suggest_across(name),
        })
    }

    fn rebuild_order_by(&mut self) {
        self.order_by_sql = if self.order_keys.is_empty() {
            None
        } else {
            Some(format!("ORDER BY {}", self.order_keys.join(", ")))
        };
    }

    // ---- LIMIT / OFFSET ----

    pub fn take(mut self, rows: u64) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn skip(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(self, offset: u64, rows: u64) -> Self {
        self.skip(offset).take(rows)
    }

    pub fn clear_limits(mut self) -> Self {
        self.offset = None;
        self.rows = None;
        self
    }

    // ---- UPDATE / INSERT field lists ----

    /// Restrict UPDATE SET assignments to the named fields. Empty list
    /// allows all fields.
    pub fn update(mut self, fields: &[&str]) -> Self {
        self.update_field_list = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Field allow-list from a member expression (`x.Name` or an
    /// anonymous object of members).
    pub fn update_expr(mut self, fields: &Expr) -> SqlResult<Self> {
        self.update_field_list = self.member_names(fields)?;
        Ok(self)
    }

    /// Restrict host-side INSERT to the named fields. Empty list allows
    /// all fields.
    pub fn insert(mut self, fields: &[&str]) -> Self {
        self.insert_field_list = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn insert_expr(mut self, fields: &Expr) -> SqlResult<Self> {
        self.insert_field_list = self.member_names(fields)?;
        Ok(self)
    }

    pub fn update_fields(&self) -> &[String] {
        &self.update_field_list
    }

    pub fn insert_fields(&self) -> &[String] {
        &self.insert_field_list
    }

    // ---- Parameter store ----

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Bind a value, returning the positional token to splice into SQL.
    pub(crate) fn add_param(&mut self, value: Value) -> String {
        let d = self.provider();
        let name = d.param_token(&self.params.len().to_string());
        self.params.push(Param {
            name: name.clone(),
            value: d.to_db_value(&value),
        });
        name
    }

    // ---- Statement assembly (read-only) ----

    pub fn to_select_statement(&self) -> String {
        let mut sql = format!("{}{}", self.select_clause(), self.body_clause());
        if let Some(o) = &self.order_by_sql {
            sql.push(' ');
            sql.push_str(o);
        }
        sql.push_str(&self.provider().limit_offset(self.rows, self.offset));
        sql
    }

    pub fn to_count_statement(&self) -> String {
        format!("SELECT COUNT(*){}", self.body_clause())
    }

    /// UPDATE statement over the given field values, reusing the
    /// accumulated filter. SET parameters are numbered after the filter's
    /// parameters; the combined list is returned without touching the
    /// expression's own store.
    pub fn to_update_statement(&self, values: &[(&str, Value)]) -> SqlResult<(String, Vec<Param>)> {
        let d = self.provider();
        let mut params = self.params.clone();
        let mut assignments = Vec::new();
        for fd in &self.model.fields {
            let Some((_, value)) = values.iter().find(|(n, _)| n.eq_ignore_ascii_case(&fd.name))
            else {
                continue;
            };
            if !self.update_field_list.is_empty()
                && !self
                    .update_field_list
                    .iter()
                    .any(|f| f.eq_ignore_ascii_case(&fd.name))
            {
                continue;
            }
            if value.is_null() && !fd.nullable {
                continue;
            }
            let name = d.param_token(&params.len().to_string());
            assignments.push(format!("{}={}", d.quote_column(&fd.column_name), name));
            params.push(Param {
                name,
                value: d.to_db_value(value),
            });
        }
        if assignments.is_empty() {
            return Err(SqlError::EmptyUpdate(self.model.name.clone()));
        }
        let mut sql = format!(
            "UPDATE {} SET {}",
            d.quote_table(&self.model.table_name),
            assignments.join(", ")
        );
        if let Some(w) = &self.where_expr {
            sql.push(' ');
            sql.push_str(w);
        }
        Ok((sql, params))
    }

    /// DELETE statement reusing the accumulated filter. With joins the
    /// filter is pushed into a primary-key sub-select, since DELETE
    /// cannot carry a join.
    pub fn to_delete_statement(&self) -> SqlResult<String> {
        let d = self.provider();
        if self.joined.is_empty() {
            let mut sql = format!("DELETE FROM {}", d.quote_table(&self.model.table_name));
            if let Some(w) = &self.where_expr {
                sql.push(' ');
                sql.push_str(w);
            }
            return Ok(sql);
        }
        let pk = self.model.primary_field().ok_or_else(|| {
            SqlError::unsupported(format!("DELETE with join on fieldless model '{}'", self.model.name))
        })?;
        let mut inner = self.clone();
        inner.select_expr = Some(format!(
            "SELECT {}",
            d.qualified_column(&self.model.table_name, &pk.column_name)
        ));
        inner.select_distinct = false;
        inner.order_by_sql = None;
        inner.order_keys.clear();
        Ok(format!(
            "DELETE FROM {} WHERE {} IN ({})",
            d.quote_table(&self.model.table_name),
            d.quote_column(&pk.column_name),
            inner.to_select_statement()
        ))
    }

    /// Diagnostic rendering with parameter values substituted as quoted
    /// literals. Never sent to an engine.
    pub fn to_merged_params_statement(&self) -> String {
        let d = self.provider();
        let mut sql = self.to_select_statement();
        // Highest ordinal first so @1 cannot clobber @10.
        for p in self.params.iter().rev() {
            sql = sql.replace(&p.name, &d.quote_value(&p.value));
        }
        sql
    }

    /// Package the compiled statement for inlining in an outer
    /// expression (`Sql::in_select`).
    pub fn to_sub_select(&self) -> SubSelect {
        SubSelect {
            sql: self.to_select_statement(),
            params: self.params.clone(),
        }
    }

    fn select_clause(&self) -> String {
        match &self.select_expr {
            Some(s) => s.clone(),
            None => self.default_select(),
        }
    }

    fn body_clause(&self) -> String {
        let mut sql = self.from_clause();
        if let Some(w) = &self.where_expr {
            sql.push(' ');
            sql.push_str(w);
        }
        if let Some(g) = &self.group_by_expr_sql {
            sql.push(' ');
            sql.push_str(g);
        }
        if let Some(h) = &self.having_expr_sql {
            sql.push(' ');
            sql.push_str(h);
        }
        sql
    }

    fn from_clause(&self) -> String {
        match &self.from_expr {
            Some(f) => f.clone(),
            None => format!(" FROM {}", self.provider().quote_table(&self.model.table_name)),
        }
    }

    // ---- Shared compile helpers ----

    pub(crate) fn provider(&self) -> &'static dyn SqlDialect {
        self.dialect.provider()
    }

    /// Compile a predicate the way a filter position requires: lambda
    /// wrappers unwrapped, bare boolean members normalized.
    pub(crate) fn visit_predicate(&mut self, pred: &Expr) -> SqlResult<Fragment> {
        let body = match pred {
            Expr::Lambda(b) => b.as_ref(),
            other => other,
        };
        self.visit_lambda(body, VisitCtx::predicate())
    }

    /// Filter text of a compiled fragment. Constant booleans collapse to
    /// the true/false literals.
    pub(crate) fn predicate_text(&self, frag: &Fragment) -> String {
        let d = self.provider();
        match frag {
            Fragment::Value(v) => match v.as_bool() {
                Some(true) => TRUE_LITERAL.to_string(),
                Some(false) => FALSE_LITERAL.to_string(),
                None => d.quote_value(v),
            },
            f => f.sql_text(d),
        }
    }

    pub(crate) fn quoted_true(&self) -> String {
        self.provider().bool_literal(true)
    }

    pub(crate) fn quoted_false(&self) -> String {
        self.provider().bool_literal(false)
    }

    /// `(TRUE=TRUE)` in the dialect's boolean spelling; a tautology that
    /// survives inside a larger filter.
    pub(crate) fn true_expression(&self) -> String {
        let t = self.quoted_true();
        format!("({}={})", t, t)
    }

    pub(crate) fn false_expression(&self) -> String {
        format!("({}={})", self.quoted_true(), self.quoted_false())
    }

    pub(crate) fn models(&self) -> impl Iterator<Item = &ModelDefinition> {
        std::iter::once(&self.model).chain(self.joined.iter())
    }

    /// Resolve a member to its model and field. `entity` pins the lookup
    /// to a joined model by name.
    pub(crate) fn resolve_field(
        &self,
        entity: Option<&str>,
        name: &str,
    ) -> Option<(&ModelDefinition, &FieldDefinition)> {
        if let Some(ent) = entity {
            let m = self.models().find(|m| m.name.eq_ignore_ascii_case(ent))?;
            return m.field_named(name).map(|f| (m, f));
        }
        self.models().find_map(|m| m.field_named(name).map(|f| (m, f)))
    }

    pub(crate) fn suggest_across(&self, name: &str) -> Option<String> {
        self.models().find_map(|m| m.suggest_field(name))
    }

    /// The joined model bound to `binding` by name, else the primary one.
    pub(crate) fn model_for_binding(&self, binding: &str) -> &ModelDefinition {
        self.models()
            .find(|m| m.name.eq_ignore_ascii_case(binding))
            .unwrap_or(&self.model)
    }

    /// Whether already-compiled SQL text is a bare column reference of
    /// one of the known models.
    pub(crate) fn is_field_name(&self, text: &str) -> bool {
        let bare = text
            .rsplit('.')
            .next()
            .unwrap_or(text)
            .trim_matches(|c| c == '"' || c == '`');
        self.models()
            .any(|m| m.field_by_column(bare).is_some() || m.field_named(bare).is_some())
    }

    pub(crate) fn is_bool_field(&self, e: &Expr) -> bool {
        match e {
            Expr::Field { entity, name } => self
                .resolve_field(entity.as_deref(), name)
                .map(|(_, fd)| fd.column_type == ColumnType::Bool && fd.enum_def.is_none())
                .unwrap_or(false),
            Expr::Lambda(body) => self.is_bool_field(body),
            _ => false,
        }
    }

    /// Static type guess: does the node produce a boolean?
    pub(crate) fn expr_is_bool(&self, e: &Expr) -> bool {
        match e {
            Expr::Value(Value::Bool(_)) => true,
            Expr::Field { .. } => self.is_bool_field(e),
            Expr::Binary { op, .. } => op.is_logical() || op.is_comparison(),
            Expr::Unary {
                op: UnaryOp::Not, ..
            } => true,
            Expr::Unary {
                op: UnaryOp::Convert,
                operand,
            } => self.expr_is_bool(operand),
            Expr::Cond {
                if_true, if_false, ..
            } => self.expr_is_bool(if_true) || self.expr_is_bool(if_false),
            Expr::Call { method, .. } => matches!(
                method,
                Method::StartsWith | Method::EndsWith | Method::Contains | Method::Equals
            ),
            Expr::Lambda(body) => self.expr_is_bool(body),
            _ => false,
        }
    }

    /// Static type guess: does the node produce a string? Drives the
    /// `+` to concatenation rewrite.
    pub(crate) fn expr_is_string(&self, e: &Expr) -> bool {
        match e {
            Expr::Value(Value::String(_)) => true,
            Expr::Field { entity, name } => self
                .resolve_field(entity.as_deref(), name)
                .map(|(_, fd)| fd.column_type == ColumnType::Text && fd.enum_def.is_none())
                .unwrap_or(false),
            Expr::Binary {
                op: BinaryOp::Add,
                left,
                right,
            } => self.expr_is_string(left) && self.expr_is_string(right),
            Expr::Call { method, .. } => matches!(
                method,
                Method::Trim
                    | Method::TrimStart
                    | Method::TrimEnd
                    | Method::Upper
                    | Method::Lower
                    | Method::Substring
                    | Method::ToStr
            ),
            Expr::Cond {
                if_true, if_false, ..
            } => self.expr_is_string(if_true) || self.expr_is_string(if_false),
            Expr::Unary {
                op: UnaryOp::Convert,
                operand,
            } => self.expr_is_string(operand),
            _ => false,
        }
    }

    /// Fold a value-only subtree to a constant. Falls back to the host
    /// hook for anything structural the compiler cannot evaluate.
    pub(crate) fn constant_value(&self, e: &Expr) -> Option<Value> {
        match e {
            Expr::Value(v) => Some(v.clone()),
            Expr::Array(items) => items
                .iter()
                .map(|i| self.constant_value(i))
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Expr::Index { object, index } => {
                let arr = self.constant_value(object)?;
                let idx = self.constant_value(index)?.as_int()?;
                match arr {
                    Value::Array(items) => items.get(idx as usize).cloned(),
                    _ => None,
                }
            }
            Expr::Unary { op, operand } => {
                let v = self.constant_value(operand)?;
                match op {
                    UnaryOp::Not => v.as_bool().map(|b| Value::Bool(!b)),
                    UnaryOp::Neg => operators::fold_neg(&v).ok(),
                    UnaryOp::Convert => Some(v),
                }
            }
            Expr::Binary { op, left, right } => {
                let l = self.constant_value(left)?;
                let r = self.constant_value(right)?;
                operators::fold_binary(*op, &l, &r).ok()
            }
            Expr::Cond {
                test,
                if_true,
                if_false,
            } => {
                let taken = self.constant_value(test)?.as_bool()?;
                self.constant_value(if taken { if_true } else { if_false })
            }
            other => self.eval_hook.as_ref().and_then(|hook| hook(other)),
        }
    }
}
