//! Projection compilation: anonymous objects, field-name select lists,
//! and the default column list.

use crate::ast::Expr;
use crate::error::SqlResult;

use super::fragment::{Fragment, SelectItem};
use super::{SqlExpression, VisitCtx};

impl SqlExpression {
    /// Anonymous object construction. Each member aliases its expression
    /// unless the expression is a field of the same name; an embedded
    /// whole-row binding prefixes its column aliases with the member name.
    pub(crate) fn visit_object(
        &mut self,
        fields: &[(String, Expr)],
        ctx: VisitCtx,
    ) -> SqlResult<Fragment> {
        let mut items: Vec<SelectItem> = Vec::new();
        for (member, arg) in fields {
            let frag = self.visit(arg, ctx)?;
            let d = self.provider();
            match (arg, frag) {
                (_, Fragment::Value(v)) => {
                    let name = self.add_param(v);
                    items.push(SelectItem::Expr {
                        sql: name,
                        alias: Some(member.clone()),
                    });
                }
                (Expr::Row(binding), Fragment::Projection(sub)) => {
                    let prefix = (!binding.eq_ignore_ascii_case(member)).then_some(member.as_str());
                    for mut item in sub {
                        if let Some(p) = prefix {
                            let inner = match item.alias() {
                                Some(a) => a.to_string(),
                                None => column_of(&item),
                            };
                            item.set_alias(Some(format!("{}{}", p, inner)));
                        }
                        items.push(item);
                    }
                }
                (_, Fragment::Projection(sub)) => items.extend(sub),
                (Expr::Field { name, .. }, f) if !name.eq_ignore_ascii_case(member) => {
                    items.push(SelectItem::Expr {
                        sql: f.sql_text(d),
                        alias: Some(member.clone()),
                    });
                }
                (Expr::Func(func), f) if !func.is_ordering_or_alias() => {
                    items.push(SelectItem::Expr {
                        sql: f.sql_text(d),
                        alias: Some(member.clone()),
                    });
                }
                (Expr::Binary { .. } | Expr::Cond { .. }, f) => {
                    items.push(SelectItem::Expr {
                        sql: f.sql_text(d),
                        alias: Some(member.clone()),
                    });
                }
                (_, f) => items.push(SelectItem::Expr {
                    sql: f.sql_text(d),
                    alias: None,
                }),
            }
        }
        Ok(Fragment::Projection(items))
    }

    pub(crate) fn select_internal(mut self, expr: &Expr, distinct: bool) -> SqlResult<Self> {
        let frag = self.visit(expr, VisitCtx::list())?;
        let d = self.provider();
        let text = match frag {
            Fragment::Value(v) => d.quote_value(&v),
            f => f.sql_text(d),
        };
        self.select_distinct = distinct;
        self.select_expr = if text.is_empty() {
            None
        } else {
            Some(format!(
                "SELECT {}{}",
                if distinct { "DISTINCT " } else { "" },
                text
            ))
        };
        Ok(self)
    }

    /// Select list from field names. Accepts `Field`, `Model.Field` and
    /// `Model.*`; unmatched names are skipped.
    pub fn select_fields(mut self, fields: &[&str]) -> Self {
        if fields.is_empty() {
            self.select_expr = None;
            return self;
        }
        let d = self.provider();
        let mut cols = Vec::new();
        for raw in fields {
            let name = raw.trim();
            if let Some(table) = name.strip_suffix(".*") {
                let model = self.model_for_binding(table);
                cols.push(format!("{}.*", d.quote_table(&model.table_name)));
                continue;
            }
            let (entity, field) = match name.split_once('.') {
                Some((e, f)) => (Some(e), f),
                None => (None, name),
            };
            if let Some((model, fd)) = self.resolve_field(entity, field) {
                let qualify = self.prefix_field_with_table_name || entity.is_some();
                cols.push(match &fd.custom_select {
                    Some(custom) => format!("{} AS {}", custom, d.quote_identifier(&fd.name)),
                    None if qualify => d.qualified_column(&model.table_name, &fd.column_name),
                    None => d.quote_column(&fd.column_name),
                });
            }
        }
        self.select_expr = if cols.is_empty() {
            None
        } else {
            Some(format!("SELECT {}", cols.join(", ")))
        };
        self
    }

    /// The implicit select list: every column of the primary model.
    pub(crate) fn default_select(&self) -> String {
        let d = self.provider();
        let cols: Vec<String> = self
            .model
            .fields
            .iter()
            .map(|fd| match &fd.custom_select {
                Some(custom) => format!("{} AS {}", custom, d.quote_identifier(&fd.name)),
                None if self.prefix_field_with_table_name => {
                    d.qualified_column(&self.model.table_name, &fd.column_name)
                }
                None => d.quote_column(&fd.column_name),
            })
            .collect();
        format!(
            "SELECT {}{}",
            if self.select_distinct { "DISTINCT " } else { "" },
            cols.join(", ")
        )
    }
}

fn column_of(item: &SelectItem) -> String {
    match item {
        SelectItem::Column { column, .. } => column.clone(),
        SelectItem::Expr { sql, .. } => sql.clone(),
    }
}

/// Drop projection aliases, for GROUP BY reuse of a select expression.
pub(crate) fn strip_aliases(items: &mut [SelectItem]) {
    for item in items {
        item.set_alias(None);
    }
}

/// Split SQL text on top-level commas, respecting parentheses and string
/// literals.
pub(crate) fn parse_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_string = false;
    for c in text.chars() {
        match c {
            '\'' => {
                in_string = !in_string;
                current.push(c);
            }
            '(' if !in_string => {
                depth += 1;
                current.push(c);
            }
            ')' if !in_string => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if !in_string && depth == 0 => {
                tokens.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        tokens.push(current.trim().to_string());
    }
    tokens
}
