//! Binary and unary operator compilation.
//!
//! The interesting cases are boolean-comparison normalization (`expr =
//! true` unwraps, `expr = false` negates, a null operand turns `=`/`<>`
//! into `IS`/`IS NOT`), enum literal coercion, and in-memory folding when
//! neither side touches a column.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::ast::{BinaryOp, Expr, UnaryOp, Value};
use crate::error::{SqlError, SqlResult};

use super::fragment::Fragment;
use super::{SqlExpression, VisitCtx};

impl SqlExpression {
    pub(crate) fn visit_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        ctx: VisitCtx,
    ) -> SqlResult<Fragment> {
        // Neither side reaches a column: fold in memory.
        if let (Some(a), Some(b)) = (self.constant_value(left), self.constant_value(right)) {
            if let Ok(v) = fold_binary(op, &a, &b) {
                return Ok(Fragment::Value(v));
            }
        }
        if op.is_logical() {
            return self.visit_logical(op, left, right, ctx);
        }

        let d = self.provider();
        let mut l = self.visit(left, ctx)?;
        let mut r = self.visit(right, ctx)?;
        let (mut l_expr, mut r_expr) = (left, right);

        // String + string is concatenation, not arithmetic.
        if op == BinaryOp::Add && self.expr_is_string(left) && self.expr_is_string(right) {
            let parts = vec![self.operand_sql(l), self.operand_sql(r)];
            return Ok(Fragment::Sql(d.string_concat(&parts)));
        }

        // Boolean-comparison normalization.
        if matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
            if matches!(l.as_value(), Some(Value::Bool(_))) && r.is_sql() {
                std::mem::swap(&mut l, &mut r);
                std::mem::swap(&mut l_expr, &mut r_expr);
            }
            if let Some(&Value::Bool(b)) = r.as_value() {
                if l.is_null_text() {
                    // null = x is never true, null <> x always is.
                    return Ok(Fragment::Value(Value::Bool(op == BinaryOp::Ne)));
                }
                let text = l.sql_text(d);
                if l.is_sql() && !self.is_field_name(&text) && !matches!(l_expr, Expr::Cond { .. })
                {
                    let keep = (op == BinaryOp::Eq) == b;
                    return if keep { Ok(l) } else { self.not_fragment(l) };
                }
            }
        }

        // Enum-tagged column against a bare literal: coerce the literal
        // to the storage representation first.
        if !matches!(
            (&l, &r),
            (Fragment::EnumColumn { .. }, Fragment::EnumColumn { .. })
        ) {
            if let Fragment::EnumColumn { def, .. } = &l {
                if let Some(v) = r.as_value() {
                    let coerced = def.coerce(v);
                    r = Fragment::Sql(self.add_param(coerced));
                }
            } else if let Fragment::EnumColumn { def, .. } = &r {
                if let Some(v) = l.as_value() {
                    let coerced = def.coerce(v);
                    l = Fragment::Sql(d.quote_value(&coerced));
                }
            }
        }

        if let (Fragment::Value(a), Fragment::Value(b)) = (&l, &r) {
            return Ok(Fragment::Value(fold_binary(op, a, b)?));
        }
        // A left-hand constant renders as a quoted literal; only the
        // right-hand one becomes a bound parameter.
        if let Fragment::Value(v) = &l {
            l = Fragment::Sql(d.quote_value(v));
        }

        if l.is_null_text() {
            std::mem::swap(&mut l, &mut r);
        }
        let mut token = op.sql_token();
        let mut sep = ctx.sep.text();
        if r.is_null_text() {
            match op {
                BinaryOp::Eq => {
                    token = "IS";
                    sep = " ";
                    r = Fragment::Sql("NULL".to_string());
                }
                BinaryOp::Ne => {
                    token = "IS NOT";
                    sep = " ";
                    r = Fragment::Sql("NULL".to_string());
                }
                _ => {}
            }
        } else if let Fragment::Value(v) = &r {
            let v = v.clone();
            r = Fragment::Sql(self.add_param(v));
        }

        let l_text = l.sql_text(d);
        let r_text = r.sql_text(d);
        Ok(Fragment::Sql(if op.is_function_style() {
            format!("{}({},{})", token, l_text, r_text)
        } else {
            format!("({}{}{}{}{})", l_text, sep, token, sep, r_text)
        }))
    }

    fn visit_logical(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        ctx: VisitCtx,
    ) -> SqlResult<Fragment> {
        let l = self.logical_side(left, ctx)?;
        let r = self.logical_side(right, ctx)?;
        let sep = ctx.sep.text();
        Ok(Fragment::Sql(format!(
            "({}{}{}{}{})",
            l,
            sep,
            op.sql_token(),
            sep,
            r
        )))
    }

    /// One side of AND/OR: bare boolean members become comparisons,
    /// constant sides become tautology literals.
    fn logical_side(&mut self, e: &Expr, ctx: VisitCtx) -> SqlResult<String> {
        if self.is_bool_field(e) {
            let frag = self.visit(e, ctx)?;
            let text = frag.sql_text(self.provider());
            return Ok(format!("{}={}", text, self.quoted_true()));
        }
        let frag = self.visit(e, ctx)?;
        Ok(match frag {
            Fragment::Value(v) => match v.as_bool() {
                Some(true) => self.true_expression(),
                Some(false) => self.false_expression(),
                None => self.add_param(v),
            },
            f => f.sql_text(self.provider()),
        })
    }

    pub(crate) fn visit_unary(
        &mut self,
        op: UnaryOp,
        operand: &Expr,
        ctx: VisitCtx,
    ) -> SqlResult<Fragment> {
        match op {
            UnaryOp::Not => {
                let frag = self.visit(operand, ctx)?;
                self.not_fragment(frag)
            }
            UnaryOp::Neg => {
                let frag = self.visit(operand, ctx)?;
                match frag {
                    Fragment::Value(v) => Ok(Fragment::Value(fold_neg(&v)?)),
                    f => Ok(Fragment::Sql(format!("-({})", f.sql_text(self.provider())))),
                }
            }
            // Numeric conversions are transparent in SQL.
            UnaryOp::Convert => self.visit(operand, ctx),
        }
    }

    /// Negate a compiled fragment. A bare column compares against the
    /// false literal, anything else gets a NOT wrapper.
    pub(crate) fn not_fragment(&mut self, frag: Fragment) -> SqlResult<Fragment> {
        match frag {
            Fragment::Value(v) => match v.as_bool() {
                Some(b) => Ok(Fragment::Value(Value::Bool(!b))),
                None => Err(SqlError::Eval(format!("NOT over non-boolean {}", v))),
            },
            f => {
                let text = f.sql_text(self.provider());
                if self.is_field_name(&text) {
                    Ok(Fragment::Sql(format!("{}={}", text, self.quoted_false())))
                } else {
                    Ok(Fragment::Sql(format!("NOT ({})", text)))
                }
            }
        }
    }

    fn operand_sql(&mut self, frag: Fragment) -> String {
        match frag {
            Fragment::Value(v) => self.add_param(v),
            f => f.sql_text(self.provider()),
        }
    }
}

/// Fold a binary operator over two constants.
pub(crate) fn fold_binary(op: BinaryOp, left: &Value, right: &Value) -> SqlResult<Value> {
    use BinaryOp::*;
    match op {
        Coalesce => {
            return Ok(if left.is_null() {
                right.clone()
            } else {
                left.clone()
            });
        }
        Eq => return Ok(Value::Bool(values_equal(left, right))),
        Ne => return Ok(Value::Bool(!values_equal(left, right))),
        And | Or => {
            let a = bool_of(left)?;
            let b = bool_of(right)?;
            return Ok(Value::Bool(if op == And { a && b } else { a || b }));
        }
        Gt | Ge | Lt | Le => {
            if left.is_null() || right.is_null() {
                return Ok(Value::Null);
            }
            let ord = compare_values(left, right).ok_or_else(|| {
                SqlError::Eval(format!("cannot compare {} with {}", left, right))
            })?;
            return Ok(Value::Bool(match op {
                Gt => ord == Ordering::Greater,
                Ge => ord != Ordering::Less,
                Lt => ord == Ordering::Less,
                _ => ord != Ordering::Greater,
            }));
        }
        _ => {}
    }
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }
    if let (Add, Value::String(a), Value::String(b)) = (op, left, right) {
        return Ok(Value::String(format!("{}{}", a, b)));
    }
    fold_numeric(op, left, right)
}

fn fold_numeric(op: BinaryOp, left: &Value, right: &Value) -> SqlResult<Value> {
    use BinaryOp::*;
    let fail = || SqlError::Eval(format!("{:?} over {} and {}", op, left, right));
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => {
            let (a, b) = (*a, *b);
            Ok(Value::Int(match op {
                Add => a + b,
                Sub => a - b,
                Mul => a * b,
                Div | Mod => {
                    if b == 0 {
                        return Err(SqlError::Eval("division by zero".to_string()));
                    }
                    if op == Div { a / b } else { a % b }
                }
                BitAnd => a & b,
                BitOr => a | b,
                BitXor => a ^ b,
                Shl => a << b,
                Shr => a >> b,
                _ => return Err(fail()),
            }))
        }
        (Value::Float(_) | Value::Int(_), Value::Float(_) | Value::Int(_)) => {
            let (a, b) = (float_of(left), float_of(right));
            Ok(Value::Float(match op {
                Add => a + b,
                Sub => a - b,
                Mul => a * b,
                Div => a / b,
                Mod => a % b,
                _ => return Err(fail()),
            }))
        }
        (Value::Decimal(_) | Value::Int(_), Value::Decimal(_) | Value::Int(_)) => {
            let (a, b) = (decimal_of(left), decimal_of(right));
            Ok(Value::Decimal(match op {
                Add => a + b,
                Sub => a - b,
                Mul => a * b,
                Div => {
                    if b.is_zero() {
                        return Err(SqlError::Eval("division by zero".to_string()));
                    }
                    a / b
                }
                Mod => a % b,
                _ => return Err(fail()),
            }))
        }
        _ => Err(fail()),
    }
}

pub(crate) fn fold_neg(v: &Value) -> SqlResult<Value> {
    match v {
        Value::Int(n) => Ok(Value::Int(-n)),
        Value::Float(n) => Ok(Value::Float(-n)),
        Value::Decimal(d) => Ok(Value::Decimal(-*d)),
        other => Err(SqlError::Eval(format!("negation of {}", other))),
    }
}

fn bool_of(v: &Value) -> SqlResult<bool> {
    v.as_bool()
        .ok_or_else(|| SqlError::Eval(format!("{} is not a boolean", v)))
}

fn float_of(v: &Value) -> f64 {
    match v {
        Value::Int(n) => *n as f64,
        Value::Float(n) => *n,
        _ => f64::NAN,
    }
}

fn decimal_of(v: &Value) -> Decimal {
    match v {
        Value::Int(n) => Decimal::from(*n),
        Value::Decimal(d) => *d,
        _ => Decimal::ZERO,
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
        (Value::Int(a), Value::Decimal(b)) | (Value::Decimal(b), Value::Int(a)) => {
            Decimal::from(*a) == *b
        }
        (a, b) => a == b,
    }
}

fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            float_of(left).partial_cmp(&float_of(right))
        }
        (Value::Int(_) | Value::Decimal(_), Value::Int(_) | Value::Decimal(_)) => {
            Some(decimal_of(left).cmp(&decimal_of(right)))
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
