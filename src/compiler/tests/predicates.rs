//! Operator compilation and boolean normalization tests.

use pretty_assertions::assert_eq;

use super::{PERSON_COLS, person, q};
use crate::prelude::*;

fn where_sql(pred: Expr) -> String {
    let e = q().where_(&pred).unwrap();
    let sql = e.to_select_statement();
    sql.split(" WHERE ").nth(1).unwrap_or("").to_string()
}

#[test]
fn test_comparison_and_like() {
    let pred = Expr::and(
        Expr::gt(Expr::field("Age"), Expr::value(18)),
        Expr::call(
            Expr::field("Name"),
            Method::StartsWith,
            vec![Expr::value("A")],
        ),
    );
    let e = q().where_(&pred).unwrap();
    assert_eq!(
        e.to_select_statement(),
        format!(
            "SELECT {} FROM \"Person\" WHERE ((\"Age\" > @0) AND upper(\"Name\") like @1)",
            PERSON_COLS
        )
    );
    assert_eq!(e.params()[0].value, Value::Int(18));
    assert_eq!(e.params()[1].value, Value::String("A%".to_string()));
}

#[test]
fn test_bare_bool_member() {
    assert_eq!(where_sql(Expr::field("Active")), "\"Active\"=TRUE");
}

#[test]
fn test_negated_bool_member() {
    assert_eq!(where_sql(Expr::not(Expr::field("Active"))), "\"Active\"=FALSE");
}

#[test]
fn test_bool_member_inside_logical() {
    assert_eq!(
        where_sql(Expr::and(
            Expr::field("Active"),
            Expr::gt(Expr::field("Age"), Expr::value(18)),
        )),
        "(\"Active\"=TRUE AND (\"Age\" > @0))"
    );
}

#[test]
fn test_compare_expression_to_true_unwraps() {
    let call = Expr::call(
        Expr::field("Name"),
        Method::StartsWith,
        vec![Expr::value("A")],
    );
    assert_eq!(
        where_sql(Expr::eq(call, Expr::value(true))),
        "upper(\"Name\") like @0"
    );
}

#[test]
fn test_compare_expression_to_false_negates() {
    let call = Expr::call(
        Expr::field("Name"),
        Method::StartsWith,
        vec![Expr::value("A")],
    );
    assert_eq!(
        where_sql(Expr::eq(call, Expr::value(false))),
        "NOT (upper(\"Name\") like @0)"
    );
}

#[test]
fn test_bool_field_compared_to_literal_parameterizes() {
    assert_eq!(
        where_sql(Expr::eq(Expr::field("Active"), Expr::value(true))),
        "(\"Active\" = @0)"
    );
}

#[test]
fn test_null_equality_uses_is() {
    assert_eq!(
        where_sql(Expr::eq(Expr::field("Email"), Expr::null())),
        "(\"Email\" IS NULL)"
    );
}

#[test]
fn test_null_on_left_swaps() {
    assert_eq!(
        where_sql(Expr::ne(Expr::null(), Expr::field("Email"))),
        "(\"Email\" IS NOT NULL)"
    );
}

#[test]
fn test_null_against_bool_folds_to_constant() {
    assert_eq!(where_sql(Expr::eq(Expr::null(), Expr::value(true))), "(1=0)");
    assert_eq!(where_sql(Expr::ne(Expr::null(), Expr::value(false))), "(1=1)");
}

#[test]
fn test_constant_predicate_folds() {
    assert_eq!(
        where_sql(Expr::lt(
            Expr::add(Expr::value(1), Expr::value(2)),
            Expr::value(5),
        )),
        "(1=1)"
    );
}

#[test]
fn test_left_constant_renders_as_literal() {
    assert_eq!(
        where_sql(Expr::gt(Expr::value(18), Expr::field("Age"))),
        "(18 > \"Age\")"
    );
}

#[test]
fn test_logical_constant_side() {
    assert_eq!(
        where_sql(Expr::and(
            Expr::value(true),
            Expr::gt(Expr::field("Age"), Expr::value(18)),
        )),
        "((TRUE=TRUE) AND (\"Age\" > @0))"
    );
}

#[test]
fn test_mod_renders_as_function() {
    assert_eq!(
        where_sql(Expr::eq(
            Expr::binary(BinaryOp::Mod, Expr::field("Age"), Expr::value(2)),
            Expr::value(0),
        )),
        "(MOD(\"Age\",@0) = @1)"
    );
}

#[test]
fn test_coalesce_renders_as_function() {
    assert_eq!(
        where_sql(Expr::eq(
            Expr::binary(BinaryOp::Coalesce, Expr::field("Email"), Expr::value("x")),
            Expr::value("x"),
        )),
        "(COALESCE(\"Email\",@0) = @1)"
    );
}

#[test]
fn test_string_add_is_concatenation() {
    assert_eq!(
        where_sql(Expr::eq(
            Expr::add(Expr::field("Name"), Expr::value("!")),
            Expr::value("A!"),
        )),
        "((\"Name\" || @0) = @1)"
    );
}

#[test]
fn test_enum_literal_coerced_to_storage() {
    let e = q()
        .where_(&Expr::eq(Expr::field("State"), Expr::value(1)))
        .unwrap();
    assert!(e.to_select_statement().contains("WHERE (\"State\" = @0)"));
    assert_eq!(e.params()[0].value, Value::String("Active".to_string()));
}

#[test]
fn test_conditional_compiles_to_case() {
    assert_eq!(
        where_sql(Expr::gt(
            Expr::cond(Expr::field("Active"), Expr::value(1), Expr::value(2)),
            Expr::value(0),
        )),
        "((CASE WHEN \"Active\"=TRUE THEN @0 ELSE @1 END) > @2)"
    );
}

#[test]
fn test_conditional_constant_test_folds_to_branch() {
    assert_eq!(
        where_sql(Expr::eq(
            Expr::field("Age"),
            Expr::cond(Expr::value(true), Expr::value(1), Expr::value(2)),
        )),
        "(\"Age\" = @0)"
    );
}

#[test]
fn test_negation() {
    assert_eq!(
        where_sql(Expr::eq(Expr::neg(Expr::field("Age")), Expr::value(-5))),
        "(-(\"Age\") = @0)"
    );
}

#[test]
fn test_bitwise_operator() {
    assert_eq!(
        where_sql(Expr::eq(
            Expr::binary(BinaryOp::BitAnd, Expr::field("Age"), Expr::value(1)),
            Expr::value(1),
        )),
        "((\"Age\" & @0) = @1)"
    );
}

#[test]
fn test_sqlite_bool_literals() {
    let e = SqlExpression::with_dialect(person(), Dialect::Sqlite)
        .where_(&Expr::field("Active"))
        .unwrap();
    assert!(e.to_select_statement().contains("WHERE \"Active\"=1"));
}
