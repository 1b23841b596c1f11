//! Membership, string operator, and `Sql` helper tests.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::{department, person, q};
use crate::prelude::*;

fn where_sql(pred: Expr) -> String {
    let e = q().where_(&pred).unwrap();
    let sql = e.to_select_statement();
    sql.split(" WHERE ").nth(1).unwrap_or("").to_string()
}

#[test]
fn test_starts_with_folds_case() {
    let e = q()
        .where_(&Expr::call(
            Expr::field("Name"),
            Method::StartsWith,
            vec![Expr::value("ab")],
        ))
        .unwrap();
    assert!(e.to_select_statement().contains("WHERE upper(\"Name\") like @0"));
    assert_eq!(e.params()[0].value, Value::String("AB%".to_string()));
}

#[test]
fn test_ends_with_and_contains_patterns() {
    let e = q()
        .where_(&Expr::call(
            Expr::field("Name"),
            Method::EndsWith,
            vec![Expr::value("x")],
        ))
        .unwrap();
    assert_eq!(e.params()[0].value, Value::String("%X".to_string()));

    let e = q()
        .where_(&Expr::call(
            Expr::field("Name"),
            Method::Contains,
            vec![Expr::value("x")],
        ))
        .unwrap();
    assert_eq!(e.params()[0].value, Value::String("%X%".to_string()));
}

#[test]
fn test_like_without_case_fold() {
    let e = q()
        .fold_like_case(false)
        .where_(&Expr::call(
            Expr::field("Name"),
            Method::StartsWith,
            vec![Expr::value("ab")],
        ))
        .unwrap();
    assert!(e.to_select_statement().contains("WHERE \"Name\" like @0"));
    assert_eq!(e.params()[0].value, Value::String("ab%".to_string()));
}

#[test]
fn test_like_escapes_wildcards() {
    let e = q()
        .where_(&Expr::call(
            Expr::field("Name"),
            Method::Contains,
            vec![Expr::value("50%")],
        ))
        .unwrap();
    assert!(
        e.to_select_statement()
            .contains("WHERE upper(\"Name\") like @0 escape '^'")
    );
    assert_eq!(e.params()[0].value, Value::String("%50^%%".to_string()));
}

#[test]
fn test_membership_static_form() {
    let pred = Expr::static_call(
        Method::Contains,
        vec![Expr::value(vec![1, 2, 3]), Expr::field("Age")],
    );
    assert_eq!(where_sql(pred), "\"Age\" IN (@0,@1,@2)");
}

#[test]
fn test_membership_instance_form() {
    let pred = Expr::call(
        Expr::value(vec!["a", "b"]),
        Method::Contains,
        vec![Expr::field("Name")],
    );
    assert_eq!(where_sql(pred), "\"Name\" IN (@0,@1)");
}

#[test]
fn test_membership_empty_set_is_false() {
    let pred = Expr::static_call(
        Method::Contains,
        vec![Expr::value(Vec::<i64>::new()), Expr::field("Age")],
    );
    assert_eq!(where_sql(pred), "(1=0)");
}

#[test]
fn test_membership_null_set_is_false() {
    let pred = Expr::static_call(Method::Contains, vec![Expr::null(), Expr::field("Age")]);
    assert_eq!(where_sql(pred), "(1=0)");
    assert_eq!(where_sql(Sql::in_null(Expr::field("Age"))), "(1=0)");
}

#[test]
fn test_membership_coerces_enum_elements() {
    let pred = Expr::static_call(
        Method::Contains,
        vec![Expr::value(vec![0, 1]), Expr::field("State")],
    );
    let e = q().where_(&pred).unwrap();
    assert_eq!(e.params()[0].value, Value::String("Draft".to_string()));
    assert_eq!(e.params()[1].value, Value::String("Active".to_string()));
}

#[test]
fn test_sub_select_inlining_renumbers_params() {
    let inner = SqlExpression::new(department())
        .select_fields(&["Id"])
        .where_(&Expr::eq(Expr::field("Name"), Expr::value("Sales")))
        .unwrap();
    let e = q()
        .where_(&Expr::gt(Expr::field("Age"), Expr::value(18)))
        .unwrap()
        .and_(&Sql::in_select(Expr::field("Id"), inner.to_sub_select()))
        .unwrap();
    assert!(e.to_select_statement().contains(
        "WHERE (\"Age\" > @0) AND \"Id\" IN \
         (SELECT \"Id\" FROM \"Department\" WHERE (\"Name\" = @1))"
    ));
    assert_eq!(e.params()[1].name, "@1");
    assert_eq!(e.params()[1].value, Value::String("Sales".to_string()));
}

#[test]
fn test_substring_is_one_indexed() {
    let pred = Expr::eq(
        Expr::call(
            Expr::field("Name"),
            Method::Substring,
            vec![Expr::value(0), Expr::value(3)],
        ),
        Expr::value("ABC"),
    );
    assert_eq!(where_sql(pred), "(substring(\"Name\" from 1 for 3) = @0)");
}

#[test]
fn test_substring_sqlite_template() {
    let e = SqlExpression::with_dialect(person(), Dialect::Sqlite)
        .where_(&Expr::eq(
            Expr::call(
                Expr::field("Name"),
                Method::Substring,
                vec![Expr::value(0), Expr::value(3)],
            ),
            Expr::value("ABC"),
        ))
        .unwrap();
    assert!(e.to_select_statement().contains("(substr(\"Name\",1,3) = @0)"));
}

#[test]
fn test_equals_method() {
    let pred = Expr::call(Expr::field("Name"), Method::Equals, vec![Expr::value("x")]);
    assert_eq!(where_sql(pred), "\"Name\"=@0");
}

#[test]
fn test_chained_string_methods() {
    let pred = Expr::eq(
        Expr::call(
            Expr::call(Expr::field("Name"), Method::Trim, vec![]),
            Method::Upper,
            vec![],
        ),
        Expr::value("A"),
    );
    assert_eq!(where_sql(pred), "(upper(ltrim(rtrim(\"Name\"))) = @0)");
}

#[test]
fn test_length_method() {
    let pred = Expr::gt(
        Expr::call(Expr::field("Name"), Method::Length, vec![]),
        Expr::value(3),
    );
    assert_eq!(where_sql(pred), "(char_length(\"Name\") > @0)");
}

#[test]
fn test_unsupported_call_is_rejected() {
    let err = q()
        .where_(&Expr::static_call(Method::Upper, vec![Expr::field("Name")]))
        .unwrap_err();
    assert!(matches!(err, SqlError::Unsupported(_)));
}

#[test]
fn test_eval_hook_resolves_opaque_calls() {
    let hook: EvalHook = Arc::new(|e| match e {
        Expr::Call {
            method: Method::ToStr,
            object: None,
            ..
        } => Some(Value::String("42".to_string())),
        _ => None,
    });
    let e = q()
        .eval_hook(hook)
        .where_(&Expr::eq(
            Expr::field("Name"),
            Expr::static_call(Method::ToStr, vec![]),
        ))
        .unwrap();
    assert!(e.to_select_statement().contains("WHERE (\"Name\" = @0)"));
    assert_eq!(e.params()[0].value, Value::String("42".to_string()));
}

#[test]
fn test_aggregates() {
    assert_eq!(
        q().select_expr(&Sql::count_star()).unwrap().to_select_statement(),
        "SELECT COUNT(*) FROM \"Person\""
    );
    assert_eq!(
        q().select_expr(&Sql::max(Expr::field("Age"))).unwrap().to_select_statement(),
        "SELECT MAX(\"Age\") FROM \"Person\""
    );
    assert_eq!(
        q().select_expr(&Sql::count_distinct(Expr::field("Name")))
            .unwrap()
            .to_select_statement(),
        "SELECT COUNT(DISTINCT \"Name\") FROM \"Person\""
    );
}

#[test]
fn test_cast_helper() {
    assert_eq!(
        q().select_expr(&Sql::cast(Expr::field("Age"), "VARCHAR(10)"))
            .unwrap()
            .to_select_statement(),
        "SELECT CAST(\"Age\" AS VARCHAR(10)) FROM \"Person\""
    );
}
