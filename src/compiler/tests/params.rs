//! Parameter store, raw fragment, and merged-rendering tests.

use pretty_assertions::assert_eq;

use super::q;
use crate::prelude::*;

#[test]
fn test_params_are_positional() {
    let e = q()
        .where_(&Expr::gt(Expr::field("Age"), Expr::value(18)))
        .unwrap()
        .and_(&Expr::eq(Expr::field("Name"), Expr::value("A")))
        .unwrap();
    let names: Vec<&str> = e.params().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["@0", "@1"]);
}

#[test]
fn test_where_fmt_binds_placeholders() {
    let e = q().where_fmt("\"Age\" = {0}", &[18.into()]).unwrap();
    assert!(e.to_select_statement().contains("WHERE \"Age\" = @0"));
    assert_eq!(e.params()[0].value, Value::Int(18));
}

#[test]
fn test_where_fmt_expands_arrays() {
    let e = q()
        .where_fmt("\"Age\" in ({0})", &[Value::from(vec![1, 2])])
        .unwrap();
    assert!(e.to_select_statement().contains("WHERE \"Age\" in (@0,@1)"));
}

#[test]
fn test_or_fmt_condition() {
    let e = q()
        .where_fmt("\"Age\" = {0}", &[18.into()])
        .unwrap()
        .or_fmt("\"Age\" = {0}", &[21.into()])
        .unwrap();
    assert!(
        e.to_select_statement()
            .contains("WHERE \"Age\" = @0 OR \"Age\" = @1")
    );
}

#[test]
fn test_unsafe_fragment_rejected() {
    assert!(matches!(
        q().where_fmt("1=1; DROP TABLE x", &[]),
        Err(SqlError::UnsafeFragment { .. })
    ));
    assert!(q().where_fmt("\"Age\" = 1 -- admin", &[]).is_err());
    assert!(q().order_by("\"Age\"; DROP TABLE x").is_err());
    assert!(q().select("1 /* hidden */").is_err());
}

#[test]
fn test_unsafe_variant_bypasses_check() {
    let e = q().unsafe_where("\"Age\" > 18 -- audited", &[]);
    assert!(e.to_select_statement().contains("\"Age\" > 18 -- audited"));
}

#[test]
fn test_merged_params_statement() {
    let e = q()
        .where_(&Expr::and(
            Expr::gt(Expr::field("Age"), Expr::value(18)),
            Expr::call(
                Expr::field("Name"),
                Method::StartsWith,
                vec![Expr::value("A")],
            ),
        ))
        .unwrap();
    assert!(
        e.to_merged_params_statement()
            .contains("WHERE ((\"Age\" > 18) AND upper(\"Name\") like 'A%')")
    );
}

#[test]
fn test_merged_params_handles_double_digit_ordinals() {
    let ages: Vec<i64> = (100..112).collect();
    let e = q()
        .where_(&Expr::static_call(
            Method::Contains,
            vec![Expr::value(ages), Expr::field("Age")],
        ))
        .unwrap();
    let merged = e.to_merged_params_statement();
    assert!(merged.contains("\"Age\" IN (100,101,102,103,104,105,106,107,108,109,110,111)"));
    assert!(!merged.contains('@'));
}

#[test]
fn test_clone_is_deep() {
    let original = q()
        .where_(&Expr::gt(Expr::field("Age"), Expr::value(18)))
        .unwrap();
    let extended = original
        .clone()
        .and_(&Expr::eq(Expr::field("Name"), Expr::value("A")))
        .unwrap();
    assert_eq!(original.params().len(), 1);
    assert_eq!(extended.params().len(), 2);
}

#[test]
fn test_sub_select_snapshot() {
    let e = q()
        .where_(&Expr::gt(Expr::field("Age"), Expr::value(18)))
        .unwrap();
    let sub = e.to_sub_select();
    assert_eq!(sub.sql, e.to_select_statement());
    assert_eq!(sub.params, e.params());
}

#[test]
fn test_string_values_quoted_in_merged_output() {
    let e = q()
        .where_(&Expr::eq(Expr::field("Name"), Expr::value("O'Brien")))
        .unwrap();
    assert!(
        e.to_merged_params_statement()
            .contains("(\"Name\" = 'O''Brien')")
    );
}
