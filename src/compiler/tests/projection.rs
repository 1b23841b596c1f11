//! Select list, anonymous object, and ordering tests.

use pretty_assertions::assert_eq;

use super::{PERSON_COLS, department, q};
use crate::prelude::*;

#[test]
fn test_anonymous_object_aliases_renamed_members() {
    let e = q()
        .select_expr(&Expr::object(vec![
            ("PersonName", Expr::field("Name")),
            ("Age", Expr::field("Age")),
        ]))
        .unwrap();
    assert_eq!(
        e.to_select_statement(),
        "SELECT \"Name\" AS \"PersonName\", \"Age\" FROM \"Person\""
    );
}

#[test]
fn test_group_with_aggregate_projection() {
    let e = q()
        .select_expr(&Expr::object(vec![
            ("Name", Expr::field("Name")),
            ("Count", Sql::count_star()),
        ]))
        .unwrap()
        .group_by_expr(&Expr::field("Name"))
        .unwrap();
    assert_eq!(
        e.to_select_statement(),
        "SELECT \"Name\", COUNT(*) AS \"Count\" FROM \"Person\" GROUP BY \"Name\""
    );
}

#[test]
fn test_group_by_strips_projection_aliases() {
    let e = q()
        .group_by_expr(&Expr::object(vec![
            ("N", Expr::field("Name")),
            ("A", Expr::field("Age")),
        ]))
        .unwrap();
    assert!(
        e.to_select_statement()
            .contains("GROUP BY \"Name\", \"Age\"")
    );
}

#[test]
fn test_embedded_row_prefixes_aliases() {
    let e = q()
        .select_expr(&Expr::object(vec![("Owner", Expr::row("Person"))]))
        .unwrap();
    assert!(
        e.to_select_statement()
            .starts_with("SELECT \"Id\" AS \"OwnerId\", \"Name\" AS \"OwnerName\"")
    );
}

#[test]
fn test_embedded_row_same_name_keeps_columns() {
    let e = q()
        .select_expr(&Expr::object(vec![("Person", Expr::row("Person"))]))
        .unwrap();
    assert_eq!(
        e.to_select_statement(),
        format!("SELECT {} FROM \"Person\"", PERSON_COLS)
    );
}

#[test]
fn test_whole_row_select_matches_default() {
    assert_eq!(
        q().select_expr(&Expr::row("Person")).unwrap().to_select_statement(),
        q().to_select_statement()
    );
}

#[test]
fn test_distinct() {
    assert!(
        q().distinct()
            .to_select_statement()
            .starts_with("SELECT DISTINCT \"Id\"")
    );
    assert_eq!(
        q().select_distinct_expr(&Expr::field("Name"))
            .unwrap()
            .to_select_statement(),
        "SELECT DISTINCT \"Name\" FROM \"Person\""
    );
}

#[test]
fn test_select_fields_by_name() {
    assert_eq!(
        q().select_fields(&["Name", "Age"]).to_select_statement(),
        "SELECT \"Name\", \"Age\" FROM \"Person\""
    );
}

#[test]
fn test_select_fields_star_suffix() {
    assert_eq!(
        q().select_fields(&["Person.*"]).to_select_statement(),
        "SELECT \"Person\".* FROM \"Person\""
    );
}

#[test]
fn test_select_fields_skips_unknown() {
    assert_eq!(
        q().select_fields(&["Name", "Bogus"]).to_select_statement(),
        "SELECT \"Name\" FROM \"Person\""
    );
}

#[test]
fn test_custom_select_column() {
    let order = ModelDefinition::new("Order")
        .field(FieldDefinition::new("Id", ColumnType::Int).primary_key())
        .field(FieldDefinition::new("Price", ColumnType::Int))
        .field(FieldDefinition::new("Qty", ColumnType::Int))
        .field(FieldDefinition::new("Total", ColumnType::Int).custom_select("\"Price\" * \"Qty\""));
    let e = SqlExpression::new(order)
        .where_(&Expr::gt(Expr::field("Total"), Expr::value(100)))
        .unwrap();
    assert_eq!(
        e.to_select_statement(),
        "SELECT \"Id\", \"Price\", \"Qty\", \"Price\" * \"Qty\" AS \"Total\" \
         FROM \"Order\" WHERE (\"Price\" * \"Qty\" > @0)"
    );
}

#[test]
fn test_order_by_then_by() {
    let e = q()
        .order_by_expr(&Expr::field("Age"))
        .unwrap()
        .then_by_descending_expr(&Expr::field("Name"))
        .unwrap();
    assert!(
        e.to_select_statement()
            .ends_with("ORDER BY \"Age\", \"Name\" DESC")
    );
}

#[test]
fn test_order_by_rebuilds_on_mutation() {
    let e = q()
        .order_by_expr(&Expr::field("Age"))
        .unwrap()
        .order_by_expr(&Expr::field("Name"))
        .unwrap();
    assert!(e.to_select_statement().ends_with("ORDER BY \"Name\""));
}

#[test]
fn test_order_by_descending_splits_multi_keys() {
    let e = q()
        .order_by_descending_expr(&Expr::object(vec![
            ("Name", Expr::field("Name")),
            ("Age", Expr::field("Age")),
        ]))
        .unwrap();
    assert!(
        e.to_select_statement()
            .ends_with("ORDER BY \"Name\" DESC, \"Age\" DESC")
    );
}

#[test]
fn test_order_by_desc_helper() {
    let e = q().order_by_expr(&Sql::desc(Expr::field("Age"))).unwrap();
    assert!(e.to_select_statement().ends_with("ORDER BY \"Age\" DESC"));
}

#[test]
fn test_order_by_field_names_with_direction_prefix() {
    let e = q().order_by_fields(&["-Age", "Name"]).unwrap();
    assert!(
        e.to_select_statement()
            .ends_with("ORDER BY \"Age\" DESC, \"Name\"")
    );
}

#[test]
fn test_alias_helper() {
    assert_eq!(
        q().select_expr(&Sql::alias(Expr::field("Name"), "N"))
            .unwrap()
            .to_select_statement(),
        "SELECT \"Name\" AS \"N\" FROM \"Person\""
    );
}

#[test]
fn test_all_fields_helper() {
    let on = Expr::eq(
        Expr::joined_field("Person", "Id"),
        Expr::joined_field("Department", "Id"),
    );
    let e = q()
        .join(&department(), &on)
        .unwrap()
        .select_expr(&Sql::all_fields("Department"))
        .unwrap();
    assert!(
        e.to_select_statement()
            .starts_with("SELECT \"Department\".* FROM \"Person\"")
    );
}

#[test]
fn test_join_alias_helper() {
    let on = Expr::eq(
        Expr::joined_field("Person", "Id"),
        Expr::joined_field("Department", "Id"),
    );
    let e = q()
        .join(&department(), &on)
        .unwrap()
        .select_expr(&Sql::join_alias(
            Expr::joined_field("Department", "Name"),
            "d",
        ))
        .unwrap();
    assert!(
        e.to_select_statement()
            .starts_with("SELECT \"d\".\"Name\" FROM \"Person\"")
    );
}
