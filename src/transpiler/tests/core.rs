//! Statement shapes on the default dialect.

use pretty_assertions::assert_eq;

use crate::ast::builders::*;
use crate::ast::{ColumnType, CompareOp, Constant, Order, Select, SortOrder, Value};
use crate::schema::ColumnDef;
use crate::transpiler::dml::delete::build_delete;
use crate::transpiler::dml::insert::build_insert;
use crate::transpiler::dml::update::{build_update, key_filter, PreparedUpdate};
use crate::transpiler::{compile_filter, compile_order, Dialect, ParamMode, ToSql};

fn orders() -> Select {
    Select::builder("Orders")
        .unwrap()
        .column(col("Id"))
        .unwrap()
        .column_as(upper(col("Name")), "N")
        .unwrap()
        .filter(eq(col("Status"), 3))
        .order_by(col("Id"), SortOrder::Desc)
        .max_rows(10)
        .unwrap()
        .build()
}

#[test]
fn test_basic_select() {
    let stmt = orders().to_sql().unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT \"Id\", UPPER(\"Name\") AS \"N\" FROM \"Orders\" WHERE \"Status\" = @P1 ORDER BY \"Id\" DESC LIMIT 10"
    );
    assert_eq!(stmt.params.len(), 1);
    assert_eq!(stmt.params[0].value, Value::Int(3));
    assert_eq!(stmt.params[0].ty, ColumnType::Integer);
    assert_eq!(stmt.max_rows, None);
}

#[test]
fn test_select_star_without_columns() {
    let select = Select::builder("Orders").unwrap().build();
    assert_eq!(select.to_sql().unwrap().sql, "SELECT * FROM \"Orders\"");
}

#[test]
fn test_select_distinct_with_alias() {
    let select = Select::builder("Orders")
        .unwrap()
        .alias("o")
        .unwrap()
        .column(col("o.Region"))
        .unwrap()
        .distinct()
        .build();
    assert_eq!(
        select.to_sql().unwrap().sql,
        "SELECT DISTINCT \"o\".\"Region\" AS \"Region\" FROM \"Orders\" AS \"o\""
    );
}

#[test]
fn test_filters_combine_with_and() {
    let select = Select::builder("Orders")
        .unwrap()
        .filter(eq(col("A"), 1))
        .filter(eq(col("B"), 2))
        .build();
    assert_eq!(
        select.to_sql().unwrap().sql,
        "SELECT * FROM \"Orders\" WHERE (\"A\" = @P1 AND \"B\" = @P2)"
    );
}

#[test]
fn test_placeholders_are_stable() {
    let d = Dialect::Postgres.generator();
    let f = eq(col("A"), 1).and(gt(col("B"), 2)).or(is_null(col("C")));
    let first = compile_filter(d.as_ref(), &f, ParamMode::Bind).unwrap();
    let second = compile_filter(d.as_ref(), &f, ParamMode::Bind).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.sql, "((\"A\" = @P1 AND \"B\" > @P2) OR \"C\" IS NULL)");
    assert_eq!(first.placeholder_count(), 2);
}

#[test]
fn test_not_equal_matches_null() {
    let d = Dialect::Postgres.generator();
    let stmt = compile_filter(d.as_ref(), &ne(col("Qty"), 5), ParamMode::Bind).unwrap();
    assert_eq!(stmt.sql, "(\"Qty\" <> @P1 OR \"Qty\" IS NULL)");
    assert_eq!(stmt.params.len(), 1);
}

#[test]
fn test_compare_to_null() {
    let d = Dialect::Postgres.generator();
    let stmt = compile_filter(d.as_ref(), &eq(col("X"), Constant::null(ColumnType::Integer).unwrap()), ParamMode::Bind).unwrap();
    assert_eq!(stmt.sql, "\"X\" IS NULL");
    let stmt = compile_filter(d.as_ref(), &ne(col("X"), Constant::null(ColumnType::Integer).unwrap()), ParamMode::Bind).unwrap();
    assert_eq!(stmt.sql, "\"X\" IS NOT NULL");
    assert!(stmt.params.is_empty());
}

#[test]
fn test_null_as_default_compare() {
    let d = Dialect::Postgres.generator();
    let f = cmp_default(col("Qty"), CompareOp::Gt, Constant::typed(5, ColumnType::Integer).unwrap());
    let stmt = compile_filter(d.as_ref(), &f, ParamMode::Bind).unwrap();
    assert_eq!(stmt.sql, "COALESCE(\"Qty\", 0) > @P1");
}

#[test]
fn test_starts_with_escapes_wildcards() {
    let d = Dialect::Postgres.generator();
    let stmt = compile_filter(d.as_ref(), &starts_with(col("Name"), "50%_"), ParamMode::Bind).unwrap();
    assert_eq!(stmt.sql, "\"Name\" LIKE @P1 ESCAPE '\\'");
    assert_eq!(stmt.params[0].value, Value::String("50\\%\\_%".to_string()));
}

#[test]
fn test_inline_mode_uses_literals() {
    let d = Dialect::Postgres.generator();
    let f = eq(col("Name"), "O'Brien").and(between(col("Qty"), 1, 5));
    let stmt = compile_filter(d.as_ref(), &f, ParamMode::Inline).unwrap();
    assert_eq!(stmt.sql, "(\"Name\" = 'O''Brien' AND \"Qty\" BETWEEN 1 AND 5)");
    assert!(stmt.params.is_empty());
}

#[test]
fn test_empty_junctions() {
    let d = Dialect::Postgres.generator();
    let always = compile_filter(d.as_ref(), &crate::ast::Filter::And(vec![]), ParamMode::Bind).unwrap();
    let never = compile_filter(d.as_ref(), &crate::ast::Filter::Or(vec![]), ParamMode::Bind).unwrap();
    assert_eq!(always.sql, "1=1");
    assert_eq!(never.sql, "1=0");
}

#[test]
fn test_in_list_and_negation() {
    let d = Dialect::Postgres.generator();
    let f = in_list(col("Id"), [1, 2, 3]).negate();
    let stmt = compile_filter(d.as_ref(), &f, ParamMode::Bind).unwrap();
    assert_eq!(stmt.sql, "NOT (\"Id\" IN (@P1, @P2, @P3))");
    let empty = compile_filter(d.as_ref(), &in_list(col("Id"), Vec::<i64>::new()), ParamMode::Bind).unwrap();
    assert_eq!(empty.sql, "1=0");
}

#[test]
fn test_in_subquery() {
    let customers = Select::builder("Customers")
        .unwrap()
        .column(col("Id"))
        .unwrap()
        .filter(eq(col("Active"), true))
        .build();
    let select = Select::builder("Orders")
        .unwrap()
        .filter(in_subquery(col("CustomerId"), customers))
        .build();
    let stmt = select.to_sql().unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT * FROM \"Orders\" WHERE \"CustomerId\" IN (SELECT \"Id\" FROM \"Customers\" WHERE \"Active\" = @P1)"
    );
    assert_eq!(stmt.params[0].value, Value::Bool(true));
}

#[test]
fn test_in_subquery_needs_single_column() {
    let sub = Select::builder("Customers").unwrap().build();
    let select = Select::builder("Orders").unwrap().filter(in_subquery(col("CustomerId"), sub)).build();
    assert!(select.to_sql().is_err());
}

#[test]
fn test_order_with_null_substitute() {
    let d = Dialect::Postgres.generator();
    let order = Order::new()
        .then_with_null(col("Rank"), SortOrder::Asc, lit(0))
        .then_desc(col("Id"));
    assert_eq!(compile_order(d.as_ref(), &order).unwrap(), "COALESCE(\"Rank\", 0) ASC, \"Id\" DESC");
}

#[test]
fn test_expression_constants_inline() {
    let select = Select::builder("People")
        .unwrap()
        .column_as(concat([col("First"), lit(" "), col("Last")]), "FullName")
        .unwrap()
        .column_as(substring(col("Code"), 2, Some(3)), "Part")
        .unwrap()
        .build();
    let stmt = select.to_sql().unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT (\"First\" || ' ' || \"Last\") AS \"FullName\", SUBSTRING(\"Code\", 2, 3) AS \"Part\" FROM \"People\""
    );
    assert!(stmt.params.is_empty());
}

#[test]
fn test_update_with_key_filter() {
    let d = Dialect::Postgres.generator();
    let set = vec![
        (ColumnDef::new("Name", ColumnType::String), Value::from("x")),
        (ColumnDef::new("Qty", ColumnType::Integer), Value::Int(2)),
    ];
    let filter = key_filter(&[ColumnDef::new("Id", ColumnType::Integer)], &[Value::Int(7)]).unwrap();
    let stmt = build_update("Orders", &set, Some(&filter), d.as_ref(), ParamMode::Bind).unwrap();
    assert_eq!(stmt.sql, "UPDATE \"Orders\" SET \"Name\" = @P1, \"Qty\" = @P2 WHERE \"Id\" = @P3");
    assert_eq!(stmt.params.len(), 3);
}

#[test]
fn test_prepared_update_rebinds() {
    let d = Dialect::Postgres.generator();
    let prepared = PreparedUpdate::prepare(
        d.as_ref(),
        "Orders",
        vec![ColumnDef::new("Qty", ColumnType::Integer)],
        vec![ColumnDef::new("Id", ColumnType::Integer)],
    )
    .unwrap();
    assert!(prepared.is_templated());

    let a = prepared.bind(d.as_ref(), &[Value::Int(1)], &[Value::Int(10)]).unwrap();
    let b = prepared.bind(d.as_ref(), &[Value::Int(2)], &[Value::Int(20)]).unwrap();
    assert_eq!(a.sql, "UPDATE \"Orders\" SET \"Qty\" = @P1 WHERE \"Id\" = @P2");
    assert_eq!(a.sql, b.sql);
    assert_eq!(b.params[1].value, Value::Int(20));

    let null_key = prepared.bind(d.as_ref(), &[Value::Int(3)], &[Value::Null]).unwrap();
    assert_eq!(null_key.sql, "UPDATE \"Orders\" SET \"Qty\" = @P1 WHERE \"Id\" IS NULL");
}

#[test]
fn test_insert_and_delete() {
    let d = Dialect::Postgres.generator();
    let cols = [ColumnDef::new("A", ColumnType::Integer), ColumnDef::new("B", ColumnType::String)];
    let rows = vec![
        vec![Value::Int(1), Value::from("x")],
        vec![Value::Int(2), Value::Null],
    ];
    let stmt = build_insert("T", &cols, &rows, d.as_ref(), ParamMode::Bind).unwrap();
    assert_eq!(stmt.sql, "INSERT INTO \"T\" (\"A\", \"B\") VALUES (@P1, @P2), (@P3, @P4)");
    assert_eq!(stmt.params[3].value, Value::Null);

    let short = vec![vec![Value::Int(1)]];
    assert!(build_insert("T", &cols, &short, d.as_ref(), ParamMode::Bind).is_err());

    let del = build_delete("T", Some(&lt(col("A"), 0)), d.as_ref(), ParamMode::Bind).unwrap();
    assert_eq!(del.sql, "DELETE FROM \"T\" WHERE \"A\" < @P1");
    let all = build_delete("T", None, d.as_ref(), ParamMode::Bind).unwrap();
    assert_eq!(all.sql, "DELETE FROM \"T\"");
}

#[test]
fn test_select_serializes_and_compiles_from_json() {
    let json = r#"{
        "table": "Orders",
        "columns": [{ "expr": { "column": "Id" } }],
        "max_rows": 5
    }"#;
    let select: Select = serde_json::from_str(json).unwrap();
    assert_eq!(select.to_sql().unwrap().sql, "SELECT \"Id\" FROM \"Orders\" LIMIT 5");
}
