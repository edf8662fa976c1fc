//! Per-dialect syntax (MsSql, Postgres, Sqlite, Access, Db2, DataView).

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use crate::ast::builders::*;
use crate::ast::{ColumnType, CompareOp, Constant, Order, Select, SortOrder, Value};
use crate::error::PolyError;
use crate::schema::ColumnDef;
use crate::transpiler::dml::delete::build_delete;
use crate::transpiler::dml::insert::build_insert;
use crate::transpiler::dml::update::PreparedUpdate;
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
fn test_mssql_dialect() {
    let stmt = orders().to_sql_with_dialect(Dialect::MsSql).unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT TOP 10 [Id], UPPER([Name]) AS [N] FROM [Orders] WHERE [Status] = @P1 ORDER BY [Id] DESC"
    );

    let d = Dialect::MsSql.generator();
    let f = eq(col("Name"), "Zoë").and(eq(col("Day"), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
    let stmt = compile_filter(d.as_ref(), &f, ParamMode::Inline).unwrap();
    assert_eq!(stmt.sql, "([Name] = N'Zoë' AND [Day] = '20240131')");

    let order = Order::new().then_with_null(col("Rank"), SortOrder::Asc, lit(0)).then_desc(col("Id"));
    assert_eq!(compile_order(d.as_ref(), &order).unwrap(), "ISNULL([Rank], 0) ASC, [Id] DESC");

    let stmt = compile_filter(d.as_ref(), &contains(col("Code"), "5%[x]"), ParamMode::Bind).unwrap();
    assert_eq!(stmt.sql, "[Code] LIKE @P1");
    assert_eq!(stmt.params[0].value, Value::String("%5[%][[]x]%".to_string()));
}

#[test]
fn test_mssql_functions() {
    let select = Select::builder("People")
        .unwrap()
        .column_as(length(col("Name")), "L")
        .unwrap()
        .column_as(substring(col("Name"), 2, None), "Tail")
        .unwrap()
        .column_as(concat([col("First"), col("Last")]), "Full")
        .unwrap()
        .build();
    assert_eq!(
        select.to_sql_with_dialect(Dialect::MsSql).unwrap().sql,
        "SELECT LEN([Name]) AS [L], SUBSTRING([Name], 2, LEN([Name])) AS [Tail], ([First] + [Last]) AS [Full] FROM [People]"
    );
}

#[test]
fn test_mssql_splits_long_in_lists() {
    let d = Dialect::MsSql.generator();
    let stmt = compile_filter(d.as_ref(), &in_list(col("Id"), 0..1001i64), ParamMode::Bind).unwrap();
    assert!(stmt.sql.starts_with("([Id] IN (@P1, @P2, "));
    assert!(stmt.sql.ends_with("@P1000) OR [Id] IN (@P1001))"));
    assert_eq!(stmt.params.len(), 1001);
}

#[test]
fn test_postgres_dialect() {
    let d = Dialect::Postgres.generator();
    assert_eq!(d.literal(&Value::Null, ColumnType::Integer).unwrap(), "CAST(NULL AS BIGINT)");
    assert_eq!(d.literal(&Value::Bool(true), ColumnType::Boolean).unwrap(), "TRUE");
    assert_eq!(
        d.literal(&Value::Binary(vec![0xAB, 0x01]), ColumnType::Binary).unwrap(),
        "'\\xab01'::bytea"
    );
    assert_eq!(d.type_name(&ColumnDef::new("G", ColumnType::Guid)).unwrap(), "UUID");
}

#[test]
fn test_sqlite_dialect() {
    let stmt = orders().to_sql_with_dialect(Dialect::Sqlite).unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT \"Id\", UPPER(\"Name\") AS \"N\" FROM \"Orders\" WHERE \"Status\" = :P1 ORDER BY \"Id\" DESC LIMIT 10"
    );
    assert_eq!(stmt.rebind(|i| format!("?{}", i + 1)), stmt.sql.replace(":P1", "?1"));
}

#[test]
fn test_sqlite_guid_as_blob() {
    let d = Dialect::Sqlite.generator();
    let g = Uuid::parse_str("00112233-4455-6677-8899-aabbccddeeff").unwrap();
    assert_eq!(
        d.literal(&Value::Guid(g), ColumnType::Guid).unwrap(),
        "X'33221100554477668899AABBCCDDEEFF'"
    );
    let stmt = compile_filter(d.as_ref(), &eq(col("G"), g), ParamMode::Bind).unwrap();
    assert_eq!(stmt.params[0].value, Value::Binary(g.to_bytes_le().to_vec()));
    assert_eq!(
        d.correct_value(Value::Binary(g.to_bytes_le().to_vec()), ColumnType::Guid).unwrap(),
        Value::Guid(g)
    );
    assert_eq!(d.correct_value(Value::Int(1), ColumnType::Boolean).unwrap(), Value::Bool(true));
}

#[test]
fn test_sqlite_integer_width() {
    let d = Dialect::Sqlite.generator();
    let small = ColumnDef::new("N", ColumnType::Integer).bounds(-100, 100);
    let wide = ColumnDef::new("N", ColumnType::Integer).bounds(0, 100_000);
    assert_eq!(d.type_name(&small).unwrap(), "TINYINT");
    assert_eq!(d.type_name(&wide).unwrap(), "INT");
    assert_eq!(d.type_name(&ColumnDef::new("N", ColumnType::Integer)).unwrap(), "BIGINT");
}

#[test]
fn test_sqlite_multi_row_insert() {
    let d = Dialect::Sqlite.generator();
    let cols = [ColumnDef::new("A", ColumnType::Integer), ColumnDef::new("B", ColumnType::Integer)];
    let rows = vec![vec![Value::Int(1), Value::Int(2)], vec![Value::Int(3), Value::Int(4)]];
    let stmt = build_insert("T", &cols, &rows, d.as_ref(), ParamMode::Bind).unwrap();
    assert_eq!(stmt.sql, "INSERT INTO \"T\" (\"A\", \"B\") VALUES (:P1, :P2), (:P3, :P4)");
    assert_eq!(d.features().batch_rows(2), 499);
}

#[test]
fn test_access_dialect() {
    let stmt = orders().to_sql_with_dialect(Dialect::Access).unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT TOP 10 [Id], UCASE([Name]) AS [N] FROM [Orders] WHERE ([Status] = ?) ORDER BY [Id] DESC"
    );
}

#[test]
fn test_access_parenthesizes_and_inlines_text() {
    let d = Dialect::Access.generator();
    let f = eq(col("A"), 1).and(contains(col("Name"), "50%"));
    let stmt = compile_filter(d.as_ref(), &f, ParamMode::Bind).unwrap();
    assert_eq!(stmt.sql, "(([A] = ?) AND ([Name] LIKE '%50[%]%'))");
    assert_eq!(stmt.params.len(), 1);

    let f = cmp_default(col("Qty"), CompareOp::Gt, Constant::typed(5, ColumnType::Integer).unwrap());
    let stmt = compile_filter(d.as_ref(), &f, ParamMode::Bind).unwrap();
    assert_eq!(stmt.sql, "(IIF([Qty] IS NULL, 0, [Qty]) > ?)");
}

#[test]
fn test_access_rejects_in_subquery() {
    let sub = Select::builder("Customers").unwrap().column(col("Id")).unwrap().build();
    let select = Select::builder("Orders")
        .unwrap()
        .filter(in_subquery(col("CustomerId"), sub))
        .build();
    let err = select.to_sql_with_dialect(Dialect::Access).unwrap_err();
    assert!(err.is_unsupported());
}

#[test]
fn test_access_single_row_writes() {
    let d = Dialect::Access.generator();
    let cols = [ColumnDef::new("A", ColumnType::Integer)];
    let rows = vec![vec![Value::Int(1)], vec![Value::Int(2)]];
    assert!(build_insert("T", &cols, &rows, d.as_ref(), ParamMode::Bind).unwrap_err().is_unsupported());
    assert_eq!(d.features().batch_rows(1), 1);

    let del = build_delete("T", Some(&eq(col("A"), 1)), d.as_ref(), ParamMode::Bind).unwrap();
    assert_eq!(del.sql, "DELETE FROM [T] WHERE ([A] = ?)");

    // Text columns cannot be bound, so every row is rendered anew.
    let prepared = PreparedUpdate::prepare(
        d.as_ref(),
        "T",
        vec![ColumnDef::new("Name", ColumnType::String)],
        vec![ColumnDef::new("A", ColumnType::Integer)],
    )
    .unwrap();
    assert!(!prepared.is_templated());
    let stmt = prepared.bind(d.as_ref(), &[Value::from("x")], &[Value::Int(1)]).unwrap();
    assert_eq!(stmt.sql, "UPDATE [T] SET [Name] = 'x' WHERE ([A] = ?)");
}

#[test]
fn test_access_statement_length_limit() {
    let d = Dialect::Access.generator();
    let err = compile_filter(d.as_ref(), &in_list(col("Id"), 0..25_000i64), ParamMode::Bind).unwrap_err();
    assert!(matches!(err, PolyError::StatementTooLong { max: 64_000, .. }));
}

#[test]
fn test_db2_dialect() {
    let stmt = orders().to_sql_with_dialect(Dialect::Db2).unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT Id, UPPER(Name) AS N FROM Orders WHERE Status = @P1 ORDER BY Id DESC"
    );
    assert_eq!(stmt.max_rows, Some(10));

    let d = Dialect::Db2.generator();
    let day = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    let stmt = compile_filter(d.as_ref(), &eq(col("SHIPPED"), day), ParamMode::Inline).unwrap();
    assert_eq!(stmt.sql, "SHIPPED = TO_DATE('2024-01-31', 'YYYY-MM-DD')");

    let ts = day.and_hms_milli_opt(8, 30, 0, 250).unwrap();
    assert_eq!(
        d.literal(&Value::DateTime(ts), ColumnType::DateTime).unwrap(),
        "TO_TIMESTAMP('2024-01-31 08:30:00.250000', 'YYYY-MM-DD HH24:MI:SS.FF6')"
    );
    assert_eq!(d.literal(&Value::Bool(true), ColumnType::Boolean).unwrap(), "'1'");
    let stmt = compile_filter(d.as_ref(), &eq(col("FLAG"), true), ParamMode::Bind).unwrap();
    assert_eq!(stmt.params[0].value, Value::String("1".to_string()));
}

#[test]
fn test_db2_rejects_quoted_names_and_nested_limits() {
    let d = Dialect::Db2.generator();
    assert!(compile_filter(d.as_ref(), &eq(col("Order Lines"), 1), ParamMode::Bind).is_err());

    let sub = Select::builder("CUSTOMERS")
        .unwrap()
        .column(col("ID"))
        .unwrap()
        .max_rows(5)
        .unwrap()
        .build();
    let select = Select::builder("ORDERS").unwrap().filter(in_subquery(col("CUSTOMER_ID"), sub)).build();
    assert!(select.to_sql_with_dialect(Dialect::Db2).unwrap_err().is_unsupported());
}

#[test]
fn test_dataview_filter_fragment() {
    let d = Dialect::DataView.generator();
    let f = eq(col("Name"), "O'Brien")
        .and(between(col("Qty"), 1, 5))
        .and(eq(col("Active"), true));
    let stmt = compile_filter(d.as_ref(), &f, ParamMode::Inline).unwrap();
    assert_eq!(
        stmt.sql,
        "([Name] = 'O''Brien' AND ([Qty] >= 1 AND [Qty] <= 5) AND [Active] = true)"
    );
    let day = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    assert_eq!(d.literal(&Value::Date(day), ColumnType::Date).unwrap(), "#01/31/2024#");
    assert_eq!(d.quote_identifier("a]b").unwrap(), "[a\\]b]");
    assert_eq!(compile_filter(d.as_ref(), &crate::ast::Filter::always(), ParamMode::Inline).unwrap().sql, "true");
}

#[test]
fn test_dataview_rejects_unsupported_constructs() {
    let d = Dialect::DataView.generator();

    // Parameters.
    let err = compile_filter(d.as_ref(), &eq(col("A"), 1), ParamMode::Bind).unwrap_err();
    assert!(err.is_unsupported());

    // IN-subquery.
    let sub = Select::builder("Customers").unwrap().column(col("Id")).unwrap().build();
    let err = compile_filter(d.as_ref(), &in_subquery(col("Id"), sub), ParamMode::Inline).unwrap_err();
    assert!(err.is_unsupported());

    // Aggregates.
    let err = compile_filter(d.as_ref(), &gt(sum(col("Qty")), 1), ParamMode::Inline).unwrap_err();
    assert!(err.is_unsupported());

    // Qualified columns and table aliases.
    let err = compile_filter(d.as_ref(), &eq(col("o.Id"), 1), ParamMode::Inline).unwrap_err();
    assert!(err.is_unsupported());
    let err = orders().to_sql_with_dialect(Dialect::DataView).unwrap_err();
    assert!(err.is_unsupported());

    // Unsupported functions.
    let err = compile_filter(d.as_ref(), &eq(upper(col("Name")), "X"), ParamMode::Inline).unwrap_err();
    assert!(err.is_unsupported());
}

#[test]
fn test_default_literals_round_trip() {
    for dialect in Dialect::ALL {
        let d = dialect.generator();
        for ty in ColumnType::ALL {
            let text = match d.default_literal(ty) {
                Ok(text) => text,
                Err(e) if e.is_unsupported() => continue,
                Err(e) => panic!("{} {}: {}", dialect, ty, e),
            };
            let back = d.parse_literal(&text, ty).unwrap_or_else(|e| panic!("{} {} '{}': {}", dialect, ty, text, e));
            assert_eq!(back, d.default_value(ty), "{} {} '{}'", dialect, ty, text);
        }
    }
}

#[test]
fn test_unknown_type_rejected_everywhere() {
    for dialect in Dialect::ALL {
        let d = dialect.generator();
        assert!(d.type_name(&ColumnDef::new("X", ColumnType::Unknown)).is_err());
        assert!(d.default_literal(ColumnType::Unknown).is_err());
    }
}

#[test]
fn test_dialect_names_parse() {
    assert_eq!("sqlserver".parse::<Dialect>().unwrap(), Dialect::MsSql);
    assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
    assert_eq!("jet".parse::<Dialect>().unwrap(), Dialect::Access);
    assert!("oracle".parse::<Dialect>().is_err());
    assert_eq!(Dialect::default(), Dialect::Postgres);
    assert_eq!(Dialect::DataView.to_string(), "DataView");
}
