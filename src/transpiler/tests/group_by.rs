//! Aggregate projections and GROUP BY inference.

use pretty_assertions::assert_eq;

use crate::ast::builders::*;
use crate::ast::{Select, SortOrder, Value};
use crate::error::PolyError;
use crate::transpiler::{Dialect, ToSql};

fn sales() -> Select {
    Select::builder("Sales")
        .unwrap()
        .column(col("Region"))
        .unwrap()
        .column_as(sum(col("Amount")), "Total")
        .unwrap()
        .column_as(count_all(), "Rows")
        .unwrap()
        .init_group_by()
        .unwrap()
        .having(gt(sum(col("Amount")), 100))
        .order_by(col("Region"), SortOrder::Asc)
        .build()
}

#[test]
fn test_inferred_group_by() {
    let stmt = sales().to_sql().unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT \"Region\", SUM(\"Amount\") AS \"Total\", COUNT(*) AS \"Rows\" FROM \"Sales\" \
         GROUP BY \"Region\" HAVING SUM(\"Amount\") > @P1 ORDER BY \"Region\" ASC"
    );
    assert_eq!(stmt.params[0].value, Value::Int(100));
}

#[test]
fn test_group_by_on_mssql() {
    let stmt = sales().to_sql_with_dialect(Dialect::MsSql).unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT [Region], SUM([Amount]) AS [Total], COUNT(*) AS [Rows] FROM [Sales] \
         GROUP BY [Region] HAVING SUM([Amount]) > @P1 ORDER BY [Region] ASC"
    );
}

#[test]
fn test_explicit_group_by_is_deduplicated() {
    let select = Select::builder("Sales")
        .unwrap()
        .column(col("Region"))
        .unwrap()
        .column_as(max(col("Amount")), "Top")
        .unwrap()
        .group_by(col("Region"))
        .init_group_by()
        .unwrap()
        .build();
    assert_eq!(select.group_by().len(), 1);
    assert!(select.has_aggregates());
}

#[test]
fn test_group_by_runs_once() {
    let err = Select::builder("Sales")
        .unwrap()
        .column(col("Region"))
        .unwrap()
        .init_group_by()
        .unwrap()
        .init_group_by()
        .unwrap_err();
    assert!(matches!(err, PolyError::GroupByInitialized(ref t) if t == "Sales"));
}

#[test]
fn test_group_by_needs_projection() {
    let err = Select::builder("Sales").unwrap().init_group_by().unwrap_err();
    assert!(matches!(err, PolyError::GroupByEmptyProjection(_)));
}

#[test]
fn test_constant_projection_not_grouped() {
    let select = Select::builder("Sales")
        .unwrap()
        .column_as(lit(1), "One")
        .unwrap()
        .column_as(avg(col("Amount")), "Mean")
        .unwrap()
        .init_group_by()
        .unwrap()
        .build();
    assert!(select.group_by().is_empty());
    assert_eq!(
        select.to_sql().unwrap().sql,
        "SELECT 1 AS \"One\", AVG(\"Amount\") AS \"Mean\" FROM \"Sales\""
    );
}
