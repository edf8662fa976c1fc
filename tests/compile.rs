use polysql::prelude::*;
use pretty_assertions::assert_eq;

const ORDERS: &str = r#"{
    "table": "Orders",
    "columns": [{ "expr": { "column": "Id" } }],
    "filter": {
        "compare": {
            "expr": { "column": "Status" },
            "op": "=",
            "value": { "value": { "type": "string", "value": "open" }, "type": "string" }
        }
    },
    "max_rows": 5
}"#;

fn orders() -> Select {
    serde_json::from_str(ORDERS).expect("valid descriptor")
}

#[test]
fn test_same_descriptor_every_dialect() {
    let select = orders();
    let expected = [
        (Dialect::MsSql, "SELECT TOP 5 [Id] FROM [Orders] WHERE [Status] = @P1"),
        (Dialect::Postgres, "SELECT \"Id\" FROM \"Orders\" WHERE \"Status\" = @P1 LIMIT 5"),
        (Dialect::Sqlite, "SELECT \"Id\" FROM \"Orders\" WHERE \"Status\" = :P1 LIMIT 5"),
        (Dialect::Access, "SELECT TOP 5 [Id] FROM [Orders] WHERE ([Status] = 'open')"),
        (Dialect::Db2, "SELECT Id FROM Orders WHERE Status = @P1"),
    ];
    for (dialect, sql) in expected {
        let stmt = polysql::compile(&select, dialect).unwrap();
        assert_eq!(stmt.sql, sql, "{}", dialect);
    }
}

#[test]
fn test_driver_row_cap_is_reported() {
    let stmt = polysql::compile(&orders(), Dialect::Db2).unwrap();
    assert_eq!(stmt.max_rows, Some(5));
    assert_eq!(stmt.params.len(), 1);
    assert_eq!(stmt.params[0].value, Value::from("open"));
}

#[test]
fn test_no_backend_dialect_rejects_select() {
    let err = polysql::compile(&orders(), Dialect::DataView).unwrap_err();
    assert!(err.is_unsupported());
}

#[test]
fn test_registry_aliases_resolve() {
    let registry = DialectRegistry::builtin();
    let select = orders();
    let by_alias = select.to_sql_with(registry.get("sqlserver").unwrap().as_ref()).unwrap();
    let by_name = select.to_sql_with(registry.get("mssql").unwrap().as_ref()).unwrap();
    assert_eq!(by_alias, by_name);
    assert!(registry.get("oracle").is_err());
}

#[test]
fn test_invalid_descriptor_is_rejected() {
    let json = r#"{ "table": "", "columns": [] }"#;
    assert!(serde_json::from_str::<Select>(json).is_err());
}
