use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ast::{Aggregation, ColumnType, Expr, Filter, NamedExpr, NamedExprList, Order, SortOrder};
use crate::error::{PolyError, PolyResult};
use crate::schema::ColumnDef;

/// A frozen SELECT descriptor.
///
/// Built through [`SelectBuilder`]; once built it cannot change and can be
/// shared across threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSelect")]
pub struct Select {
    table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    alias: Option<String>,
    columns: NamedExprList,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    group_by: Vec<Expr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    having: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order: Option<Order>,
    max_rows: u64,
    distinct: bool,
}

impl Select {
    pub fn builder(table: &str) -> PolyResult<SelectBuilder> {
        SelectBuilder::new(table)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Projection list; empty means all columns.
    pub fn columns(&self) -> &NamedExprList {
        &self.columns
    }

    /// Type of each result column. Plain columns are looked up in `schema`
    /// by name; other expressions use [`Expr::type_hint`]. An empty
    /// projection yields the schema's own types.
    pub fn result_types(&self, schema: &[ColumnDef]) -> Vec<ColumnType> {
        if self.columns.is_empty() {
            return schema.iter().map(|c| c.ty).collect();
        }
        self.columns
            .iter()
            .map(|named| match named.expr().as_column() {
                Some(c) => schema
                    .iter()
                    .find(|d| d.name.eq_ignore_ascii_case(c.name()))
                    .map_or(ColumnType::Unknown, |d| d.ty),
                None => named.expr().type_hint(),
            })
            .collect()
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn group_by(&self) -> &[Expr] {
        &self.group_by
    }

    pub fn has_group_by(&self) -> bool {
        !self.group_by.is_empty()
    }

    pub fn having(&self) -> Option<&Filter> {
        self.having.as_ref()
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref().filter(|o| !o.is_empty())
    }

    /// Row cap; 0 means unbounded.
    pub fn max_rows(&self) -> u64 {
        self.max_rows
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// Every column name referenced by the projection, filter, grouping,
    /// having and ordering, through the same walk used for GROUP BY inference.
    pub fn collect_columns(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for n in &self.columns {
            n.expr().collect_columns(&mut out);
        }
        if let Some(f) = &self.filter {
            f.collect_columns(&mut out);
        }
        for g in &self.group_by {
            g.collect_columns(&mut out);
        }
        if let Some(h) = &self.having {
            h.collect_columns(&mut out);
        }
        if let Some(o) = &self.order {
            o.collect_columns(&mut out);
        }
        out
    }

    pub fn has_aggregates(&self) -> bool {
        self.columns.iter().any(|n| n.expr().contains_aggregate())
    }
}

/// Mutable SELECT builder; [`SelectBuilder::build`] freezes it.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    select: Select,
    group_by_initialized: bool,
}

impl SelectBuilder {
    pub fn new(table: &str) -> PolyResult<Self> {
        if table.trim().is_empty() {
            return Err(PolyError::invalid("table name", "must not be empty"));
        }
        Ok(Self {
            select: Select {
                table: table.to_string(),
                alias: None,
                columns: NamedExprList::new(),
                filter: None,
                group_by: Vec::new(),
                having: None,
                order: None,
                max_rows: 0,
                distinct: false,
            },
            group_by_initialized: false,
        })
    }

    /// `FROM table AS alias`
    pub fn alias(mut self, alias: &str) -> PolyResult<Self> {
        if alias.trim().is_empty() {
            return Err(PolyError::invalid("table alias", format!("empty alias for '{}'", self.select.table)));
        }
        self.select.alias = Some(alias.to_string());
        Ok(self)
    }

    /// Project a bare column under its own name.
    pub fn column(self, expr: Expr) -> PolyResult<Self> {
        self.named(NamedExpr::from_expr(expr)?)
    }

    /// Project an expression under an explicit alias.
    pub fn column_as(self, expr: Expr, alias: &str) -> PolyResult<Self> {
        self.named(NamedExpr::new(expr, alias)?)
    }

    pub fn named(mut self, named: NamedExpr) -> PolyResult<Self> {
        self.select.columns.push(named)?;
        Ok(self)
    }

    /// Add a WHERE filter; repeated calls are combined with AND.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.select.filter = Some(match self.select.filter.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    pub fn group_by(mut self, expr: Expr) -> Self {
        if !self.select.group_by.contains(&expr) {
            self.select.group_by.push(expr);
        }
        self
    }

    pub fn having(mut self, filter: Filter) -> Self {
        self.select.having = Some(match self.select.having.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.select.order = Some(order);
        self
    }

    pub fn order_by(mut self, expr: Expr, direction: SortOrder) -> Self {
        let order = self.select.order.take().unwrap_or_default();
        self.select.order = Some(match direction {
            SortOrder::Asc => order.then_asc(expr),
            SortOrder::Desc => order.then_desc(expr),
        });
        self
    }

    /// Row cap; 0 means unbounded, negative counts are rejected.
    pub fn max_rows(mut self, count: i64) -> PolyResult<Self> {
        if count < 0 {
            return Err(PolyError::invalid(
                "row limit",
                format!("{} for table '{}' is negative", count, self.select.table),
            ));
        }
        self.select.max_rows = count as u64;
        Ok(self)
    }

    pub fn distinct(mut self) -> Self {
        self.select.distinct = true;
        self
    }

    /// Infer GROUP BY from the projection list.
    ///
    /// Every projected expression built only from columns is appended to
    /// GROUP BY; aggregate-only and constant expressions are skipped; an
    /// expression mixing both is rejected. Runs at most once per descriptor.
    pub fn init_group_by(mut self) -> PolyResult<Self> {
        if self.group_by_initialized {
            return Err(PolyError::GroupByInitialized(self.select.table));
        }
        if self.select.columns.is_empty() {
            return Err(PolyError::GroupByEmptyProjection(self.select.table));
        }
        let mut inferred = Vec::new();
        for named in &self.select.columns {
            match named.expr().aggregation() {
                Aggregation::Mixed => {
                    return Err(PolyError::MixedAggregation {
                        alias: named.alias().to_string(),
                    });
                }
                Aggregation::Columns => inferred.push(named.expr().clone()),
                Aggregation::Aggregate | Aggregation::Constant => {}
            }
        }
        for expr in inferred {
            self = self.group_by(expr);
        }
        self.group_by_initialized = true;
        Ok(self)
    }

    pub fn build(self) -> Select {
        self.select
    }
}

#[derive(Deserialize)]
struct RawSelect {
    table: String,
    #[serde(default)]
    alias: Option<String>,
    #[serde(default)]
    columns: Vec<NamedExpr>,
    #[serde(default)]
    filter: Option<Filter>,
    #[serde(default)]
    group_by: Vec<Expr>,
    #[serde(default)]
    infer_group_by: bool,
    #[serde(default)]
    having: Option<Filter>,
    #[serde(default)]
    order: Option<Order>,
    #[serde(default)]
    max_rows: i64,
    #[serde(default)]
    distinct: bool,
}

impl TryFrom<RawSelect> for Select {
    type Error = PolyError;

    fn try_from(raw: RawSelect) -> Result<Self, Self::Error> {
        let mut b = SelectBuilder::new(&raw.table)?;
        if let Some(a) = &raw.alias {
            b = b.alias(a)?;
        }
        for n in raw.columns {
            b = b.named(n)?;
        }
        if let Some(f) = raw.filter {
            b = b.filter(f);
        }
        for g in raw.group_by {
            b = b.group_by(g);
        }
        if raw.infer_group_by {
            b = b.init_group_by()?;
        }
        if let Some(h) = raw.having {
            b = b.having(h);
        }
        if let Some(o) = raw.order {
            b = b.order(o);
        }
        b = b.max_rows(raw.max_rows)?;
        if raw.distinct {
            b = b.distinct();
        }
        Ok(b.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;

    #[test]
    fn test_result_types_follow_schema() {
        let schema = vec![
            ColumnDef::new("Id", ColumnType::Integer),
            ColumnDef::new("Key", ColumnType::Guid),
        ];
        let select = Select::builder("Keys")
            .unwrap()
            .column(col("key"))
            .unwrap()
            .column_as(count_all(), "N")
            .unwrap()
            .column(col("Missing"))
            .unwrap()
            .build();
        assert_eq!(
            select.result_types(&schema),
            vec![ColumnType::Guid, ColumnType::Integer, ColumnType::Unknown]
        );
        let star = Select::builder("Keys").unwrap().build();
        assert_eq!(star.result_types(&schema), vec![ColumnType::Integer, ColumnType::Guid]);
    }

    #[test]
    fn test_group_by_inference() {
        let select = Select::builder("Orders")
            .unwrap()
            .column(col("ColA"))
            .unwrap()
            .column_as(sum(col("ColB")), "Total")
            .unwrap()
            .init_group_by()
            .unwrap()
            .build();
        assert_eq!(select.group_by(), &[col("ColA")]);
    }

    #[test]
    fn test_group_by_rejects_mixed() {
        let err = Select::builder("Orders")
            .unwrap()
            .column(col("ColA"))
            .unwrap()
            .column_as(coalesce([col("ColA"), sum(col("ColB"))]), "Mixed")
            .unwrap()
            .init_group_by()
            .unwrap_err();
        assert!(matches!(err, PolyError::MixedAggregation { alias } if alias == "Mixed"));
    }

    #[test]
    fn test_group_by_twice() {
        let b = Select::builder("Orders")
            .unwrap()
            .column(col("ColA"))
            .unwrap()
            .init_group_by()
            .unwrap();
        assert!(matches!(b.init_group_by(), Err(PolyError::GroupByInitialized(t)) if t == "Orders"));
    }

    #[test]
    fn test_group_by_empty_projection() {
        let b = Select::builder("Orders").unwrap();
        assert!(matches!(b.init_group_by(), Err(PolyError::GroupByEmptyProjection(_))));
    }

    #[test]
    fn test_validation() {
        assert!(Select::builder("  ").is_err());
        assert!(Select::builder("T").unwrap().max_rows(-1).is_err());
        assert_eq!(Select::builder("T").unwrap().max_rows(0).unwrap().build().max_rows(), 0);
    }

    #[test]
    fn test_collect_columns_consistent() {
        let select = Select::builder("T")
            .unwrap()
            .column(col("A"))
            .unwrap()
            .filter(eq(col("B"), 1))
            .order(desc(col("C")))
            .build();
        let cols: Vec<String> = select.collect_columns().into_iter().collect();
        assert_eq!(cols, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_deserialize_runs_validation() {
        let json = r#"{"table": "T", "columns": [{"expr": {"column": "A"}}, {"expr": {"column": "B"}, "alias": "a"}]}"#;
        let err = serde_json::from_str::<Select>(json).unwrap_err();
        assert!(err.to_string().contains("Duplicate alias"));

        let json = r#"{"table": "T", "columns": [{"expr": {"column": "A"}}], "max_rows": 5}"#;
        let select: Select = serde_json::from_str(json).unwrap();
        assert_eq!(select.max_rows(), 5);
        assert_eq!(select.columns().iter().next().unwrap().alias(), "A");
    }
}
