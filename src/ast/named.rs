use serde::{Deserialize, Serialize};

use crate::ast::Expr;
use crate::error::{PolyError, PolyResult};

/// An expression paired with its output alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNamedExpr")]
pub struct NamedExpr {
    expr: Expr,
    alias: String,
}

#[derive(Deserialize)]
struct RawNamedExpr {
    expr: Expr,
    #[serde(default)]
    alias: Option<String>,
}

impl TryFrom<RawNamedExpr> for NamedExpr {
    type Error = PolyError;

    fn try_from(raw: RawNamedExpr) -> Result<Self, Self::Error> {
        match raw.alias {
            Some(alias) => NamedExpr::new(raw.expr, alias),
            None => NamedExpr::from_expr(raw.expr),
        }
    }
}

impl NamedExpr {
    pub fn new(expr: Expr, alias: impl Into<String>) -> PolyResult<Self> {
        let alias = alias.into();
        if alias.trim().is_empty() {
            return Err(PolyError::invalid("alias", format!("empty alias for '{}'", expr)));
        }
        Ok(Self { expr, alias })
    }

    /// Named expression whose alias defaults to the column's last path segment.
    /// Anything other than a bare column needs an explicit alias.
    pub fn from_expr(expr: Expr) -> PolyResult<Self> {
        match &expr {
            Expr::Column(c) => {
                let alias = c.name().to_string();
                Ok(Self { expr, alias })
            }
            other => Err(PolyError::invalid("alias", format!("'{}' requires an explicit alias", other))),
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Whether `AS alias` must be emitted. A bare, unqualified column whose
    /// alias equals its name can skip it.
    pub fn alias_required(&self) -> bool {
        match &self.expr {
            Expr::Column(c) => c.is_qualified() || c.full_name() != self.alias,
            _ => true,
        }
    }
}

/// Ordered projection list with unique aliases (compared case-insensitively).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<NamedExpr>", into = "Vec<NamedExpr>")]
pub struct NamedExprList {
    items: Vec<NamedExpr>,
}

impl NamedExprList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, named: NamedExpr) -> PolyResult<()> {
        if self.get(named.alias()).is_some() {
            return Err(PolyError::AliasCollision(named.alias));
        }
        self.items.push(named);
        Ok(())
    }

    pub fn get(&self, alias: &str) -> Option<&NamedExpr> {
        self.items.iter().find(|n| n.alias.eq_ignore_ascii_case(alias))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NamedExpr> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl TryFrom<Vec<NamedExpr>> for NamedExprList {
    type Error = PolyError;

    fn try_from(items: Vec<NamedExpr>) -> Result<Self, Self::Error> {
        let mut list = NamedExprList::new();
        for item in items {
            list.push(item)?;
        }
        Ok(list)
    }
}

impl From<NamedExprList> for Vec<NamedExpr> {
    fn from(list: NamedExprList) -> Self {
        list.items
    }
}

impl<'a> IntoIterator for &'a NamedExprList {
    type Item = &'a NamedExpr;
    type IntoIter = std::slice::Iter<'a, NamedExpr>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
