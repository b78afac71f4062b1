//! Table sources: base tables and join trees.
//!
//! A join is itself a table source, so left-deep and bushy trees both
//! compose. Join predicates are checked against the joined scope when the
//! join is built; outer-join kinds feed the nullability environment the
//! decoder consults (weak-side columns read back as nullable regardless of
//! their declared tags).

use std::collections::HashSet;

use compact_str::CompactString;

use crate::error::BuildError;
use crate::expr::Expr;
use crate::schema::Table;
use crate::types::TypeTag;

/// The join flavors of the algebra.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
}

impl JoinKind {
    pub(crate) const fn sql_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::LeftOuter => "LEFT OUTER JOIN",
            JoinKind::RightOuter => "RIGHT OUTER JOIN",
            JoinKind::FullOuter => "FULL OUTER JOIN",
        }
    }
}

/// A base table or a join tree.
#[derive(Debug, Clone)]
pub enum TableSource {
    Table(Table),
    Join(Box<Join>),
}

/// A join node with its predicate.
#[derive(Debug, Clone)]
pub struct Join {
    pub(crate) kind: JoinKind,
    pub(crate) left: TableSource,
    pub(crate) right: TableSource,
    pub(crate) on: Expr,
}

impl TableSource {
    /// Starts an inner join against `right`.
    pub fn join(self, right: impl Into<TableSource>) -> JoinBuilder {
        JoinBuilder::new(JoinKind::Inner, self, right.into())
    }

    /// Starts a left outer join against `right`.
    pub fn left_outer(self, right: impl Into<TableSource>) -> JoinBuilder {
        JoinBuilder::new(JoinKind::LeftOuter, self, right.into())
    }

    /// Starts a right outer join against `right`.
    pub fn right_outer(self, right: impl Into<TableSource>) -> JoinBuilder {
        JoinBuilder::new(JoinKind::RightOuter, self, right.into())
    }

    /// Starts a full outer join against `right`.
    pub fn full_outer(self, right: impl Into<TableSource>) -> JoinBuilder {
        JoinBuilder::new(JoinKind::FullOuter, self, right.into())
    }

    /// Every table instance in this source, left to right.
    pub fn tables(&self) -> Vec<Table> {
        let mut out = Vec::new();
        self.collect_tables(&mut out);
        out
    }

    fn collect_tables(&self, out: &mut Vec<Table>) {
        match self {
            TableSource::Table(t) => out.push(t.clone()),
            TableSource::Join(j) => {
                j.left.collect_tables(out);
                j.right.collect_tables(out);
            }
        }
    }

    pub(crate) fn contains_instance(&self, instance: u64) -> bool {
        match self {
            TableSource::Table(t) => t.instance() == instance,
            TableSource::Join(j) => {
                j.left.contains_instance(instance) || j.right.contains_instance(instance)
            }
        }
    }

    /// Instances whose columns decode as nullable because they sit on the
    /// weak side of an outer join.
    pub(crate) fn nullable_instances(&self) -> HashSet<u64> {
        let mut out = HashSet::new();
        self.collect_nullable(&mut out);
        out
    }

    fn collect_nullable(&self, out: &mut HashSet<u64>) {
        if let TableSource::Join(j) = self {
            j.left.collect_nullable(out);
            j.right.collect_nullable(out);
            match j.kind {
                JoinKind::Inner => {}
                JoinKind::LeftOuter => mark_all(&j.right, out),
                JoinKind::RightOuter => mark_all(&j.left, out),
                JoinKind::FullOuter => {
                    mark_all(&j.left, out);
                    mark_all(&j.right, out);
                }
            }
        }
    }
}

fn mark_all(source: &TableSource, out: &mut HashSet<u64>) {
    match source {
        TableSource::Table(t) => {
            out.insert(t.instance());
        }
        TableSource::Join(j) => {
            mark_all(&j.left, out);
            mark_all(&j.right, out);
        }
    }
}

impl From<Table> for TableSource {
    fn from(table: Table) -> Self {
        TableSource::Table(table)
    }
}

impl From<&Table> for TableSource {
    fn from(table: &Table) -> Self {
        TableSource::Table(table.clone())
    }
}

/// A join awaiting its ON predicate.
#[derive(Debug, Clone)]
pub struct JoinBuilder {
    kind: JoinKind,
    left: TableSource,
    right: TableSource,
}

impl JoinBuilder {
    fn new(kind: JoinKind, left: TableSource, right: TableSource) -> Self {
        Self { kind, left, right }
    }

    /// Attaches the predicate. It must be Boolean and reference only columns
    /// of the joined scope.
    pub fn on(self, predicate: Expr) -> Result<TableSource, BuildError> {
        if !predicate.tag().is_boolean() {
            return Err(BuildError::TypeMismatch {
                expected: TypeTag::Bool,
                actual: predicate.tag().base().clone(),
            });
        }
        let mut missing: Option<(CompactString, CompactString)> = None;
        predicate.visit_columns(&mut |table, ordinal| {
            let in_scope = self.left.contains_instance(table.instance())
                || self.right.contains_instance(table.instance());
            if !in_scope && missing.is_none() {
                let column = table
                    .columns()
                    .get(ordinal)
                    .map(|c| CompactString::new(c.name()))
                    .unwrap_or_default();
                missing = Some((CompactString::new(table.name()), column));
            }
        });
        if let Some((table, column)) = missing {
            return Err(BuildError::UnknownTableColumn { table, column });
        }
        Ok(TableSource::Join(Box::new(Join {
            kind: self.kind,
            left: self.left,
            right: self.right,
            on: predicate,
        })))
    }
}

impl Table {
    /// Starts an inner join from this table.
    pub fn join(&self, right: impl Into<TableSource>) -> JoinBuilder {
        TableSource::from(self).join(right)
    }

    /// Starts a left outer join from this table.
    pub fn left_outer(&self, right: impl Into<TableSource>) -> JoinBuilder {
        TableSource::from(self).left_outer(right)
    }

    /// Starts a right outer join from this table.
    pub fn right_outer(&self, right: impl Into<TableSource>) -> JoinBuilder {
        TableSource::from(self).right_outer(right)
    }

    /// Starts a full outer join from this table.
    pub fn full_outer(&self, right: impl Into<TableSource>) -> JoinBuilder {
        TableSource::from(self).full_outer(right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{eq, lit};
    use crate::schema::ColumnSet;
    use crate::types::TypeTag;

    fn table(name: &str) -> Table {
        ColumnSet::new()
            .add("id", TypeTag::Int)
            .unwrap()
            .table(name)
    }

    #[test]
    fn outer_join_marks_the_weak_side() {
        let a = table("a");
        let b = table("b");
        let on = eq(a.column("id").unwrap(), b.column("id").unwrap()).unwrap();
        let src = a.left_outer(&b).on(on).unwrap();
        let nullable = src.nullable_instances();
        assert!(!nullable.contains(&a.instance()));
        assert!(nullable.contains(&b.instance()));
    }

    #[test]
    fn join_predicate_must_be_boolean() {
        let a = table("a");
        let b = table("b");
        let err = a.join(&b).on(lit(1i32)).unwrap_err();
        assert!(matches!(err, BuildError::TypeMismatch { .. }));
    }

    #[test]
    fn join_predicate_must_stay_in_scope() {
        let a = table("a");
        let b = table("b");
        let c = table("c");
        let on = eq(a.column("id").unwrap(), c.column("id").unwrap()).unwrap();
        let err = a.join(&b).on(on).unwrap_err();
        assert!(matches!(err, BuildError::UnknownTableColumn { .. }));
    }
}
