//! Column sets and tables.
//!
//! A [`ColumnSet`] is an ordered, append-only list of typed columns; binding
//! it to a relation name with [`ColumnSet::table`] produces a [`Table`] whose
//! bindings expose each column as a qualified column-reference expression.
//! The ordinal position of a column inside its set is its only stable
//! identity; names exist for rendering and lookup.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use compact_str::CompactString;

use crate::error::BuildError;
use crate::expr::Expr;
use crate::types::TypeTag;

/// A named, typed column inside a column set.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: CompactString,
    ty: TypeTag,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeTag {
        &self.ty
    }
}

/// An ordered, heterogeneous list of columns not yet bound to a relation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSet {
    columns: Vec<Column>,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column, rejecting duplicate names and malformed tags.
    pub fn add(mut self, name: &str, ty: TypeTag) -> Result<Self, BuildError> {
        ty.validate()?;
        if self.columns.iter().any(|c| c.name == name) {
            return Err(BuildError::DuplicateColumn(CompactString::new(name)));
        }
        self.columns.push(Column {
            name: CompactString::new(name),
            ty,
        });
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, ordinal: usize) -> Option<&Column> {
        self.columns.get(ordinal)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Binds the set to a relation name, producing a table instance.
    pub fn table(self, name: &str) -> Table {
        Table {
            inner: Arc::new(TableInner {
                name: CompactString::new(name),
                columns: self,
                instance: next_instance(),
            }),
        }
    }
}

#[derive(Debug)]
struct TableInner {
    name: CompactString,
    columns: ColumnSet,
    instance: u64,
}

static INSTANCE_IDS: AtomicU64 = AtomicU64::new(1);

fn next_instance() -> u64 {
    INSTANCE_IDS.fetch_add(1, Ordering::Relaxed)
}

/// A named relation with its column set.
///
/// Tables are immutable and cheaply cloneable; clones share the same
/// *instance*, which is what column references point at. [`Table::aliased`]
/// derives a distinct instance of the same relation for self-joins; the
/// renderer assigns `name`, `name_2`, ... when one relation name appears
/// several times in a source tree.
#[derive(Debug, Clone)]
pub struct Table {
    inner: Arc<TableInner>,
}

impl Table {
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.inner.columns
    }

    pub(crate) fn instance(&self) -> u64 {
        self.inner.instance
    }

    /// A fresh instance of the same relation, for self-joins.
    pub fn aliased(&self) -> Table {
        Table {
            inner: Arc::new(TableInner {
                name: self.inner.name.clone(),
                columns: self.inner.columns.clone(),
                instance: next_instance(),
            }),
        }
    }

    /// Looks up a column by name and returns it as a qualified
    /// column-reference expression.
    pub fn column(&self, name: &str) -> Result<Expr, BuildError> {
        match self.inner.columns.position(name) {
            Some(ordinal) => Ok(Expr::column_ref(self.clone(), ordinal)),
            None => Err(BuildError::UnknownTableColumn {
                table: self.inner.name.clone(),
                column: CompactString::new(name),
            }),
        }
    }

    /// Column-reference expressions for every column, mirroring the set's
    /// order.
    pub fn bindings(&self) -> Vec<Expr> {
        (0..self.inner.columns.len())
            .map(|ordinal| Expr::column_ref(self.clone(), ordinal))
            .collect()
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.inner.instance == other.inner.instance
    }
}

impl Eq for Table {}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Table {
        ColumnSet::new()
            .add("usr_id", TypeTag::Int)
            .and_then(|c| c.add("first_name", TypeTag::Text))
            .unwrap()
            .table("users")
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = ColumnSet::new()
            .add("id", TypeTag::Int)
            .and_then(|c| c.add("id", TypeTag::Text))
            .unwrap_err();
        assert_eq!(err, BuildError::DuplicateColumn("id".into()));
    }

    #[test]
    fn bindings_mirror_the_set() {
        let t = users();
        let bindings = t.bindings();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].tag(), &TypeTag::Int);
        assert_eq!(bindings[1].tag(), &TypeTag::Text);
    }

    #[test]
    fn aliased_tables_are_distinct_instances() {
        let t = users();
        let t2 = t.aliased();
        assert_ne!(t, t2);
        assert_eq!(t.name(), t2.name());
        assert_eq!(t, t.clone());
    }

    #[test]
    fn unknown_column_lookup_fails() {
        let t = users();
        assert!(matches!(
            t.column("nope"),
            Err(BuildError::UnknownTableColumn { .. })
        ));
    }
}
