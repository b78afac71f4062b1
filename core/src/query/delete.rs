//! DELETE trees.

use std::marker::PhantomData;

use crate::error::BuildError;
use crate::expr::Expr;
use crate::query::update::single_table_scope;
use crate::schema::Table;
use crate::types::TypeTag;

/// A full DELETE statement.
#[derive(Debug, Clone)]
pub struct Delete {
    pub(crate) table: Table,
    pub(crate) filter: Option<Expr>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteInit;
#[derive(Debug, Clone, Copy, Default)]
pub struct WhereSet;

/// Opens a DELETE against the given table.
pub fn delete_from(table: &Table) -> DeleteBuilder<DeleteInit> {
    DeleteBuilder {
        table: table.clone(),
        filter: None,
        _state: PhantomData,
    }
}

/// The staged DELETE builder; without a WHERE it deletes every row.
#[derive(Debug, Clone)]
pub struct DeleteBuilder<State> {
    table: Table,
    filter: Option<Expr>,
    _state: PhantomData<State>,
}

impl DeleteBuilder<DeleteInit> {
    /// Adds the WHERE predicate.
    pub fn r#where(self, predicate: Expr) -> DeleteBuilder<WhereSet> {
        DeleteBuilder {
            table: self.table,
            filter: Some(predicate),
            _state: PhantomData,
        }
    }
}

impl<State> DeleteBuilder<State> {
    /// Finishes the tree.
    pub fn build(self) -> Result<Delete, BuildError> {
        if let Some(predicate) = &self.filter {
            if !predicate.tag().is_boolean() {
                return Err(BuildError::TypeMismatch {
                    expected: TypeTag::Bool,
                    actual: predicate.tag().base().clone(),
                });
            }
            single_table_scope(&self.table, predicate)?;
        }
        Ok(Delete {
            table: self.table,
            filter: self.filter,
        })
    }
}
