//! UPDATE trees.

use std::marker::PhantomData;

use compact_str::CompactString;

use crate::error::BuildError;
use crate::expr::Expr;
use crate::schema::Table;
use crate::types::TypeTag;

/// A full UPDATE statement: target table, assignments, optional filter.
#[derive(Debug, Clone)]
pub struct Update {
    pub(crate) table: Table,
    pub(crate) assignments: Vec<(usize, Expr)>,
    pub(crate) filter: Option<Expr>,
}

/// Builder state markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateInit;
#[derive(Debug, Clone, Copy, Default)]
pub struct SetClause;
#[derive(Debug, Clone, Copy, Default)]
pub struct WhereSet;

/// Opens an UPDATE against the given table.
pub fn update(table: &Table) -> UpdateBuilder<UpdateInit> {
    UpdateBuilder {
        table: table.clone(),
        assignments: Vec::new(),
        filter: None,
        _state: PhantomData,
    }
}

/// The staged UPDATE builder; at least one `set` is required before `build`.
#[derive(Debug, Clone)]
pub struct UpdateBuilder<State> {
    table: Table,
    assignments: Vec<(usize, Expr)>,
    filter: Option<Expr>,
    _state: PhantomData<State>,
}

impl<State> UpdateBuilder<State> {
    fn transition<Next>(self) -> UpdateBuilder<Next> {
        UpdateBuilder {
            table: self.table,
            assignments: self.assignments,
            filter: self.filter,
            _state: PhantomData,
        }
    }

    fn push_assignment(
        mut self,
        column: &str,
        value: Expr,
    ) -> Result<UpdateBuilder<SetClause>, BuildError> {
        let Some(ordinal) = self.table.columns().position(column) else {
            return Err(BuildError::UnknownTableColumn {
                table: CompactString::new(self.table.name()),
                column: CompactString::new(column),
            });
        };
        if self.assignments.iter().any(|(o, _)| *o == ordinal) {
            return Err(BuildError::DuplicateAssignment(CompactString::new(column)));
        }
        let value = value.operand()?;
        let column_ty = self.table.columns().get(ordinal).map(|c| c.ty().clone());
        let column_ty = column_ty.unwrap_or(TypeTag::Text);
        check_assignable(&column_ty, value.tag())?;
        single_table_scope(&self.table, &value)?;
        self.assignments.push((ordinal, value));
        Ok(self.transition())
    }
}

impl UpdateBuilder<UpdateInit> {
    /// Assigns `column = value`.
    pub fn set(self, column: &str, value: Expr) -> Result<UpdateBuilder<SetClause>, BuildError> {
        self.push_assignment(column, value)
    }
}

impl UpdateBuilder<SetClause> {
    /// Assigns another column; each column at most once.
    pub fn set(self, column: &str, value: Expr) -> Result<UpdateBuilder<SetClause>, BuildError> {
        self.push_assignment(column, value)
    }

    /// Adds the WHERE predicate.
    pub fn r#where(mut self, predicate: Expr) -> UpdateBuilder<WhereSet> {
        self.filter = Some(predicate);
        self.transition()
    }

    /// Finishes the tree.
    pub fn build(self) -> Result<Update, BuildError> {
        finish(self.table, self.assignments, self.filter)
    }
}

impl UpdateBuilder<WhereSet> {
    /// Finishes the tree.
    pub fn build(self) -> Result<Update, BuildError> {
        finish(self.table, self.assignments, self.filter)
    }
}

fn finish(
    table: Table,
    assignments: Vec<(usize, Expr)>,
    filter: Option<Expr>,
) -> Result<Update, BuildError> {
    if let Some(predicate) = &filter {
        if !predicate.tag().is_boolean() {
            return Err(BuildError::TypeMismatch {
                expected: TypeTag::Bool,
                actual: predicate.tag().base().clone(),
            });
        }
        single_table_scope(&table, predicate)?;
    }
    Ok(Update {
        table,
        assignments,
        filter,
    })
}

/// `value` is assignable to a column of type `column_ty`: same base type,
/// and a nullable value only fits a nullable column.
pub(crate) fn check_assignable(column_ty: &TypeTag, value_ty: &TypeTag) -> Result<(), BuildError> {
    if !column_ty.same_base(value_ty) {
        return Err(BuildError::TypeMismatch {
            expected: column_ty.clone(),
            actual: value_ty.clone(),
        });
    }
    if value_ty.is_nullable() && !column_ty.is_nullable() {
        return Err(BuildError::TypeMismatch {
            expected: column_ty.clone(),
            actual: value_ty.clone(),
        });
    }
    Ok(())
}

pub(crate) fn single_table_scope(table: &Table, expr: &Expr) -> Result<(), BuildError> {
    let mut missing: Option<(CompactString, CompactString)> = None;
    expr.visit_columns(&mut |t, ordinal| {
        if t != table && missing.is_none() {
            let column = t
                .columns()
                .get(ordinal)
                .map(|c| CompactString::new(c.name()))
                .unwrap_or_default();
            missing = Some((CompactString::new(t.name()), column));
        }
    });
    match missing {
        Some((table, column)) => Err(BuildError::UnknownTableColumn { table, column }),
        None => Ok(()),
    }
}
