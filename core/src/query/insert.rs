//! INSERT trees.

use compact_str::CompactString;

use crate::error::BuildError;
use crate::query::update::check_assignable;
use crate::query::Read;
use crate::schema::Table;
use crate::types::{TypeTag, Value};

/// A full INSERT statement: target table, column list, and a row source.
#[derive(Debug, Clone)]
pub struct Insert {
    pub(crate) table: Table,
    pub(crate) columns: Vec<usize>,
    pub(crate) source: InsertSource,
}

/// Where inserted rows come from.
#[derive(Debug, Clone)]
pub enum InsertSource {
    Rows(Vec<Vec<Value>>),
    Query(Read),
}

/// Opens an INSERT for the named columns of the given table.
///
/// Columns must exist, and each may appear only once.
pub fn insert_into(table: &Table, columns: &[&str]) -> Result<InsertBuilder, BuildError> {
    if columns.is_empty() {
        return Err(BuildError::ShapeMismatch(
            "insert column list is empty".into(),
        ));
    }
    let mut ordinals = Vec::with_capacity(columns.len());
    for name in columns {
        let Some(ordinal) = table.columns().position(name) else {
            return Err(BuildError::UnknownTableColumn {
                table: CompactString::new(table.name()),
                column: CompactString::new(*name),
            });
        };
        if ordinals.contains(&ordinal) {
            return Err(BuildError::DuplicateColumn(CompactString::new(*name)));
        }
        ordinals.push(ordinal);
    }
    Ok(InsertBuilder {
        table: table.clone(),
        columns: ordinals,
    })
}

/// An INSERT awaiting its row source.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: Table,
    columns: Vec<usize>,
}

impl InsertBuilder {
    fn column_ty(&self, position: usize) -> TypeTag {
        self.columns
            .get(position)
            .and_then(|&o| self.table.columns().get(o))
            .map(|c| c.ty().clone())
            .unwrap_or(TypeTag::Text)
    }

    fn column_name(&self, position: usize) -> CompactString {
        self.columns
            .get(position)
            .and_then(|&o| self.table.columns().get(o))
            .map(|c| CompactString::new(c.name()))
            .unwrap_or_default()
    }

    /// Literal rows; each row must match the column list in arity and types.
    /// NULL values only fit nullable columns.
    pub fn values(self, rows: Vec<Vec<Value>>) -> Result<Insert, BuildError> {
        if rows.is_empty() {
            return Err(BuildError::EmptyRows);
        }
        for row in &rows {
            if row.len() != self.columns.len() {
                return Err(BuildError::ShapeMismatch(format!(
                    "insert row has {} values for {} columns",
                    row.len(),
                    self.columns.len()
                )));
            }
            for (position, value) in row.iter().enumerate() {
                let column_ty = self.column_ty(position);
                match value.tag() {
                    None => {
                        if !column_ty.is_nullable() {
                            return Err(BuildError::NullForNonNullable(
                                self.column_name(position),
                            ));
                        }
                    }
                    Some(tag) => check_assignable(&column_ty, &tag)?,
                }
            }
        }
        Ok(Insert {
            table: self.table,
            columns: self.columns,
            source: InsertSource::Rows(rows),
        })
    }

    /// A query source; its row shape must match the column list, and a
    /// nullable source column only fits a nullable target.
    pub fn from_read(self, read: Read) -> Result<Insert, BuildError> {
        let tags = read.tags();
        if tags.len() != self.columns.len() {
            return Err(BuildError::ShapeMismatch(format!(
                "query source has {} columns for {} insert columns",
                tags.len(),
                self.columns.len()
            )));
        }
        for (position, tag) in tags.iter().enumerate() {
            let column_ty = self.column_ty(position);
            check_assignable(&column_ty, tag)?;
        }
        Ok(Insert {
            table: self.table,
            columns: self.columns,
            source: InsertSource::Query(read),
        })
    }
}
