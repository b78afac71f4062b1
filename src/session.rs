//! Blocking statement execution over `rusqlite`.
//!
//! A [`Session`] borrows a caller-owned connection and a dialect. Reads
//! stream lazily: rows are decoded one cursor advance at a time, the
//! consumer may stop early, and the statement and cursor are released by
//! drop on every exit path, including errors.

use std::marker::PhantomData;
use std::ops::ControlFlow;
use std::sync::{Mutex, PoisonError};

use relq_core::query::Read;
use relq_core::render::{MutationStatement, ToSqlText};
use relq_core::row::{decode_row, FromRow};
use relq_core::types::TypeTag;
use relq_core::{relq_trace_exec, relq_trace_query, DecodeError, Dialect};
use rusqlite::Connection;

use crate::error::{Error, Result};

/// Scoped connection acquisition with guaranteed release.
///
/// The connection is only reachable inside the closure; releasing it is not
/// the closure's job, so early returns and errors cannot leak it.
pub trait ConnectionProvider {
    fn with_connection<R>(&self, f: impl FnOnce(&Connection) -> Result<R>) -> Result<R>;
}

impl ConnectionProvider for Connection {
    fn with_connection<R>(&self, f: impl FnOnce(&Connection) -> Result<R>) -> Result<R> {
        f(self)
    }
}

/// A mutex-guarded single connection, the smallest useful provider.
pub struct ConnectionPool {
    conn: Mutex<Connection>,
}

impl ConnectionPool {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

impl ConnectionProvider for ConnectionPool {
    fn with_connection<R>(&self, f: impl FnOnce(&Connection) -> Result<R>) -> Result<R> {
        let guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}

/// A connection paired with a dialect; the statement-execution surface.
pub struct Session<'c> {
    conn: &'c Connection,
    dialect: Dialect,
}

impl<'c> Session<'c> {
    pub fn new(conn: &'c Connection, dialect: Dialect) -> Self {
        Self { conn, dialect }
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Executes an insert, update, or delete; returns the driver's affected
    /// row count.
    pub fn execute<S: MutationStatement>(&self, statement: &S) -> Result<usize> {
        let sql = statement.sql_text(&self.dialect)?;
        relq_trace_query!(&sql);
        let rows = self.conn.execute(&sql, [])?;
        relq_trace_exec!(&sql, rows);
        Ok(rows)
    }

    /// Runs a read and collects every decoded row.
    pub fn rows<T: FromRow>(&self, read: &Read) -> Result<Vec<T>> {
        let mut out = Vec::new();
        self.for_each(read, |row| {
            out.push(row);
            ControlFlow::Continue(())
        })?;
        Ok(out)
    }

    /// Runs a read, delivering rows one at a time. Returning `Break` stops
    /// consumption; the remaining rows are never decoded and the cursor is
    /// closed.
    pub fn for_each<T: FromRow>(
        &self,
        read: &Read,
        mut f: impl FnMut(T) -> ControlFlow<()>,
    ) -> Result<()> {
        let sql = read.sql_text(&self.dialect)?;
        let tags = read.tags();
        relq_trace_query!(&sql);
        let mut statement = self.conn.prepare(&sql)?;
        let mut rows = statement.query([])?;
        while let Some(row) = rows.next()? {
            let decoded = decode_row::<_, T>(row, &tags, &self.dialect)?;
            if let ControlFlow::Break(()) = f(decoded) {
                break;
            }
        }
        // statement and cursor drop here on every path
        Ok(())
    }

    /// Runs a read expected to produce at least one row; decodes only the
    /// first.
    pub fn one<T: FromRow>(&self, read: &Read) -> Result<T> {
        let mut found = None;
        self.for_each(read, |row| {
            found = Some(row);
            ControlFlow::Break(())
        })?;
        found.ok_or(Error::NotFound)
    }

    /// Renders the read and prepares its statement, for manual cursor
    /// consumption via [`RowStream::over`].
    pub fn prepare(&self, read: &Read) -> Result<rusqlite::Statement<'c>> {
        let sql = read.sql_text(&self.dialect)?;
        relq_trace_query!(&sql);
        Ok(self.conn.prepare(&sql)?)
    }
}

/// A manually driven cursor over a read's rows.
///
/// The sequence is lazy, finite, and consumed at most once: after the last
/// row, an error, or [`RowStream::close`], the cursor is closed and further
/// advances fail with [`DecodeError::Closed`]. Dropping the stream releases
/// the cursor on every path.
pub struct RowStream<'s, T> {
    rows: rusqlite::Rows<'s>,
    tags: Vec<TypeTag>,
    dialect: Dialect,
    open: bool,
    _marker: PhantomData<T>,
}

impl<'s, T: FromRow> RowStream<'s, T> {
    /// Opens the cursor of a statement prepared with [`Session::prepare`]
    /// for the same read.
    pub fn over(
        statement: &'s mut rusqlite::Statement<'_>,
        read: &Read,
        dialect: &Dialect,
    ) -> Result<Self> {
        let rows = statement.query([])?;
        Ok(RowStream {
            rows,
            tags: read.tags(),
            dialect: dialect.clone(),
            open: true,
            _marker: PhantomData,
        })
    }

    /// Advances the cursor and decodes the next row, or returns `None` at
    /// the end. The first error closes the stream.
    pub fn next_row(&mut self) -> Result<Option<T>> {
        if !self.open {
            return Err(Error::Decode(DecodeError::Closed));
        }
        match self.rows.next() {
            Ok(Some(row)) => match decode_row::<_, T>(row, &self.tags, &self.dialect) {
                Ok(decoded) => Ok(Some(decoded)),
                Err(error) => {
                    self.open = false;
                    Err(error.into())
                }
            },
            Ok(None) => {
                self.open = false;
                Ok(None)
            }
            Err(error) => {
                self.open = false;
                Err(error.into())
            }
        }
    }

    /// Releases the cursor without consuming the remaining rows.
    pub fn close(self) {}
}
