//! # relq
//!
//! A typed SQL construction and execution library. Tables and queries are
//! described with an algebraic builder; the library renders SQL text for a
//! target dialect and executes it over a blocking driver, decoding result
//! rows into right-nested typed tuples.
//!
//! ## Quick start
//!
//! ```rust
//! use relq::prelude::*;
//!
//! # fn main() -> relq::Result<()> {
//! let users = ColumnSet::new()
//!     .add("usr_id", TypeTag::Int)?
//!     .add("first_name", TypeTag::Text)?
//!     .table("users");
//!
//! let conn = rusqlite::Connection::open_in_memory()?;
//! conn.execute_batch("CREATE TABLE users (usr_id INT, first_name TEXT)")?;
//! let db = Session::new(&conn, Dialect::sqlite());
//!
//! let rows = insert_into(&users, &["usr_id", "first_name"])?
//!     .values(vec![vec![Value::Int(1), Value::Text("Ada".into())]])?;
//! db.execute(&rows)?;
//!
//! let read = select((users.column("usr_id")?, users.column("first_name")?))
//!     .from(&users)
//!     .build()?;
//! let people: Vec<(i32, (String, ()))> = db.rows(&read)?;
//! assert_eq!(people, vec![(1, ("Ada".into(), ()))]);
//! # Ok(())
//! # }
//! ```

mod error;
mod session;

pub use error::{Error, Result};
pub use session::{ConnectionPool, ConnectionProvider, RowStream, Session};

// Re-export the core algebra at the crate root
pub use relq_core::*;

// The driver is part of the public surface (connections are caller-owned)
pub use rusqlite;

/// Everything a query-building module usually needs.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::session::{ConnectionPool, ConnectionProvider, RowStream, Session};
    pub use relq_core::expr::{
        abs, add, and, avg, call, case_when, ceil, coalesce, concat, cos, count, count_all,
        count_distinct, div, eq, floor, ge, gt, in_list, in_subquery, is_not_null, is_null, le,
        length, like, lit, ln, log, lower, lt, max, min, mul, ne, neg, not, not_in_list,
        not_in_subquery, null_of, or, rem, round, sin, sqrt, sub, substring, sum, trim, upper,
        Expr,
    };
    pub use relq_core::query::{
        asc, delete_from, desc, insert_into, select, update, Delete, Direction, Insert, NullsOrder,
        OrderKey, Read, Update,
    };
    pub use relq_core::render::{expr_text, ToSqlText};
    pub use relq_core::row::{FromRow, FromValue, RowAccess};
    pub use relq_core::{
        BuildError, ColumnSet, DecodeError, Dialect, Selection, Table, TableSource, TypeTag, Value,
    };
}
