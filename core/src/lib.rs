//! relq core - typed SQL construction
//!
//! The core of relq: a typed relational algebra over columns, tables, and
//! expressions; statement trees for reads and writes; a dialect-parameterized
//! renderer producing SQL text; and a tag-driven row decoder reconstructing
//! typed tuples from a driver cursor.
//!
//! Trees built here are immutable values. Construction checks keep them
//! well-formed (column membership, operand types, aggregation legality, join
//! shapes), rendering is a pure function of tree and dialect, and decoding
//! verifies the driver's answer against the selection's type tags.

pub mod dialect;
pub mod error;
pub mod expr;
pub mod query;
pub mod render;
pub mod row;
pub mod schema;
pub mod selection;
pub mod source;
pub mod sql;
pub mod tracing;
pub mod types;

// Re-export key types and constructors
pub use dialect::Dialect;
pub use error::{BuildError, DecodeError};
pub use expr::{lit, null_of, Expr};
pub use query::{
    delete_from, insert_into, select, update, Delete, Direction, Insert, NullsOrder, OrderKey,
    Read, Update,
};
pub use schema::{Column, ColumnSet, Table};
pub use selection::Selection;
pub use source::{JoinKind, TableSource};
pub use sql::{Sql, SqlChunk, Token};
pub use types::{TypeTag, Value};
