//! Statement trees: reads, inserts, updates, deletes.

mod delete;
mod insert;
mod select;
mod update;

pub use delete::{delete_from, Delete, DeleteBuilder};
pub use insert::{insert_into, Insert, InsertBuilder, InsertSource};
pub use select::{
    asc, desc, select, Direction, LiteralRows, NullsOrder, OrderKey, Read, SelectBuilder,
    SelectInit, SelectStatement,
};
pub use update::{update, Update, UpdateBuilder};
