#![allow(dead_code)]

use relq::prelude::*;
use rusqlite::Connection;

/// The order-tracking schema shared by the integration tests.
pub struct Schema {
    pub users: Table,
    pub orders: Table,
    pub order_details: Table,
}

pub fn schema() -> Schema {
    let users = ColumnSet::new()
        .add("usr_id", TypeTag::Int)
        .unwrap()
        .add("dob", TypeTag::Date)
        .unwrap()
        .add("first_name", TypeTag::Text)
        .unwrap()
        .add("last_name", TypeTag::Text)
        .unwrap()
        .table("users");

    let orders = ColumnSet::new()
        .add("order_id", TypeTag::Int)
        .unwrap()
        .add("usr_id", TypeTag::Int)
        .unwrap()
        .add("order_date", TypeTag::Date)
        .unwrap()
        .table("orders");

    let order_details = ColumnSet::new()
        .add("order_id", TypeTag::Int)
        .unwrap()
        .add("product_id", TypeTag::Int)
        .unwrap()
        .add("quantity", TypeTag::Double)
        .unwrap()
        .add("unit_price", TypeTag::Double)
        .unwrap()
        .table("order_details");

    Schema {
        users,
        orders,
        order_details,
    }
}

pub fn setup_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE users (usr_id INT, dob DATE, first_name TEXT, last_name TEXT);
         CREATE TABLE orders (order_id INT, usr_id INT, order_date DATE);
         CREATE TABLE order_details (order_id INT, product_id INT, quantity DOUBLE, unit_price DOUBLE);",
    )
    .unwrap();
    conn
}

/// Inserts a user through the library itself.
pub fn seed_user(db: &Session<'_>, schema: &Schema, id: i32, first: &str, last: &str) {
    let insert = insert_into(&schema.users, &["usr_id", "first_name", "last_name"])
        .unwrap()
        .values(vec![vec![
            Value::Int(id),
            Value::Text(first.into()),
            Value::Text(last.into()),
        ]])
        .unwrap();
    db.execute(&insert).unwrap();
}

pub fn seed_order(db: &Session<'_>, schema: &Schema, order_id: i32, usr_id: i32, date: &str) {
    let insert = insert_into(&schema.orders, &["order_id", "usr_id", "order_date"])
        .unwrap()
        .values(vec![vec![
            Value::Int(order_id),
            Value::Int(usr_id),
            Value::Date(date.parse().unwrap()),
        ]])
        .unwrap();
    db.execute(&insert).unwrap();
}

pub fn seed_detail(
    db: &Session<'_>,
    schema: &Schema,
    order_id: i32,
    product_id: i32,
    quantity: f64,
    unit_price: f64,
) {
    let insert = insert_into(
        &schema.order_details,
        &["order_id", "product_id", "quantity", "unit_price"],
    )
    .unwrap()
    .values(vec![vec![
        Value::Int(order_id),
        Value::Int(product_id),
        Value::Double(quantity),
        Value::Double(unit_price),
    ]])
    .unwrap();
    db.execute(&insert).unwrap();
}
