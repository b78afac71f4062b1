use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use relq::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

mod common;

use common::{schema, seed_user, setup_db};

/// Writes one literal into a single-column table, reads it back, and hands
/// the decoded leaf to the caller.
fn round_trip<T: FromValue>(sql_type: &str, tag: TypeTag, value: Value) -> T {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("CREATE TABLE t (v {sql_type})"))
        .unwrap();
    let table = ColumnSet::new()
        .add("v", tag)
        .unwrap()
        .table("t");
    let db = Session::new(&conn, Dialect::sqlite());

    let insert = insert_into(&table, &["v"])
        .unwrap()
        .values(vec![vec![value]])
        .unwrap();
    db.execute(&insert).unwrap();

    let read = select(table.column("v").unwrap())
        .from(&table)
        .build()
        .unwrap();
    let (leaf, ()): (T, ()) = db.one(&read).unwrap();
    leaf
}

#[test]
fn scalar_literals_round_trip() {
    assert!(round_trip::<bool>("BOOLEAN", TypeTag::Bool, Value::Bool(true)));
    assert_eq!(
        round_trip::<i8>("INT", TypeTag::Byte, Value::Byte(-7)),
        -7
    );
    assert_eq!(
        round_trip::<i16>("INT", TypeTag::Short, Value::Short(1234)),
        1234
    );
    assert_eq!(
        round_trip::<i32>("INT", TypeTag::Int, Value::Int(-123456)),
        -123456
    );
    assert_eq!(
        round_trip::<i64>("BIGINT", TypeTag::Long, Value::Long(1i64 << 40)),
        1i64 << 40
    );
    assert_eq!(
        round_trip::<f64>("DOUBLE", TypeTag::Double, Value::Double(2.5)),
        2.5
    );
    assert_eq!(
        round_trip::<String>("TEXT", TypeTag::Text, Value::Text("O'Brien".into())),
        "O'Brien"
    );
    assert_eq!(
        round_trip::<char>("TEXT", TypeTag::Char, Value::Char('ß')),
        'ß'
    );
}

#[test]
fn decimal_round_trips_exactly_through_text() {
    let exact: Decimal = "12345678901234.5678".parse().unwrap();
    assert_eq!(
        round_trip::<Decimal>("TEXT", TypeTag::Decimal, Value::Decimal(exact)),
        exact
    );
}

#[test]
fn bytes_round_trip_structurally() {
    let payload = vec![0u8, 1, 2, 254, 255];
    assert_eq!(
        round_trip::<Vec<u8>>("BLOB", TypeTag::Bytes, Value::Bytes(payload.clone())),
        payload
    );
}

#[test]
fn uuid_round_trips_as_text() {
    let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
    assert_eq!(
        round_trip::<Uuid>("TEXT", TypeTag::Uuid, Value::Uuid(id)),
        id
    );
}

#[test]
fn temporal_literals_round_trip_structurally() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    assert_eq!(
        round_trip::<NaiveDate>("DATE", TypeTag::Date, Value::Date(date)),
        date
    );

    let time = NaiveTime::from_hms_milli_opt(14, 30, 5, 250).unwrap();
    assert_eq!(
        round_trip::<NaiveTime>("TEXT", TypeTag::Time, Value::Time(time)),
        time
    );

    let datetime = date.and_hms_opt(14, 30, 5).unwrap();
    assert_eq!(
        round_trip::<NaiveDateTime>("TIMESTAMP", TypeTag::DateTime, Value::DateTime(datetime)),
        datetime
    );

    let instant: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 5).unwrap();
    assert_eq!(
        round_trip::<DateTime<Utc>>("TIMESTAMP", TypeTag::Instant, Value::Instant(instant)),
        instant
    );

    let offset = FixedOffset::east_opt(2 * 3600).unwrap();
    let stamped = offset.with_ymd_and_hms(2024, 3, 9, 14, 30, 5).unwrap();
    assert_eq!(
        round_trip::<DateTime<FixedOffset>>(
            "TIMESTAMP",
            TypeTag::OffsetDateTime,
            Value::OffsetDateTime(stamped),
        ),
        stamped
    );
}

#[test]
fn nullable_slots_decode_null_as_absent() {
    let leaf = round_trip::<Option<i32>>("INT", TypeTag::nullable(TypeTag::Int), Value::Null);
    assert_eq!(leaf, None);

    let leaf = round_trip::<Option<i32>>("INT", TypeTag::nullable(TypeTag::Int), Value::Int(3));
    assert_eq!(leaf, Some(3));
}

#[test]
fn null_against_a_total_slot_fails_the_row() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE t (v INT); INSERT INTO t VALUES (NULL)")
        .unwrap();
    let table = ColumnSet::new()
        .add("v", TypeTag::Int)
        .unwrap()
        .table("t");
    let db = Session::new(&conn, Dialect::sqlite());

    let read = select(table.column("v").unwrap())
        .from(&table)
        .build()
        .unwrap();
    let result = db.rows::<(i32, ())>(&read);
    assert!(matches!(
        result,
        Err(relq::Error::Decode(DecodeError::UnexpectedNull(1)))
    ));
}

#[test]
fn driver_kind_mismatch_is_reported() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE t (v TEXT); INSERT INTO t VALUES ('abc')")
        .unwrap();
    // declared Long, stored TEXT
    let table = ColumnSet::new()
        .add("v", TypeTag::Long)
        .unwrap()
        .table("t");
    let db = Session::new(&conn, Dialect::sqlite());

    let read = select(table.column("v").unwrap())
        .from(&table)
        .build()
        .unwrap();
    let result = db.rows::<(i64, ())>(&read);
    assert!(matches!(
        result,
        Err(relq::Error::Decode(DecodeError::UnexpectedType {
            ordinal: 1,
            ..
        }))
    ));
}

#[test]
fn count_star_is_zero_on_empty_input() {
    let s = schema();
    let conn = setup_db();
    let db = Session::new(&conn, Dialect::sqlite());

    let read = select(count_all()).from(&s.users).build().unwrap();
    let (n, ()): (i64, ()) = db.one(&read).unwrap();
    assert_eq!(n, 0);
}

#[test]
fn leaf_count_and_order_mirror_the_selection() {
    let s = schema();
    let conn = setup_db();
    let db = Session::new(&conn, Dialect::sqlite());
    seed_user(&db, &s, 7, "Ada", "Lovelace");

    let read = select((
        s.users.column("usr_id").unwrap(),
        s.users.column("first_name").unwrap(),
        s.users.column("last_name").unwrap(),
    ))
    .from(&s.users)
    .build()
    .unwrap();

    assert_eq!(
        read.tags(),
        vec![TypeTag::Int, TypeTag::Text, TypeTag::Text]
    );
    let (id, (first, (last, ()))): (i32, (String, (String, ()))) = db.one(&read).unwrap();
    assert_eq!((id, first.as_str(), last.as_str()), (7, "Ada", "Lovelace"));
}

#[test]
fn expressions_decode_like_columns() {
    let s = schema();
    let conn = setup_db();
    let db = Session::new(&conn, Dialect::sqlite());
    seed_user(&db, &s, 1, "ada", "l");

    let read = select((
        upper(s.users.column("first_name").unwrap()).unwrap(),
        add(s.users.column("usr_id").unwrap(), lit(10i32)).unwrap(),
    ))
    .from(&s.users)
    .build()
    .unwrap();

    let (name, (sum, ())): (String, (f64, ())) = db.one(&read).unwrap();
    assert_eq!(name, "ADA");
    assert_eq!(sum, 11.0);
}
