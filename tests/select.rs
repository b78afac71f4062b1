use relq::prelude::*;

mod common;

use common::{schema, seed_user, setup_db};

#[test]
fn plain_projection_renders_and_decodes() {
    let s = schema();
    let conn = setup_db();
    let db = Session::new(&conn, Dialect::sqlite());
    seed_user(&db, &s, 1, "Terrence", "Smith");

    let read = select((
        s.users.column("first_name").unwrap(),
        s.users.column("last_name").unwrap(),
    ))
    .from(&s.users)
    .build()
    .unwrap();

    assert_eq!(
        read.sql_text(db.dialect()).unwrap(),
        "SELECT users.first_name, users.last_name FROM users"
    );

    let rows: Vec<(String, (String, ()))> = db.rows(&read).unwrap();
    assert_eq!(rows, vec![("Terrence".to_string(), ("Smith".to_string(), ()))]);
}

#[test]
fn rendering_is_deterministic_and_pure() {
    let s = schema();
    let read = select((
        s.users.column("first_name").unwrap(),
        s.users.column("last_name").unwrap(),
    ))
    .from(&s.users)
    .build()
    .unwrap();

    let dialect = Dialect::sqlite();
    let first = read.sql_text(&dialect).unwrap();
    let second = read.sql_text(&dialect).unwrap();
    assert_eq!(first, second);
}

#[test]
fn aliased_projection_keeps_the_underlying_shape() {
    let s = schema();
    let plain = Selection::from((
        s.users.column("first_name").unwrap(),
        s.users.column("last_name").unwrap(),
    ));
    let aliased = Selection::from((
        s.users.column("first_name").unwrap().alias("first"),
        s.users.column("last_name").unwrap().alias("last"),
    ));

    // equal modulo alias, position for position
    assert!(plain.equivalent(&aliased));
    assert!(plain.shape_matches(&aliased));

    let read = select(aliased).from(&s.users).build().unwrap();
    assert_eq!(
        read.sql_text(&Dialect::sqlite()).unwrap(),
        "SELECT users.first_name AS \"first\", users.last_name AS \"last\" FROM users"
    );
}

#[test]
fn order_limit_offset_render_in_clause_order() {
    let s = schema();
    let read = select((
        s.users.column("first_name").unwrap(),
        s.users.column("last_name").unwrap(),
    ))
    .from(&s.users)
    .order_by([
        s.users.column("last_name").unwrap().asc(),
        s.users.column("first_name").unwrap().desc(),
    ])
    .limit(2)
    .build()
    .unwrap();

    assert_eq!(
        read.sql_text(&Dialect::sqlite()).unwrap(),
        "SELECT users.first_name, users.last_name FROM users \
         ORDER BY users.last_name ASC, users.first_name DESC LIMIT 2"
    );
}

#[test]
fn ordering_and_pagination_execute() {
    let s = schema();
    let conn = setup_db();
    let db = Session::new(&conn, Dialect::sqlite());
    for (id, first, last) in [(1, "Ada", "Z"), (2, "Ben", "Y"), (3, "Cy", "X")] {
        seed_user(&db, &s, id, first, last);
    }

    let read = select(s.users.column("first_name").unwrap())
        .from(&s.users)
        .order_by([s.users.column("last_name").unwrap().asc()])
        .limit(2)
        .offset(1)
        .build()
        .unwrap();

    let rows: Vec<(String, ())> = db.rows(&read).unwrap();
    assert_eq!(
        rows,
        vec![("Ben".to_string(), ()), ("Ada".to_string(), ())]
    );
}

#[test]
fn limit_zero_renders_and_yields_nothing() {
    let s = schema();
    let conn = setup_db();
    let db = Session::new(&conn, Dialect::sqlite());
    seed_user(&db, &s, 1, "Ada", "L");

    let read = select(s.users.column("first_name").unwrap())
        .from(&s.users)
        .limit(0)
        .build()
        .unwrap();

    assert!(read.sql_text(db.dialect()).unwrap().ends_with("LIMIT 0"));
    let rows: Vec<(String, ())> = db.rows(&read).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn empty_selection_is_rejected() {
    let s = schema();
    let err = select(Selection::new()).from(&s.users).build().unwrap_err();
    assert_eq!(err, BuildError::EmptySelection);
}

#[test]
fn out_of_scope_columns_are_rejected() {
    let s = schema();
    let read = select(s.orders.column("order_id").unwrap())
        .from(&s.users)
        .build();
    assert!(matches!(
        read,
        Err(BuildError::UnknownTableColumn { .. })
    ));
}

#[test]
fn where_predicate_must_be_boolean() {
    let s = schema();
    let err = select(s.users.column("first_name").unwrap())
        .from(&s.users)
        .r#where(lit(1i32))
        .build()
        .unwrap_err();
    assert!(matches!(err, BuildError::TypeMismatch { .. }));
}

#[test]
fn early_termination_closes_the_stream() {
    let s = schema();
    let conn = setup_db();
    let db = Session::new(&conn, Dialect::sqlite());
    for id in 1..=5 {
        seed_user(&db, &s, id, "A", "B");
    }

    let read = select(s.users.column("usr_id").unwrap())
        .from(&s.users)
        .build()
        .unwrap();

    let mut seen = 0usize;
    db.for_each(&read, |_row: (i32, ())| {
        seen += 1;
        if seen == 2 {
            std::ops::ControlFlow::Break(())
        } else {
            std::ops::ControlFlow::Continue(())
        }
    })
    .unwrap();
    assert_eq!(seen, 2);

    // the connection is immediately reusable
    let all: Vec<(i32, ())> = db.rows(&read).unwrap();
    assert_eq!(all.len(), 5);
}

#[test]
fn a_consumed_stream_is_closed() {
    let s = schema();
    let conn = setup_db();
    let db = Session::new(&conn, Dialect::sqlite());
    seed_user(&db, &s, 1, "Ada", "L");

    let read = select(s.users.column("usr_id").unwrap())
        .from(&s.users)
        .build()
        .unwrap();

    let mut statement = db.prepare(&read).unwrap();
    let mut stream = RowStream::<(i32, ())>::over(&mut statement, &read, db.dialect()).unwrap();
    assert_eq!(stream.next_row().unwrap(), Some((1, ())));
    assert_eq!(stream.next_row().unwrap(), None);
    // the sequence is single-pass; advancing again is an error
    assert!(matches!(
        stream.next_row(),
        Err(relq::Error::Decode(DecodeError::Closed))
    ));
}

#[test]
fn union_deduplicates_and_union_all_does_not() {
    let s = schema();
    let conn = setup_db();
    let db = Session::new(&conn, Dialect::sqlite());
    seed_user(&db, &s, 1, "Ada", "L");

    let base = || {
        select(s.users.column("first_name").unwrap())
            .from(&s.users)
            .build()
            .unwrap()
    };

    let union = base().union(base()).unwrap();
    assert_eq!(
        union.sql_text(db.dialect()).unwrap(),
        "SELECT users.first_name FROM users UNION SELECT users.first_name FROM users"
    );
    let rows: Vec<(String, ())> = db.rows(&union).unwrap();
    assert_eq!(rows.len(), 1);

    let union_all = base().union_all(base()).unwrap();
    let rows: Vec<(String, ())> = db.rows(&union_all).unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn union_operands_must_share_a_shape() {
    let s = schema();
    let names = select(s.users.column("first_name").unwrap())
        .from(&s.users)
        .build()
        .unwrap();
    let ids = select(s.users.column("usr_id").unwrap())
        .from(&s.users)
        .build()
        .unwrap();
    assert!(matches!(
        names.union(ids),
        Err(BuildError::TypeMismatch { .. })
    ));
}

#[test]
fn literal_rows_are_a_read() {
    let conn = setup_db();
    let db = Session::new(&conn, Dialect::sqlite());

    let read = Read::values(vec![
        vec![Value::Int(1), Value::Text("one".into())],
        vec![Value::Int(2), Value::Text("two".into())],
    ])
    .unwrap();

    assert_eq!(
        read.sql_text(db.dialect()).unwrap(),
        "VALUES (1, 'one'), (2, 'two')"
    );
    let rows: Vec<(i32, (String, ()))> = db.rows(&read).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], (1, ("one".to_string(), ())));
}
