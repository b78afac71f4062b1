use relq::prelude::*;

mod common;

use common::schema;

fn text(expr: &Expr) -> String {
    expr_text(expr, &Dialect::sqlite()).unwrap()
}

#[test]
fn comparisons_require_matching_bases() {
    let s = schema();
    let id = s.users.column("usr_id").unwrap();
    let name = s.users.column("first_name").unwrap();

    assert!(eq(id.clone(), lit(1i32)).is_ok());
    assert!(matches!(
        eq(id, lit("one")),
        Err(BuildError::TypeMismatch { .. })
    ));
    assert!(matches!(
        and(lit(true), name),
        Err(BuildError::TypeMismatch { .. })
    ));
}

#[test]
fn arithmetic_widens_to_double() {
    let s = schema();
    let qty = s.order_details.column("quantity").unwrap();
    let price = s.order_details.column("unit_price").unwrap();

    let total = mul(qty, price).unwrap();
    assert_eq!(total.tag(), &TypeTag::Double);

    let with_int = add(lit(1i32), lit(2i64)).unwrap();
    assert_eq!(with_int.tag(), &TypeTag::Double);

    assert!(matches!(
        add(lit("a"), lit(1i32)),
        Err(BuildError::TypeMismatch { .. })
    ));
}

#[test]
fn precedence_parenthesizes_reassociated_trees() {
    let a = lit(1i32);
    let b = lit(2i32);
    let c = lit(3i32);

    // (a + b) * c keeps its parens; a + b * c needs none
    let grouped = mul(add(a.clone(), b.clone()).unwrap(), c.clone()).unwrap();
    assert_eq!(text(&grouped), "(1 + 2) * 3");

    let natural = add(a.clone(), mul(b.clone(), c.clone()).unwrap()).unwrap();
    assert_eq!(text(&natural), "1 + 2 * 3");

    // right-nested same-precedence trees keep their shape
    let right = add(a.clone(), add(b.clone(), c.clone()).unwrap()).unwrap();
    assert_eq!(text(&right), "1 + (2 + 3)");

    let left = add(add(a, b).unwrap(), c).unwrap();
    assert_eq!(text(&left), "1 + 2 + 3");
}

#[test]
fn logic_parenthesizes_or_under_and() {
    let t = lit(true);
    let f = lit(false);

    let e = and(or(t.clone(), f.clone()).unwrap(), f.clone()).unwrap();
    assert_eq!(text(&e), "(1 OR 0) AND 0");

    let e = or(t.clone(), and(f.clone(), t).unwrap()).unwrap();
    assert_eq!(text(&e), "1 OR 0 AND 0");

    let e = not(or(f.clone(), f).unwrap()).unwrap();
    assert_eq!(text(&e), "NOT (0 OR 0)");
}

#[test]
fn negation_parenthesizes_compound_operands() {
    let e = neg(add(lit(1i32), lit(2i32)).unwrap()).unwrap();
    assert_eq!(text(&e), "-(1 + 2)");

    let e = neg(lit(5i32)).unwrap();
    assert_eq!(text(&e), "-5");
}

#[test]
fn null_membership_is_boolean_nullable() {
    let e = in_list(null_of(TypeTag::Text), [lit("a"), lit("b")]).unwrap();
    assert_eq!(e.tag(), &TypeTag::nullable(TypeTag::Bool));
    assert_eq!(text(&e), "NULL IN ('a', 'b')");

    let plain = in_list(lit("a"), [lit("b")]).unwrap();
    assert_eq!(plain.tag(), &TypeTag::Bool);
}

#[test]
fn empty_membership_matches_nothing() {
    let e = in_list(lit("a"), []).unwrap();
    assert_eq!(text(&e), "'a' IN (NULL)");
}

#[test]
fn subquery_membership_requires_one_column() {
    let s = schema();
    let ids = select(s.orders.column("usr_id").unwrap())
        .from(&s.orders)
        .build()
        .unwrap();
    let e = in_subquery(s.users.column("usr_id").unwrap(), ids).unwrap();
    assert_eq!(
        text(&e),
        "users.usr_id IN (SELECT orders.usr_id FROM orders)"
    );

    let two = select((
        s.orders.column("usr_id").unwrap(),
        s.orders.column("order_id").unwrap(),
    ))
    .from(&s.orders)
    .build()
    .unwrap();
    assert!(matches!(
        in_subquery(s.users.column("usr_id").unwrap(), two),
        Err(BuildError::ShapeMismatch(_))
    ));
}

#[test]
fn null_tests_render_postfix() {
    let s = schema();
    let dob = s.users.column("dob").unwrap();
    assert_eq!(text(&is_null(dob.clone()).unwrap()), "users.dob IS NULL");
    assert_eq!(
        text(&is_not_null(dob).unwrap()),
        "users.dob IS NOT NULL"
    );
}

#[test]
fn like_requires_text() {
    let s = schema();
    let e = like(s.users.column("first_name").unwrap(), lit("T%")).unwrap();
    assert_eq!(text(&e), "users.first_name LIKE 'T%'");
    assert!(matches!(
        like(s.users.column("usr_id").unwrap(), lit("T%")),
        Err(BuildError::TypeMismatch { .. })
    ));
}

#[test]
fn case_branches_unify() {
    let s = schema();
    let id = s.users.column("usr_id").unwrap();

    let e = case_when(eq(id.clone(), lit(1i32)).unwrap(), lit("one"))
        .unwrap()
        .when(eq(id.clone(), lit(2i32)).unwrap(), lit("two"))
        .unwrap()
        .otherwise(lit("many"))
        .unwrap();
    assert_eq!(
        text(&e),
        "CASE WHEN users.usr_id = 1 THEN 'one' WHEN users.usr_id = 2 THEN 'two' ELSE 'many' END"
    );
    assert_eq!(e.tag(), &TypeTag::Text);

    // without ELSE the value may be absent
    let open = case_when(eq(id.clone(), lit(1i32)).unwrap(), lit("one"))
        .unwrap()
        .end();
    assert_eq!(open.tag(), &TypeTag::nullable(TypeTag::Text));

    assert!(matches!(
        case_when(eq(id, lit(1i32)).unwrap(), lit("one"))
            .unwrap()
            .otherwise(lit(1i32)),
        Err(BuildError::TypeMismatch { .. })
    ));
}

#[test]
fn coalesce_drops_nullability_when_an_arm_is_total() {
    let fallback = lit("1970-01-01".parse::<chrono::NaiveDate>().unwrap());
    let e = coalesce([null_of(TypeTag::Date), fallback]).unwrap();
    assert_eq!(e.tag(), &TypeTag::Date);
    assert_eq!(text(&e), "COALESCE(NULL, '1970-01-01')");

    let all_nullable = coalesce([null_of(TypeTag::Date), null_of(TypeTag::Date)]).unwrap();
    assert_eq!(all_nullable.tag(), &TypeTag::nullable(TypeTag::Date));

    assert!(matches!(
        coalesce([null_of(TypeTag::Date), lit(1i32)]),
        Err(BuildError::TypeMismatch { .. })
    ));
}

#[test]
fn functions_check_arity_and_classes() {
    let s = schema();
    let name = s.users.column("first_name").unwrap();

    let e = lower(name.clone()).unwrap();
    assert_eq!(text(&e), "LOWER(users.first_name)");
    assert_eq!(e.tag(), &TypeTag::Text);

    assert!(matches!(
        abs(name.clone()),
        Err(BuildError::TypeMismatch { .. })
    ));
    assert!(matches!(
        call("SUBSTRING", [name.clone()]),
        Err(BuildError::ArityMismatch { .. })
    ));
    assert!(matches!(
        call("NO_SUCH_FN", [name]),
        Err(BuildError::UnsupportedForDialect { .. })
    ));
}

#[test]
fn math_functions_build_and_render() {
    let s = schema();
    let qty = s.order_details.column("quantity").unwrap();

    let e = sqrt(qty.clone()).unwrap();
    assert_eq!(e.tag(), &TypeTag::Double);
    assert_eq!(text(&e), "SQRT(order_details.quantity)");

    // CEIL/FLOOR/ROUND keep their operand's tag
    let e = ceil(qty.clone()).unwrap();
    assert_eq!(e.tag(), &TypeTag::Double);
    assert_eq!(text(&e), "CEIL(order_details.quantity)");
    assert_eq!(text(&floor(lit(2.5f64)).unwrap()), "FLOOR(2.5)");
    assert_eq!(text(&round(lit(2.5f64)).unwrap()), "ROUND(2.5)");

    for built in [
        ln(qty.clone()).unwrap(),
        log(qty.clone()).unwrap(),
        sin(qty.clone()).unwrap(),
        cos(qty).unwrap(),
    ] {
        assert_eq!(built.tag(), &TypeTag::Double);
    }
    assert_eq!(text(&ln(lit(1i64)).unwrap()), "LN(1)");

    assert!(matches!(
        sqrt(s.users.column("first_name").unwrap()),
        Err(BuildError::TypeMismatch { .. })
    ));
}

#[test]
fn function_names_map_per_dialect() {
    let s = schema();
    let e = substring(
        s.users.column("first_name").unwrap(),
        lit(1i32),
        Some(lit(3i32)),
    )
    .unwrap();

    assert_eq!(
        expr_text(&e, &Dialect::sqlite()).unwrap(),
        "SUBSTR(users.first_name, 1, 3)"
    );
    assert_eq!(
        expr_text(&e, &Dialect::postgres()).unwrap(),
        "SUBSTRING(users.first_name, 1, 3)"
    );
}

#[test]
fn aggregates_type_as_specified() {
    let s = schema();
    let qty = s.order_details.column("quantity").unwrap();

    assert_eq!(sum(qty.clone()).unwrap().tag(), &TypeTag::Double);
    assert_eq!(avg(qty.clone()).unwrap().tag(), &TypeTag::Double);
    assert_eq!(count(qty.clone()).unwrap().tag(), &TypeTag::Long);
    assert_eq!(count_all().tag(), &TypeTag::Long);
    assert_eq!(
        count_distinct(qty.clone()).unwrap().tag(),
        &TypeTag::Long
    );
    assert_eq!(min(qty.clone()).unwrap().tag(), &TypeTag::Double);
    assert!(sum(qty).unwrap().is_aggregated());

    assert!(matches!(
        sum(s.users.column("first_name").unwrap()),
        Err(BuildError::TypeMismatch { .. })
    ));
}

#[test]
fn aggregate_rendering_includes_distinct_and_star() {
    let s = schema();
    let qty = s.order_details.column("quantity").unwrap();

    assert_eq!(text(&count_all()), "COUNT(*)");
    assert_eq!(
        text(&count_distinct(qty.clone()).unwrap()),
        "COUNT(DISTINCT order_details.quantity)"
    );
    assert_eq!(
        text(&sum(mul(qty, s.order_details.column("unit_price").unwrap()).unwrap()).unwrap()),
        "SUM(order_details.quantity * order_details.unit_price)"
    );
}

#[test]
fn aliases_are_selection_level_only() {
    let aliased = lit(1i32).alias("n");
    assert!(matches!(
        add(aliased, lit(2i32)),
        Err(BuildError::AliasNotTopLevel)
    ));
}

#[test]
fn nullable_tags_collapse_and_propagate() {
    let once = TypeTag::nullable(TypeTag::Int);
    assert_eq!(TypeTag::nullable(once.clone()), once);

    let s = schema();
    let dob = s.users.column("dob").unwrap();
    let cmp = eq(dob, lit("2000-01-01".parse::<chrono::NaiveDate>().unwrap())).unwrap();
    // both operands total, so the comparison is too
    assert_eq!(cmp.tag(), &TypeTag::Bool);

    let cmp = eq(null_of(TypeTag::Int), lit(1i32)).unwrap();
    assert_eq!(cmp.tag(), &TypeTag::nullable(TypeTag::Bool));
}
