use crate::common::utility::create_n_rows;
use crate::common::{ConstraintViolation, Error};
use crate::sql::planner::{ColumnRef, Expr, Query, TableRef};
use crate::sql::tests::utility::QueryRunner;
use crate::types::field::Field;
use crate::types::{Column, DataType, Schema};
use itertools::Itertools;

// ================================= Test Tables =================================

/// a(id int, name varchar) with rows (1, x), (2, y).
fn table_a() -> Schema {
    Schema::builder()
        .name("a")
        .column("id", DataType::Int, false, None, None)
        .column("name", DataType::Text, false, None, None)
        .build()
}

/// b(a_id int, val varchar) with rows (1, p), (3, q).
fn table_b() -> Schema {
    Schema::builder()
        .name("b")
        .column("a_id", DataType::Int, false, None, None)
        .column("val", DataType::Text, false, None, None)
        .build()
}

/// people(name varchar, age int nullable).
fn people() -> Schema {
    Schema::builder()
        .name("people")
        .column("name", DataType::Text, false, None, None)
        .column("age", DataType::Int, true, None, None)
        .build()
}

/// users(id int auto-increment, name varchar(10), active bool default true).
fn users() -> Schema {
    Schema::builder()
        .name("users")
        .column_from_definition(
            Column::builder()
                .name("id")
                .data_type(DataType::Int)
                .auto_increment()
                .build(),
        )
        .column("name", DataType::Text, false, None, Some(10))
        .column(
            "active",
            DataType::Bool,
            false,
            Some(Field::Boolean(true)),
            None,
        )
        .build()
}

fn seed_ab(runner: &mut QueryRunner) {
    runner
        .create(table_a())
        .insert("a", vec![Some(Field::Integer(1)), Some(Field::from("x"))])
        .insert("a", vec![Some(Field::Integer(2)), Some(Field::from("y"))])
        .create(table_b())
        .insert("b", vec![Some(Field::Integer(1)), Some(Field::from("p"))])
        .insert("b", vec![Some(Field::Integer(3)), Some(Field::from("q"))]);
}

fn seed_people(runner: &mut QueryRunner) {
    runner
        .create(people())
        .insert("people", vec![Some(Field::from("ann")), Some(Field::Integer(25))])
        .insert("people", vec![Some(Field::from("bob")), Some(Field::Integer(35))])
        .insert("people", vec![Some(Field::from("eve")), Some(Field::Null)]);
}

// ===============================================================================

#[test]
fn test_insert_scan_roundtrip_with_resolution() {
    // Explicit values, the auto-increment counter, and defaults all land in
    // the stored row exactly once, in schema order.
    QueryRunner::new()
        .create(users())
        .insert("users", vec![None, Some(Field::from("jake")), None])
        .insert(
            "users",
            vec![None, Some(Field::from("lucy")), Some(Field::Boolean(false))],
        )
        .select_expect(
            Query::from(TableRef::new("users")),
            "users.id, users.name, users.active ; \
             1, jake, true ; \
             2, lucy, false",
        );
}

#[test]
fn test_auto_increment_not_consumed_by_failed_insert() {
    let mut runner = QueryRunner::new();
    runner.create(users());
    runner.insert("users", vec![None, Some(Field::from("jake")), None]);

    // An oversized name fails validation after the counter was resolved; the
    // counter value must not be consumed.
    let err = runner
        .try_insert(
            "users",
            vec![None, Some(Field::from("a name too long to store")), None],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Constraint(ConstraintViolation::SizeExceeded { .. })
    ));

    runner
        .insert("users", vec![None, Some(Field::from("lucy")), None])
        .select_expect(
            Query::from(TableRef::new("users")),
            "users.id, users.name, users.active ; \
             1, jake, true ; \
             2, lucy, true",
        );
}

#[test]
fn test_missing_required_value_rejected() {
    let mut runner = QueryRunner::new();
    runner.create(users());

    let err = runner.try_insert("users", vec![None, None, None]).unwrap_err();
    assert!(matches!(
        err,
        Error::Constraint(ConstraintViolation::MissingValue { .. })
    ));
    assert_eq!(runner.db().table("users").unwrap().row_count(), 0);
}

#[test]
fn test_auto_increment_override_rejected() {
    let mut runner = QueryRunner::new();
    runner.create(users());

    let err = runner
        .try_insert(
            "users",
            vec![Some(Field::Integer(99)), Some(Field::from("jake")), None],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Constraint(ConstraintViolation::AutoIncrementOverride { .. })
    ));
    assert_eq!(runner.db().table("users").unwrap().row_count(), 0);
}

#[test]
fn test_inner_join() {
    // a ⨝ b on a.id = b.a_id keeps exactly the (1, x, 1, p) pairing.
    QueryRunner::new().bind(seed_ab).select_expect(
        Query::from(TableRef::new("a")).join(
            TableRef::new("b"),
            Some(Expr::qualified("a", "id").eq(Expr::qualified("b", "a_id"))),
        ),
        "a.id, a.name, b.a_id, b.val ; \
         1, x, 1, p",
    );
}

#[test]
fn test_cross_join() {
    // No condition pairs every row: right rows cycle fastest.
    QueryRunner::new().bind(seed_ab).select_expect(
        Query::from(TableRef::new("a")).join(TableRef::new("b"), None),
        "a.id, a.name, b.a_id, b.val ; \
         1, x, 1, p ; \
         1, x, 3, q ; \
         2, y, 1, p ; \
         2, y, 3, q",
    );
}

#[test]
fn test_filter_null_comparisons_false() {
    // age > 30 keeps only bob; eve's NULL age compares false, not as an error.
    QueryRunner::new().bind(seed_people).select_expect(
        Query::from(TableRef::new("people"))
            .filter(Expr::column("age").gt(Expr::constant(30))),
        "people.name, people.age ; \
         bob, 35",
    );
}

#[test]
fn test_filter_is_null() {
    QueryRunner::new().bind(seed_people).select_expect(
        Query::from(TableRef::new("people")).filter(Expr::column("age").is_null()),
        "people.name, people.age ; \
         eve, NULL",
    );
}

#[test]
fn test_projection_preserves_scan_order() {
    QueryRunner::new().bind(seed_people).select_expect(
        Query::from(TableRef::new("people")).project(vec![ColumnRef::new("name")]),
        "people.name ; ann ; bob ; eve",
    );
}

#[test]
fn test_projection_reorders_and_repeats() {
    QueryRunner::new().bind(seed_ab).select_expect(
        Query::from(TableRef::new("a")).project(vec![
            ColumnRef::new("name"),
            ColumnRef::new("id"),
            ColumnRef::new("name"),
        ]),
        "a.name, a.id, a.name ; x, 1, x ; y, 2, y",
    );
}

#[test]
fn test_oversized_text_rejected() {
    let mut runner = QueryRunner::new();
    runner.create(users());

    let err = runner
        .try_insert(
            "users",
            vec![None, Some(Field::from("abcdefghijk")), None],
        )
        .unwrap_err();
    match err {
        Error::Constraint(ConstraintViolation::SizeExceeded { .. }) => {}
        other => panic!("expected a size violation, got {other:?}"),
    }
}

#[test]
fn test_type_mismatch_rejected() {
    let mut runner = QueryRunner::new();
    runner.create(users());

    let err = runner
        .try_insert(
            "users",
            vec![None, Some(Field::Integer(7)), None],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Constraint(ConstraintViolation::TypeMismatch { .. })
    ));
}

#[test]
fn test_incompatible_predicate_comparison() {
    // name = 1 compares text against an integer, which is a type error
    // surfaced to the caller, not an empty result.
    let err = QueryRunner::new().bind(seed_people).select_err(
        Query::from(TableRef::new("people"))
            .filter(Expr::column("name").eq(Expr::constant(1))),
    );
    assert!(matches!(err, Error::Type(_)));
}

#[test]
fn test_incompatible_join_columns() {
    // Joining text against int columns fails at plan time, before any row is
    // compared.
    let err = QueryRunner::new().bind(seed_ab).select_err(
        Query::from(TableRef::new("a")).join(
            TableRef::new("b"),
            Some(Expr::qualified("a", "name").eq(Expr::qualified("b", "a_id"))),
        ),
    );
    assert!(matches!(err, Error::Type(_)));
}

#[test]
fn test_unknown_table() {
    let err = QueryRunner::new().select_err(Query::from(TableRef::new("nope")));
    assert!(matches!(err, Error::Resolution(_)));
}

#[test]
fn test_unknown_column() {
    let err = QueryRunner::new().bind(seed_people).select_err(
        Query::from(TableRef::new("people")).filter(Expr::column("salary").is_null()),
    );
    assert!(matches!(err, Error::Resolution(_)));
}

#[test]
fn test_ambiguous_column() {
    // Both a and b have no shared names, so join people with itself via an
    // alias: unqualified "age" is then ambiguous.
    let err = QueryRunner::new().bind(seed_people).select_err(
        Query::from(TableRef::new("people"))
            .join(TableRef::aliased("people", "p2"), None)
            .filter(Expr::column("age").is_null()),
    );
    assert!(matches!(err, Error::Resolution(_)));
}

#[test]
fn test_alias_resolution() {
    // A self-join under an alias: each person paired with the people older
    // than them.
    QueryRunner::new().bind(seed_people).select_expect(
        Query::from(TableRef::new("people"))
            .join(
                TableRef::aliased("people", "older"),
                Some(Expr::qualified("older", "age").gt(Expr::qualified("people", "age"))),
            )
            .project(vec![
                ColumnRef::qualified("people", "name"),
                ColumnRef::qualified("older", "name"),
            ]),
        "people.name, older.name ; ann, bob",
    );
}

#[test]
fn test_duplicate_alias_rejected() {
    let err = QueryRunner::new().bind(seed_ab).select_err(
        Query::from(TableRef::new("a")).join(TableRef::aliased("b", "a"), None),
    );
    assert!(matches!(err, Error::Resolution(_)));
}

#[test]
fn test_three_table_join() {
    let mut runner = QueryRunner::new();
    seed_ab(&mut runner);
    runner
        .create(
            Schema::builder()
                .name("c")
                .column("b_val", DataType::Text, false, None, None)
                .build(),
        )
        .insert("c", vec![Some(Field::from("p"))])
        .select_expect(
            Query::from(TableRef::new("a"))
                .join(
                    TableRef::new("b"),
                    Some(Expr::qualified("a", "id").eq(Expr::qualified("b", "a_id"))),
                )
                .join(
                    TableRef::new("c"),
                    Some(Expr::qualified("b", "val").eq(Expr::qualified("c", "b_val"))),
                ),
            "a.id, a.name, b.a_id, b.val, c.b_val ; \
             1, x, 1, p, p",
        );
}

#[test]
fn test_hash_join_matches_nested_loop_output() {
    // The equality join is planned as a hash join; filtering a cross join on
    // the same condition forces the nested-loop path. Results must agree,
    // including order.
    let mut runner = QueryRunner::new();
    seed_ab(&mut runner);
    runner.insert("b", vec![Some(Field::Integer(2)), Some(Field::from("r"))]);
    runner.insert("b", vec![Some(Field::Integer(1)), Some(Field::from("s"))]);

    let on = Expr::qualified("a", "id").eq(Expr::qualified("b", "a_id"));
    let hashed = runner
        .db()
        .execute(Query::from(TableRef::new("a")).join(TableRef::new("b"), Some(on.clone())))
        .unwrap();
    let looped = runner
        .db()
        .execute(
            Query::from(TableRef::new("a"))
                .join(TableRef::new("b"), None)
                .filter(on),
        )
        .unwrap();
    assert_eq!(hashed.rows, looped.rows);
}

#[test]
fn test_hash_join_signed_zero_keys() {
    // 0.0 and -0.0 compare equal, so the hashed equality join must pair
    // them, just like the nested loop does.
    let mut runner = QueryRunner::new();
    runner
        .create(
            Schema::builder()
                .name("l")
                .column("x", DataType::Float, false, None, None)
                .build(),
        )
        .insert("l", vec![Some(Field::Float(0.0))])
        .create(
            Schema::builder()
                .name("r")
                .column("y", DataType::Float, false, None, None)
                .build(),
        )
        .insert("r", vec![Some(Field::Float(-0.0))]);

    let on = Expr::qualified("l", "x").eq(Expr::qualified("r", "y"));
    let hashed = runner
        .db()
        .execute(Query::from(TableRef::new("l")).join(TableRef::new("r"), Some(on.clone())))
        .unwrap();
    let looped = runner
        .db()
        .execute(
            Query::from(TableRef::new("l"))
                .join(TableRef::new("r"), None)
                .filter(on),
        )
        .unwrap();
    assert_eq!(hashed.rows.len(), 1);
    assert_eq!(hashed.rows, looped.rows);
}

#[test]
fn test_bulk_random_inserts() {
    let mut runner = QueryRunner::new();
    runner.create(
        Schema::builder()
            .name("bulk")
            .column("bulk0", DataType::Int, false, None, None)
            .column("bulk1", DataType::Int, false, None, None)
            .column("bulk2", DataType::Int, false, None, None)
            .build(),
    );

    let inserted = {
        let db = runner.db();
        let table = db.table("bulk").unwrap();
        assert_eq!(table.row_count(), 0);
        // Seeded so failures reproduce.
        let mut rows = Vec::new();
        for i in 0..1000 {
            let values = crate::common::utility::create_random_fields(table.schema(), Some(i));
            rows.push(values);
        }
        rows
    };
    for values in &inserted {
        runner.insert("bulk", values.iter().cloned().map(Some).collect());
    }

    let result = runner
        .db()
        .execute(Query::from(TableRef::new("bulk")))
        .unwrap();
    assert_eq!(result.rows.len(), 1000);
    // Scan order is insertion order.
    let expected = inserted
        .iter()
        .map(|v| crate::storage::Row::from(v.clone()).to_string(None))
        .collect_vec();
    let actual = result.rows.iter().map(|r| r.to_string(None)).collect_vec();
    assert_eq!(actual, expected);
}

#[test]
fn test_create_n_rows_helper() {
    let mut table =
        crate::storage::Table::new(crate::common::utility::create_table_definition(4, "t"));
    let rows = create_n_rows(20, &mut table, Some(42));
    assert_eq!(table.row_count(), 20);
    for (id, row) in rows {
        assert_eq!(table.get_row(id), Some(&row));
    }
}
