use dbal::prelude::*;
use dbal::CursorError;

fn numbers_db() -> Database {
    let db = Database::new(DatabaseConfig::sqlite_memory()).unwrap();
    db.import(
        "CREATE TABLE numbers (n INTEGER, label TEXT, parity TEXT);
         INSERT INTO numbers VALUES (1, 'one', 'odd'), (2, 'two', 'even'), (3, 'three', 'odd'),
                                    (4, 'four', 'even'), (5, 'five', 'odd');",
    )
    .unwrap();
    db
}

fn numbers(db: &Database) -> TabularResult {
    db.select()
        .from("numbers")
        .unwrap()
        .order_by("n", Order::Asc)
        .execute()
        .unwrap()
}

#[test]
fn next_after_eof_fails_loudly() {
    let db = numbers_db();
    let mut result = db
        .select()
        .from("numbers")
        .unwrap()
        .where_gt("n", 4)
        .execute()
        .unwrap();
    assert_eq!(result.next().unwrap().unwrap().get_int("n").unwrap(), 5);
    assert!(result.next().unwrap().is_none());
    assert!(result.is_eof());

    let err = result.next().unwrap_err();
    assert!(matches!(err, DbError::Cursor(CursorError::AfterEnd)));
    // Still fails on every further call.
    assert!(result.next().unwrap_err().is_cursor());
}

#[test]
fn rows_requires_untouched_cursor() {
    let db = numbers_db();
    let mut result = numbers(&db);
    result.next().unwrap();
    match result.rows().unwrap_err() {
        DbError::Cursor(CursorError::AlreadyConsumed { consumed }) => assert_eq!(consumed, 1),
        other => panic!("unexpected error: {other}"),
    }

    let mut fresh = numbers(&db);
    assert_eq!(fresh.rows().unwrap().len(), 5);
    assert!(fresh.rows().unwrap_err().is_cursor());
}

#[test]
fn fetch_orientation_moves_forward_only() {
    let db = numbers_db();
    let mut result = numbers(&db);

    result.set_fetch(FetchOrientation::Absolute(2));
    assert_eq!(result.next().unwrap().unwrap().get_int("n").unwrap(), 3);
    assert_eq!(result.position(), 3);

    result.set_fetch(FetchOrientation::Relative(1));
    assert_eq!(result.next().unwrap().unwrap().get_int("n").unwrap(), 5);

    result.set_fetch(FetchOrientation::Absolute(0));
    match result.next().unwrap_err() {
        DbError::Cursor(CursorError::Backward { position, requested }) => {
            assert_eq!(position, 5);
            assert_eq!(requested, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn orientation_applies_to_one_fetch() {
    let db = numbers_db();
    let mut result = numbers(&db);
    result.set_fetch(FetchOrientation::Relative(2));
    assert_eq!(result.next().unwrap().unwrap().get_int("n").unwrap(), 3);
    assert_eq!(result.next().unwrap().unwrap().get_int("n").unwrap(), 4);
}

#[test]
fn reducer_extracts_and_groups() {
    let db = numbers_db();
    let reducer = numbers(&db).reducer().unwrap();

    assert_eq!(reducer.len(), 5);
    assert_eq!(reducer.first_int().unwrap(), Some(1));
    assert_eq!(reducer.first_string(), Some("1".to_string()));

    let by_label = reducer.index_by("label").unwrap();
    assert_eq!(by_label["four"].get_int("n").unwrap(), 4);

    let by_parity = reducer.group_by("parity").unwrap();
    assert_eq!(by_parity["odd"].len(), 3);
    assert_eq!(by_parity["even"].len(), 2);

    assert!(reducer.column("missing").is_err());
}

#[test]
fn reducer_boolean_coercion() {
    let db = Database::new(DatabaseConfig::sqlite_memory()).unwrap();
    db.import(
        "CREATE TABLE flags (v);
         INSERT INTO flags VALUES ('yes'), ('true'), ('1'), (7), ('no'), (0), (NULL);",
    )
    .unwrap();
    let flags = db
        .select()
        .columns(&["v"])
        .from("flags")
        .unwrap()
        .execute()
        .unwrap()
        .reducer()
        .unwrap();
    let coerced: Vec<bool> = flags
        .column("v")
        .unwrap()
        .iter()
        .map(Value::to_bool)
        .collect();
    assert_eq!(coerced, vec![true, true, true, true, false, false, false]);
}

#[test]
fn empty_result_reducer() {
    let db = numbers_db();
    let reducer = db
        .select()
        .from("numbers")
        .unwrap()
        .where_gt("n", 100)
        .execute()
        .unwrap()
        .reducer()
        .unwrap();
    assert!(reducer.is_empty());
    assert_eq!(reducer.first_value(), None);
    assert_eq!(reducer.first_int().unwrap(), None);
    assert_eq!(reducer.first_bool(), None);
}

#[test]
fn typed_accessor_reports_decode_error() {
    let db = numbers_db();
    let row = numbers(&db).next().unwrap().unwrap();
    let err = row.get_int("label").unwrap_err();
    assert!(matches!(err, DbError::Decode { ref column, .. } if column == "label"));
}

#[test]
fn rows_serialize_as_maps() {
    let db = numbers_db();
    let row = numbers(&db).next().unwrap().unwrap();
    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["n"], 1);
    assert_eq!(json["label"], "one");
}
