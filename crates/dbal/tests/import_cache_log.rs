use dbal::prelude::*;
use dbal::{SLOW_QUERY_THRESHOLD, log::sql_hash};
use std::time::Duration;

#[test]
fn import_runs_each_statement_with_prefix() {
    let db = Database::new(DatabaseConfig::sqlite_memory().table_prefix("cms_")).unwrap();
    let count = db
        .import(
            "-- schema
             CREATE TABLE #__menu (id INTEGER PRIMARY KEY, title TEXT);
             /* seed */
             INSERT INTO #__menu (title) VALUES ('Home; start'), ('It''s us');
             INSERT INTO #__menu (title) VALUES ('Contact');",
        )
        .unwrap();
    assert_eq!(count, 3);
    assert_eq!(db.query_count(), 3);

    let titles = db
        .select()
        .columns(&["title"])
        .from("#__menu")
        .unwrap()
        .order_by("id", Order::Asc)
        .execute()
        .unwrap()
        .reducer()
        .unwrap()
        .column("title")
        .unwrap();
    assert_eq!(
        titles,
        vec![Value::from("Home; start"), Value::from("It's us"), Value::from("Contact")]
    );
}

#[test]
fn import_refuses_quote_then_comment() {
    let db = Database::new(DatabaseConfig::sqlite_memory()).unwrap();
    db.import("CREATE TABLE t (a TEXT)").unwrap();
    // The splitter keeps the literal; the lenient guard refuses the idiom inside it.
    let err = db.import("INSERT INTO t VALUES ('x''--')").unwrap_err();
    assert!(err.is_rejected());
}

#[test]
fn import_stops_at_first_failure() {
    let db = Database::new(DatabaseConfig::sqlite_memory()).unwrap();
    let err = db
        .import("CREATE TABLE a (x INTEGER); INSERT INTO missing VALUES (1); CREATE TABLE b (x INTEGER)")
        .unwrap_err();
    assert!(err.is_database());
    assert_eq!(db.query_count(), 1);
}

#[test]
fn raw_select_returns_rows() {
    let db = Database::new(DatabaseConfig::sqlite_memory()).unwrap();
    let result = db.raw("SELECT 1 AS one, 2 AS two").execute().unwrap();
    let rows = result.into_tabular().unwrap().rows().unwrap();
    assert_eq!(rows[0].get_int("two").unwrap(), 2);
}

#[test]
fn cached_select_skips_backend_on_hit() {
    let db = Database::new(DatabaseConfig::sqlite_memory().enable_query_cache()).unwrap();
    db.import("CREATE TABLE tags (name TEXT); INSERT INTO tags VALUES ('rust'), ('sql');")
        .unwrap();
    let before = db.query_count();

    let first = db
        .select()
        .from("tags")
        .unwrap()
        .cached("all-tags")
        .execute()
        .unwrap()
        .rows()
        .unwrap();
    assert_eq!(db.query_count(), before + 1);

    db.insert("tags").set("name", "new").execute().unwrap();

    let mut second = db.select().from("tags").unwrap().cached("all-tags").execute().unwrap();
    assert_eq!(second.columns(), ["name"]);
    let second = second.rows().unwrap();
    assert_eq!(db.query_count(), before + 2);
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);

    db.with_query_cache(|cache| {
        assert!(cache.contains("all-tags"));
        cache.remove("all-tags");
    });
    let third = db
        .select()
        .from("tags")
        .unwrap()
        .cached("all-tags")
        .execute()
        .unwrap()
        .rows()
        .unwrap();
    assert_eq!(third.len(), 3);
}

#[test]
fn cached_empty_result_keeps_its_columns() {
    let db = Database::new(DatabaseConfig::sqlite_memory().enable_query_cache()).unwrap();
    db.import("CREATE TABLE t (a INTEGER, b TEXT)").unwrap();

    for _ in 0..2 {
        let mut result = db.select().from("t").unwrap().cached("k").execute().unwrap();
        assert_eq!(result.columns(), ["a", "b"]);
        let values = result.reducer().unwrap().column("a").unwrap();
        assert!(values.is_empty());
    }
    // Second run was served from the cache.
    assert_eq!(db.query_count(), 2);
    assert_eq!(
        db.with_query_cache(|cache| cache.columns("k").map(<[String]>::to_vec)),
        Some(vec!["a".to_string(), "b".to_string()])
    );
}

#[test]
fn cache_is_ignored_when_disabled() {
    let db = Database::new(DatabaseConfig::sqlite_memory()).unwrap();
    db.import("CREATE TABLE t (a INTEGER)").unwrap();
    db.select().from("t").unwrap().cached("k").execute().unwrap();
    db.select().from("t").unwrap().cached("k").execute().unwrap();
    assert_eq!(db.query_count(), 3);
    assert!(db.with_query_cache(|cache| cache.is_empty()));
}

#[test]
fn query_log_records_formatted_sql_and_hash() {
    let db = Database::new(DatabaseConfig::sqlite_memory().enable_query_log()).unwrap();
    db.create("t").column("a", "INTEGER").column("b", "TEXT").execute().unwrap();
    db.insert("t").set("a", 7).set("b", "x").execute().unwrap();

    let log = db.query_log();
    assert_eq!(log.len(), 2);
    let insert = &log[1];
    assert_eq!(insert.sql, "INSERT INTO `t` (`a`, `b`) VALUES (?, ?)");
    assert_eq!(insert.formatted_sql, "INSERT INTO `t` (`a`, `b`) VALUES (7, 'x')");
    assert_eq!(insert.hash, sql_hash(&insert.sql));
    assert_eq!(insert.hash.len(), 32);
    assert_eq!(insert.values, vec![Value::Int(7), Value::from("x")]);

    assert_eq!(db.total_query_time(), log.iter().map(|e| e.duration).sum::<Duration>());
    assert!(db.slow_queries().iter().all(|e| e.duration > SLOW_QUERY_THRESHOLD));
    assert_eq!(db.query_log_summary().query_count, 2);

    assert_eq!(db.take_query_log().len(), 2);
    assert!(db.query_log().is_empty());
}

#[test]
fn query_log_is_off_by_default() {
    let db = Database::new(DatabaseConfig::sqlite_memory()).unwrap();
    db.create("t").column("a", "INTEGER").execute().unwrap();
    assert!(db.query_log().is_empty());
    assert_eq!(db.query_count(), 1);
}

#[test]
fn mysql_only_statements_fail_on_sqlite_backend() {
    let db = Database::new(DatabaseConfig::sqlite_memory()).unwrap();
    db.create("t").column("a", "INTEGER").execute().unwrap();
    assert!(db.show().tables().execute().unwrap_err().is_database());
    assert!(db.truncate("t").execute().unwrap_err().is_database());
}
