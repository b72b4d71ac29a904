#[cfg(test)]
mod tests {
    use crate::backend::Backend;
    use crate::config::DbConfig;
    use crate::database::{Database, Options};
    use crate::error::{Error, Result};
    use crate::insert::InsertBuilder;
    use crate::registry::Registry;
    use crate::result::Row;
    use crate::select::SelectBuilder;
    use crate::testing::{Event, FakeDriver, Reply};
    use crate::update::UpdateBuilder;
    use crate::value::SqlValue;
    use crate::vars;
    use crate::where_clause::Where;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn open_with(config: DbConfig) -> (FakeDriver, Database) {
        let driver = FakeDriver::default();
        let mut registry = Registry::new();
        registry.register(config.backend.clone(), driver.clone());
        let db = Database::open(&config, &registry).unwrap();
        (driver, db)
    }

    fn open(backend: &str) -> (FakeDriver, Database) {
        open_with(DbConfig::new(backend))
    }

    fn exec(sql: &str) -> Event {
        Event::Execute(sql.to_string(), Vec::new())
    }

    #[test]
    fn connects_lazily_and_autocommits() {
        let (driver, db) = open("mysql");
        let mut s = db.session();
        assert!(!s.is_connected());
        assert!(driver.events().is_empty());

        assert_eq!(s.execute("DELETE FROM log").unwrap(), 1);
        assert!(s.is_connected());
        assert_eq!(
            driver.events(),
            vec![Event::Connect, exec("DELETE FROM log"), Event::Commit]
        );
        assert_eq!(s.statement_count(), 1);
    }

    #[test]
    fn query_returns_rows() {
        let (driver, db) = open("mysql");
        driver.reply(Reply::rows(
            &["id", "name"],
            vec![
                vec![SqlValue::from(1), SqlValue::from("joe")],
                vec![SqlValue::from(2), SqlValue::from("ann")],
            ],
        ));
        let mut s = db.session();
        let rs = s.query("SELECT id, name FROM user").unwrap();
        assert_eq!(rs.len(), 2);
        assert_eq!(rs.columns(), ["id".to_string(), "name".to_string()]);

        let rows: Vec<Row> = rs.collect::<Result<_>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["name"], SqlValue::from("ann"));
        assert_eq!(rows[0].get("id"), Some(&SqlValue::I64(1)));
    }

    #[test]
    fn result_set_list_and_first() {
        let (driver, db) = open("mysql");
        let reply = Reply::rows(&["n"], vec![vec![SqlValue::from(1)], vec![SqlValue::from(2)]]);
        driver.reply(reply.clone()).reply(reply);
        let mut s = db.session();

        let mut rs = s.query("SELECT n FROM t").unwrap();
        let first = rs.next().unwrap().unwrap();
        assert_eq!(first["n"], SqlValue::I64(1));
        let rest = rs.list().unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0]["n"], SqlValue::I64(2));

        let first = s.query("SELECT n FROM t").unwrap().first().unwrap();
        assert_eq!(first.map(|r| r["n"].clone()), Some(SqlValue::I64(1)));
    }

    #[test]
    fn statement_without_result_set() {
        let (driver, db) = open("mysql");
        driver.reply(Reply::affected(3));
        let mut s = db.session();
        let mut rs = s.query("UPDATE user SET age = age + 1").unwrap();
        assert_eq!(rs.len(), 3);
        assert!(rs.columns().is_empty());
        assert!(rs.next().is_none());
    }

    #[test]
    fn query_with_template() {
        let (driver, db) = open("mysql");
        let mut s = db.session();
        s.query_with("SELECT * FROM user WHERE id > $id", &vars! { "id" => 80 })
            .unwrap();
        assert_eq!(
            driver.events()[1],
            Event::Execute(
                "SELECT * FROM user WHERE id > %s".to_string(),
                vec![SqlValue::I64(80)]
            )
        );
    }

    #[test]
    fn backend_decides_markers_and_escaping() {
        let (driver, db) = open("sqlite");
        let mut s = db.session();
        s.query_with("SELECT * FROM t WHERE name LIKE 'a%' AND id = :id", &vars! { "id" => 1 })
            .unwrap();
        assert_eq!(
            driver.statements(),
            vec!["SELECT * FROM t WHERE name LIKE 'a%' AND id = ?"]
        );

        let (driver, db) = open("mysql");
        let mut s = db.session();
        s.execute("UPDATE t SET a = 'x%'").unwrap();
        assert_eq!(driver.statements(), vec!["UPDATE t SET a = 'x%%'"]);
    }

    #[test]
    fn transaction_commit() {
        let (driver, db) = open("mysql");
        let mut s = db.session();
        let mut tx = s.transaction().unwrap();
        assert_eq!(tx.depth(), 0);
        tx.execute("INSERT INTO t (a) VALUES (1)").unwrap();
        tx.commit().unwrap();
        assert_eq!(s.transaction_depth(), 0);
        assert_eq!(
            driver.events(),
            vec![
                Event::Connect,
                Event::Commit,
                exec("INSERT INTO t (a) VALUES (1)"),
                Event::Commit,
            ]
        );
    }

    #[test]
    fn dropped_transaction_rolls_back() {
        let (driver, db) = open("mysql");
        let mut s = db.session();
        {
            let mut tx = s.transaction().unwrap();
            tx.execute("DELETE FROM t").unwrap();
        }
        assert_eq!(s.transaction_depth(), 0);
        assert_eq!(driver.events().last(), Some(&Event::Rollback));
    }

    #[test]
    fn nested_transactions_use_savepoints() {
        let (driver, db) = open("postgres");
        let mut s = db.session();
        let mut tx = s.transaction().unwrap();
        {
            let mut inner = tx.transaction().unwrap();
            assert_eq!(inner.depth(), 1);
            assert_eq!(inner.transaction_depth(), 2);
            inner.execute("UPDATE t SET a = 1").unwrap();
            inner.rollback().unwrap();
        }
        {
            let mut inner = tx.transaction().unwrap();
            inner.execute("UPDATE t SET a = 2").unwrap();
            inner.commit().unwrap();
        }
        assert_eq!(tx.transaction_depth(), 1);
        tx.commit().unwrap();

        assert_eq!(
            driver.statements(),
            vec![
                "SAVEPOINT crystal_sp_1",
                "UPDATE t SET a = 1",
                "ROLLBACK TO SAVEPOINT crystal_sp_1",
                "SAVEPOINT crystal_sp_1",
                "UPDATE t SET a = 2",
                "RELEASE SAVEPOINT crystal_sp_1",
            ]
        );
        assert_eq!(driver.events().last(), Some(&Event::Commit));
    }

    #[test]
    fn ignored_nested_transactions() {
        let config = DbConfig {
            ignore_nested_transactions: true,
            ..DbConfig::new("mysql")
        };
        let (driver, db) = open_with(config);
        let mut s = db.session();
        let mut tx = s.transaction().unwrap();
        {
            let mut inner = tx.transaction().unwrap();
            inner.execute("UPDATE t SET a = 1").unwrap();
            inner.commit().unwrap();
        }
        tx.commit().unwrap();
        assert_eq!(driver.statements(), vec!["UPDATE t SET a = 1"]);
    }

    #[test]
    fn failure_without_transaction_rolls_back_connection() {
        let (driver, db) = open("mysql");
        driver.fail_on("broken");
        let mut s = db.session();
        let err = s.execute("SELECT * FROM broken").unwrap_err();
        assert!(matches!(err, Error::Driver(_)));
        assert_eq!(
            driver.events(),
            vec![
                Event::Connect,
                exec("SELECT * FROM broken"),
                Event::Rollback
            ]
        );
        assert_eq!(s.statement_count(), 1);
    }

    #[test]
    fn failure_in_savepoint_rolls_back_innermost_frame() {
        let (driver, db) = open("mysql");
        driver.fail_on("broken");
        let mut s = db.session();
        let mut tx = s.transaction().unwrap();
        {
            let mut inner = tx.transaction().unwrap();
            assert!(inner.execute("INSERT INTO broken VALUES (1)").is_err());
            assert_eq!(inner.transaction_depth(), 1);
        }
        assert_eq!(tx.transaction_depth(), 1);
        tx.commit().unwrap();

        assert_eq!(
            driver.statements(),
            vec![
                "SAVEPOINT crystal_sp_1",
                "INSERT INTO broken VALUES (1)",
                "ROLLBACK TO SAVEPOINT crystal_sp_1",
            ]
        );
        assert_eq!(driver.events().last(), Some(&Event::Commit));
    }

    #[test]
    fn failure_in_top_level_transaction_clears_stack() {
        let (driver, db) = open("mysql");
        driver.fail_on("broken");
        let mut s = db.session();
        let mut tx = s.transaction().unwrap();
        assert!(tx.execute("DELETE FROM broken").is_err());
        assert_eq!(tx.transaction_depth(), 0);
        tx.commit().unwrap();
        assert_eq!(
            driver.events(),
            vec![
                Event::Connect,
                Event::Commit,
                exec("DELETE FROM broken"),
                Event::Rollback,
            ]
        );
    }

    #[test]
    fn select_helpers() {
        let (driver, db) = open("mysql");
        driver
            .reply(Reply::rows(&["COUNT"], vec![vec![SqlValue::from(3)]]))
            .reply(Reply::rows(&["name"], vec![vec![SqlValue::from("joe")]]));
        let mut sb = SelectBuilder::new(["user"]);
        sb.filter([("gender", "girl")]);

        let mut s = db.session();
        assert_eq!(s.select_count(&sb, None).unwrap(), 3);
        let row = s.select_first(&sb).unwrap().unwrap();
        assert_eq!(row["name"], SqlValue::from("joe"));
        assert!(s.select_all(&sb).unwrap().is_empty());

        assert_eq!(
            driver.statements(),
            vec![
                "SELECT COUNT(*) AS COUNT FROM user WHERE gender = %s",
                "SELECT * FROM user WHERE gender = %s",
                "SELECT * FROM user WHERE gender = %s",
            ]
        );
    }

    #[test]
    fn insert_returns_rowcount_or_id() {
        let (driver, db) = open("mysql");
        driver
            .reply(Reply::affected(1))
            .reply(Reply::affected(1))
            .reply(Reply::rows(&["last_insert_id()"], vec![vec![SqlValue::from(42)]]));
        let mut ib = InsertBuilder::new("user");
        ib.set("name", "joe");

        let mut s = db.session();
        assert_eq!(s.insert(&ib).unwrap(), 1);
        assert_eq!(s.insert_returning_id(&ib, None).unwrap(), 42);
        assert_eq!(
            driver.statements(),
            vec![
                "INSERT INTO user (name) VALUES (%s)",
                "INSERT INTO user (name) VALUES (%s)",
                "SELECT last_insert_id();",
            ]
        );
        assert_eq!(driver.events().last(), Some(&Event::Commit));
    }

    #[test]
    fn postgres_insert_id_uses_sequence() {
        let (driver, db) = open("postgres");
        driver
            .reply(Reply::affected(1))
            .reply(Reply::rows(&["currval"], vec![vec![SqlValue::from(7)]]));
        let mut ib = InsertBuilder::new("user");
        ib.set("name", "joe");

        let mut s = db.session();
        assert_eq!(s.insert_returning_id(&ib, None).unwrap(), 7);
        assert_eq!(
            driver.events()[2],
            Event::Execute(
                "SELECT currval(%s);".to_string(),
                vec![SqlValue::from("user_id_seq")]
            )
        );
    }

    #[test]
    fn multiple_insert_single_statement() {
        let (driver, db) = open("mysql");
        driver.reply(Reply::affected(2));
        let mut ib = InsertBuilder::new("user");
        ib.add_row([("a", 1)]).add_row([("a", 2)]);

        let mut s = db.session();
        assert_eq!(s.multiple_insert(&ib).unwrap(), 2);
        assert_eq!(
            driver.statements(),
            vec!["INSERT INTO user (a) VALUES (%s), (%s)"]
        );
    }

    #[test]
    fn multiple_insert_falls_back_to_single_rows() {
        let (driver, db) = open("sqlite");
        let mut ib = InsertBuilder::new("user");
        ib.add_row([("a", 1)]).add_row([("a", 2)]);

        let mut s = db.session();
        assert_eq!(s.multiple_insert(&ib).unwrap(), 2);
        assert_eq!(
            driver.statements(),
            vec!["INSERT INTO user (a) VALUES (?)", "INSERT INTO user (a) VALUES (?)"]
        );
    }

    #[test]
    fn multiple_insert_ids_range() {
        let (driver, db) = open("mysql");
        driver
            .reply(Reply::affected(3))
            .reply(Reply::rows(&["id"], vec![vec![SqlValue::from(12)]]));
        let mut ib = InsertBuilder::new("user");
        for a in 0..3 {
            ib.add_row([("a", a)]);
        }

        let mut s = db.session();
        assert_eq!(s.multiple_insert_ids(&ib, None).unwrap(), vec![10, 11, 12]);
    }

    #[test]
    fn multiple_insert_empty_and_mismatched() {
        let (driver, db) = open("mysql");
        let mut s = db.session();
        assert_eq!(s.multiple_insert(&InsertBuilder::new("user")).unwrap(), 0);
        assert!(s.multiple_insert_ids(&InsertBuilder::new("user"), None).unwrap().is_empty());

        let mut ib = InsertBuilder::new("user");
        ib.add_row([("a", 1)]).add_row([("b", 2)]);
        assert!(matches!(s.multiple_insert(&ib), Err(Error::MismatchedRowShape)));
        assert!(matches!(
            s.multiple_insert_ids(&ib, None),
            Err(Error::MismatchedRowShape)
        ));

        let mut holey = InsertBuilder::new("user");
        holey
            .add_row([("a", 1)])
            .add_row(Vec::<(&str, i64)>::new())
            .add_row([("a", 3)]);
        assert!(matches!(s.multiple_insert(&holey), Err(Error::MismatchedRowShape)));
        assert!(matches!(
            s.multiple_insert_ids(&holey, None),
            Err(Error::MismatchedRowShape)
        ));
        assert!(driver.events().is_empty());
    }

    #[test]
    fn debug_queries_keeps_last_statement() {
        let config = DbConfig {
            debug_queries: true,
            ..DbConfig::new("mysql")
        };
        let (_driver, db) = open_with(config);
        let mut s = db.session();
        assert!(s.last_query().is_none());
        s.query_with("DELETE FROM t WHERE id = $id", &vars! { "id" => 1 })
            .unwrap();
        let info = s.last_query().unwrap();
        assert_eq!(info.sql, "DELETE FROM t WHERE id = 1");
        assert!(info.run_time_ms >= 0.0);
    }

    #[test]
    fn close_and_reconnect() {
        let (driver, db) = open("mysql");
        let mut s = db.session();
        s.execute("SELECT 1").unwrap();
        s.close().unwrap();
        assert!(!s.is_connected());
        s.execute("SELECT 2").unwrap();
        drop(s);

        let connects = driver
            .events()
            .iter()
            .filter(|e| **e == Event::Connect)
            .count();
        assert_eq!(connects, 2);
        assert_eq!(driver.events().last(), Some(&Event::Close));
    }

    #[test]
    fn sessions_are_independent() {
        let (driver, db) = open("mysql");
        let mut a = db.session();
        let mut b = db.session();
        let tx = a.transaction().unwrap();
        b.execute("SELECT 1").unwrap();
        assert_eq!(b.transaction_depth(), 0);
        drop(tx);
        let connects = driver
            .events()
            .iter()
            .filter(|e| **e == Event::Connect)
            .count();
        assert_eq!(connects, 2);
    }

    #[test]
    fn open_passes_connect_params() {
        let (driver, db) = open_with(DbConfig::from_url("mysql://root:pw@localhost/test").unwrap());
        assert_eq!(db.backend(), Backend::MySql);
        db.session().execute("SELECT 1").unwrap();
        let params = driver.last_params().unwrap();
        assert_eq!(params.database.as_deref(), Some("test"));
        assert_eq!(params.password.as_deref(), Some("pw"));
        assert_eq!(params.charset.as_deref(), Some("utf8"));
    }

    #[test]
    fn open_errors() {
        let registry = Registry::new();
        let err = Database::open(&DbConfig::new("mysql"), &registry).unwrap_err();
        assert!(matches!(err, Error::UnsupportedDriver(_)));
        let err = Database::open(&DbConfig::new("oracle"), &registry).unwrap_err();
        assert!(matches!(err, Error::UnknownDatabase(name) if name == "oracle"));
    }

    #[test]
    fn explicit_driver_and_builder_execution() {
        let driver = FakeDriver::default();
        let config = DbConfig {
            debug: true,
            ..DbConfig::new("sqlite")
        };
        let db = Database::with_driver(Backend::Sqlite, Arc::new(driver.clone()), &config);
        assert_eq!(
            db.options(),
            Options {
                debug: true,
                ..Options::default()
            }
        );

        let mut ub = UpdateBuilder::new(["user"]);
        ub.set("age", 20).filter(Where::Id(1));
        driver.reply(Reply::affected(3));
        assert_eq!(db.session().execute_builder(&ub).unwrap(), 3);
        assert_eq!(
            driver.events()[1],
            Event::Execute(
                "UPDATE user SET age = ? WHERE id = ?".to_string(),
                vec![SqlValue::from(20), SqlValue::from(1)],
            )
        );
    }
}
