use tablemap::{Reconciliation, Table};
use tablemap_test::run_test;

#[derive(Debug, Default, PartialEq, Table)]
#[tablemap(name = "scores")]
struct Score {
    #[tablemap(column = "Id", primary_key, length = 16)]
    id: String,
    #[tablemap(column = "Score")]
    score: i32,
}

#[derive(Debug, Default, PartialEq, Table)]
#[tablemap(name = "players")]
struct Player {
    #[tablemap(primary_key, auto_increment)]
    id: u32,
    #[tablemap(length = 32, unique)]
    name: String,
    level: i32,
    nickname: Option<String>,
    banned: bool,
}

#[derive(Debug, Default, PartialEq, Table)]
#[tablemap(name = "players")]
struct PlainPlayer {
    #[tablemap(primary_key, auto_increment)]
    id: u32,
    #[tablemap(length = 32)]
    name: String,
    level: i32,
    nickname: Option<String>,
    banned: bool,
}

#[derive(Debug, Default, PartialEq, Table)]
#[tablemap(name = "scores")]
struct RankedScore {
    #[tablemap(column = "Id", length = 16, unique)]
    id: String,
    #[tablemap(column = "Score", primary_key)]
    score: i32,
}

#[derive(Debug, Default, PartialEq, Table)]
#[tablemap(name = "counters")]
struct Counter {
    #[tablemap(primary_key)]
    id: i32,
    #[tablemap(column_type = "BIGINT UNSIGNED")]
    hits: i64,
}

#[derive(Debug, Default, PartialEq, Table)]
#[tablemap(name = "tags")]
struct Tag {
    #[tablemap(length = 32, unique)]
    label: String,
    uses: i32,
}

#[derive(Debug, Default, Table)]
#[tablemap(name = "a_b")]
struct Underscore {
    id: i32,
}

#[tokio::test]
async fn test_create_then_unchanged() {
    run_test(|db, engine| async move {
        assert!(!engine.table_exists::<Score>().await.unwrap());

        assert_eq!(
            engine.ensure_table::<Score>().await.unwrap(),
            Reconciliation::Created
        );
        assert!(db.has_table("scores"));
        assert_eq!(
            db.statements().last().unwrap(),
            "CREATE TABLE scores (Id VARCHAR(16) NOT NULL PRIMARY KEY, Score INT NOT NULL)"
        );

        db.clear_statements();
        assert_eq!(
            engine.ensure_table::<Score>().await.unwrap(),
            Reconciliation::Unchanged
        );
        assert_eq!(
            db.statements(),
            vec!["SHOW TABLES LIKE 'scores'", "SHOW COLUMNS FROM scores"]
        );

        assert!(engine.table_exists::<Score>().await.unwrap());
    })
    .await;
}

#[tokio::test]
async fn test_display_width_ignored() {
    run_test(|db, engine| async move {
        db.run(
            "CREATE TABLE players (id INT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY, \
             name VARCHAR(32) NOT NULL UNIQUE, level INT(11) NOT NULL, nickname TEXT, \
             banned TINYINT(1) NOT NULL)",
        )
        .unwrap();
        assert_eq!(
            db.column_types("players")[2],
            ("level".to_string(), "int(11)".to_string())
        );

        assert_eq!(
            engine.ensure_table::<Player>().await.unwrap(),
            Reconciliation::Unchanged
        );
        assert!(db.statements().iter().all(|sql| !sql.starts_with("ALTER")));
    })
    .await;
}

#[tokio::test]
async fn test_drop_detection() {
    run_test(|db, engine| async move {
        db.run("CREATE TABLE scores (Id VARCHAR(16) NOT NULL PRIMARY KEY, Score INT NOT NULL, legacy INT)")
            .unwrap();

        assert_eq!(
            engine.ensure_table::<Score>().await.unwrap(),
            Reconciliation::Altered
        );

        let alter = db.statements().last().unwrap().clone();
        assert_eq!(alter, "ALTER TABLE scores DROP COLUMN legacy");
        assert_eq!(db.column_types("scores").len(), 2);

        assert_eq!(
            engine.ensure_table::<Score>().await.unwrap(),
            Reconciliation::Unchanged
        );
    })
    .await;
}

#[tokio::test]
async fn test_add_modify_drop() {
    run_test(|db, engine| async move {
        db.run(
            "CREATE TABLE players (id INT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY, \
             NAME VARCHAR(32), level BIGINT NOT NULL, legacy INT)",
        )
        .unwrap();
        db.run("INSERT INTO players (NAME, level) VALUES ('bob', 3)").unwrap();

        assert_eq!(
            engine.ensure_table::<Player>().await.unwrap(),
            Reconciliation::Altered
        );
        assert_eq!(
            db.statements().last().unwrap(),
            "ALTER TABLE players ADD nickname TEXT, ADD banned BOOL NOT NULL, \
             MODIFY name VARCHAR(32) NOT NULL UNIQUE, MODIFY level INT NOT NULL, \
             DROP COLUMN legacy"
        );

        // Existing rows survive and read back through the new schema
        let players = engine.get_rows::<Player>("", vec![], None).await.unwrap();
        assert_eq!(
            players,
            vec![Player {
                id: 1,
                name: "bob".into(),
                level: 3,
                nickname: None,
                banned: false,
            }]
        );

        assert_eq!(
            engine.ensure_table::<Player>().await.unwrap(),
            Reconciliation::Unchanged
        );
    })
    .await;
}

#[tokio::test]
async fn test_unsigned_column_type() {
    run_test(|db, engine| async move {
        let outcome = engine.ensure_table::<Counter>().await.unwrap();
        assert_eq!(outcome, Reconciliation::Created);
        assert!(outcome.is_ok());
        assert_eq!(
            db.statements().last().unwrap(),
            "CREATE TABLE counters (id INT NOT NULL PRIMARY KEY, hits BIGINT UNSIGNED NOT NULL)"
        );
        assert_eq!(
            db.column_types("counters")[1],
            ("hits".to_string(), "bigint(20) unsigned".to_string())
        );

        assert_eq!(
            engine.ensure_table::<Counter>().await.unwrap(),
            Reconciliation::Unchanged
        );
    })
    .await;
}

#[tokio::test]
async fn test_unique_dropped() {
    run_test(|db, engine| async move {
        db.run(
            "CREATE TABLE players (id INT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY, \
             name VARCHAR(32) NOT NULL UNIQUE, level INT NOT NULL, nickname TEXT, \
             banned BOOL NOT NULL)",
        )
        .unwrap();

        assert_eq!(
            engine.ensure_table::<PlainPlayer>().await.unwrap(),
            Reconciliation::Altered
        );
        assert_eq!(
            db.statements().last().unwrap(),
            "ALTER TABLE players MODIFY name VARCHAR(32) NOT NULL, DROP INDEX name"
        );

        // Duplicate names are accepted once the index is gone
        for _ in 0..2 {
            assert!(engine
                .insert_row(&PlainPlayer {
                    name: "bob".into(),
                    ..Default::default()
                })
                .await
                .unwrap());
        }

        assert_eq!(
            engine.ensure_table::<PlainPlayer>().await.unwrap(),
            Reconciliation::Unchanged
        );
    })
    .await;
}

#[tokio::test]
async fn test_primary_key_moved() {
    run_test(|db, engine| async move {
        engine.ensure_table::<Score>().await.unwrap();

        assert_eq!(
            engine.ensure_table::<RankedScore>().await.unwrap(),
            Reconciliation::Altered
        );
        assert_eq!(
            db.statements().last().unwrap(),
            "ALTER TABLE scores MODIFY Id VARCHAR(16) NOT NULL UNIQUE, \
             MODIFY Score INT NOT NULL PRIMARY KEY, DROP PRIMARY KEY"
        );

        assert_eq!(
            engine.ensure_table::<RankedScore>().await.unwrap(),
            Reconciliation::Unchanged
        );
    })
    .await;
}

#[tokio::test]
async fn test_unique_without_primary_key() {
    run_test(|db, engine| async move {
        assert_eq!(
            engine.ensure_table::<Tag>().await.unwrap(),
            Reconciliation::Created
        );

        // Reported as PRI, the table has no other key
        db.clear_statements();
        assert_eq!(
            engine.ensure_table::<Tag>().await.unwrap(),
            Reconciliation::Unchanged
        );
        assert!(db.statements().iter().all(|sql| !sql.starts_with("ALTER")));
    })
    .await;
}

#[tokio::test]
async fn test_exact_table_name() {
    run_test(|db, engine| async move {
        db.run("CREATE TABLE axb (id INT NOT NULL)").unwrap();

        // `_` matches any character in LIKE
        assert!(!engine.table_exists::<Underscore>().await.unwrap());
        assert_eq!(
            engine.ensure_table::<Underscore>().await.unwrap(),
            Reconciliation::Created
        );
        assert!(db.has_table("a_b"));
    })
    .await;
}

#[tokio::test]
async fn test_failure_closes_connection() {
    run_test(|db, engine| async move {
        db.fail_statements_containing("CREATE TABLE");

        let outcome = engine.ensure_table::<Score>().await.unwrap();
        assert_eq!(outcome, Reconciliation::Failed);
        assert!(!outcome.is_ok());
        assert!(!db.has_table("scores"));
        assert_eq!(db.opened(), 1);
        assert_eq!(db.closed(), 1);

        db.clear_failures();
        db.refuse_connections();
        assert_eq!(
            engine.ensure_table::<Score>().await.unwrap(),
            Reconciliation::Failed
        );
        assert_eq!(db.opened(), 1);
    })
    .await;
}

#[tokio::test]
async fn test_unknown_live_type() {
    run_test(|db, engine| async move {
        db.run("CREATE TABLE scores (Id VARCHAR(16) NOT NULL PRIMARY KEY, Score GEOMETRY NOT NULL)")
            .unwrap();

        assert!(matches!(
            engine.ensure_table::<Score>().await,
            Err(tablemap::error::Error::UnsupportedSqlType(_))
        ));
        assert_eq!(db.opened(), db.closed());
    })
    .await;
}

#[tokio::test]
async fn test_one_connection_per_operation() {
    run_test(|db, engine| async move {
        engine.ensure_table::<Score>().await.unwrap();
        engine.ensure_table::<Score>().await.unwrap();
        engine.table_exists::<Score>().await.unwrap();

        assert_eq!(db.opened(), 3);
        assert_eq!(db.closed(), 3);
    })
    .await;
}
