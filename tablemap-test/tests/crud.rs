use tablemap::{error::Error, Options, Reconciliation, Table, Value};
use tablemap_test::{run_test, setup};

#[derive(Debug, Clone, Default, PartialEq, Table)]
#[tablemap(name = "scores")]
struct Score {
    #[tablemap(column = "Id", primary_key, length = 16)]
    id: String,
    #[tablemap(column = "Score")]
    score: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Rank {
    Bronze,
    Silver,
    Gold,
}

impl Default for Rank {
    fn default() -> Self {
        Self::Bronze
    }
}

tablemap::impl_sql_enum!(Rank {
    Bronze = 0,
    Silver = 1,
    Gold = 2,
});

#[derive(Debug, Clone, Default, PartialEq, Table)]
#[tablemap(name = "players")]
struct Player {
    #[tablemap(primary_key, auto_increment)]
    id: u32,
    #[tablemap(length = 32, unique)]
    name: String,
    motto: Option<String>,
    banned: bool,
    #[tablemap(enumeration)]
    tier: Rank,
    #[tablemap(enumeration)]
    best_tier: Option<Rank>,
    joined: Option<chrono::NaiveDateTime>,
    #[tablemap(ignore)]
    online: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Table)]
#[tablemap(name = "samples")]
struct Sample {
    #[tablemap(primary_key)]
    id: i64,
    delta: i8,
    level: u8,
    views: u64,
    ratio: f32,
    precise: f64,
    amount: rust_decimal::Decimal,
    token: uuid::Uuid,
    payload: Vec<u8>,
    tag: char,
    label: String,
}

fn sample() -> Sample {
    Sample {
        id: 1,
        delta: -7,
        level: 200,
        views: u64::MAX,
        ratio: 1.5,
        precise: 0.1,
        amount: rust_decimal::Decimal::new(4200, 0),
        token: uuid::Uuid::from_u128(0x67e5_5044_10b1_426f_9247_bb68_0e5f_e0c8),
        payload: vec![0x00, 0x27, 0x5c, 0xff],
        tag: '\'',
        label: r"it's C:\".into(),
    }
}

fn player(name: &str) -> Player {
    Player {
        name: name.into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_then_populate() {
    run_test(|_db, engine| async move {
        assert_eq!(
            engine.ensure_table::<Score>().await.unwrap(),
            Reconciliation::Created
        );

        let a = Score {
            id: "a".into(),
            score: 5,
        };
        assert!(engine.insert_row(&a).await.unwrap());

        let found = engine.get_row::<Score>("Id='a'", vec![]).await.unwrap();
        assert_eq!(found, Some(a));

        let missing = engine.get_row::<Score>("Id='b'", vec![]).await.unwrap();
        assert_eq!(missing, None);
    })
    .await;
}

#[tokio::test]
async fn test_quote_round_trip() {
    run_test(|db, engine| async move {
        engine.ensure_table::<Player>().await.unwrap();

        let mut o_brien = player("O'Brien");
        o_brien.motto = Some("it's 'fine'".into());
        assert!(engine.insert_row(&o_brien).await.unwrap());

        // Stored with the placeholder
        assert_eq!(
            db.rows("players")[0].value("name"),
            Some(&Value::Str("O&#39;Brien".into()))
        );

        // String parameters are escaped the same way
        let found = engine
            .get_row::<Player>("WHERE name = ?", vec![Value::from("O'Brien")])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, "O'Brien");
        assert_eq!(found.motto.as_deref(), Some("it's 'fine'"));
        assert_eq!(found.id, 1);
    })
    .await;
}

#[tokio::test]
async fn test_batch_insert() {
    run_test(|db, engine| async move {
        engine.ensure_table::<Player>().await.unwrap();
        db.clear_statements();

        let players = vec![player("a"), player("b"), player("c")];
        assert!(engine.insert_rows(&players).await.unwrap());

        let executed = db.executed();
        assert_eq!(executed.len(), 1);
        assert_eq!(
            executed[0].sql,
            "INSERT INTO players (name, motto, banned, tier, best_tier, joined) VALUES \
             (?, ?, ?, ?, ?, ?), (?, ?, ?, ?, ?, ?), (?, ?, ?, ?, ?, ?)"
        );
        assert_eq!(executed[0].params.len(), 18);
        assert_eq!(executed[0].params[1], Value::Null);

        let names = engine
            .get_rows::<Player>("", vec![], None)
            .await
            .unwrap()
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![(1, "a".to_string()), (2, "b".to_string()), (3, "c".to_string())]
        );

        let limited = engine
            .get_rows::<Player>("", vec![], Some(2))
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);

        // Nothing to insert, nothing executed
        db.clear_statements();
        assert!(engine.insert_rows::<Player>(&[]).await.unwrap());
        assert!(db.statements().is_empty());
    })
    .await;
}

#[tokio::test]
async fn test_inline_literals() {
    let (db, engine) = setup();
    let engine = engine.with_options(Options::default().inline_literals(true));

    engine.ensure_table::<Player>().await.unwrap();
    db.clear_statements();

    let mut gold = player("gold");
    gold.banned = true;
    gold.tier = Rank::Gold;
    assert!(engine.insert_row(&gold).await.unwrap());

    assert_eq!(
        db.statements(),
        vec!["INSERT INTO players (name, motto, banned, tier, best_tier, joined) VALUES \
              ('gold', NULL, '1', '2', NULL, NULL)"]
    );
    assert!(db.executed()[0].params.is_empty());

    let found = engine
        .get_row::<Player>("banned = true", vec![])
        .await
        .unwrap()
        .unwrap();
    assert!(found.banned);
    assert_eq!(found.tier, Rank::Gold);
    assert_eq!(found.best_tier, None);
}

#[tokio::test]
async fn test_bound_encoding() {
    run_test(|db, engine| async move {
        engine.ensure_table::<Player>().await.unwrap();
        db.clear_statements();

        let joined = chrono::NaiveDate::from_ymd_opt(2022, 1, 2)
            .unwrap()
            .and_hms_milli_opt(3, 4, 5, 600)
            .unwrap();
        let mut silver = player("silver");
        silver.banned = true;
        silver.best_tier = Some(Rank::Silver);
        silver.joined = Some(joined);
        silver.online = true;
        engine.insert_row(&silver).await.unwrap();

        assert_eq!(
            db.executed()[0].params,
            vec![
                Value::Str("silver".into()),
                Value::Null,
                Value::I64(1),
                Value::I64(0),
                Value::I64(1),
                Value::Str("2022-01-02 03:04:05.600".into()),
            ]
        );

        let found = engine
            .get_row::<Player>("name = ?", vec![Value::from("silver")])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            found,
            Player {
                id: 1,
                online: false,
                ..silver
            }
        );
    })
    .await;
}

#[tokio::test]
async fn test_update() {
    run_test(|db, engine| async move {
        engine.ensure_table::<Player>().await.unwrap();
        engine
            .insert_rows(&[player("a"), player("b")])
            .await
            .unwrap();
        db.clear_statements();

        let mut a = engine
            .get_row::<Player>("name = 'a'", vec![])
            .await
            .unwrap()
            .unwrap();
        a.motto = Some("first".into());
        a.tier = Rank::Silver;
        assert!(engine
            .update_row(&a, "WHERE id = ?", vec![Value::from(a.id)])
            .await
            .unwrap());
        assert_eq!(
            db.statements().last().unwrap(),
            "UPDATE players SET name = ?, motto = ?, banned = ?, tier = ?, best_tier = ?, joined = ? \
             WHERE id = ?"
        );

        assert!(engine
            .update_columns::<Player>(vec![("banned", Value::from(true))], "name = ?", vec![Value::from("b")])
            .await
            .unwrap());
        assert_eq!(
            db.statements().last().unwrap(),
            "UPDATE players SET banned = ? WHERE name = ?"
        );

        let players = engine.get_rows::<Player>("", vec![], None).await.unwrap();
        assert_eq!(players[0], a);
        assert!(!players[0].banned);
        assert!(players[1].banned);

        let unknown = engine
            .update_columns::<Player>(vec![("level", Value::from(3))], "id = 1", vec![])
            .await;
        assert!(matches!(unknown, Err(Error::Argument(_))));
    })
    .await;
}

#[tokio::test]
async fn test_delete() {
    run_test(|_db, engine| async move {
        engine.ensure_table::<Player>().await.unwrap();
        engine
            .insert_rows(&[player("a"), player("b"), player("c")])
            .await
            .unwrap();

        assert!(engine
            .delete_rows::<Player>("name <> ?", vec![Value::from("b")])
            .await
            .unwrap());

        let left = engine.get_rows::<Player>("", vec![], None).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].name, "b");
    })
    .await;
}

#[tokio::test]
async fn test_missing_predicate() {
    run_test(|db, engine| async move {
        let updated = engine.update_row(&player("a"), "", vec![]).await;
        assert!(matches!(updated, Err(Error::MissingPredicate(_))));

        let updated = engine
            .update_columns::<Player>(vec![("banned", Value::from(true))], "  where ", vec![])
            .await;
        assert!(matches!(updated, Err(Error::MissingPredicate(_))));

        let deleted = engine.delete_rows::<Player>("   ", vec![]).await;
        assert!(matches!(deleted, Err(Error::MissingPredicate(_))));

        assert!(db.statements().is_empty());
        assert_eq!(db.opened(), 0);
    })
    .await;
}

#[tokio::test]
async fn test_failure_absorbed() {
    run_test(|db, engine| async move {
        engine.ensure_table::<Player>().await.unwrap();
        engine.insert_row(&player("a")).await.unwrap();

        // Duplicate unique name
        assert!(!engine.insert_row(&player("a")).await.unwrap());

        db.fail_statements_containing("SELECT");
        assert_eq!(
            engine.get_row::<Player>("name = 'a'", vec![]).await.unwrap(),
            None
        );
        assert!(engine
            .get_rows::<Player>("", vec![], None)
            .await
            .unwrap()
            .is_empty());

        db.clear_failures();
        db.refuse_connections();
        assert!(!engine
            .delete_rows::<Player>("name = 'a'", vec![])
            .await
            .unwrap());

        assert_eq!(db.opened(), db.closed());
    })
    .await;
}

#[tokio::test]
async fn test_decode_failure_yields_default() {
    run_test(|db, engine| async move {
        engine.ensure_table::<Player>().await.unwrap();
        db.run(
            "INSERT INTO players (name, banned, tier) VALUES ('ok', 0, 1), ('broken', 0, 9)",
        )
        .unwrap();

        let players = engine.get_rows::<Player>("", vec![], None).await.unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].tier, Rank::Silver);
        assert_eq!(players[1], Player::default());
    })
    .await;
}

#[tokio::test]
async fn test_other_table() {
    run_test(|db, engine| async move {
        db.run("CREATE TABLE scores_archive (Id VARCHAR(16) NOT NULL PRIMARY KEY, Score INT NOT NULL)")
            .unwrap();
        db.run("INSERT INTO scores_archive (Id, Score) VALUES ('old', 1), ('older', 2)")
            .unwrap();

        let rows = engine
            .get_rows_from::<Score>("scores_archive", "Score >= ?", vec![Value::from(2)], None)
            .await
            .unwrap();
        assert_eq!(
            rows,
            vec![Score {
                id: "older".into(),
                score: 2,
            }]
        );

        let row = engine
            .get_row_from::<Score>("scores_archive", "", vec![])
            .await
            .unwrap();
        assert_eq!(row.map(|s| s.id), Some("old".to_string()));
    })
    .await;
}

#[tokio::test]
async fn test_every_type_round_trip() {
    run_test(|db, engine| async move {
        engine.ensure_table::<Sample>().await.unwrap();
        assert!(engine.insert_row(&sample()).await.unwrap());

        // A quote fits a single CHAR unchanged
        assert_eq!(
            db.rows("samples")[0].value("tag"),
            Some(&Value::Str("'".into()))
        );

        let found = engine.get_row::<Sample>("id = ?", vec![Value::from(1)]).await.unwrap();
        assert_eq!(found, Some(sample()));

        let changed = Sample {
            delta: i8::MIN,
            level: u8::MAX,
            tag: 'x',
            label: "plain".into(),
            ..sample()
        };
        assert!(engine
            .update_row(&changed, "id = ?", vec![Value::from(1)])
            .await
            .unwrap());
        assert_eq!(
            engine.get_rows::<Sample>("", vec![], None).await.unwrap(),
            vec![changed]
        );

        assert_eq!(
            engine.ensure_table::<Sample>().await.unwrap(),
            Reconciliation::Unchanged
        );
    })
    .await;
}

#[tokio::test]
async fn test_every_type_inline() {
    let (db, engine) = setup();
    let engine = engine.with_options(Options::default().inline_literals(true));

    engine.ensure_table::<Sample>().await.unwrap();
    db.clear_statements();
    assert!(engine.insert_row(&sample()).await.unwrap());

    // The trailing backslash cannot close the literal early
    let sql = db.statements()[0].clone();
    assert!(sql.ends_with(r"X'00275CFF', '''', 'it&#39;s C:\\')"), "{}", sql);
    assert!(db.executed()[0].params.is_empty());

    let found = engine.get_row::<Sample>("id = 1", vec![]).await.unwrap();
    assert_eq!(found, Some(sample()));
}
