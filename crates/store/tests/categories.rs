use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use migration::MigratorTrait;
use store::{DEFAULT_CATEGORIES, Store, StoreDefaults, StoreError};

async fn store_with_db() -> (Store, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let store = Store::builder().database(db.clone()).build().unwrap();
    (store, db)
}

async fn stored_positions(db: &DatabaseConnection, tenant_id: &str) -> Vec<(String, i64)> {
    let rows = db
        .query_all(Statement::from_sql_and_values(
            db.get_database_backend(),
            "SELECT name, position FROM categories WHERE tenant_id = ? ORDER BY position",
            [tenant_id.into()],
        ))
        .await
        .unwrap();
    rows.iter()
        .map(|row| {
            (
                row.try_get::<String>("", "name").unwrap(),
                row.try_get::<i64>("", "position").unwrap(),
            )
        })
        .collect()
}

fn positions(expected: &[(&str, i64)]) -> Vec<(String, i64)> {
    expected
        .iter()
        .map(|(name, position)| (name.to_string(), *position))
        .collect()
}

#[tokio::test]
async fn positions_stay_dense_and_one_based() {
    let (store, db) = store_with_db().await;

    store
        .reconcile_categories("alice", &["Food", "Travel"])
        .await
        .unwrap();
    assert_eq!(
        stored_positions(&db, "alice").await,
        positions(&[("Food", 1), ("Travel", 2)])
    );

    store
        .reconcile_categories("alice", &["Travel", "Food", "Rent"])
        .await
        .unwrap();
    assert_eq!(
        stored_positions(&db, "alice").await,
        positions(&[("Travel", 1), ("Food", 2), ("Rent", 3)])
    );

    store.reconcile_categories("alice", &["Rent"]).await.unwrap();
    assert_eq!(
        stored_positions(&db, "alice").await,
        positions(&[("Rent", 1)])
    );
}

#[tokio::test]
async fn seeded_defaults_are_positioned_in_order() {
    let (store, db) = store_with_db().await;
    store.categories("alice").await.unwrap();

    let expected: Vec<(String, i64)> = DEFAULT_CATEGORIES
        .iter()
        .zip(1..)
        .map(|(name, position)| (name.to_string(), position))
        .collect();
    assert_eq!(stored_positions(&db, "alice").await, expected);
}

#[tokio::test]
async fn first_read_seeds_defaults() {
    let (store, _) = store_with_db().await;

    let names = store.categories("alice").await.unwrap();

    assert_eq!(names, DEFAULT_CATEGORIES.to_vec());
    // Second read returns the same stored rows.
    assert_eq!(store.categories("alice").await.unwrap(), names);
}

#[tokio::test]
async fn seeds_configured_defaults() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let store = Store::builder()
        .database(db)
        .defaults(StoreDefaults {
            categories: vec!["Rent".to_string(), "Fun".to_string()],
            ..StoreDefaults::default()
        })
        .build()
        .unwrap();

    assert_eq!(store.categories("alice").await.unwrap(), vec!["Rent", "Fun"]);
}

#[tokio::test]
async fn reconcile_reorders_adds_and_removes() {
    let (store, _) = store_with_db().await;
    store
        .reconcile_categories("alice", &["Food", "Travel"])
        .await
        .unwrap();
    assert_eq!(store.categories("alice").await.unwrap(), vec!["Food", "Travel"]);

    store
        .reconcile_categories("alice", &["Travel", "Food", "Rent"])
        .await
        .unwrap();
    assert_eq!(
        store.categories("alice").await.unwrap(),
        vec!["Travel", "Food", "Rent"]
    );

    store.reconcile_categories("alice", &["Rent"]).await.unwrap();
    assert_eq!(store.categories("alice").await.unwrap(), vec!["Rent"]);
}

#[tokio::test]
async fn reconcile_is_idempotent() {
    let (store, _) = store_with_db().await;
    let names = ["Utilities", "Food", "Shopping"];

    store.reconcile_categories("alice", &names).await.unwrap();
    let once = store.categories("alice").await.unwrap();
    store.reconcile_categories("alice", &names).await.unwrap();
    let twice = store.categories("alice").await.unwrap();

    assert_eq!(once, names.to_vec());
    assert_eq!(once, twice);
}

#[tokio::test]
async fn reconcile_sanitizes_and_collapses_duplicates() {
    let (store, _) = store_with_db().await;

    store
        .reconcile_categories("alice", &["  Food ", "Travel", "Food", "Eating<out>"])
        .await
        .unwrap();

    assert_eq!(
        store.categories("alice").await.unwrap(),
        vec!["Food", "Travel", "Eating out"]
    );
}

#[tokio::test]
async fn invalid_lists_leave_categories_untouched() {
    let (store, _) = store_with_db().await;
    store
        .reconcile_categories("alice", &["Food", "Travel"])
        .await
        .unwrap();

    let empty: [&str; 0] = [];
    let err = store.reconcile_categories("alice", &empty).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    let err = store
        .reconcile_categories("alice", &["Rent", "  <> "])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    assert_eq!(store.categories("alice").await.unwrap(), vec!["Food", "Travel"]);
}

#[tokio::test]
async fn categories_are_isolated_between_tenants() {
    let (store, _) = store_with_db().await;
    store
        .reconcile_categories("alice", &["Food", "Travel"])
        .await
        .unwrap();
    store
        .reconcile_categories("bob", &["Travel", "Books"])
        .await
        .unwrap();

    assert_eq!(store.categories("alice").await.unwrap(), vec!["Food", "Travel"]);
    assert_eq!(store.categories("bob").await.unwrap(), vec!["Travel", "Books"]);
    assert_eq!(
        store.categories("carol").await.unwrap(),
        DEFAULT_CATEGORIES.to_vec()
    );
}
