use chrono::{TimeZone, Utc};
use sea_orm::Database;

use migration::MigratorTrait;
use store::{
    Currency, DEFAULT_CATEGORIES, Interval, MoneyCents, RuleSpec, Store, StoreDefaults, StoreError,
    TenantConfig,
};

async fn store_with_db() -> Store {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Store::builder().database(db).build().unwrap()
}

#[tokio::test]
async fn config_starts_from_defaults() {
    let store = store_with_db().await;

    let config = store.tenant_config("alice").await.unwrap();

    assert_eq!(
        config,
        TenantConfig {
            currency: Currency::Usd,
            start_day: 1
        }
    );
    assert_eq!(store.currency("alice").await.unwrap(), Currency::Usd);
    assert_eq!(store.start_day("alice").await.unwrap(), 1);
}

#[tokio::test]
async fn updates_change_only_their_field() {
    let store = store_with_db().await;

    store.update_start_day("alice", 15).await.unwrap();
    store.update_currency("alice", Currency::Ars).await.unwrap();

    assert_eq!(
        store.tenant_config("alice").await.unwrap(),
        TenantConfig {
            currency: Currency::Ars,
            start_day: 15
        }
    );
    assert_eq!(
        store.tenant_config("bob").await.unwrap(),
        TenantConfig {
            currency: Currency::Usd,
            start_day: 1
        }
    );
}

#[tokio::test]
async fn start_day_out_of_range_is_rejected() {
    let store = store_with_db().await;
    store.update_start_day("alice", 31).await.unwrap();

    for day in [0, 32] {
        let err = store.update_start_day("alice", day).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }
    assert_eq!(store.start_day("alice").await.unwrap(), 31);
}

#[tokio::test]
async fn settings_snapshot() {
    let store = store_with_db().await;
    store.update_currency("alice", Currency::Eur).await.unwrap();
    let rule = store
        .create_recurring_rule(
            "alice",
            &RuleSpec::new(
                "Rent",
                MoneyCents::new(-80000),
                "Rent",
                Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
                Interval::Monthly,
                12,
            ),
        )
        .await
        .unwrap();

    let settings = store.tenant_settings("alice").await.unwrap();

    assert_eq!(settings.currency, Currency::Eur);
    assert_eq!(settings.start_day, 1);
    assert_eq!(settings.categories, DEFAULT_CATEGORIES.to_vec());
    assert_eq!(settings.recurring_rules, vec![rule]);
}

#[tokio::test]
async fn builder_rejects_invalid_defaults() {
    let db = Database::connect("sqlite::memory:").await.unwrap();

    let err = Store::builder()
        .database(db.clone())
        .defaults(StoreDefaults {
            start_day: 0,
            ..StoreDefaults::default()
        })
        .build()
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let err = Store::builder()
        .database(db)
        .defaults(StoreDefaults {
            categories: vec![],
            ..StoreDefaults::default()
        })
        .build()
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn configured_defaults_apply_to_new_tenants() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let store = Store::builder()
        .database(db)
        .defaults(StoreDefaults {
            currency: Currency::Ars,
            start_day: 5,
            ..StoreDefaults::default()
        })
        .build()
        .unwrap();

    assert_eq!(
        store.tenant_config("alice").await.unwrap(),
        TenantConfig {
            currency: Currency::Ars,
            start_day: 5
        }
    );
}
