use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use crate::{Currency, ResultStore, StoreError, categories::DEFAULT_CATEGORIES, tenant_config};

mod categories;
mod config;
mod expenses;
mod recurring;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// The body runs as an async block, so `?` and `return` inside it leave the
/// block and still go through the rollback arm. A future dropped mid-body
/// drops the un-committed `DatabaseTransaction`, which rolls it back too.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result: $crate::ResultStore<_> = async { $body }.await;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                tracing::debug!("rolling back unit of work: {err}");
                if let Err(rollback_err) = $tx.rollback().await {
                    tracing::error!("rollback failed: {rollback_err}");
                }
                Err(err)
            }
        }
    }};
}

pub(crate) use with_tx;

/// Values a tenant starts from before configuring anything.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreDefaults {
    pub currency: Currency,
    pub start_day: u8,
    pub categories: Vec<String>,
}

impl Default for StoreDefaults {
    fn default() -> Self {
        Self {
            currency: Currency::Usd,
            start_day: 1,
            categories: DEFAULT_CATEGORIES.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Tenant-scoped store.
///
/// Every operation takes the tenant id as its first argument and every query
/// it issues is filtered on `tenant_id`. Lookups and mutations on an id that
/// belongs to another tenant fail exactly like a missing id.
#[derive(Debug)]
pub struct Store {
    database: DatabaseConnection,
    defaults: StoreDefaults,
}

impl Store {
    /// Return a builder for `Store`. Help to build the struct.
    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }

    pub fn defaults(&self) -> &StoreDefaults {
        &self.defaults
    }
}

/// The builder for `Store`
#[derive(Default)]
pub struct StoreBuilder {
    database: DatabaseConnection,
    defaults: StoreDefaults,
}

impl StoreBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> StoreBuilder {
        self.database = db;
        self
    }

    /// Override the per-tenant defaults.
    pub fn defaults(mut self, defaults: StoreDefaults) -> StoreBuilder {
        self.defaults = defaults;
        self
    }

    /// Construct `Store`, checking the defaults once so that lazily seeded
    /// tenants can never receive an invalid configuration.
    pub fn build(self) -> ResultStore<Store> {
        tenant_config::validate_start_day(self.defaults.start_day)?;
        let categories = crate::categories::normalize_category_list(&self.defaults.categories)
            .map_err(|err| StoreError::validation(format!("default categories: {err}")))?;
        Ok(Store {
            database: self.database,
            defaults: StoreDefaults {
                categories,
                ..self.defaults
            },
        })
    }
}
