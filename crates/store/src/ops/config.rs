use sea_orm::{DatabaseTransaction, TransactionTrait, prelude::*, sea_query::OnConflict};

use crate::{
    Currency, ResultStore, StoreError, TenantConfig, TenantSettings,
    tenant_config::{self, validate_start_day},
};

use super::{Store, with_tx};

impl Store {
    /// Return the tenant's configuration, creating it from the defaults on
    /// first access.
    pub async fn tenant_config(&self, tenant_id: &str) -> ResultStore<TenantConfig> {
        with_tx!(self, |db_tx| self.tenant_config_in(&db_tx, tenant_id).await)
    }

    pub async fn currency(&self, tenant_id: &str) -> ResultStore<Currency> {
        Ok(self.tenant_config(tenant_id).await?.currency)
    }

    pub async fn start_day(&self, tenant_id: &str) -> ResultStore<u8> {
        Ok(self.tenant_config(tenant_id).await?.start_day)
    }

    /// Change the tenant's currency. Existing expenses keep theirs.
    pub async fn update_currency(&self, tenant_id: &str, currency: Currency) -> ResultStore<()> {
        with_tx!(self, |db_tx| {
            let current = self.tenant_config_in(&db_tx, tenant_id).await?;
            let config = TenantConfig {
                currency,
                ..current
            };
            Self::upsert_config(&db_tx, tenant_id, config, tenant_config::Column::Currency)
                .await
        })
    }

    /// Change the start-of-month day (1–31).
    pub async fn update_start_day(&self, tenant_id: &str, start_day: u8) -> ResultStore<()> {
        let start_day = validate_start_day(start_day)?;
        with_tx!(self, |db_tx| {
            let current = self.tenant_config_in(&db_tx, tenant_id).await?;
            let config = TenantConfig {
                start_day,
                ..current
            };
            Self::upsert_config(&db_tx, tenant_id, config, tenant_config::Column::StartDay)
                .await
        })
    }

    /// Currency, start day, categories and recurring rules in one snapshot.
    pub async fn tenant_settings(&self, tenant_id: &str) -> ResultStore<TenantSettings> {
        with_tx!(self, |db_tx| {
            let config = self.tenant_config_in(&db_tx, tenant_id).await?;
            let categories = self.categories_in(&db_tx, tenant_id).await?;
            let recurring_rules = Self::recurring_rules_in(&db_tx, tenant_id).await?;
            Ok(TenantSettings {
                currency: config.currency,
                start_day: config.start_day,
                categories,
                recurring_rules,
            })
        })
    }

    pub(super) async fn tenant_config_in(
        &self,
        db_tx: &DatabaseTransaction,
        tenant_id: &str,
    ) -> ResultStore<TenantConfig> {
        if let Some(model) = tenant_config::Entity::find_by_id(tenant_id.to_string())
            .one(db_tx)
            .await?
        {
            return TenantConfig::try_from(model);
        }

        let defaults = TenantConfig {
            currency: self.defaults.currency,
            start_day: self.defaults.start_day,
        };
        tracing::debug!(tenant_id, "creating default tenant config");
        // A concurrent first access may have created the row meanwhile.
        tenant_config::Entity::insert(tenant_config::ActiveModel::for_tenant(tenant_id, defaults))
            .on_conflict(
                OnConflict::column(tenant_config::Column::TenantId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db_tx)
            .await?;

        let model = tenant_config::Entity::find_by_id(tenant_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| StoreError::not_found("tenant config", tenant_id))?;
        TenantConfig::try_from(model)
    }

    /// Explicit currency if given, else the tenant's configured one.
    pub(super) async fn resolve_currency(
        &self,
        db_tx: &DatabaseTransaction,
        tenant_id: &str,
        requested: Option<Currency>,
    ) -> ResultStore<Currency> {
        match requested {
            Some(currency) => Ok(currency),
            None => Ok(self.tenant_config_in(db_tx, tenant_id).await?.currency),
        }
    }

    async fn upsert_config(
        db_tx: &DatabaseTransaction,
        tenant_id: &str,
        config: TenantConfig,
        changed: tenant_config::Column,
    ) -> ResultStore<()> {
        tenant_config::Entity::insert(tenant_config::ActiveModel::for_tenant(tenant_id, config))
            .on_conflict(
                OnConflict::column(tenant_config::Column::TenantId)
                    .update_column(changed)
                    .to_owned(),
            )
            .exec_without_returning(db_tx)
            .await?;
        Ok(())
    }
}
