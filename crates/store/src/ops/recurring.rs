//! Rule writes together with their materialized instances.
//!
//! Each public operation is a single unit of work: a reader never observes a
//! rule without its instance set, or an instance set half deleted.
//! Concurrent edits of the same rule are not merged; the last commit wins.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    GenerationMode, RecurringRule, ResultStore, RuleSpec, StoreError, expenses, generate,
    recurring_rules,
};

use super::{Store, with_tx};

/// Which instances of a rule a write touches.
#[derive(Clone, Copy, Debug)]
enum InstanceScope {
    All,
    /// Instances dated strictly after the cutoff.
    After(DateTime<Utc>),
}

impl InstanceScope {
    fn new(all: bool, now: DateTime<Utc>) -> Self {
        if all { Self::All } else { Self::After(now) }
    }
}

impl Store {
    /// Store a new rule and materialize all of its occurrences.
    pub async fn create_recurring_rule(
        &self,
        tenant_id: &str,
        spec: &RuleSpec,
    ) -> ResultStore<RecurringRule> {
        let spec = spec.validated()?;
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let currency = self
                .resolve_currency(&db_tx, tenant_id, spec.currency)
                .await?;
            let rule = RecurringRule::from_spec(Uuid::new_v4(), tenant_id, spec, currency)?;
            recurring_rules::ActiveModel::try_from(&rule)?
                .insert(&db_tx)
                .await?;

            let instances = generate(&rule, GenerationMode::Full, now)?;
            Self::insert_expenses(&db_tx, &instances).await?;

            tracing::debug!(
                tenant_id,
                rule_id = %rule.id,
                instances = instances.len(),
                "created recurring rule"
            );
            Ok(rule)
        })
    }

    /// Replace a rule and regenerate its instances.
    ///
    /// With `update_all` every existing instance is discarded and the whole
    /// series is generated again. Otherwise instances dated up to now are
    /// kept untouched and only the future part of the new series is written.
    pub async fn update_recurring_rule(
        &self,
        tenant_id: &str,
        rule_id: Uuid,
        spec: &RuleSpec,
        update_all: bool,
    ) -> ResultStore<()> {
        let spec = spec.validated()?;
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let currency = self
                .resolve_currency(&db_tx, tenant_id, spec.currency)
                .await?;
            let rule = RecurringRule::from_spec(rule_id, tenant_id, spec, currency)?;
            let active = recurring_rules::ActiveModel {
                id: ActiveValue::NotSet,
                tenant_id: ActiveValue::NotSet,
                ..recurring_rules::ActiveModel::try_from(&rule)?
            };
            let updated = recurring_rules::Entity::update_many()
                .set(active)
                .filter(recurring_rules::Column::TenantId.eq(tenant_id))
                .filter(recurring_rules::Column::Id.eq(rule_id.to_string()))
                .exec(&db_tx)
                .await?
                .rows_affected;
            if updated == 0 {
                return Err(StoreError::not_found(
                    "recurring rule",
                    &rule_id.to_string(),
                ));
            }

            let removed = Self::delete_instances(
                &db_tx,
                tenant_id,
                rule_id,
                InstanceScope::new(update_all, now),
            )
            .await?;

            let mode = if update_all {
                GenerationMode::Full
            } else {
                GenerationMode::FutureOnly
            };
            let instances = generate(&rule, mode, now)?;
            Self::insert_expenses(&db_tx, &instances).await?;

            tracing::debug!(
                tenant_id,
                rule_id = %rule_id,
                update_all,
                removed,
                inserted = instances.len(),
                "updated recurring rule"
            );
            Ok(())
        })
    }

    /// Delete a rule with all of its instances, or only the future ones.
    ///
    /// Instances kept by a partial delete stay orphaned: their
    /// `recurring_id` still names the deleted rule.
    pub async fn delete_recurring_rule(
        &self,
        tenant_id: &str,
        rule_id: Uuid,
        remove_all: bool,
    ) -> ResultStore<()> {
        let now = Utc::now();
        with_tx!(self, |db_tx| {
            let deleted = recurring_rules::Entity::delete_many()
                .filter(recurring_rules::Column::TenantId.eq(tenant_id))
                .filter(recurring_rules::Column::Id.eq(rule_id.to_string()))
                .exec(&db_tx)
                .await?
                .rows_affected;
            if deleted == 0 {
                return Err(StoreError::not_found(
                    "recurring rule",
                    &rule_id.to_string(),
                ));
            }

            let removed = Self::delete_instances(
                &db_tx,
                tenant_id,
                rule_id,
                InstanceScope::new(remove_all, now),
            )
            .await?;
            tracing::debug!(
                tenant_id,
                rule_id = %rule_id,
                remove_all,
                removed,
                "deleted recurring rule"
            );
            Ok(())
        })
    }

    pub async fn recurring_rules(&self, tenant_id: &str) -> ResultStore<Vec<RecurringRule>> {
        with_tx!(self, |db_tx| Self::recurring_rules_in(&db_tx, tenant_id).await)
    }

    pub async fn recurring_rule(
        &self,
        tenant_id: &str,
        rule_id: Uuid,
    ) -> ResultStore<RecurringRule> {
        with_tx!(self, |db_tx| {
            let model = recurring_rules::Entity::find_by_id(rule_id.to_string())
                .filter(recurring_rules::Column::TenantId.eq(tenant_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| StoreError::not_found("recurring rule", &rule_id.to_string()))?;
            RecurringRule::try_from(model)
        })
    }

    pub(super) async fn recurring_rules_in(
        db_tx: &DatabaseTransaction,
        tenant_id: &str,
    ) -> ResultStore<Vec<RecurringRule>> {
        recurring_rules::Entity::find()
            .filter(recurring_rules::Column::TenantId.eq(tenant_id))
            .order_by_asc(recurring_rules::Column::StartDate)
            .order_by_asc(recurring_rules::Column::Id)
            .all(db_tx)
            .await?
            .into_iter()
            .map(RecurringRule::try_from)
            .collect()
    }

    async fn delete_instances(
        db_tx: &DatabaseTransaction,
        tenant_id: &str,
        rule_id: Uuid,
        scope: InstanceScope,
    ) -> ResultStore<u64> {
        let mut query = expenses::Entity::delete_many()
            .filter(expenses::Column::TenantId.eq(tenant_id))
            .filter(expenses::Column::RecurringId.eq(rule_id.to_string()));
        if let InstanceScope::After(cutoff) = scope {
            query = query.filter(expenses::Column::Date.gt(cutoff));
        }
        Ok(query.exec(db_tx).await?.rows_affected)
    }
}
