use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    ResultStore, StoreError,
    categories::{self, normalize_category_list},
};

use super::{Store, with_tx};

impl Store {
    /// Category names ordered by position.
    ///
    /// A tenant without categories is seeded with the configured defaults
    /// through the same upsert used by [`Store::reconcile_categories`], so
    /// concurrent first reads converge on one set of rows.
    pub async fn categories(&self, tenant_id: &str) -> ResultStore<Vec<String>> {
        with_tx!(self, |db_tx| self.categories_in(&db_tx, tenant_id).await)
    }

    /// Make the stored categories exactly `names`, in that order.
    ///
    /// Names are sanitized first; an empty list or a name that sanitizes to
    /// nothing is rejected before anything is written. Existing names keep
    /// their row and only move, missing names are inserted, and every stored
    /// name absent from the list is deleted. Applying the same list twice is
    /// a no-op.
    pub async fn reconcile_categories<S: AsRef<str>>(
        &self,
        tenant_id: &str,
        names: &[S],
    ) -> ResultStore<()> {
        let names = normalize_category_list(names)?;
        with_tx!(self, |db_tx| Self::reconcile_in(&db_tx, tenant_id, &names).await)
    }

    pub(super) async fn categories_in(
        &self,
        db_tx: &DatabaseTransaction,
        tenant_id: &str,
    ) -> ResultStore<Vec<String>> {
        let names = Self::category_names(db_tx, tenant_id).await?;
        if !names.is_empty() {
            return Ok(names);
        }

        tracing::debug!(tenant_id, "seeding default categories");
        Self::reconcile_in(db_tx, tenant_id, &self.defaults.categories).await?;
        Self::category_names(db_tx, tenant_id).await
    }

    async fn category_names(
        db_tx: &DatabaseTransaction,
        tenant_id: &str,
    ) -> ResultStore<Vec<String>> {
        categories::Entity::find()
            .select_only()
            .column(categories::Column::Name)
            .filter(categories::Column::TenantId.eq(tenant_id))
            .order_by_asc(categories::Column::Position)
            .into_tuple::<String>()
            .all(db_tx)
            .await
            .map_err(Into::into)
    }

    async fn reconcile_in(
        db_tx: &DatabaseTransaction,
        tenant_id: &str,
        names: &[String],
    ) -> ResultStore<()> {
        for (index, name) in names.iter().enumerate() {
            let position = i32::try_from(index + 1)
                .map_err(|_| StoreError::validation("too many categories"))?;
            let row = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                tenant_id: ActiveValue::Set(tenant_id.to_string()),
                name: ActiveValue::Set(name.clone()),
                position: ActiveValue::Set(position),
            };
            categories::Entity::insert(row)
                .on_conflict(
                    OnConflict::columns([categories::Column::TenantId, categories::Column::Name])
                        .update_column(categories::Column::Position)
                        .to_owned(),
                )
                .exec_without_returning(db_tx)
                .await?;
        }

        let removed = categories::Entity::delete_many()
            .filter(categories::Column::TenantId.eq(tenant_id))
            .filter(categories::Column::Name.is_not_in(names.iter().cloned()))
            .exec(db_tx)
            .await?
            .rows_affected;

        tracing::debug!(
            tenant_id,
            kept = names.len(),
            removed,
            "reconciled categories"
        );
        Ok(())
    }
}
