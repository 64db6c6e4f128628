use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{Expense, ExpenseDraft, ResultStore, StoreError, expenses};

use super::{Store, with_tx};

/// Rows per multi-row `INSERT`; keeps bound parameters under every backend's
/// limit (11 columns per row).
const INSERT_CHUNK: usize = 64;

impl Store {
    /// All expenses of the tenant, newest first.
    pub async fn list_expenses(&self, tenant_id: &str) -> ResultStore<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            let models = expenses::Entity::find()
                .filter(expenses::Column::TenantId.eq(tenant_id))
                .order_by_desc(expenses::Column::Date)
                .order_by_asc(expenses::Column::Id)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Expense::try_from).collect()
        })
    }

    /// Instances generated from one rule, oldest first. Includes orphaned
    /// instances whose rule was already deleted.
    pub async fn rule_instances(
        &self,
        tenant_id: &str,
        rule_id: Uuid,
    ) -> ResultStore<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            let models = expenses::Entity::find()
                .filter(expenses::Column::TenantId.eq(tenant_id))
                .filter(expenses::Column::RecurringId.eq(rule_id.to_string()))
                .order_by_asc(expenses::Column::Date)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Expense::try_from).collect()
        })
    }

    pub async fn get_expense(&self, tenant_id: &str, expense_id: Uuid) -> ResultStore<Expense> {
        with_tx!(self, |db_tx| {
            let model = expenses::Entity::find_by_id(expense_id.to_string())
                .filter(expenses::Column::TenantId.eq(tenant_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| StoreError::not_found("expense", &expense_id.to_string()))?;
            Expense::try_from(model)
        })
    }

    /// Add a standalone expense. A missing currency falls back to the
    /// tenant's.
    pub async fn add_expense(&self, tenant_id: &str, draft: &ExpenseDraft) -> ResultStore<Expense> {
        let draft = draft.validated()?;
        with_tx!(self, |db_tx| {
            let currency = self
                .resolve_currency(&db_tx, tenant_id, draft.currency)
                .await?;
            let expense = Expense::from_draft(Uuid::new_v4(), tenant_id, draft, currency)?;
            expenses::ActiveModel::try_from(&expense)?
                .insert(&db_tx)
                .await?;
            tracing::debug!(tenant_id, expense_id = %expense.id, "added expense");
            Ok(expense)
        })
    }

    /// Add several expenses at once; either all of them are stored or none.
    pub async fn add_expenses(
        &self,
        tenant_id: &str,
        drafts: &[ExpenseDraft],
    ) -> ResultStore<Vec<Expense>> {
        let drafts = drafts
            .iter()
            .map(ExpenseDraft::validated)
            .collect::<ResultStore<Vec<_>>>()?;
        if drafts.is_empty() {
            return Ok(Vec::new());
        }
        with_tx!(self, |db_tx| {
            let fallback = self.tenant_config_in(&db_tx, tenant_id).await?.currency;
            let added = drafts
                .into_iter()
                .map(|draft| {
                    let currency = draft.currency.unwrap_or(fallback);
                    Expense::from_draft(Uuid::new_v4(), tenant_id, draft, currency)
                })
                .collect::<ResultStore<Vec<_>>>()?;
            Self::insert_expenses(&db_tx, &added).await?;
            Ok(added)
        })
    }

    /// Replace every field of an expense except its id and tenant.
    pub async fn update_expense(
        &self,
        tenant_id: &str,
        expense_id: Uuid,
        draft: &ExpenseDraft,
    ) -> ResultStore<()> {
        let draft = draft.validated()?;
        with_tx!(self, |db_tx| {
            let currency = self
                .resolve_currency(&db_tx, tenant_id, draft.currency)
                .await?;
            let expense = Expense::from_draft(expense_id, tenant_id, draft, currency)?;
            let active = expenses::ActiveModel {
                id: ActiveValue::NotSet,
                tenant_id: ActiveValue::NotSet,
                ..expenses::ActiveModel::try_from(&expense)?
            };
            let updated = expenses::Entity::update_many()
                .set(active)
                .filter(expenses::Column::TenantId.eq(tenant_id))
                .filter(expenses::Column::Id.eq(expense_id.to_string()))
                .exec(&db_tx)
                .await?
                .rows_affected;
            if updated == 0 {
                return Err(StoreError::not_found("expense", &expense_id.to_string()));
            }
            Ok(())
        })
    }

    pub async fn remove_expense(&self, tenant_id: &str, expense_id: Uuid) -> ResultStore<()> {
        with_tx!(self, |db_tx| {
            let removed = expenses::Entity::delete_many()
                .filter(expenses::Column::TenantId.eq(tenant_id))
                .filter(expenses::Column::Id.eq(expense_id.to_string()))
                .exec(&db_tx)
                .await?
                .rows_affected;
            if removed == 0 {
                return Err(StoreError::not_found("expense", &expense_id.to_string()));
            }
            Ok(())
        })
    }

    /// Remove the given expenses, skipping ids that do not exist for the
    /// tenant. Returns how many rows were deleted.
    pub async fn remove_expenses(&self, tenant_id: &str, expense_ids: &[Uuid]) -> ResultStore<u64> {
        if expense_ids.is_empty() {
            return Ok(0);
        }
        with_tx!(self, |db_tx| {
            let removed = expenses::Entity::delete_many()
                .filter(expenses::Column::TenantId.eq(tenant_id))
                .filter(expenses::Column::Id.is_in(expense_ids.iter().map(Uuid::to_string)))
                .exec(&db_tx)
                .await?
                .rows_affected;
            Ok(removed)
        })
    }

    pub(super) async fn insert_expenses(
        db_tx: &DatabaseTransaction,
        rows: &[Expense],
    ) -> ResultStore<()> {
        for chunk in rows.chunks(INSERT_CHUNK) {
            let models = chunk
                .iter()
                .map(expenses::ActiveModel::try_from)
                .collect::<ResultStore<Vec<_>>>()?;
            expenses::Entity::insert_many(models)
                .exec_without_returning(db_tx)
                .await?;
        }
        Ok(())
    }
}
