//! Expenses: standalone entries and instances materialized from a rule.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, Flow, MoneyCents, RecurringRule, ResultStore, StoreError,
    util::{decode_tags, encode_tags, optional_text, parse_uuid, required_text, sanitize_tags},
};

/// A stored expense (or income, when `amount` is positive).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub tenant_id: String,
    /// Rule this instance was generated from. Not a foreign key: past
    /// instances survive the deletion of their rule.
    pub recurring_id: Option<Uuid>,
    pub name: String,
    pub category: String,
    pub amount: MoneyCents,
    pub currency: Currency,
    pub date: DateTime<Utc>,
    pub tags: Vec<String>,
    pub source: Option<String>,
    pub card: Option<String>,
}

impl Expense {
    /// Instance of `rule` dated `date`.
    pub(crate) fn materialized(rule: &RecurringRule, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: rule.tenant_id.clone(),
            recurring_id: Some(rule.id),
            name: rule.name.clone(),
            category: rule.category.clone(),
            amount: rule.amount,
            currency: rule.currency,
            date,
            tags: rule.tags.clone(),
            source: None,
            card: None,
        }
    }

    pub(crate) fn from_draft(
        id: Uuid,
        tenant_id: &str,
        draft: ExpenseDraft,
        currency: Currency,
    ) -> ResultStore<Self> {
        let date = draft
            .date
            .ok_or_else(|| StoreError::validation("expense 'date' cannot be empty"))?;
        Ok(Self {
            id,
            tenant_id: tenant_id.to_string(),
            recurring_id: draft.recurring_id,
            name: draft.name,
            category: draft.category,
            amount: draft.amount,
            currency,
            date,
            tags: draft.tags,
            source: draft.source,
            card: draft.card,
        })
    }
}

/// Caller input for adding or replacing an expense.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub name: String,
    pub category: String,
    pub amount: MoneyCents,
    #[serde(default)]
    pub flow: Option<Flow>,
    /// Falls back to the tenant's configured currency.
    #[serde(default)]
    pub currency: Option<Currency>,
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub card: Option<String>,
    #[serde(default)]
    pub recurring_id: Option<Uuid>,
}

impl ExpenseDraft {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        amount: MoneyCents,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            amount,
            date: Some(date),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    #[must_use]
    pub fn flow(mut self, flow: Flow) -> Self {
        self.flow = Some(flow);
        self
    }

    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn card(mut self, card: impl Into<String>) -> Self {
        self.card = Some(card.into());
        self
    }

    pub(crate) fn validated(&self) -> ResultStore<ExpenseDraft> {
        let name = required_text(&self.name, "expense 'name'")?;
        let category = required_text(&self.category, "expense 'category'")?;
        if self.amount.is_zero() {
            return Err(StoreError::validation("expense 'amount' cannot be 0"));
        }
        if self.date.is_none() {
            return Err(StoreError::validation("expense 'date' cannot be empty"));
        }
        Ok(ExpenseDraft {
            name,
            category,
            amount: Flow::signed(self.flow, self.amount),
            flow: None,
            currency: self.currency,
            date: self.date,
            tags: sanitize_tags(&self.tags),
            source: optional_text(self.source.as_deref()),
            card: optional_text(self.card.as_deref()),
            recurring_id: self.recurring_id,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub tenant_id: String,
    pub recurring_id: Option<String>,
    pub name: String,
    pub category: String,
    pub amount_minor: i64,
    pub currency: String,
    pub date: DateTimeUtc,
    pub tags: Option<String>,
    pub source: Option<String>,
    pub card: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Expense> for ActiveModel {
    type Error = StoreError;

    fn try_from(expense: &Expense) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(expense.id.to_string()),
            tenant_id: ActiveValue::Set(expense.tenant_id.clone()),
            recurring_id: ActiveValue::Set(expense.recurring_id.map(|id| id.to_string())),
            name: ActiveValue::Set(expense.name.clone()),
            category: ActiveValue::Set(expense.category.clone()),
            amount_minor: ActiveValue::Set(expense.amount.cents()),
            currency: ActiveValue::Set(expense.currency.code().to_string()),
            date: ActiveValue::Set(expense.date),
            tags: ActiveValue::Set(encode_tags(&expense.tags)?),
            source: ActiveValue::Set(expense.source.clone()),
            card: ActiveValue::Set(expense.card.clone()),
        })
    }
}

impl TryFrom<Model> for Expense {
    type Error = StoreError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let tags = decode_tags(model.tags.as_deref(), &model.id)?;
        let recurring_id = model
            .recurring_id
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .map(|raw| parse_uuid(raw, "recurring rule"))
            .transpose()?;
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            tenant_id: model.tenant_id,
            recurring_id,
            name: model.name,
            category: model.category,
            amount: MoneyCents::new(model.amount_minor),
            currency: Currency::try_from(model.currency.as_str())?,
            date: model.date,
            tags,
            source: model.source.filter(|s| !s.is_empty()),
            card: model.card.filter(|s| !s.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn draft() -> ExpenseDraft {
        ExpenseDraft::new(
            "Lunch",
            "Food",
            MoneyCents::new(1250),
            Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn validated_applies_flow_and_cleans_optional_fields() {
        let clean = draft()
            .flow(Flow::Expense)
            .source("  ")
            .card("Visa *1234")
            .validated()
            .unwrap();
        assert_eq!(clean.amount.cents(), -1250);
        assert_eq!(clean.source, None);
        assert_eq!(clean.card.as_deref(), Some("Visa 1234"));
    }

    #[test]
    fn validated_rejects_zero_amount() {
        let mut draft = draft();
        draft.amount = MoneyCents::ZERO;
        assert!(matches!(draft.validated(), Err(StoreError::Validation(_))));
    }

    #[test]
    fn validated_rejects_missing_date() {
        let mut draft = draft();
        draft.date = None;
        assert!(matches!(draft.validated(), Err(StoreError::Validation(_))));
    }

    #[test]
    fn refund_is_stored_positive() {
        let clean = draft().flow(Flow::Refund).validated().unwrap();
        let expense =
            Expense::from_draft(Uuid::new_v4(), "alice", clean, Currency::Eur).unwrap();
        assert_eq!(expense.amount.cents(), 1250);
        assert_eq!(expense.currency, Currency::Eur);
    }
}
