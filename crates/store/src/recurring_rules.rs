//! Recurring rules: templates that materialize into dated expenses.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, Flow, Interval, MoneyCents, ResultStore, StoreError,
    util::{decode_tags, encode_tags, parse_uuid, required_text, sanitize_tags},
};

/// Minimum number of occurrences for a rule to recur at all.
pub const MIN_OCCURRENCES: u32 = 2;

/// A stored recurring rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringRule {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
    pub amount: MoneyCents,
    pub currency: Currency,
    pub category: String,
    pub tags: Vec<String>,
    /// Date of the first occurrence.
    pub start_date: DateTime<Utc>,
    pub interval: Interval,
    pub occurrences: u32,
}

/// Caller input for creating or replacing a rule.
///
/// `currency: None` falls back to the tenant's configured currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub name: String,
    pub amount: MoneyCents,
    #[serde(default)]
    pub flow: Option<Flow>,
    #[serde(default)]
    pub currency: Option<Currency>,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub interval: Interval,
    pub occurrences: u32,
}

impl RuleSpec {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        amount: MoneyCents,
        category: impl Into<String>,
        start_date: DateTime<Utc>,
        interval: Interval,
        occurrences: u32,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            flow: None,
            currency: None,
            category: category.into(),
            tags: Vec::new(),
            start_date: Some(start_date),
            interval,
            occurrences,
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

    /// Sanitize and check the spec; nothing is persisted before this passes.
    ///
    /// The returned spec has clean text fields, the flow folded into the
    /// amount sign and a start date.
    pub(crate) fn validated(&self) -> ResultStore<RuleSpec> {
        let name = required_text(&self.name, "recurring expense 'name'")?;
        let category = required_text(&self.category, "recurring expense 'category'")?;
        if self.occurrences < MIN_OCCURRENCES {
            return Err(StoreError::validation(format!(
                "at least {MIN_OCCURRENCES} occurrences required to recur"
            )));
        }
        if i32::try_from(self.occurrences).is_err() {
            return Err(StoreError::validation(format!(
                "too many occurrences: {}",
                self.occurrences
            )));
        }
        let Some(start_date) = self.start_date else {
            return Err(StoreError::validation(
                "start date for recurring expense must be specified",
            ));
        };
        if !self.interval.fits(start_date, self.occurrences) {
            return Err(StoreError::validation(format!(
                "{} {} occurrences from {start_date} run past the supported calendar range",
                self.occurrences, self.interval
            )));
        }
        Ok(RuleSpec {
            name,
            amount: Flow::signed(self.flow, self.amount),
            flow: None,
            currency: self.currency,
            category,
            tags: sanitize_tags(&self.tags),
            start_date: self.start_date,
            interval: self.interval,
            occurrences: self.occurrences,
        })
    }
}

impl RecurringRule {
    pub(crate) fn from_spec(
        id: Uuid,
        tenant_id: &str,
        spec: RuleSpec,
        currency: Currency,
    ) -> ResultStore<Self> {
        let start_date = spec.start_date.ok_or_else(|| {
            StoreError::validation("start date for recurring expense must be specified")
        })?;
        Ok(Self {
            id,
            tenant_id: tenant_id.to_string(),
            name: spec.name,
            amount: spec.amount,
            currency,
            category: spec.category,
            tags: spec.tags,
            start_date,
            interval: spec.interval,
            occurrences: spec.occurrences,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recurring_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub amount_minor: i64,
    pub currency: String,
    pub category: String,
    pub start_date: DateTimeUtc,
    pub interval: String,
    pub occurrences: i32,
    pub tags: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&RecurringRule> for ActiveModel {
    type Error = StoreError;

    fn try_from(rule: &RecurringRule) -> Result<Self, Self::Error> {
        let occurrences = i32::try_from(rule.occurrences)
            .map_err(|_| StoreError::validation("too many occurrences"))?;
        Ok(Self {
            id: ActiveValue::Set(rule.id.to_string()),
            tenant_id: ActiveValue::Set(rule.tenant_id.clone()),
            name: ActiveValue::Set(rule.name.clone()),
            amount_minor: ActiveValue::Set(rule.amount.cents()),
            currency: ActiveValue::Set(rule.currency.code().to_string()),
            category: ActiveValue::Set(rule.category.clone()),
            start_date: ActiveValue::Set(rule.start_date),
            interval: ActiveValue::Set(rule.interval.as_str().to_string()),
            occurrences: ActiveValue::Set(occurrences),
            tags: ActiveValue::Set(encode_tags(&rule.tags)?),
        })
    }
}

impl TryFrom<Model> for RecurringRule {
    type Error = StoreError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let tags = decode_tags(model.tags.as_deref(), &model.id)?;
        let occurrences = u32::try_from(model.occurrences).map_err(|_| {
            StoreError::Database(DbErr::Type(format!(
                "invalid stored occurrences {} for recurring rule {}",
                model.occurrences, model.id
            )))
        })?;
        Ok(Self {
            id: parse_uuid(&model.id, "recurring rule")?,
            tenant_id: model.tenant_id,
            name: model.name,
            amount: MoneyCents::new(model.amount_minor),
            currency: Currency::try_from(model.currency.as_str())?,
            category: model.category,
            tags,
            start_date: model.start_date,
            interval: Interval::try_from(model.interval.as_str())?,
            occurrences,
        })
    }
}
