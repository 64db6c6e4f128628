//! Per-tenant settings row.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Currency, RecurringRule, ResultStore, StoreError};

/// Valid range for the start-of-month day.
pub const START_DAY_RANGE: std::ops::RangeInclusive<u8> = 1..=31;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantConfig {
    pub currency: Currency,
    /// Day of the month the tenant's budgeting month starts on.
    pub start_day: u8,
}

/// Everything a client needs to render a tenant's setup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSettings {
    pub currency: Currency,
    pub start_day: u8,
    pub categories: Vec<String>,
    pub recurring_rules: Vec<RecurringRule>,
}

pub(crate) fn validate_start_day(day: u8) -> ResultStore<u8> {
    if !START_DAY_RANGE.contains(&day) {
        return Err(StoreError::validation(format!("invalid start date: {day}")));
    }
    Ok(day)
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tenant_config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tenant_id: String,
    pub currency: String,
    pub start_day: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn for_tenant(tenant_id: &str, config: TenantConfig) -> Self {
        Self {
            tenant_id: ActiveValue::Set(tenant_id.to_string()),
            currency: ActiveValue::Set(config.currency.code().to_string()),
            start_day: ActiveValue::Set(i32::from(config.start_day)),
        }
    }
}

impl TryFrom<Model> for TenantConfig {
    type Error = StoreError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let start_day = u8::try_from(model.start_day)
            .ok()
            .filter(|day| START_DAY_RANGE.contains(day))
            .ok_or_else(|| {
                StoreError::Database(DbErr::Type(format!(
                    "invalid stored start day {} for tenant {}",
                    model.start_day, model.tenant_id
                )))
            })?;
        Ok(Self {
            currency: Currency::try_from(model.currency.as_str())?,
            start_day,
        })
    }
}
