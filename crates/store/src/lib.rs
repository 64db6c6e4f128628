//! Tenant-scoped transactional storage for expenses.
//!
//! The crate owns two pieces with real invariants:
//!
//! - materializing [`RecurringRule`]s into dated [`Expense`] instances, and
//!   regenerating them (fully or only the future part) when a rule changes;
//! - reconciling a tenant's ordered category list against stored rows.
//!
//! Everything goes through [`Store`], which takes the tenant id first on
//! every call and wraps each multi-row write in one database transaction.

pub use currency::Currency;
pub use error::StoreError;
pub use expenses::{Expense, ExpenseDraft};
pub use flow::Flow;
pub use money::MoneyCents;
pub use ops::{Store, StoreBuilder, StoreDefaults};
pub use recurrence::{GenerationMode, Interval, generate};
pub use recurring_rules::{MIN_OCCURRENCES, RecurringRule, RuleSpec};
pub use tenant_config::{TenantConfig, TenantSettings};
pub use util::sanitize_text;

pub use categories::DEFAULT_CATEGORIES;

mod categories;
mod currency;
mod error;
mod expenses;
mod flow;
mod money;
mod ops;
mod recurrence;
mod recurring_rules;
mod tenant_config;
mod util;

pub type ResultStore<T> = Result<T, StoreError>;
