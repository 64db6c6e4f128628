//! Ordered category names per tenant.
//!
//! `(tenant_id, name)` is unique; the name is the stable identity of a
//! category and `position` its dense 1-based display rank.

use sea_orm::entity::prelude::*;

use crate::{ResultStore, StoreError, util::required_text};

/// Categories seeded for a tenant that has none.
pub const DEFAULT_CATEGORIES: [&str; 10] = [
    "Food",
    "Groceries",
    "Travel",
    "Rent",
    "Utilities",
    "Entertainment",
    "Healthcare",
    "Shopping",
    "Miscellaneous",
    "Income",
];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Sanitize an ordered category list ahead of reconciliation.
///
/// Rejects an empty list and any entry that is blank once sanitized. A name
/// repeated later in the list keeps its first position.
pub(crate) fn normalize_category_list<S: AsRef<str>>(names: &[S]) -> ResultStore<Vec<String>> {
    if names.is_empty() {
        return Err(StoreError::validation("categories cannot be empty"));
    }
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for raw in names {
        let name = required_text(raw.as_ref(), "category name")?;
        if !out.contains(&name) {
            out.push(name);
        }
    }
    Ok(out)
}
