//! Errors returned by the store.
//!
//! - [`Validation`] malformed input, rejected before any write.
//! - [`NotFound`] a tenant-scoped lookup or mutation matched no row.
//! - [`Conflict`] a uniqueness violation that no upsert absorbed.
//! - [`Database`] backend or transaction failure; the unit of work was rolled
//!   back and nothing is retried here.
//!
//!  [`Validation`]: StoreError::Validation
//!  [`NotFound`]: StoreError::NotFound
//!  [`Conflict`]: StoreError::Conflict
//!  [`Database`]: StoreError::Database
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Store custom errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(DbErr),
}

impl StoreError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn not_found(what: &str, id: &str) -> Self {
        Self::NotFound(format!("{what} with id {id}"))
    }
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => Self::Conflict(msg),
            _ => Self::Database(err),
        }
    }
}

impl PartialEq for StoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
