//! The module contains the error the engine can throw.
//!
//! Each variant maps to one HTTP status in the server crate:
//!
//! - [`KeyNotFound`] an entity does not exist (or belongs to someone else).
//! - [`ExistingKey`] a unique name/guid is already taken.
//! - [`InvalidValue`] input violates a domain rule.
//! - [`Forbidden`] the caller addressed another user's data.
//! - [`Unauthorized`] credentials were rejected.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`InvalidValue`]: EngineError::InvalidValue
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`Unauthorized`]: EngineError::Unauthorized
use api_types::{AmountError, UnknownVariant};
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl From<UnknownVariant> for EngineError {
    fn from(value: UnknownVariant) -> Self {
        Self::InvalidValue(value.to_string())
    }
}

impl From<AmountError> for EngineError {
    fn from(value: AmountError) -> Self {
        Self::InvalidValue(value.to_string())
    }
}
