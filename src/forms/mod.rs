//! Form definitions backing the dashboard routes.

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod clients;
pub mod edit;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("malformed form body: {0}")]
    Malformed(String),

    #[error("invalid commission")]
    InvalidCommission,

    #[error("deletion was not confirmed")]
    DeletionNotConfirmed,

    #[error(transparent)]
    Field(#[from] TypeConstraintError),
}

/// Browsers post `on` for a ticked checkbox and nothing otherwise.
pub(crate) fn is_checked(value: Option<&str>) -> bool {
    value.is_some_and(|value| !matches!(value.trim(), "" | "off" | "false" | "0"))
}
