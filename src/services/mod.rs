//! Dashboard workflows shared by the HTTP routes.

use std::sync::{MutexGuard, PoisonError};

use thiserror::Error;

use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::state::{Dashboard, SharedDashboard};
use crate::store::{StoreError, SyncOperation};

pub mod clients;
pub mod edit;

/// Errors surfaced to the route layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to fetch clients: {0}")]
    Fetch(String),

    #[error("failed to update clients: {0}")]
    UpdateFailed(String),

    #[error("username `{0}` is already taken")]
    DuplicateUsername(String),

    #[error("client `{0}` not found")]
    NotFound(String),

    #[error("`{0}` is not allowed to change the active flag")]
    NotPermitted(String),

    #[error("a {0} is already in progress")]
    OperationInProgress(SyncOperation),

    #[error("no client is being edited")]
    NoEditSession,

    #[error("form error: {0}")]
    Form(String),

    #[error("type constraint violation: {0}")]
    TypeConstraint(#[from] TypeConstraintError),

    #[error("internal error")]
    Internal,
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername(username) => ServiceError::DuplicateUsername(username),
            StoreError::NotFound(username) => ServiceError::NotFound(username),
            StoreError::NotPermitted(actor) => ServiceError::NotPermitted(actor),
            StoreError::OperationInProgress(operation) => {
                ServiceError::OperationInProgress(operation)
            }
            StoreError::NoEditSession => ServiceError::NoEditSession,
            StoreError::Field(err) => ServiceError::TypeConstraint(err),
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::Field(err) => ServiceError::TypeConstraint(err),
            other => ServiceError::Form(other.to_string()),
        }
    }
}

/// Locks the dashboard for in-memory work. Never hold the guard across an `.await`.
pub(crate) fn lock(state: &SharedDashboard) -> ServiceResult<MutexGuard<'_, Dashboard>> {
    state.lock().map_err(|err| {
        log::error!("Dashboard state lock poisoned: {err}");
        ServiceError::Internal
    })
}

/// Holds the store's in-flight marker for one backend round trip.
///
/// Dropping an armed guard clears the marker, so a request future that is
/// dropped mid-await does not block later loads and saves.
pub(crate) struct InFlight<'a> {
    state: &'a SharedDashboard,
    armed: bool,
}

impl<'a> InFlight<'a> {
    /// Marks `operation` as in flight. Must not be called while `state` is locked.
    pub(crate) fn begin(state: &'a SharedDashboard, operation: SyncOperation) -> ServiceResult<Self> {
        lock(state)?.store.begin(operation)?;
        Ok(Self { state, armed: true })
    }

    /// Called once the store has recorded the outcome itself.
    pub(crate) fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut dashboard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            dashboard.store.abort();
        }
    }
}
