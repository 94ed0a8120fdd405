//! In-memory client store with a baseline for change detection.
//!
//! The live list holds local edits; the baseline is the collection as it was
//! last fetched from or saved to the backend. Every mutation is computed on a
//! [`ClientList`] snapshot and swapped in only when it succeeds, so a rejected
//! operation never leaves the store half-modified.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::client::ClientRecord;
use crate::domain::field::{FieldPath, FieldValue};
use crate::domain::types::TypeConstraintError;

pub mod collection;
pub mod edit_session;

pub use collection::ClientList;
pub use edit_session::{EditSession, SessionState};

/// Errors raised by local store and edit session operations.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
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

    #[error(transparent)]
    Field(#[from] TypeConstraintError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend round trip the store is waiting on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOperation {
    Load,
    Save,
}

impl Display for SyncOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncOperation::Load => f.write_str("load"),
            SyncOperation::Save => f.write_str("save"),
        }
    }
}

/// Live client list plus the last synced baseline.
#[derive(Debug, Default)]
pub struct ClientStore {
    live: ClientList,
    baseline: ClientList,
    in_flight: Option<SyncOperation>,
    synced_at: Option<DateTime<Utc>>,
}

impl ClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose live list and baseline are both `records`.
    pub fn with_records(records: Vec<ClientRecord>) -> Self {
        let mut store = Self::default();
        store.reset(ClientList::new(records));
        store
    }

    pub fn clients(&self) -> &ClientList {
        &self.live
    }

    pub fn baseline(&self) -> &ClientList {
        &self.baseline
    }

    pub fn get(&self, username: &str) -> Option<&ClientRecord> {
        self.live.get(username)
    }

    /// `true` once a load or save has completed.
    pub fn is_synced(&self) -> bool {
        self.synced_at.is_some()
    }

    pub fn synced_at(&self) -> Option<DateTime<Utc>> {
        self.synced_at
    }

    pub fn in_flight(&self) -> Option<SyncOperation> {
        self.in_flight
    }

    /// Deep, order-sensitive comparison of the live list against the baseline.
    pub fn has_pending_changes(&self) -> bool {
        self.live != self.baseline
    }

    pub fn apply_field_change(
        &mut self,
        username: &str,
        path: FieldPath,
        value: FieldValue,
    ) -> StoreResult<()> {
        self.live = self.live.with_field_change(username, path, value)?;
        Ok(())
    }

    /// Sets `active` on `username` when `actor` is the super-admin.
    pub fn set_active(&mut self, username: &str, actor: &str, value: bool) -> StoreResult<()> {
        self.live = self.live.with_active(username, actor, value).inspect_err(|err| {
            log::warn!("Refused active change on {username}: {err}");
        })?;
        Ok(())
    }

    pub fn add_record(&mut self, record: ClientRecord) -> StoreResult<()> {
        self.live = self.live.with_record(record)?;
        Ok(())
    }

    pub fn remove_record(&mut self, username: &str) {
        self.live = self.live.without_record(username);
    }

    pub fn replace_record(&mut self, old_username: &str, record: ClientRecord) -> StoreResult<()> {
        self.live = self.live.with_replacement(old_username, record)?;
        Ok(())
    }

    /// Drops every local edit made since the last sync.
    pub fn discard_changes(&mut self) {
        self.live = self.baseline.clone();
    }

    /// Marks `operation` as in flight, rejecting overlapping round trips.
    pub fn begin(&mut self, operation: SyncOperation) -> StoreResult<()> {
        if let Some(current) = self.in_flight {
            return Err(StoreError::OperationInProgress(current));
        }
        self.in_flight = Some(operation);
        Ok(())
    }

    /// Clears the in-flight marker after a failed round trip.
    pub fn abort(&mut self) {
        self.in_flight = None;
    }

    /// Replaces both the live list and the baseline with fetched records.
    pub fn finish_load(&mut self, records: Vec<ClientRecord>) {
        self.in_flight = None;
        self.reset(ClientList::new(records));
    }

    /// Makes `sent` the new baseline.
    ///
    /// Edits made while the save was in flight stay pending.
    pub fn finish_save(&mut self, sent: ClientList) {
        self.in_flight = None;
        self.baseline = sent;
        self.synced_at = Some(Utc::now());
    }

    fn reset(&mut self, list: ClientList) {
        self.baseline = list.clone();
        self.live = list;
        self.synced_at = Some(Utc::now());
    }
}
