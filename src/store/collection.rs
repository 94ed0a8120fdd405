//! Ordered client collection with pure, snapshot-returning mutations.

use serde::Serialize;

use crate::domain::client::ClientRecord;
use crate::domain::field::{FieldPath, FieldValue};
use crate::domain::permissions::can_toggle_active;
use crate::domain::types::Username;
use crate::store::{StoreError, StoreResult};

/// Ordered list of client records keyed by unique username.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ClientList(Vec<ClientRecord>);

impl ClientList {
    pub fn new(records: Vec<ClientRecord>) -> Self {
        Self(records)
    }

    pub fn as_slice(&self) -> &[ClientRecord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClientRecord> {
        self.0.iter()
    }

    pub fn get(&self, username: &str) -> Option<&ClientRecord> {
        self.0.iter().find(|record| record.username == username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.get(username).is_some()
    }

    fn position(&self, username: &str) -> Option<usize> {
        self.0.iter().position(|record| record.username == username)
    }

    /// Returns a copy with one field of `username` changed.
    ///
    /// An unknown username yields an unchanged copy.
    pub fn with_field_change(
        &self,
        username: &str,
        path: FieldPath,
        value: FieldValue,
    ) -> StoreResult<Self> {
        let Some(index) = self.position(username) else {
            log::debug!("Ignoring change of {path} for unknown client {username}");
            return Ok(self.clone());
        };

        let mut next = self.clone();
        path.apply(&mut next.0[index], value)?;

        let changed = &next.0[index].username;
        let collides = next
            .0
            .iter()
            .enumerate()
            .any(|(position, record)| position != index && &record.username == changed);
        if collides {
            return Err(StoreError::DuplicateUsername(changed.clone()));
        }

        Ok(next)
    }

    /// Returns a copy with the `active` flag of `username` set.
    ///
    /// Only the super-admin identity may do this.
    pub fn with_active(&self, username: &str, actor: &str, value: bool) -> StoreResult<Self> {
        if !can_toggle_active(actor) {
            return Err(StoreError::NotPermitted(actor.to_string()));
        }

        let mut next = self.clone();
        if let Some(index) = next.position(username) {
            next.0[index].active = Some(value);
        }
        Ok(next)
    }

    /// Returns a copy with `record` appended.
    pub fn with_record(&self, mut record: ClientRecord) -> StoreResult<Self> {
        record.username = Username::new(record.username)?.into_inner();
        if self.contains(&record.username) {
            return Err(StoreError::DuplicateUsername(record.username));
        }

        record.normalize_client_id();
        if !record.partner {
            record.commission = 0.0;
        }

        let mut next = self.clone();
        next.0.push(record);
        Ok(next)
    }

    /// Returns a copy without `username`.
    pub fn without_record(&self, username: &str) -> Self {
        Self(
            self.0
                .iter()
                .filter(|record| record.username != username)
                .cloned()
                .collect(),
        )
    }

    /// Returns a copy where the record of `old_username` is swapped for `record`.
    ///
    /// Order is preserved. A blank password is omitted from the replacement,
    /// which the backend reads as "unchanged". If `old_username` is gone the
    /// record is appended.
    pub fn with_replacement(&self, old_username: &str, mut record: ClientRecord) -> StoreResult<Self> {
        record.username = Username::new(record.username)?.into_inner();
        if record.username != old_username && self.contains(&record.username) {
            return Err(StoreError::DuplicateUsername(record.username));
        }

        record.normalize_client_id();
        record.elide_blank_password();

        let mut next = self.clone();
        match next.position(old_username) {
            Some(index) => next.0[index] = record,
            None => next.0.push(record),
        }
        Ok(next)
    }
}
