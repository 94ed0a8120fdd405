//! Edit session for a single client.
//!
//! The session works on a deep copy of one record; the store only sees the
//! result when the session is committed.

use crate::domain::client::ClientRecord;
use crate::domain::field::{FieldPath, FieldValue};
use crate::domain::permissions::can_toggle_active;
use crate::store::{ClientStore, StoreError, StoreResult};

/// Lifecycle of an edit: `Closed → Open → {Saved, Cancelled}`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Closed,
    Open {
        /// Username of the record being replaced on commit.
        original_username: String,
        draft: ClientRecord,
    },
    /// Committed; holds the username the record was saved under.
    Saved(String),
    Cancelled,
}

#[derive(Clone, Debug, Default)]
pub struct EditSession {
    state: SessionState,
    /// Set when the last commit attempt failed; the next open resumes the draft.
    rejected: bool,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open { .. })
    }

    /// Working copy of the open session.
    pub fn draft(&self) -> Option<&ClientRecord> {
        match &self.state {
            SessionState::Open { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn original_username(&self) -> Option<&str> {
        match &self.state {
            SessionState::Open {
                original_username, ..
            } => Some(original_username),
            _ => None,
        }
    }

    /// Starts editing `username`, replacing any session already open.
    pub fn open(&mut self, store: &ClientStore, username: &str) -> StoreResult<&ClientRecord> {
        let record = store
            .get(username)
            .ok_or_else(|| StoreError::NotFound(username.to_string()))?;

        if let Some(previous) = self.original_username() {
            log::debug!("Discarding open edit of {previous}");
        }

        self.state = SessionState::Open {
            original_username: username.to_string(),
            draft: record.clone().with_edit_defaults(),
        };
        self.rejected = false;

        self.draft().ok_or(StoreError::NoEditSession)
    }

    /// Changes one field of the working copy.
    pub fn edit(&mut self, path: FieldPath, value: FieldValue) -> StoreResult<()> {
        let draft = self.draft_mut()?;
        let mut next = draft.clone();
        path.apply(&mut next, value)?;
        *draft = next;
        Ok(())
    }

    /// Applies every change to the working copy, or none of them.
    pub fn edit_all<I>(&mut self, changes: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = (FieldPath, FieldValue)>,
    {
        let draft = self.draft_mut()?;
        let mut next = draft.clone();
        for (path, value) in changes {
            path.apply(&mut next, value).inspect_err(|err| {
                log::error!("Rejected edit of {path}: {err}");
            })?;
        }
        *draft = next;
        Ok(())
    }

    /// Changes `active` on the working copy when `actor` is the super-admin.
    pub fn set_active(&mut self, actor: &str, value: bool) -> StoreResult<()> {
        if !can_toggle_active(actor) {
            return Err(StoreError::NotPermitted(actor.to_string()));
        }
        self.draft_mut()?.active = Some(value);
        Ok(())
    }

    /// Flags the open draft as holding a rejected submission.
    pub fn mark_rejected(&mut self) {
        self.rejected = self.is_open();
    }

    /// `true` when the open draft for `username` holds a rejected submission.
    ///
    /// The flag is cleared either way.
    pub fn take_rejected(&mut self, username: &str) -> bool {
        let rejected = std::mem::take(&mut self.rejected);
        rejected && self.original_username() == Some(username)
    }

    pub fn cancel(&mut self) -> StoreResult<()> {
        if !self.is_open() {
            return Err(StoreError::NoEditSession);
        }
        self.state = SessionState::Cancelled;
        self.rejected = false;
        Ok(())
    }

    /// Writes the working copy into `store`.
    ///
    /// On a username collision the session stays open so the operator can
    /// pick another name. Returns the username the record was saved under.
    pub fn commit(&mut self, store: &mut ClientStore) -> StoreResult<String> {
        let SessionState::Open {
            original_username,
            draft,
        } = &self.state
        else {
            return Err(StoreError::NoEditSession);
        };

        let mut record = draft.clone();
        record.normalize_client_id();
        record.elide_blank_password();

        let collides = store
            .clients()
            .iter()
            .any(|other| other.username == record.username && other.username != *original_username);
        if collides {
            return Err(StoreError::DuplicateUsername(record.username));
        }

        let username = record.username.clone();
        store.replace_record(original_username, record)?;
        self.state = SessionState::Saved(username.clone());
        self.rejected = false;
        Ok(username)
    }

    fn draft_mut(&mut self) -> StoreResult<&mut ClientRecord> {
        match &mut self.state {
            SessionState::Open { draft, .. } => Ok(draft),
            _ => Err(StoreError::NoEditSession),
        }
    }
}
