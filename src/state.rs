//! Per-process dashboard state shared by every handler.

use std::sync::Mutex;

use crate::store::{ClientStore, EditSession};

/// Client store plus the single operator's edit session.
#[derive(Debug, Default)]
pub struct Dashboard {
    pub store: ClientStore,
    pub session: EditSession,
}

impl Dashboard {
    pub fn new(store: ClientStore) -> Self {
        Self {
            store,
            session: EditSession::new(),
        }
    }
}

pub type SharedDashboard = Mutex<Dashboard>;
