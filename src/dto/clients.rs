use serde::Serialize;

use crate::domain::client::ClientRecord;
use crate::domain::permissions::{CommandKey, FeatureKey, Language, can_toggle_active};
use crate::store::ClientStore;

/// One permission checkbox in a row or in the edit form.
#[derive(Debug, Serialize)]
pub struct PermissionCell {
    pub key: &'static str,
    /// Dotted field name posted back by the toggle form.
    pub field: String,
    pub enabled: bool,
}

/// A dashboard table row.
#[derive(Debug, Serialize)]
pub struct ClientRow {
    pub username: String,
    pub client_id: String,
    pub contact_name: String,
    pub contact_email: String,
    pub language: &'static str,
    pub partner: bool,
    pub commission: f64,
    pub active: bool,
    pub features: Vec<PermissionCell>,
    pub commands: Vec<PermissionCell>,
    /// Differs from the last synced copy, or is new.
    pub modified: bool,
}

impl ClientRow {
    pub fn new(record: &ClientRecord, baseline: Option<&ClientRecord>) -> Self {
        let contact = record.contact.clone().unwrap_or_default();
        Self {
            username: record.username.clone(),
            client_id: record.client_id.clone(),
            contact_name: contact.name,
            contact_email: contact.email,
            language: record.features.language().as_str(),
            partner: record.partner,
            commission: record.commission,
            active: record.is_active(),
            features: FeatureKey::ALL
                .iter()
                .map(|key| PermissionCell {
                    key: key.as_str(),
                    field: format!("features.{key}"),
                    enabled: record.features.get(*key),
                })
                .collect(),
            commands: CommandKey::ALL
                .iter()
                .map(|key| PermissionCell {
                    key: key.as_str(),
                    field: format!("commands.{key}"),
                    enabled: record.commands.get(*key),
                })
                .collect(),
            modified: baseline != Some(record),
        }
    }
}

/// Data required to render the dashboard template.
#[derive(Debug, Serialize)]
pub struct DashboardPageData {
    pub clients: Vec<ClientRow>,
    pub has_pending_changes: bool,
    pub can_toggle_active: bool,
    /// RFC 3339 time of the last load or save.
    pub synced_at: Option<String>,
    pub in_flight: Option<String>,
    /// Set when the initial load failed.
    pub load_error: Option<String>,
    pub feature_keys: Vec<&'static str>,
    pub command_keys: Vec<&'static str>,
    pub languages: Vec<&'static str>,
}

impl DashboardPageData {
    pub fn new(store: &ClientStore, actor: &str, load_error: Option<String>) -> Self {
        Self {
            clients: store
                .clients()
                .iter()
                .map(|record| ClientRow::new(record, store.baseline().get(&record.username)))
                .collect(),
            has_pending_changes: store.has_pending_changes(),
            can_toggle_active: can_toggle_active(actor),
            synced_at: store.synced_at().map(|at| at.to_rfc3339()),
            in_flight: store.in_flight().map(|operation| operation.to_string()),
            load_error,
            feature_keys: FeatureKey::ALL.iter().map(|key| key.as_str()).collect(),
            command_keys: CommandKey::ALL.iter().map(|key| key.as_str()).collect(),
            languages: Language::ALL.iter().map(|language| language.as_str()).collect(),
        }
    }
}

/// Data required to render the edit template.
#[derive(Debug, Serialize)]
pub struct EditPageData {
    pub original_username: String,
    pub client: ClientRow,
    pub can_toggle_active: bool,
    pub languages: Vec<&'static str>,
}

impl EditPageData {
    pub fn new(original_username: &str, draft: &ClientRecord, actor: &str) -> Self {
        Self {
            original_username: original_username.to_string(),
            client: ClientRow::new(draft, None),
            can_toggle_active: can_toggle_active(actor),
            languages: Language::ALL.iter().map(|language| language.as_str()).collect(),
        }
    }
}
