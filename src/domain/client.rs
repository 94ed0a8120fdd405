use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::permissions::{Commands, Features, Language, LanguageSetting};
use crate::domain::types::{
    ClientCode, Commission, ContactEmail, ContactName, Password, Username,
};

/// Contact person of a client.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// A kiosk-rental client as exchanged with the backend.
///
/// Members this dashboard does not model are kept in `extra` and written back
/// unchanged, because a save replaces the backend collection wholesale.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub username: String,
    /// `None` means "unchanged" to the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "clientId", default)]
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub commands: Commands,
    #[serde(default)]
    pub partner: bool,
    #[serde(default, deserialize_with = "lenient_commission")]
    pub commission: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accepts numbers, numeric strings and `null` (read as zero).
///
/// Non-finite strings such as `"NaN"` are rejected.
fn lenient_commission<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => 0.0,
        Some(Value::Number(number)) => number.as_f64().unwrap_or_default(),
        Some(Value::String(text)) if text.trim().is_empty() => 0.0,
        Some(Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .map_err(serde::de::Error::custom)?,
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "invalid commission: {other}"
            )));
        }
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(serde::de::Error::custom(format!(
            "invalid commission: {value}"
        )))
    }
}

impl ClientRecord {
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(false)
    }

    /// Uppercases `clientId` in place.
    pub fn normalize_client_id(&mut self) {
        self.client_id = self.client_id.trim().to_uppercase();
    }

    /// Clears a blank password so it is not sent to the backend.
    pub fn elide_blank_password(&mut self) {
        if self
            .password
            .as_deref()
            .is_some_and(|password| password.trim().is_empty())
        {
            self.password = None;
        }
    }

    /// Fills the members the edit form always shows.
    pub fn with_edit_defaults(mut self) -> Self {
        if self.contact.is_none() {
            self.contact = Some(Contact::default());
        }
        if self.features.defaultlanguage.is_none() {
            self.features.defaultlanguage = Some(Language::En.into());
        }
        self
    }
}

/// Validated payload of the create-client workflow.
#[derive(Clone, Debug)]
pub struct NewClientRecord {
    pub username: Username,
    pub password: Password,
    pub client_id: ClientCode,
    pub contact_name: ContactName,
    pub contact_email: Option<ContactEmail>,
    pub language: Language,
    pub partner: bool,
    pub commission: Commission,
}

impl NewClientRecord {
    #[must_use]
    pub fn new(username: Username, password: Password, client_id: ClientCode) -> Self {
        Self {
            username,
            password,
            client_id,
            contact_name: ContactName::new(""),
            contact_email: None,
            language: Language::default(),
            partner: false,
            commission: Commission::ZERO,
        }
    }
}

impl From<NewClientRecord> for ClientRecord {
    /// Every feature and command starts disabled.
    fn from(new: NewClientRecord) -> Self {
        let mut features = Features::all_disabled();
        features.defaultlanguage = Some(new.language.into());
        let commission = if new.partner {
            new.commission.get()
        } else {
            0.0
        };

        Self {
            username: new.username.into_inner(),
            password: Some(new.password.into_inner()),
            client_id: new.client_id.into_inner(),
            contact: Some(Contact {
                name: new.contact_name.into_inner(),
                email: new
                    .contact_email
                    .map(ContactEmail::into_inner)
                    .unwrap_or_default(),
            }),
            features,
            commands: Commands::all_disabled(),
            partner: new.partner,
            commission,
            active: None,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::permissions::{CommandKey, FeatureKey};

    #[test]
    fn record_round_trips_unknown_members() {
        let raw = json!({
            "username": "kiosk-co",
            "clientId": "KC1",
            "features": {"details": true},
            "commands": {"client edit": true},
            "partner": true,
            "commission": 12.5,
            "region": "north",
        });

        let record: ClientRecord = serde_json::from_value(raw).unwrap();

        assert_eq!(record.client_id, "KC1");
        assert!(record.features.get(FeatureKey::Details));
        assert!(record.commands.get(CommandKey::ClientEdit));
        assert_eq!(record.extra["region"], json!("north"));
        assert_eq!(record.password, None);
        assert_eq!(record.contact, None);

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["region"], json!("north"));
        assert!(back.get("password").is_none());
        assert!(back.get("active").is_none());
    }

    #[test]
    fn commission_accepts_strings_and_null() {
        let record: ClientRecord =
            serde_json::from_value(json!({"username": "a", "commission": "7.5"})).unwrap();
        assert_eq!(record.commission, 7.5);

        let record: ClientRecord =
            serde_json::from_value(json!({"username": "a", "commission": null})).unwrap();
        assert_eq!(record.commission, 0.0);
    }

    #[test]
    fn non_finite_commission_is_rejected() {
        for raw in ["NaN", "inf", "-Infinity"] {
            let result =
                serde_json::from_value::<ClientRecord>(json!({"username": "a", "commission": raw}));
            assert!(result.is_err(), "{raw} was accepted");
        }
    }

    #[test]
    fn edit_defaults_fill_contact_and_language() {
        let record = ClientRecord {
            username: "bob".into(),
            ..ClientRecord::default()
        }
        .with_edit_defaults();

        assert_eq!(record.contact, Some(Contact::default()));
        assert_eq!(
            record.features.defaultlanguage,
            Some(LanguageSetting::Supported(Language::En))
        );
    }

    #[test]
    fn blank_password_is_elided() {
        let mut record = ClientRecord {
            password: Some("  ".into()),
            ..ClientRecord::default()
        };
        record.elide_blank_password();
        assert_eq!(record.password, None);

        record.password = Some("secret".into());
        record.elide_blank_password();
        assert_eq!(record.password.as_deref(), Some("secret"));
    }

    #[test]
    fn new_record_starts_with_everything_disabled() {
        let new = NewClientRecord::new(
            Username::new("alice").unwrap(),
            Password::new("pw").unwrap(),
            ClientCode::new("a1").unwrap(),
        );

        let record = ClientRecord::from(new);

        assert_eq!(record.client_id, "A1");
        assert!(!record.partner);
        assert_eq!(record.commission, 0.0);
        assert!(FeatureKey::ALL.iter().all(|key| !record.features.get(*key)));
        assert!(CommandKey::ALL.iter().all(|key| !record.commands.get(*key)));
        assert_eq!(
            record.features.defaultlanguage,
            Some(LanguageSetting::Supported(Language::En))
        );
    }
}
