//! Feature flags and command permissions granted to a client.
//!
//! The key sets are an external contract with the kiosk backend and must
//! match its spelling exactly, including the space in `client edit`.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::types::TypeConstraintError;

/// The only identity allowed to flip a client's `active` flag.
pub const SUPER_ADMIN_USERNAME: &str = "chargerent";

/// Returns `true` when `actor` may change `active` flags.
pub fn can_toggle_active(actor: &str) -> bool {
    actor == SUPER_ADMIN_USERNAME
}

macro_rules! permission_keys {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $key:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every key in the order the dashboard lists them.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire spelling of the key.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = TypeConstraintError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($key => Ok($name::$variant),)+
                    other => Err(TypeConstraintError::UnknownField(other.to_string())),
                }
            }
        }
    };
}

permission_keys!(
    /// Capability toggles deciding what a client can see.
    FeatureKey {
        Rentals => "rentals",
        Details => "details",
        StationId => "stationid",
        Address => "address",
        Status => "status",
        Reporting => "reporting",
        LeaseRevenue => "lease_revenue",
        RentalCounts => "rental_counts",
        RentalRevenue => "rental_revenue",
        ClientCommission => "client_commission",
        RepCommission => "rep_commission",
    }
);

permission_keys!(
    /// Remote commands a client may issue against its kiosks.
    ///
    /// `details` grants the detail view command and drags `features.details`
    /// along with it when enabled.
    CommandKey {
        Edit => "edit",
        Lock => "lock",
        Eject => "eject",
        EjectMultiple => "eject_multiple",
        Updates => "updates",
        Connectivity => "connectivity",
        Reboot => "reboot",
        Reload => "reload",
        Disable => "disable",
        ClientEdit => "client edit",
        Details => "details",
    }
);

/// Default UI language of a client's kiosks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    pub const ALL: &'static [Language] = &[Language::En, Language::Fr];

    pub const fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }
}

impl FromStr for Language {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unsupported language `{other}`"
            ))),
        }
    }
}

/// Feature flags of a client plus its default language.
///
/// Flags are keyed by their wire name so that keys unknown to this dashboard
/// survive a fetch/save round trip.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Features {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaultlanguage: Option<LanguageSetting>,
    #[serde(flatten)]
    flags: BTreeMap<String, bool>,
}

impl Features {
    /// Every known flag set to `false` and the language set to English.
    pub fn all_disabled() -> Self {
        Self {
            defaultlanguage: Some(Language::default().into()),
            flags: FeatureKey::ALL
                .iter()
                .map(|key| (key.as_str().to_string(), false))
                .collect(),
        }
    }

    /// Missing flags read as disabled.
    pub fn get(&self, key: FeatureKey) -> bool {
        self.flags.get(key.as_str()).copied().unwrap_or(false)
    }

    pub fn set(&mut self, key: FeatureKey, value: bool) {
        self.flags.insert(key.as_str().to_string(), value);
    }

    /// Unset and unsupported languages read as English.
    pub fn language(&self) -> Language {
        match self.defaultlanguage {
            Some(LanguageSetting::Supported(language)) => language,
            _ => Language::default(),
        }
    }
}

/// Default language as stored by the backend.
///
/// Values the dashboard does not offer are kept verbatim so a save writes
/// them back untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LanguageSetting {
    Supported(Language),
    Unsupported(String),
}

impl From<Language> for LanguageSetting {
    fn from(language: Language) -> Self {
        LanguageSetting::Supported(language)
    }
}

/// Command permissions of a client.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Commands(BTreeMap<String, bool>);

impl Commands {
    /// Every known command set to `false`.
    pub fn all_disabled() -> Self {
        Self(
            CommandKey::ALL
                .iter()
                .map(|key| (key.as_str().to_string(), false))
                .collect(),
        )
    }

    pub fn get(&self, key: CommandKey) -> bool {
        self.0.get(key.as_str()).copied().unwrap_or(false)
    }

    pub fn set(&mut self, key: CommandKey, value: bool) {
        self.0.insert(key.as_str().to_string(), value);
    }
}
