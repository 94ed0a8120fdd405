//! Typed addressing of the editable members of a [`ClientRecord`].
//!
//! Form posts name fields with dotted strings such as `contact.email`; they
//! are resolved into a [`FieldPath`] once at the boundary. `active` has no
//! path on purpose: it is only reachable through the gated toggle.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::domain::client::ClientRecord;
use crate::domain::permissions::{CommandKey, FeatureKey, Language};
use crate::domain::types::{
    ClientCode, Commission, ContactEmail, ContactName, TypeConstraintError, Username,
};

/// Members stored directly on the record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TopLevelField {
    Username,
    Password,
    ClientId,
    Partner,
    Commission,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Email,
}

/// Members living inside one of the record's nested mappings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NestedField {
    Contact(ContactField),
    Feature(FeatureKey),
    DefaultLanguage,
    Command(CommandKey),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldPath {
    TopLevel(TopLevelField),
    Nested(NestedField),
}

/// New value for a field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Number(f64),
    Language(Language),
}

impl FieldPath {
    pub const fn feature(key: FeatureKey) -> Self {
        FieldPath::Nested(NestedField::Feature(key))
    }

    pub const fn command(key: CommandKey) -> Self {
        FieldPath::Nested(NestedField::Command(key))
    }

    /// Converts a raw form value into the kind this path expects.
    pub fn parse_value(self, raw: &str) -> Result<FieldValue, TypeConstraintError> {
        match self {
            FieldPath::TopLevel(TopLevelField::Partner)
            | FieldPath::Nested(NestedField::Feature(_))
            | FieldPath::Nested(NestedField::Command(_)) => parse_flag(raw).map(FieldValue::Flag),
            FieldPath::TopLevel(TopLevelField::Commission) => raw
                .trim()
                .parse::<f64>()
                .map(FieldValue::Number)
                .map_err(|_| TypeConstraintError::InvalidValue(format!("not a number: {raw}"))),
            FieldPath::Nested(NestedField::DefaultLanguage) => {
                raw.parse().map(FieldValue::Language)
            }
            _ => Ok(FieldValue::Text(raw.to_string())),
        }
    }

    /// Writes `value` into `record`.
    ///
    /// Setting `commands.details` also enables `features.details`.
    pub fn apply(
        self,
        record: &mut ClientRecord,
        value: FieldValue,
    ) -> Result<(), TypeConstraintError> {
        match self {
            FieldPath::TopLevel(field) => apply_top_level(field, record, value, self),
            FieldPath::Nested(NestedField::Contact(field)) => {
                let text = expect_text(self, value)?;
                let contact = record.contact.get_or_insert_with(Default::default);
                match field {
                    ContactField::Name => contact.name = ContactName::new(text).into_inner(),
                    ContactField::Email if text.trim().is_empty() => contact.email.clear(),
                    ContactField::Email => contact.email = ContactEmail::new(text)?.into_inner(),
                }
                Ok(())
            }
            FieldPath::Nested(NestedField::Feature(key)) => {
                let flag = expect_flag(self, value)?;
                record.features.set(key, flag);
                Ok(())
            }
            FieldPath::Nested(NestedField::DefaultLanguage) => {
                let language = match value {
                    FieldValue::Language(language) => language,
                    FieldValue::Text(text) => text.parse()?,
                    _ => return Err(mismatch(self, "language")),
                };
                record.features.defaultlanguage = Some(language.into());
                Ok(())
            }
            FieldPath::Nested(NestedField::Command(key)) => {
                let flag = expect_flag(self, value)?;
                record.commands.set(key, flag);
                if key == CommandKey::Details && flag {
                    record.features.set(FeatureKey::Details, true);
                }
                Ok(())
            }
        }
    }
}

fn apply_top_level(
    field: TopLevelField,
    record: &mut ClientRecord,
    value: FieldValue,
    path: FieldPath,
) -> Result<(), TypeConstraintError> {
    match field {
        TopLevelField::Username => {
            let text = expect_text(path, value)?;
            record.username = Username::new(text)?.into_inner();
        }
        TopLevelField::Password => {
            record.password = Some(expect_text(path, value)?);
        }
        TopLevelField::ClientId => {
            record.client_id = ClientCode::new(expect_text(path, value)?)?.into_inner();
        }
        TopLevelField::Partner => {
            record.partner = expect_flag(path, value)?;
        }
        TopLevelField::Commission => {
            let FieldValue::Number(number) = value else {
                return Err(mismatch(path, "number"));
            };
            if !record.partner {
                return Err(TypeConstraintError::CommissionRequiresPartner);
            }
            record.commission = Commission::new(number)?.get();
        }
    }
    Ok(())
}

/// Reads an HTML checkbox or hidden boolean value.
pub fn parse_flag(raw: &str) -> Result<bool, TypeConstraintError> {
    match raw.trim() {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" | "" => Ok(false),
        other => Err(TypeConstraintError::InvalidValue(format!(
            "not a boolean: {other}"
        ))),
    }
}

fn expect_text(path: FieldPath, value: FieldValue) -> Result<String, TypeConstraintError> {
    match value {
        FieldValue::Text(text) => Ok(text),
        _ => Err(mismatch(path, "text")),
    }
}

fn expect_flag(path: FieldPath, value: FieldValue) -> Result<bool, TypeConstraintError> {
    match value {
        FieldValue::Flag(flag) => Ok(flag),
        _ => Err(mismatch(path, "boolean")),
    }
}

fn mismatch(path: FieldPath, expected: &'static str) -> TypeConstraintError {
    TypeConstraintError::FieldValueMismatch {
        field: path.to_string(),
        expected,
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldPath::TopLevel(TopLevelField::Username) => f.write_str("username"),
            FieldPath::TopLevel(TopLevelField::Password) => f.write_str("password"),
            FieldPath::TopLevel(TopLevelField::ClientId) => f.write_str("clientId"),
            FieldPath::TopLevel(TopLevelField::Partner) => f.write_str("partner"),
            FieldPath::TopLevel(TopLevelField::Commission) => f.write_str("commission"),
            FieldPath::Nested(NestedField::Contact(ContactField::Name)) => {
                f.write_str("contact.name")
            }
            FieldPath::Nested(NestedField::Contact(ContactField::Email)) => {
                f.write_str("contact.email")
            }
            FieldPath::Nested(NestedField::Feature(key)) => write!(f, "features.{key}"),
            FieldPath::Nested(NestedField::DefaultLanguage) => {
                f.write_str("features.defaultlanguage")
            }
            FieldPath::Nested(NestedField::Command(key)) => write!(f, "commands.{key}"),
        }
    }
}

impl FromStr for FieldPath {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || TypeConstraintError::UnknownField(s.to_string());
        let path = match s.split_once('.') {
            None => match s {
                "username" => FieldPath::TopLevel(TopLevelField::Username),
                "password" => FieldPath::TopLevel(TopLevelField::Password),
                "clientId" => FieldPath::TopLevel(TopLevelField::ClientId),
                "partner" => FieldPath::TopLevel(TopLevelField::Partner),
                "commission" => FieldPath::TopLevel(TopLevelField::Commission),
                _ => return Err(unknown()),
            },
            Some(("contact", "name")) => FieldPath::Nested(NestedField::Contact(ContactField::Name)),
            Some(("contact", "email")) => {
                FieldPath::Nested(NestedField::Contact(ContactField::Email))
            }
            Some(("features", "defaultlanguage")) => FieldPath::Nested(NestedField::DefaultLanguage),
            Some(("features", key)) => FieldPath::feature(key.parse().map_err(|_| unknown())?),
            Some(("commands", key)) => FieldPath::command(key.parse().map_err(|_| unknown())?),
            Some(_) => return Err(unknown()),
        };
        Ok(path)
    }
}
