use serde::Deserialize;

use crate::domain::field::{ContactField, FieldPath, FieldValue, NestedField, TopLevelField};
use crate::domain::permissions::{CommandKey, FeatureKey, Language};
use crate::forms::{FormError, is_checked};

#[derive(Debug, Deserialize)]
/// Full edit form of one client.
///
/// `features` and `commands` carry one entry per ticked checkbox, so the body
/// must be decoded with `serde_html_form`.
pub struct EditClientForm {
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub client_id: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub defaultlanguage: String,
    #[serde(default)]
    pub partner: Option<String>,
    #[serde(default)]
    pub commission: String,
    #[serde(default)]
    pub active: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub commands: Vec<String>,
}

impl EditClientForm {
    pub fn from_bytes(body: &[u8]) -> Result<Self, FormError> {
        serde_html_form::from_bytes(body).map_err(|err| FormError::Malformed(err.to_string()))
    }

    pub fn active(&self) -> bool {
        is_checked(self.active.as_deref())
    }

    /// Field writes that bring a draft in line with this form.
    ///
    /// `partner` precedes `commission`, and commands come after features so
    /// that enabling `commands.details` wins over an unticked
    /// `features.details`.
    pub fn field_changes(&self) -> Result<Vec<(FieldPath, FieldValue)>, FormError> {
        let features = parse_keys::<FeatureKey>(&self.features)?;
        let commands = parse_keys::<CommandKey>(&self.commands)?;
        let partner = is_checked(self.partner.as_deref());

        let mut changes = vec![
            (
                FieldPath::TopLevel(TopLevelField::Username),
                FieldValue::Text(self.username.clone()),
            ),
            (
                FieldPath::TopLevel(TopLevelField::Password),
                FieldValue::Text(self.password.clone()),
            ),
            (
                FieldPath::TopLevel(TopLevelField::ClientId),
                FieldValue::Text(self.client_id.clone()),
            ),
            (
                FieldPath::Nested(NestedField::Contact(ContactField::Name)),
                FieldValue::Text(self.contact_name.clone()),
            ),
            (
                FieldPath::Nested(NestedField::Contact(ContactField::Email)),
                FieldValue::Text(self.contact_email.clone()),
            ),
        ];

        if !self.defaultlanguage.trim().is_empty() {
            let language: Language = self.defaultlanguage.parse()?;
            changes.push((
                FieldPath::Nested(NestedField::DefaultLanguage),
                FieldValue::Language(language),
            ));
        }

        changes.push((
            FieldPath::TopLevel(TopLevelField::Partner),
            FieldValue::Flag(partner),
        ));
        if partner && !self.commission.trim().is_empty() {
            let commission = FieldPath::TopLevel(TopLevelField::Commission)
                .parse_value(&self.commission)
                .map_err(|_| FormError::InvalidCommission)?;
            changes.push((FieldPath::TopLevel(TopLevelField::Commission), commission));
        }

        for key in FeatureKey::ALL {
            changes.push((
                FieldPath::feature(*key),
                FieldValue::Flag(features.contains(key)),
            ));
        }
        for key in CommandKey::ALL {
            changes.push((
                FieldPath::command(*key),
                FieldValue::Flag(commands.contains(key)),
            ));
        }

        Ok(changes)
    }
}

fn parse_keys<K>(raw: &[String]) -> Result<Vec<K>, FormError>
where
    K: std::str::FromStr<Err = crate::domain::types::TypeConstraintError>,
{
    raw.iter()
        .map(|key| key.parse::<K>().map_err(FormError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_checkboxes_are_collected() {
        let body = b"username=bob&client_id=bb&features=rentals&features=status\
&commands=client+edit&commands=details&partner=on&commission=12.5&active=on";

        let form = EditClientForm::from_bytes(body).unwrap();

        assert_eq!(form.features, vec!["rentals", "status"]);
        assert_eq!(form.commands, vec!["client edit", "details"]);
        assert!(form.active());
        assert_eq!(form.password, "");
    }

    #[test]
    fn changes_cover_every_permission_in_order() {
        let body = b"username=bob&client_id=bb&commands=details&partner=on&commission=10";
        let form = EditClientForm::from_bytes(body).unwrap();

        let changes = form.field_changes().unwrap();
        let position = |path: FieldPath| changes.iter().position(|(p, _)| *p == path).unwrap();

        assert!(
            position(FieldPath::TopLevel(TopLevelField::Partner))
                < position(FieldPath::TopLevel(TopLevelField::Commission))
        );
        assert!(
            position(FieldPath::feature(FeatureKey::Details))
                < position(FieldPath::command(CommandKey::Details))
        );
        assert_eq!(
            changes.len(),
            5 + 2 + FeatureKey::ALL.len() + CommandKey::ALL.len()
        );
    }

    #[test]
    fn commission_is_skipped_for_non_partners() {
        let body = b"username=bob&client_id=bb&commission=10&defaultlanguage=fr";
        let form = EditClientForm::from_bytes(body).unwrap();

        let changes = form.field_changes().unwrap();

        assert!(
            !changes
                .iter()
                .any(|(path, _)| *path == FieldPath::TopLevel(TopLevelField::Commission))
        );
        assert!(changes.contains(&(
            FieldPath::Nested(NestedField::DefaultLanguage),
            FieldValue::Language(Language::Fr)
        )));
    }

    #[test]
    fn unknown_keys_and_missing_fields_are_rejected() {
        let form = EditClientForm::from_bytes(b"username=bob&client_id=bb&features=warp").unwrap();
        assert!(matches!(form.field_changes(), Err(FormError::Field(_))));

        assert!(matches!(
            EditClientForm::from_bytes(b"client_id=bb"),
            Err(FormError::Malformed(_))
        ));
    }
}
