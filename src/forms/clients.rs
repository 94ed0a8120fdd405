use serde::Deserialize;
use validator::Validate;

use crate::domain::client::NewClientRecord;
use crate::domain::field::{FieldPath, FieldValue, TopLevelField, parse_flag};
use crate::domain::types::{ClientCode, Commission, ContactEmail, ContactName, Password, Username};
use crate::forms::{FormError, is_checked};

#[derive(Deserialize, Validate)]
/// Form data for the create-client workflow.
pub struct AddClientForm {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(length(min = 1))]
    pub client_id: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub defaultlanguage: Option<String>,
    #[serde(default)]
    pub partner: Option<String>,
    #[serde(default)]
    pub commission: Option<String>,
}

impl TryFrom<AddClientForm> for NewClientRecord {
    type Error = FormError;

    fn try_from(form: AddClientForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let mut new = NewClientRecord::new(
            Username::new(form.username)?,
            Password::new(form.password)?,
            ClientCode::new(form.client_id)?,
        );
        new.contact_name = ContactName::new(form.contact_name);
        if !form.contact_email.trim().is_empty() {
            new.contact_email = Some(ContactEmail::new(form.contact_email)?);
        }
        if let Some(language) = form.defaultlanguage.filter(|value| !value.trim().is_empty()) {
            new.language = language.parse()?;
        }

        new.partner = is_checked(form.partner.as_deref());
        if new.partner
            && let Some(raw) = form.commission.filter(|value| !value.trim().is_empty())
        {
            let value = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| FormError::InvalidCommission)?;
            new.commission = Commission::new(value)?;
        }

        Ok(new)
    }
}

#[derive(Deserialize)]
/// Single-field change posted from a dashboard cell.
pub struct FieldChangeForm {
    pub username: String,
    /// Dotted field name, or `active`.
    pub field: String,
    #[serde(default)]
    pub value: String,
}

/// What a [`FieldChangeForm`] asks to change.
#[derive(Debug, PartialEq)]
pub enum ChangeTarget {
    /// The gated top-level `active` flag.
    Active(bool),
    Field(FieldPath, FieldValue),
}

impl FieldChangeForm {
    /// Resolves the posted field name and value into a typed change.
    pub fn target(&self) -> Result<ChangeTarget, FormError> {
        if self.field == "active" {
            return Ok(ChangeTarget::Active(parse_flag(&self.value)?));
        }
        let path: FieldPath = self.field.parse()?;
        let value = path.parse_value(&self.value)?;
        Ok(ChangeTarget::Field(path, value))
    }
}

#[derive(Deserialize)]
/// Commission input of a partner row.
pub struct CommissionForm {
    pub username: String,
    pub commission: String,
}

impl CommissionForm {
    pub fn value(&self) -> Result<FieldValue, FormError> {
        FieldPath::TopLevel(TopLevelField::Commission)
            .parse_value(&self.commission)
            .map_err(|_| FormError::InvalidCommission)
    }
}

#[derive(Deserialize)]
/// Delete button of a dashboard row; `confirm` is the confirmation checkbox.
pub struct DeleteClientForm {
    pub username: String,
    #[serde(default)]
    pub confirm: Option<String>,
}

impl DeleteClientForm {
    pub fn confirmed_username(&self) -> Result<&str, FormError> {
        if is_checked(self.confirm.as_deref()) {
            Ok(&self.username)
        } else {
            Err(FormError::DeletionNotConfirmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::client::ClientRecord;
    use crate::domain::permissions::{CommandKey, FeatureKey, Language};

    fn add_form() -> AddClientForm {
        AddClientForm {
            username: "newco".into(),
            password: "secret".into(),
            client_id: "nc1".into(),
            contact_name: "<script>alert(1)</script>Jane Doe ".into(),
            contact_email: "Jane@NewCo.com".into(),
            defaultlanguage: Some("fr".into()),
            partner: None,
            commission: Some("25".into()),
        }
    }

    #[test]
    fn add_form_builds_disabled_record() {
        let new = NewClientRecord::try_from(add_form()).unwrap();
        let record = ClientRecord::from(new);

        assert_eq!(record.client_id, "NC1");
        assert_eq!(record.contact.as_ref().unwrap().email, "jane@newco.com");
        assert_eq!(record.contact.as_ref().unwrap().name, "Jane Doe");
        assert_eq!(record.features.language(), Language::Fr);
        assert!(FeatureKey::ALL.iter().all(|key| !record.features.get(*key)));
        assert!(CommandKey::ALL.iter().all(|key| !record.commands.get(*key)));
        assert!(!record.partner);
        assert_eq!(record.commission, 0.0);
    }

    #[test]
    fn add_form_keeps_commission_for_partners() {
        let mut form = add_form();
        form.partner = Some("on".into());

        let record = ClientRecord::from(NewClientRecord::try_from(form).unwrap());

        assert!(record.partner);
        assert_eq!(record.commission, 25.0);
    }

    #[test]
    fn add_form_rejects_bad_input() {
        let mut form = add_form();
        form.username = String::new();
        assert!(matches!(
            NewClientRecord::try_from(form),
            Err(FormError::Validation(_))
        ));

        let mut form = add_form();
        form.contact_email = "not-an-email".into();
        assert!(matches!(
            NewClientRecord::try_from(form),
            Err(FormError::Field(_))
        ));

        let mut form = add_form();
        form.partner = Some("on".into());
        form.commission = Some("abc".into());
        assert!(matches!(
            NewClientRecord::try_from(form),
            Err(FormError::InvalidCommission)
        ));
    }

    #[test]
    fn field_change_routes_active_separately() {
        let form = FieldChangeForm {
            username: "a".into(),
            field: "active".into(),
            value: "true".into(),
        };
        assert_eq!(form.target().unwrap(), ChangeTarget::Active(true));

        let form = FieldChangeForm {
            username: "a".into(),
            field: "features.rentals".into(),
            value: "false".into(),
        };
        assert_eq!(
            form.target().unwrap(),
            ChangeTarget::Field(FieldPath::feature(FeatureKey::Rentals), FieldValue::Flag(false))
        );

        let form = FieldChangeForm {
            username: "a".into(),
            field: "features.teleport".into(),
            value: "true".into(),
        };
        assert!(form.target().is_err());
    }

    #[test]
    fn delete_requires_confirmation() {
        let form = DeleteClientForm {
            username: "a".into(),
            confirm: None,
        };
        assert!(matches!(
            form.confirmed_username(),
            Err(FormError::DeletionNotConfirmed)
        ));

        let form = DeleteClientForm {
            username: "a".into(),
            confirm: Some("on".into()),
        };
        assert_eq!(form.confirmed_username().unwrap(), "a");
    }
}
