//! The intake record and partial updates to it.

use serde::{Deserialize, Serialize};

use super::fields::{Answer, ChoiceField, TextField};

/// Everything the client fills in on the anamnese form.
///
/// A record is a snapshot: the form store replaces it wholesale on every edit
/// instead of mutating it in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct IntakeRecord {
    /// Client full name
    pub full_name: String,
    /// WhatsApp number, already masked as `(DD) DDDDD-DDDD`
    pub phone: String,
    /// Has had lash extension/lifting before
    pub prior_procedure: Answer,
    /// Allergic to glue or cosmetics
    pub allergy: Answer,
    /// Sensitive eyes
    pub eye_sensitivity: Answer,
    /// Wears contact lenses
    pub contact_lenses: Answer,
    /// Has an eye condition
    pub eye_condition: Answer,
    /// Pregnant or nursing
    pub pregnant_or_nursing: Answer,
    /// Desired lash style (free text)
    pub desired_style: String,
    /// Additional notes (free text)
    pub notes: String,
    /// Client authorizes the procedure
    pub consent: bool,
}

impl IntakeRecord {
    /// Current answer for a yes/no question.
    pub fn answer(&self, field: ChoiceField) -> Answer {
        match field {
            ChoiceField::PriorProcedure => self.prior_procedure,
            ChoiceField::Allergy => self.allergy,
            ChoiceField::EyeSensitivity => self.eye_sensitivity,
            ChoiceField::ContactLenses => self.contact_lenses,
            ChoiceField::EyeCondition => self.eye_condition,
            ChoiceField::PregnantOrNursing => self.pregnant_or_nursing,
        }
    }

    /// Current value of a free-text field.
    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::FullName => &self.full_name,
            TextField::DesiredStyle => &self.desired_style,
            TextField::Notes => &self.notes,
        }
    }

    /// Serialize to pretty JSON for host diagnostics.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// A partial update. Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakePatch {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub prior_procedure: Option<Answer>,
    pub allergy: Option<Answer>,
    pub eye_sensitivity: Option<Answer>,
    pub contact_lenses: Option<Answer>,
    pub eye_condition: Option<Answer>,
    pub pregnant_or_nursing: Option<Answer>,
    pub desired_style: Option<String>,
    pub notes: Option<String>,
    pub consent: Option<bool>,
}

impl IntakePatch {
    pub fn text(field: TextField, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match field {
            TextField::FullName => Self {
                full_name: value,
                ..Self::default()
            },
            TextField::DesiredStyle => Self {
                desired_style: value,
                ..Self::default()
            },
            TextField::Notes => Self {
                notes: value,
                ..Self::default()
            },
        }
    }

    pub fn answer(field: ChoiceField, answer: Answer) -> Self {
        let mut patch = Self::default();
        let slot = match field {
            ChoiceField::PriorProcedure => &mut patch.prior_procedure,
            ChoiceField::Allergy => &mut patch.allergy,
            ChoiceField::EyeSensitivity => &mut patch.eye_sensitivity,
            ChoiceField::ContactLenses => &mut patch.contact_lenses,
            ChoiceField::EyeCondition => &mut patch.eye_condition,
            ChoiceField::PregnantOrNursing => &mut patch.pregnant_or_nursing,
        };
        *slot = Some(answer);
        patch
    }

    pub fn phone(value: impl Into<String>) -> Self {
        Self {
            phone: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn consent(value: bool) -> Self {
        Self {
            consent: Some(value),
            ..Self::default()
        }
    }

    /// Produce a new record with this patch laid over `base`.
    pub fn apply_to(self, base: &IntakeRecord) -> IntakeRecord {
        IntakeRecord {
            full_name: self.full_name.unwrap_or_else(|| base.full_name.clone()),
            phone: self.phone.unwrap_or_else(|| base.phone.clone()),
            prior_procedure: self.prior_procedure.unwrap_or(base.prior_procedure),
            allergy: self.allergy.unwrap_or(base.allergy),
            eye_sensitivity: self.eye_sensitivity.unwrap_or(base.eye_sensitivity),
            contact_lenses: self.contact_lenses.unwrap_or(base.contact_lenses),
            eye_condition: self.eye_condition.unwrap_or(base.eye_condition),
            pregnant_or_nursing: self.pregnant_or_nursing.unwrap_or(base.pregnant_or_nursing),
            desired_style: self
                .desired_style
                .unwrap_or_else(|| base.desired_style.clone()),
            notes: self.notes.unwrap_or_else(|| base.notes.clone()),
            consent: self.consent.unwrap_or(base.consent),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
