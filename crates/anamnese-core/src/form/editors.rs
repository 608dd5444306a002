//! Stateless field editors.
//!
//! Each editor reads what it shows from a record snapshot and turns a user
//! interaction into a [`FieldEdit`]. None of them hold state of their own.

use crate::models::{Answer, ChoiceField, IntakeRecord, TextField};
use crate::phone::format_phone;

use super::FieldEdit;

/// Consent text next to the checkbox.
pub const CONSENT_LABEL: &str =
    "Autorizo o procedimento e confirmo que todas as informações prestadas são verdadeiras e completas.";

/// Plain text input or text area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextInput {
    pub field: TextField,
    pub required: bool,
}

impl TextInput {
    pub fn new(field: TextField) -> Self {
        Self {
            field,
            required: matches!(field, TextField::FullName),
        }
    }

    pub fn label(&self) -> &'static str {
        self.field.form_label()
    }

    pub fn placeholder(&self) -> &'static str {
        self.field.placeholder()
    }

    pub fn value<'r>(&self, record: &'r IntakeRecord) -> &'r str {
        record.text(self.field)
    }

    pub fn input(&self, value: impl Into<String>) -> FieldEdit {
        FieldEdit::Text(self.field, value.into())
    }
}

/// Masked WhatsApp number input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhoneInput;

impl PhoneInput {
    pub const LABEL: &'static str = "WhatsApp";
    pub const PLACEHOLDER: &'static str = "(00) 00000-0000";

    pub fn value<'r>(&self, record: &'r IntakeRecord) -> &'r str {
        &record.phone
    }

    /// Raw keystroke buffer; the mask is applied when the edit lands.
    pub fn input(&self, raw: impl Into<String>) -> FieldEdit {
        FieldEdit::Phone(raw.into())
    }

    /// What the input will display for `raw`.
    pub fn preview(&self, raw: &str) -> String {
        format_phone(raw)
    }
}

/// One rendered option of a yes/no control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceOption {
    pub answer: Answer,
    pub label: &'static str,
    pub selected: bool,
}

/// Two mutually exclusive buttons bound to a yes/no field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceControl {
    pub field: ChoiceField,
    pub current: Answer,
}

impl ChoiceControl {
    pub fn new(field: ChoiceField, current: Answer) -> Self {
        Self { field, current }
    }

    pub fn from_record(field: ChoiceField, record: &IntakeRecord) -> Self {
        Self::new(field, record.answer(field))
    }

    pub fn label(&self) -> &'static str {
        self.field.form_label()
    }

    /// Affirmative first; exactly one option is selected.
    pub fn options(&self) -> [ChoiceOption; 2] {
        Answer::ALL.map(|answer| ChoiceOption {
            answer,
            label: answer.label(),
            selected: answer == self.current,
        })
    }

    pub fn select(&self, answer: Answer) -> FieldEdit {
        FieldEdit::Choice(self.field, answer)
    }
}

/// Consent checkbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsentCheckbox;

impl ConsentCheckbox {
    pub fn label(&self) -> &'static str {
        CONSENT_LABEL
    }

    pub fn checked(&self, record: &IntakeRecord) -> bool {
        record.consent
    }

    pub fn toggle(&self, checked: bool) -> FieldEdit {
        FieldEdit::Consent(checked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormStore;

    #[test]
    fn test_choice_control_marks_single_option() {
        let control = ChoiceControl::new(ChoiceField::Allergy, Answer::No);
        let options = control.options();

        assert_eq!(options[0].label, "Sim");
        assert!(!options[0].selected);
        assert_eq!(options[1].label, "Não");
        assert!(options[1].selected);
    }

    #[test]
    fn test_choice_selection_round_trip_through_store() {
        let mut store = FormStore::new();
        let control = ChoiceControl::from_record(ChoiceField::EyeCondition, &store.get());

        store.apply(control.select(Answer::Yes));

        let control = ChoiceControl::from_record(ChoiceField::EyeCondition, &store.get());
        let selected: Vec<_> = control.options().iter().filter(|o| o.selected).map(|o| o.answer).collect();
        assert_eq!(selected, vec![Answer::Yes]);
    }

    #[test]
    fn test_text_input_metadata() {
        let name = TextInput::new(TextField::FullName);
        assert!(name.required);
        assert_eq!(name.placeholder(), "Ex: Maria Silva");

        let notes = TextInput::new(TextField::Notes);
        assert!(!notes.required);
    }

    #[test]
    fn test_phone_input_preview() {
        assert_eq!(PhoneInput.preview("47999998888"), "(47) 99999-8888");
        assert_eq!(PhoneInput.input("479"), FieldEdit::Phone("479".into()));
    }

    #[test]
    fn test_consent_checkbox() {
        let mut store = FormStore::new();
        assert!(!ConsentCheckbox.checked(&store.get()));
        store.apply(ConsentCheckbox.toggle(true));
        assert!(ConsentCheckbox.checked(&store.get()));
    }
}
