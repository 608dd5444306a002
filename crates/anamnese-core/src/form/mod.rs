//! Form state: the single intake record of a session and the edits that
//! replace it.

pub mod editors;
pub mod layout;

pub use editors::*;
pub use layout::*;

use std::sync::Arc;

use crate::models::{Answer, ChoiceField, IntakePatch, IntakeRecord, TextField};
use crate::phone::format_phone;

/// One user interaction with a field editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    /// Keystrokes in a plain text input or the notes area
    Text(TextField, String),
    /// Raw keystrokes in the masked phone input
    Phone(String),
    /// A yes/no option was pressed
    Choice(ChoiceField, Answer),
    /// The consent checkbox was toggled
    Consent(bool),
}

impl FieldEdit {
    /// Translate into a patch. The store masks the phone when it is written.
    pub fn into_patch(self) -> IntakePatch {
        match self {
            FieldEdit::Text(field, value) => IntakePatch::text(field, value),
            FieldEdit::Phone(raw) => IntakePatch::phone(raw),
            FieldEdit::Choice(field, answer) => IntakePatch::answer(field, answer),
            FieldEdit::Consent(checked) => IntakePatch::consent(checked),
        }
    }
}

/// Holds the current intake snapshot.
///
/// Snapshots handed out by [`FormStore::get`] are never modified; every write
/// installs a fresh record.
#[derive(Debug, Clone, Default)]
pub struct FormStore {
    current: Arc<IntakeRecord>,
}

impl FormStore {
    /// Create a store holding the default record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot.
    pub fn get(&self) -> Arc<IntakeRecord> {
        Arc::clone(&self.current)
    }

    /// Replace the fields present in `patch`, keeping every other field.
    /// A phone value is masked on the way in; nothing else is validated.
    pub fn set(&mut self, mut patch: IntakePatch) -> Arc<IntakeRecord> {
        if patch.is_empty() {
            return self.get();
        }
        if let Some(phone) = patch.phone.take() {
            patch.phone = Some(format_phone(&phone));
        }
        let next = patch.apply_to(&self.current);
        self.current = Arc::new(next);
        tracing::trace!("intake record replaced");
        self.get()
    }

    /// Apply an editor interaction.
    pub fn apply(&mut self, edit: FieldEdit) -> Arc<IntakeRecord> {
        self.set(edit.into_patch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_has_defaults() {
        let store = FormStore::new();
        assert_eq!(*store.get(), IntakeRecord::default());
    }

    #[test]
    fn test_set_replaces_snapshot() {
        let mut store = FormStore::new();
        let before = store.get();

        let after = store.set(IntakePatch::text(TextField::FullName, "Ana"));

        assert_eq!(after.full_name, "Ana");
        assert!(before.full_name.is_empty());
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_edits_do_not_reset_other_fields() {
        let mut store = FormStore::new();
        store.apply(FieldEdit::Text(TextField::FullName, "Maria Silva".into()));
        store.apply(FieldEdit::Choice(ChoiceField::Allergy, Answer::Yes));
        store.apply(FieldEdit::Phone("47999998888".into()));
        store.apply(FieldEdit::Consent(true));
        store.apply(FieldEdit::Text(TextField::Notes, "Primeira vez".into()));

        let record = store.get();
        assert_eq!(record.full_name, "Maria Silva");
        assert_eq!(record.allergy, Answer::Yes);
        assert_eq!(record.phone, "(47) 99999-8888");
        assert!(record.consent);
        assert_eq!(record.notes, "Primeira vez");
        assert_eq!(record.eye_condition, Answer::No);
    }

    #[test]
    fn test_phone_edit_is_masked() {
        let mut store = FormStore::new();
        let record = store.apply(FieldEdit::Phone("47 9999".into()));
        assert_eq!(record.phone, "(47) 9999");
    }

    #[test]
    fn test_set_masks_phone() {
        let mut store = FormStore::new();
        store.apply(FieldEdit::Text(TextField::FullName, "Ana".into()));

        let record = store.set(IntakePatch::phone("47999998888"));
        assert_eq!(record.phone, "(47) 99999-8888");
        assert_eq!(record.full_name, "Ana");

        let again = store.set(IntakePatch::phone(record.phone.clone()));
        assert_eq!(again.phone, "(47) 99999-8888");
    }

    #[test]
    fn test_empty_patch_keeps_snapshot() {
        let mut store = FormStore::new();
        let before = store.get();
        let after = store.set(IntakePatch::default());
        assert!(Arc::ptr_eq(&before, &after));
    }
}
