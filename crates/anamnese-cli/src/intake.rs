//! Load a filled-in intake from disk.
//!
//! The file holds an intake record as JSON or TOML (by extension). Values are
//! replayed through the form editors, so a raw phone number gets the same
//! mask it would get when typed.

use std::path::Path;

use anamnese_core::form::{ChoiceControl, ConsentCheckbox, PhoneInput, TextInput};
use anamnese_core::{ChoiceField, FormStore, IntakeRecord, TextField};
use anyhow::{Context, Result};

/// Parse an intake file.
pub fn read_record(path: &Path) -> Result<IntakeRecord> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read intake file {}", path.display()))?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(&text)
            .with_context(|| format!("Invalid TOML intake {}", path.display()))
    } else {
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON intake {}", path.display()))
    }
}

/// Fill a fresh form store with `record`, one editor at a time.
pub fn replay(record: &IntakeRecord) -> FormStore {
    let mut store = FormStore::new();

    for field in TextField::ALL {
        store.apply(TextInput::new(field).input(record.text(field)));
    }
    store.apply(PhoneInput.input(record.phone.as_str()));
    for field in ChoiceField::ALL {
        let control = ChoiceControl::from_record(field, &store.get());
        store.apply(control.select(record.answer(field)));
    }
    store.apply(ConsentCheckbox.toggle(record.consent));

    tracing::debug!(full_name = %store.get().full_name, "intake loaded");
    store
}

/// [`read_record`] then [`replay`].
pub fn load(path: &Path) -> Result<FormStore> {
    Ok(replay(&read_record(path)?))
}
