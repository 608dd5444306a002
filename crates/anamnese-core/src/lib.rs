//! Anamnese Core Library
//!
//! Intake form for Yeda Lash Designer: collects client health and preference
//! answers, renders them into a PDF anamnese and hands the client off to
//! WhatsApp with a pre-filled greeting.
//!
//! # Architecture
//!
//! ```text
//! Field editors ──▶ Phone mask ──▶ FormStore (one IntakeRecord snapshot)
//!                                         │
//!                                    submit pressed
//!                                         │
//!                           ┌─────────────▼─────────────┐
//!                           │  consent? ── no ──▶ notice │
//!                           └─────────────┬─────────────┘
//!                                         │ yes
//!                               Document composer
//!                                         │
//!                                DocumentSink.save
//!                                         │
//!                                  (1.5 s timer)
//!                                         │
//!                              Navigator → wa.me link
//! ```
//!
//! # Core Principle
//!
//! **No document without consent.** A submit with the consent box unchecked
//! leaves everything untouched and only raises the blocking notice.
//!
//! # Modules
//!
//! - [`models`]: Intake record, answers and field identifiers
//! - [`form`]: Form store, field editors and page layout
//! - [`phone`]: WhatsApp number mask
//! - [`document`]: Document composer and PDF writer
//! - [`handoff`]: WhatsApp handoff URL, navigator and timers
//! - [`submit`]: Submit state machine

pub mod document;
pub mod form;
pub mod handoff;
pub mod models;
pub mod phone;
pub mod submit;

// Re-export commonly used types
pub use document::{
    compose, document_file_name, DirectoryTarget, DocumentError, DocumentSink, IssuedAt,
    MemoryTarget, PayloadTarget, PdfSink, RecordingSink,
};
pub use form::{ChoiceControl, FieldEdit, FormStore};
pub use handoff::{
    handoff_url, HandoffDispatcher, ManualScheduler, Navigator, RecordingNavigator, Scheduler,
    ThreadScheduler, TimerHandle, TimerOutcome,
};
pub use models::{Answer, ChoiceField, IntakePatch, IntakeRecord, TextField};
pub use phone::format_phone;
pub use submit::{Submission, SubmitController, SubmitError, SubmitState};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum AnamneseError {
    #[error("{0}")]
    ConsentRequired(String),

    #[error("Submission in progress: {0}")]
    InProgress(String),

    #[error("Document error: {0}")]
    DocumentError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("State error: {0}")]
    StateError(String),
}

impl From<SubmitError> for AnamneseError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::ConsentRequired => AnamneseError::ConsentRequired(e.to_string()),
            SubmitError::InProgress(state) => AnamneseError::InProgress(format!("{:?}", state)),
            SubmitError::Document(inner) => AnamneseError::DocumentError(inner.to_string()),
            SubmitError::StatePoisoned => AnamneseError::StateError(e.to_string()),
        }
    }
}

impl From<DocumentError> for AnamneseError {
    fn from(e: DocumentError) -> Self {
        AnamneseError::DocumentError(e.to_string())
    }
}

impl From<serde_json::Error> for AnamneseError {
    fn from(e: serde_json::Error) -> Self {
        AnamneseError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for AnamneseError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        AnamneseError::StateError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Start a new intake session with a blank form.
#[uniffi::export]
pub fn new_intake_session() -> Arc<IntakeSession> {
    let session = IntakeSession {
        session_id: uuid::Uuid::new_v4().to_string(),
        store: Mutex::new(FormStore::new()),
        controller: SubmitController::new(),
    };
    tracing::debug!(session_id = %session.session_id, "intake session started");
    Arc::new(session)
}

/// Mask raw WhatsApp input as `(DD) DDDDD-DDDD`.
#[uniffi::export]
pub fn mask_phone(raw: String) -> String {
    format_phone(&raw)
}

/// The handoff link with the encoded greeting.
#[uniffi::export]
pub fn whatsapp_handoff_url() -> String {
    handoff_url()
}

// =========================================================================
// Main API Object
// =========================================================================

/// One filling of the form, owned by the host view.
#[derive(uniffi::Object)]
pub struct IntakeSession {
    session_id: String,
    store: Mutex<FormStore>,
    controller: SubmitController,
}

impl IntakeSession {
    fn apply(&self, edit: FieldEdit) -> Result<Arc<IntakeRecord>, AnamneseError> {
        let mut store = self.store.lock()?;
        Ok(store.apply(edit))
    }

    fn current(&self) -> Result<Arc<IntakeRecord>, AnamneseError> {
        let store = self.store.lock()?;
        Ok(store.get())
    }
}

#[uniffi::export]
impl IntakeSession {
    pub fn session_id(&self) -> String {
        self.session_id.clone()
    }

    // =========================================================================
    // Field Editors
    // =========================================================================

    /// Update a free-text field.
    pub fn edit_text(&self, field: FfiTextField, value: String) -> Result<(), AnamneseError> {
        self.apply(FieldEdit::Text(field.into(), value))?;
        Ok(())
    }

    /// Feed raw phone input; returns the masked value to display.
    pub fn edit_phone(&self, raw: String) -> Result<String, AnamneseError> {
        let record = self.apply(FieldEdit::Phone(raw))?;
        Ok(record.phone.clone())
    }

    /// Select Sim (`true`) or Não (`false`) for a health question.
    pub fn set_answer(&self, field: FfiChoiceField, yes: bool) -> Result<(), AnamneseError> {
        self.apply(FieldEdit::Choice(field.into(), Answer::from_bool(yes)))?;
        Ok(())
    }

    pub fn set_consent(&self, checked: bool) -> Result<(), AnamneseError> {
        self.apply(FieldEdit::Consent(checked))?;
        Ok(())
    }

    /// Current form values.
    pub fn snapshot(&self) -> Result<FfiIntakeRecord, AnamneseError> {
        Ok(self.current()?.as_ref().clone().into())
    }

    /// Current form values as JSON.
    pub fn snapshot_json(&self) -> Result<String, AnamneseError> {
        Ok(self.current()?.to_json()?)
    }

    // =========================================================================
    // Submit
    // =========================================================================

    /// Generate the PDF. The host saves the bytes, waits `handoff_delay_ms`,
    /// opens `handoff_url` and then calls [`IntakeSession::complete_handoff`].
    pub fn submit(&self) -> Result<FfiSubmission, AnamneseError> {
        let record = self.current()?;
        let mut sink = PdfSink::new(MemoryTarget::new());
        let submission = self
            .controller
            .submit(&record, &IssuedAt::now(), &mut sink)?;

        let pdf = sink
            .into_target()
            .saved
            .pop()
            .ok_or_else(|| AnamneseError::DocumentError("document was not saved".into()))?;

        tracing::info!(
            session_id = %self.session_id,
            file_name = %submission.file_name,
            bytes = pdf.bytes.len(),
            "anamnese ready for host"
        );

        Ok(FfiSubmission {
            file_name: submission.file_name,
            pdf_bytes: pdf.bytes,
            handoff_url: submission.handoff.url().to_string(),
            handoff_delay_ms: submission.handoff.delay().as_millis() as u64,
        })
    }

    /// Mark the handoff navigation as done, re-enabling submit.
    pub fn complete_handoff(&self) -> Result<(), AnamneseError> {
        Ok(self.controller.complete_handoff()?)
    }

    /// Label for the submit control.
    pub fn button_label(&self) -> Result<String, AnamneseError> {
        Ok(self.controller.state()?.button_label().to_string())
    }

    pub fn is_submit_enabled(&self) -> Result<bool, AnamneseError> {
        Ok(self.controller.state()?.is_enabled())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe free-text field identifier.
#[derive(Debug, Clone, Copy, uniffi::Enum)]
pub enum FfiTextField {
    FullName,
    DesiredStyle,
    Notes,
}

impl From<FfiTextField> for TextField {
    fn from(field: FfiTextField) -> Self {
        match field {
            FfiTextField::FullName => TextField::FullName,
            FfiTextField::DesiredStyle => TextField::DesiredStyle,
            FfiTextField::Notes => TextField::Notes,
        }
    }
}

/// FFI-safe health question identifier.
#[derive(Debug, Clone, Copy, uniffi::Enum)]
pub enum FfiChoiceField {
    PriorProcedure,
    Allergy,
    EyeSensitivity,
    ContactLenses,
    EyeCondition,
    PregnantOrNursing,
}

impl From<FfiChoiceField> for ChoiceField {
    fn from(field: FfiChoiceField) -> Self {
        match field {
            FfiChoiceField::PriorProcedure => ChoiceField::PriorProcedure,
            FfiChoiceField::Allergy => ChoiceField::Allergy,
            FfiChoiceField::EyeSensitivity => ChoiceField::EyeSensitivity,
            FfiChoiceField::ContactLenses => ChoiceField::ContactLenses,
            FfiChoiceField::EyeCondition => ChoiceField::EyeCondition,
            FfiChoiceField::PregnantOrNursing => ChoiceField::PregnantOrNursing,
        }
    }
}

/// FFI-safe intake record. Health answers are `true` for Sim.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiIntakeRecord {
    pub full_name: String,
    pub phone: String,
    pub prior_procedure: bool,
    pub allergy: bool,
    pub eye_sensitivity: bool,
    pub contact_lenses: bool,
    pub eye_condition: bool,
    pub pregnant_or_nursing: bool,
    pub desired_style: String,
    pub notes: String,
    pub consent: bool,
}

impl From<IntakeRecord> for FfiIntakeRecord {
    fn from(record: IntakeRecord) -> Self {
        Self {
            full_name: record.full_name,
            phone: record.phone,
            prior_procedure: record.prior_procedure.is_yes(),
            allergy: record.allergy.is_yes(),
            eye_sensitivity: record.eye_sensitivity.is_yes(),
            contact_lenses: record.contact_lenses.is_yes(),
            eye_condition: record.eye_condition.is_yes(),
            pregnant_or_nursing: record.pregnant_or_nursing.is_yes(),
            desired_style: record.desired_style,
            notes: record.notes,
            consent: record.consent,
        }
    }
}

/// FFI-safe submit result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSubmission {
    pub file_name: String,
    pub pdf_bytes: Vec<u8>,
    pub handoff_url: String,
    pub handoff_delay_ms: u64,
}
