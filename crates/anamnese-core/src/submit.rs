//! Submit action: consent gate, document emission and handoff.
//!
//! ```text
//! Idle ──(consent = false)──▶ Idle + notice
//! Idle ──(consent = true)───▶ Generating ──(saved)──▶ Handoff ──(navigated)──▶ Idle
//! ```
//!
//! Each submit is independent; nothing carries over between attempts.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::{compose, DocumentError, DocumentSink, IssuedAt};
use crate::handoff::{HandoffDispatcher, Navigator, Scheduler, TimerHandle};
use crate::models::IntakeRecord;

/// Blocking notice shown when consent is missing.
pub const CONSENT_NOTICE: &str = "Por favor, autorize o procedimento para continuar.";

pub const SUBMIT_LABEL: &str = "GERAR ANAMNESE EM PDF";
pub const PROCESSING_LABEL: &str = "PROCESSANDO...";

/// Submit errors.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Por favor, autorize o procedimento para continuar.")]
    ConsentRequired,

    #[error("Submission already in progress: {0:?}")]
    InProgress(SubmitState),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Submit state lock poisoned")]
    StatePoisoned,
}

pub type SubmitResult<T> = Result<T, SubmitError>;

/// Where the submit action currently is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    /// Document being composed; the submit control is disabled
    Generating,
    /// Document saved, navigation scheduled
    Handoff,
}

impl SubmitState {
    /// Label of the submit control.
    pub fn button_label(self) -> &'static str {
        match self {
            SubmitState::Idle => SUBMIT_LABEL,
            SubmitState::Generating | SubmitState::Handoff => PROCESSING_LABEL,
        }
    }

    /// Whether the submit control accepts presses.
    pub fn is_enabled(self) -> bool {
        matches!(self, SubmitState::Idle)
    }
}

/// Result of a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Name the document was saved under
    pub file_name: String,
    /// Handoff still to be dispatched
    pub handoff: HandoffDispatcher,
}

/// Drives the submit state machine.
///
/// Cloning shares the state, so a scheduled handoff can return the controller
/// to idle.
#[derive(Debug, Clone, Default)]
pub struct SubmitController {
    state: Arc<Mutex<SubmitState>>,
}

impl SubmitController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SubmitResult<SubmitState> {
        let state = self.state.lock().map_err(|_| SubmitError::StatePoisoned)?;
        Ok(*state)
    }

    /// Idle → Generating, checked and set under one lock so concurrent
    /// submits cannot both start.
    fn begin(&self, record: &IntakeRecord) -> SubmitResult<()> {
        let mut state = self.state.lock().map_err(|_| SubmitError::StatePoisoned)?;
        if !state.is_enabled() {
            return Err(SubmitError::InProgress(*state));
        }

        if !record.consent {
            tracing::info!("submit blocked: consent not given");
            return Err(SubmitError::ConsentRequired);
        }

        tracing::debug!(from = ?*state, to = ?SubmitState::Generating, "submit state");
        *state = SubmitState::Generating;
        Ok(())
    }

    fn set_state(&self, next: SubmitState) -> SubmitResult<()> {
        let mut state = self.state.lock().map_err(|_| SubmitError::StatePoisoned)?;
        tracing::debug!(from = ?*state, to = ?next, "submit state");
        *state = next;
        Ok(())
    }

    /// Check consent, compose and save the document.
    ///
    /// Leaves the controller in [`SubmitState::Handoff`]; the caller dispatches
    /// the returned handoff and then calls [`SubmitController::complete_handoff`].
    /// Without consent nothing is drawn and the state stays idle.
    pub fn submit<S: DocumentSink + ?Sized>(
        &self,
        record: &IntakeRecord,
        issued_at: &IssuedAt,
        sink: &mut S,
    ) -> SubmitResult<Submission> {
        self.begin(record)?;
        let file_name = match compose(record, issued_at, sink) {
            Ok(file_name) => file_name,
            Err(e) => {
                tracing::warn!(error = %e, "anamnese generation failed");
                self.set_state(SubmitState::Idle)?;
                return Err(e.into());
            }
        };
        self.set_state(SubmitState::Handoff)?;

        tracing::info!(file_name = %file_name, "anamnese emitted");
        Ok(Submission {
            file_name,
            handoff: HandoffDispatcher::new(),
        })
    }

    /// Handoff → Idle. Any other state is left alone.
    pub fn complete_handoff(&self) -> SubmitResult<()> {
        let mut state = self.state.lock().map_err(|_| SubmitError::StatePoisoned)?;
        if *state == SubmitState::Handoff {
            tracing::debug!(from = ?*state, to = ?SubmitState::Idle, "submit state");
            *state = SubmitState::Idle;
        }
        Ok(())
    }

    fn reset(&self) {
        if let Err(e) = self.complete_handoff() {
            tracing::warn!(error = %e, "could not reset submit state");
        }
    }

    /// Full submit: emit the document, then schedule the navigation. The
    /// controller returns to idle once the navigation fires, or once the
    /// returned handle cancels it.
    pub fn submit_and_dispatch<S: DocumentSink + ?Sized>(
        &self,
        record: &IntakeRecord,
        issued_at: &IssuedAt,
        sink: &mut S,
        scheduler: &dyn Scheduler,
        navigator: Arc<dyn Navigator>,
    ) -> SubmitResult<(Submission, TimerHandle)> {
        let submission = self.submit(record, issued_at, sink)?;

        let after_navigation = self.clone();
        let after_cancel = self.clone();
        let timer = submission
            .handoff
            .dispatch(scheduler, navigator, move || after_navigation.reset())
            .on_cancel(move || {
                tracing::info!("handoff cancelled");
                after_cancel.reset();
            });

        Ok((submission, timer))
    }
}
