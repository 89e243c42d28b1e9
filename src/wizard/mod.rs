//! Wizard controller.
//!
//! [`Wizard`] holds the pure step transitions over a [`FormState`].
//! [`WizardSession`] owns the state of one running form, guards final
//! submission with an in-flight flag, and hands the collected values to a
//! [`Submitter`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use crate::submit::{Ack, Submitter};

pub mod error;
pub mod rules;
pub mod schema;
pub mod state;

pub use error::{EditError, FieldError, FieldErrorKind, SubmitFailure, ValidationFailure};
pub use schema::{FieldKind, FieldSpec, FormSchema, StepSchema, SIGNUP_FORM};
pub use state::{FieldValue, FormErrors, FormState, FormValues};

/// Pure transitions over a form schema
#[derive(Debug, Clone, Copy)]
pub struct Wizard {
    schema: &'static FormSchema,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new(&SIGNUP_FORM)
    }
}

impl Wizard {
    pub fn new(schema: &'static FormSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'static FormSchema {
        self.schema
    }

    /// Total number of steps, `N`
    pub fn step_count(&self) -> usize {
        self.schema.step_count()
    }

    pub fn initial_state(&self) -> FormState {
        FormState::initial(self.schema)
    }

    pub fn is_final_step(&self, state: &FormState) -> bool {
        state.step >= self.step_count()
    }

    /// Fraction of the form completed, `(step - 1) / (N - 1)`
    pub fn progress(&self, state: &FormState) -> f64 {
        let n = self.step_count();
        if n <= 1 {
            return 1.0;
        }
        let step = self.clamp_step(state.step);
        (step - 1) as f64 / (n - 1) as f64
    }

    fn clamp_step(&self, step: usize) -> usize {
        step.clamp(1, self.step_count().max(1))
    }

    /// Validate the fields of one step.
    ///
    /// Errors for that step's fields are replaced with the fresh result;
    /// errors on other steps are left alone.
    pub fn validate_step(&self, mut state: FormState, step: usize) -> (FormState, Vec<FieldError>) {
        let Some(step_schema) = self.schema.step(step) else {
            return (state, Vec::new());
        };

        let mut failures = Vec::new();
        for spec in step_schema.fields {
            state.errors.remove(spec.name);
            if let Some(message) = rules::first_failure(spec.rules, state.value(spec.name)) {
                failures.push(FieldError {
                    field: spec.name.to_string(),
                    message: message.to_string(),
                    kind: FieldErrorKind::Field,
                });
            }
        }

        // A mismatch outranks the confirmation field's own message
        if let Some(rule) = step_schema.cross_field {
            if !rule.passes(&state.values) {
                failures.retain(|f| f.field != rule.field);
                failures.push(FieldError {
                    field: rule.field.to_string(),
                    message: rule.message.to_string(),
                    kind: FieldErrorKind::CrossField,
                });
            }
        }

        for failure in &failures {
            state
                .errors
                .insert(failure.field.clone(), failure.message.clone());
        }

        (state, failures)
    }

    /// Validate the current step and move forward one step, capped at `N`.
    pub fn advance(&self, mut state: FormState) -> Result<FormState, ValidationFailure> {
        state.step = self.clamp_step(state.step);
        let step = state.step;

        let (mut state, failures) = self.validate_step(state, step);
        if !failures.is_empty() {
            tracing::debug!(step, failed = failures.len(), "Step validation failed");
            return Err(ValidationFailure { state, failures });
        }

        state.step = self.clamp_step(step + 1);
        tracing::debug!(from = step, to = state.step, "Advanced");
        Ok(state)
    }

    /// Move back one step, floored at 1. Values and errors are untouched.
    pub fn retreat(&self, mut state: FormState) -> FormState {
        state.step = self.clamp_step(state.step.saturating_sub(1));
        state
    }

    /// Final-step gate: the state must be on step `N` and that step must
    /// validate. The returned state carries step `N`'s fresh errors.
    pub fn check_submit(&self, state: FormState) -> (FormState, Result<(), SubmitFailure>) {
        let expected = self.step_count();
        if state.step != expected {
            let actual = state.step;
            return (state, Err(SubmitFailure::NotFinalStep { expected, actual }));
        }

        let (state, failures) = self.validate_step(state, expected);
        if failures.is_empty() {
            (state, Ok(()))
        } else {
            let count = failures.len();
            (state, Err(SubmitFailure::Invalid(count)))
        }
    }

    /// Validate every step at once, keeping the current step.
    pub fn validate_all(&self, state: FormState) -> Result<FormState, ValidationFailure> {
        let mut state = state;
        let mut failures = Vec::new();
        for step in 1..=self.step_count() {
            let (next, mut step_failures) = self.validate_step(state, step);
            state = next;
            failures.append(&mut step_failures);
        }

        if failures.is_empty() {
            Ok(state)
        } else {
            Err(ValidationFailure { state, failures })
        }
    }
}

/// Releases the in-flight flag when dropped
#[derive(Debug)]
pub struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Values cleared for submission, holding the session's in-flight flag
#[derive(Debug)]
pub struct PendingSubmission {
    pub id: Uuid,
    pub values: FormValues,
    guard: InFlightGuard,
}

impl PendingSubmission {
    /// Send the values to the collaborator. The outcome keeps the in-flight
    /// flag held until it is applied with [`WizardSession::finish_submit`]
    /// or dropped.
    pub async fn send(self, submitter: &dyn Submitter) -> SubmitOutcome {
        tracing::info!(submission = %self.id, fields = self.values.len(), "Submitting form");
        let result = submitter.submit(&self.values).await;
        match &result {
            Ok(ack) => {
                tracing::info!(submission = %self.id, ack = %ack.message, "Submission acknowledged");
            }
            Err(e) => {
                tracing::warn!(submission = %self.id, error = %e, "Submission failed");
            }
        }
        SubmitOutcome {
            id: self.id,
            result,
            guard: self.guard,
        }
    }
}

/// Collaborator result for one submission, not yet applied to the session
#[derive(Debug)]
pub struct SubmitOutcome {
    pub id: Uuid,
    pub result: Result<Ack, SubmitFailure>,
    guard: InFlightGuard,
}

/// Banner-level message shown after a submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success(String),
    Failure(String),
}

impl Banner {
    pub fn text(&self) -> &str {
        match self {
            Banner::Success(s) | Banner::Failure(s) => s,
        }
    }
}

/// One running form: state, in-flight flag and last banner
#[derive(Debug)]
pub struct WizardSession {
    wizard: Wizard,
    state: FormState,
    in_flight: Arc<AtomicBool>,
    banner: Option<Banner>,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new(Wizard::default())
    }
}

impl WizardSession {
    pub fn new(wizard: Wizard) -> Self {
        Self {
            state: wizard.initial_state(),
            wizard,
            in_flight: Arc::new(AtomicBool::new(false)),
            banner: None,
        }
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn step(&self) -> usize {
        self.state.step
    }

    pub fn current_step(&self) -> Option<&'static StepSchema> {
        self.wizard.schema().step(self.state.step)
    }

    pub fn progress(&self) -> f64 {
        self.wizard.progress(&self.state)
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    /// Whether a submission is outstanding
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Set a field's value and clear its error. The value must fit the
    /// field's kind: text for text-like fields, a boolean for checkboxes.
    pub fn edit(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<(), EditError> {
        let value = value.into();
        self.check_edit(field, &value)?;
        self.state.values.insert(field.to_string(), value);
        self.state.errors.remove(field);
        Ok(())
    }

    fn check_edit(&self, field: &str, value: &FieldValue) -> Result<(), EditError> {
        let Some(spec) = self.wizard.schema().field(field) else {
            return Err(EditError::UnknownField(field.to_string()));
        };
        if !spec.kind.accepts(value) {
            return Err(EditError::WrongType {
                field: field.to_string(),
                expected: spec.kind.expected(),
            });
        }
        Ok(())
    }

    /// Apply a batch of edits. Nothing is applied if any of them is rejected.
    pub fn load(&mut self, values: FormValues) -> Result<(), EditError> {
        for (field, value) in &values {
            self.check_edit(field, value)?;
        }
        for (field, value) in values {
            self.edit(&field, value)?;
        }
        Ok(())
    }

    /// Advance past the current step. On failure the session keeps the
    /// annotated state.
    pub fn advance(&mut self) -> Result<(), ValidationFailure> {
        let current = std::mem::replace(&mut self.state, self.wizard.initial_state());
        match self.wizard.advance(current) {
            Ok(next) => {
                self.state = next;
                self.banner = None;
                Ok(())
            }
            Err(failure) => {
                self.state = failure.state.clone();
                Err(failure)
            }
        }
    }

    pub fn retreat(&mut self) {
        let current = std::mem::replace(&mut self.state, self.wizard.initial_state());
        self.state = self.wizard.retreat(current);
    }

    /// Gate a submission and take the in-flight flag.
    ///
    /// Rejected while another submission is outstanding, when not on the
    /// final step, or when the final step does not validate (errors are then
    /// written to the state).
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SubmitFailure> {
        if self.is_in_flight() {
            return Err(SubmitFailure::InFlight);
        }

        let current = std::mem::replace(&mut self.state, self.wizard.initial_state());
        let (state, gate) = self.wizard.check_submit(current);
        self.state = state;
        gate?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SubmitFailure::InFlight);
        }

        self.banner = None;
        Ok(PendingSubmission {
            id: Uuid::new_v4(),
            values: self.state.values.clone(),
            guard: InFlightGuard {
                flag: self.in_flight.clone(),
            },
        })
    }

    /// Apply the outcome of a submission: reset on success, keep the state
    /// and record the failure banner otherwise. The in-flight flag is
    /// released only after the outcome is applied.
    pub fn finish_submit(&mut self, outcome: SubmitOutcome) -> Result<Ack, SubmitFailure> {
        let SubmitOutcome { result, guard, .. } = outcome;
        match &result {
            Ok(ack) => {
                self.state = self.wizard.initial_state();
                self.banner = Some(Banner::Success(ack.message.clone()));
            }
            Err(e) => {
                self.banner = Some(Banner::Failure(e.banner()));
            }
        }
        drop(guard);
        result
    }

    /// Gate, send and apply a submission in one call.
    ///
    /// A request rejected because another is in flight leaves the banner
    /// alone.
    pub async fn submit(&mut self, submitter: &dyn Submitter) -> Result<Ack, SubmitFailure> {
        let pending = match self.begin_submit() {
            Ok(pending) => pending,
            Err(SubmitFailure::InFlight) => return Err(SubmitFailure::InFlight),
            Err(e) => {
                self.banner = Some(Banner::Failure(e.banner()));
                return Err(e);
            }
        };
        let outcome = pending.send(submitter).await;
        self.finish_submit(outcome)
    }
}
