//! Wizard error types.

use thiserror::Error;

use super::state::FormState;

/// Whether a failure came from a field's own rules or from a cross-field rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    Field,
    CrossField,
}

/// One failing field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub kind: FieldErrorKind,
}

/// A step did not validate.
///
/// Carries the state it was computed from, with `errors` populated for the
/// failing fields and `step` unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation on step {}", .failures.len(), .state.step)]
pub struct ValidationFailure {
    pub state: FormState,
    pub failures: Vec<FieldError>,
}

impl ValidationFailure {
    /// Failure entry for a field, if it failed
    pub fn failure(&self, field: &str) -> Option<&FieldError> {
        self.failures.iter().find(|f| f.field == field)
    }

    pub fn has_cross_field_failure(&self) -> bool {
        self.failures
            .iter()
            .any(|f| f.kind == FieldErrorKind::CrossField)
    }
}

/// Final submission failed. The form state is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitFailure {
    #[error("submission is only possible from step {expected} (currently on step {actual})")]
    NotFinalStep { expected: usize, actual: usize },

    #[error("form has {0} invalid field(s)")]
    Invalid(usize),

    #[error("a submission is already in progress")]
    InFlight,

    #[error("server rejected the submission ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("could not reach the submission endpoint: {0}")]
    Transport(String),
}

impl SubmitFailure {
    /// Whether the collaborator was contacted for this failure
    pub fn reached_network(&self) -> bool {
        matches!(
            self,
            SubmitFailure::Rejected { .. } | SubmitFailure::Transport(_)
        )
    }

    /// One-line message for the submission banner.
    ///
    /// Network failures are not classified: every one of them asks the user
    /// to submit again.
    pub fn banner(&self) -> String {
        if self.reached_network() {
            format!("Submission failed, please try again. ({})", self)
        } else {
            format!("Cannot submit: {}", self)
        }
    }
}

/// A field edit the schema does not allow
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("field '{field}' expects {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_for_network_failures() {
        let err = SubmitFailure::Rejected {
            status: 500,
            body: "boom".into(),
        };
        assert!(err.reached_network());
        assert!(err.banner().starts_with("Submission failed, please try again."));
        assert!(err.banner().contains("500"));

        let err = SubmitFailure::Transport("connection refused".into());
        assert!(err.banner().contains("connection refused"));
    }

    #[test]
    fn test_banner_for_local_failures() {
        let err = SubmitFailure::NotFinalStep {
            expected: 3,
            actual: 1,
        };
        assert!(!err.reached_network());
        assert!(err.banner().starts_with("Cannot submit:"));
        assert!(!SubmitFailure::InFlight.reached_network());
    }
}
