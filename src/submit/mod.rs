//! Submission collaborator.
//!
//! The wizard hands its final values to a [`Submitter`]; the HTTP
//! implementation POSTs them as JSON to the configured endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::wizard::{FormValues, SubmitFailure};

mod http;

pub use http::HttpSubmitter;

/// Message returned when the endpoint gives no message of its own
pub const DEFAULT_ACK_MESSAGE: &str = "Form submitted successfully";

/// Acknowledgement of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub message: String,
}

impl Ack {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for Ack {
    fn default() -> Self {
        Self::new(DEFAULT_ACK_MESSAGE)
    }
}

/// Receives the full set of form values once the final step validates.
///
/// Any failure is reported once; the caller decides whether to submit again.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, values: &FormValues) -> Result<Ack, SubmitFailure>;
}
