//! HTTP submitter backed by reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{Ack, Submitter};
use crate::config::SubmitConfig;
use crate::wizard::{FormValues, SubmitFailure};

/// POSTs form values as a JSON object
pub struct HttpSubmitter {
    client: Client,
    endpoint: String,
}

impl HttpSubmitter {
    /// Build a submitter for an endpoint, with an optional request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, SubmitFailure> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SubmitFailure::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &SubmitConfig) -> Result<Self, SubmitFailure> {
        Self::new(
            config.endpoint.clone(),
            config.timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(&self, values: &FormValues) -> Result<Ack, SubmitFailure> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(values)
            .send()
            .await
            .map_err(|e| SubmitFailure::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            tracing::debug!(endpoint = %self.endpoint, status = %status, "Submission rejected");
            return Err(SubmitFailure::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        // Endpoints are only required to answer 2xx; a message is optional
        Ok(serde_json::from_str::<Ack>(&body).unwrap_or_default())
    }
}
