//! Hosted classifier binding.
//!
//! Posts message text to an inference endpoint speaking the common
//! `{"inputs": ...}` / `[{"label", "score"}]` convention and parses the
//! response. Enabled with the `remote` feature.

use std::time::Duration;

use clinsight_core::{EmotionError, EmotionModel, LabelScore, ModelResult};
use serde::Serialize;
use tracing::debug;

use crate::scoring::{parse_classifier_output, ScoringError, ScoringResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct ScoreRequest<'a> {
    inputs: &'a str,
}

/// Emotion scorer backed by a hosted classifier endpoint.
pub struct RemoteModel {
    endpoint: String,
    api_token: Option<String>,
    client: reqwest::blocking::Client,
}

impl RemoteModel {
    pub fn new(endpoint: impl Into<String>) -> ScoringResult<Self> {
        Self::with_token(endpoint, None)
    }

    pub fn with_token(
        endpoint: impl Into<String>,
        api_token: Option<String>,
    ) -> ScoringResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ScoringError::Http(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            api_token,
            client,
        })
    }

    fn request(&self, text: &str) -> ScoringResult<Vec<LabelScore>> {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .json(&ScoreRequest { inputs: text });
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .map_err(|e| ScoringError::Http(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScoringError::Http(format!(
                "classifier endpoint returned {status}"
            )));
        }

        let body = response
            .text()
            .map_err(|e| ScoringError::Http(e.to_string()))?;
        debug!(bytes = body.len(), "classifier response received");
        parse_classifier_output(&body)
    }
}

impl EmotionModel for RemoteModel {
    fn score(&self, text: &str) -> ModelResult<Vec<LabelScore>> {
        self.request(text)
            .map_err(|e| EmotionError::Backend(e.to_string()))
    }
}
