//! HTTP client for the story generator.

use std::time::Duration;

use async_trait::async_trait;
use moonbeams_core::error::DomainError;
use moonbeams_core::story::{Story, StoryRequest, StorySource};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Upper bound on one generation request; story generation is slow.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Body sent to the generator.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateStoryBody<'a> {
    story_type: &'static str,
    moral: &'a str,
    /// Minutes; zero when no sleep timer is selected.
    duration: u32,
}

impl<'a> GenerateStoryBody<'a> {
    fn from_request(request: &'a StoryRequest) -> Self {
        Self {
            story_type: request.story_type.as_str(),
            moral: &request.moral,
            duration: request.duration_minutes.unwrap_or(0),
        }
    }
}

/// Story source that asks a remote generator over HTTP. One attempt per
/// request; failures are reported, not retried.
#[derive(Debug, Clone)]
pub struct HttpStorySource {
    client: Client,
    endpoint: String,
}

impl HttpStorySource {
    /// Creates a client for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the HTTP client cannot be
    /// built.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DomainError::Infrastructure(format!("http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl StorySource for HttpStorySource {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_story(&self, request: &StoryRequest) -> Result<Story, DomainError> {
        let body = GenerateStoryBody::from_request(request);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "story service unreachable");
                DomainError::StoryRetrieval(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "story service returned an error");
            return Err(DomainError::StoryRetrieval(format!(
                "server error: {}",
                status.as_u16()
            )));
        }

        let story: Story = response
            .json()
            .await
            .map_err(|e| DomainError::StoryRetrieval(format!("malformed story: {e}")))?;
        debug!(title = %story.title, "story received");
        Ok(story)
    }
}
