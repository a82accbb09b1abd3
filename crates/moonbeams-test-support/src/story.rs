//! Test story sources.

use std::sync::Mutex;

use async_trait::async_trait;
use moonbeams_core::error::DomainError;
use moonbeams_core::story::{Story, StoryRequest, StorySource};

/// A story source that returns the same story every time and records the
/// requests it saw.
#[derive(Debug)]
pub struct StaticStorySource {
    story: Story,
    requests: Mutex<Vec<StoryRequest>>,
}

impl StaticStorySource {
    /// Creates a source that always answers with `story`.
    #[must_use]
    pub fn new(story: Story) -> Self {
        Self {
            story,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of the requests received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<StoryRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl StorySource for StaticStorySource {
    async fn fetch_story(&self, request: &StoryRequest) -> Result<Story, DomainError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.story.clone())
    }
}

/// A story source that always fails, like an unreachable backend.
#[derive(Debug)]
pub struct FailingStorySource;

#[async_trait]
impl StorySource for FailingStorySource {
    async fn fetch_story(&self, _request: &StoryRequest) -> Result<Story, DomainError> {
        Err(DomainError::StoryRetrieval("server error: 503".into()))
    }
}
