//! Stories and where they come from.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A story to narrate. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// Story title, spoken first.
    pub title: String,
    /// Story body.
    #[serde(alias = "text")]
    pub body: String,
}

impl Story {
    /// Creates a story.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// The text handed to the chunker: `title + ". " + body`.
    ///
    /// A blank title or body is left out rather than producing a stray
    /// `"."` unit.
    #[must_use]
    pub fn narration_text(&self) -> String {
        match (self.title.trim().is_empty(), self.body.trim().is_empty()) {
            (true, true) => String::new(),
            (true, false) => self.body.clone(),
            (false, true) => format!("{}.", self.title),
            (false, false) => format!("{}. {}", self.title, self.body),
        }
    }
}

/// The folktale traditions the story service knows how to tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryType {
    /// Tenali Raman court tales.
    TenaliRaman,
    /// Akbar and Birbal wisdom tales.
    AkbarBirbal,
    /// Vikram and Betaal riddles.
    VikramBetal,
    /// Panchatantra animal fables.
    Panchatantra,
    /// Episodes from the Mahabharata.
    Mahabharata,
    /// Episodes from the Ramayana.
    Ramayana,
}

impl StoryType {
    /// Wire name understood by the story service.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TenaliRaman => "tenali_raman",
            Self::AkbarBirbal => "akbar_birbal",
            Self::VikramBetal => "vikram_betal",
            Self::Panchatantra => "panchatantra",
            Self::Mahabharata => "mahabharata",
            Self::Ramayana => "ramayana",
        }
    }
}

impl fmt::Display for StoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoryType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "tenali_raman" => Ok(Self::TenaliRaman),
            "akbar_birbal" => Ok(Self::AkbarBirbal),
            "vikram_betal" => Ok(Self::VikramBetal),
            "panchatantra" => Ok(Self::Panchatantra),
            "mahabharata" => Ok(Self::Mahabharata),
            "ramayana" => Ok(Self::Ramayana),
            other => Err(DomainError::Validation(format!(
                "unknown story type: {other:?}"
            ))),
        }
    }
}

/// What the listener asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryRequest {
    /// Tradition to tell the story in.
    pub story_type: StoryType,
    /// Moral or theme, already trimmed and non-empty.
    pub moral: String,
    /// Selected sleep duration, passed along as a length hint.
    pub duration_minutes: Option<u32>,
}

impl StoryRequest {
    /// Validates raw listener input.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the moral is blank or the story
    /// type is unknown.
    pub fn parse(
        story_type: &str,
        moral: &str,
        duration_minutes: Option<u32>,
    ) -> Result<Self, DomainError> {
        let moral = moral.trim();
        if moral.is_empty() {
            return Err(DomainError::Validation(
                "please type a moral or theme".to_owned(),
            ));
        }
        Ok(Self {
            story_type: story_type.parse()?,
            moral: moral.to_owned(),
            duration_minutes,
        })
    }
}

/// Asynchronous provider of stories. Transport and retry policy are the
/// implementation's business; failures surface as
/// `DomainError::StoryRetrieval`.
#[async_trait]
pub trait StorySource: Send + Sync {
    /// Produces a story for `request`.
    async fn fetch_story(&self, request: &StoryRequest) -> Result<Story, DomainError>;
}
