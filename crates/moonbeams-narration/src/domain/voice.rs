//! Voice selection.
//!
//! The selector re-derives its default whenever the engine announces a new
//! voice list. The playback controller only ever sees the chosen
//! identifier, captured once per narration.

use moonbeams_core::engine::{Voice, VoiceId};
use moonbeams_core::error::DomainError;
use serde::Serialize;

/// Priority rules for the default voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoicePreferences {
    /// Exact voice name tried first.
    pub preferred_name: String,
    /// Primary locale tag, matched as a substring of the label.
    pub primary_locale: String,
    /// Secondary locale tag, matched as a substring of the label.
    pub secondary_locale: String,
    /// Vendor name, matched as a substring of the label.
    pub vendor: String,
}

impl Default for VoicePreferences {
    fn default() -> Self {
        Self {
            preferred_name: "Google हिन्दी".to_owned(),
            primary_locale: "hi-IN".to_owned(),
            secondary_locale: "en-IN".to_owned(),
            vendor: "Google".to_owned(),
        }
    }
}

/// Picks the default voice: exact name, then primary locale, then secondary
/// locale, then vendor, then whatever comes first.
#[must_use]
pub fn pick_default<'a>(voices: &'a [Voice], preferences: &VoicePreferences) -> Option<&'a Voice> {
    let label_contains = |needle: &str| {
        voices
            .iter()
            .find(|voice| !needle.is_empty() && voice.label().contains(needle))
    };

    voices
        .iter()
        .find(|voice| voice.name == preferences.preferred_name)
        .or_else(|| label_contains(&preferences.primary_locale))
        .or_else(|| label_contains(&preferences.secondary_locale))
        .or_else(|| label_contains(&preferences.vendor))
        .or_else(|| voices.first())
}

/// Resolves the voice to put on an utterance at submit time.
///
/// Falls back to the first available voice when `requested` is missing or
/// no longer offered; `None` leaves the choice to the engine.
#[must_use]
pub fn resolve_for_submit(requested: Option<&VoiceId>, available: &[Voice]) -> Option<VoiceId> {
    requested
        .and_then(|id| available.iter().find(|voice| &voice.id == id))
        .or_else(|| available.first())
        .map(|voice| voice.id.clone())
}

/// One entry of the voice picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceOption {
    /// Voice identifier.
    pub id: VoiceId,
    /// `"<name> (<lang>)"`.
    pub label: String,
    /// Whether this is the current selection.
    pub selected: bool,
}

/// Tracks the offered voices and the current selection.
#[derive(Debug, Clone)]
pub struct VoiceSelector {
    preferences: VoicePreferences,
    voices: Vec<Voice>,
    selected: Option<VoiceId>,
    chosen_by_listener: bool,
}

impl VoiceSelector {
    /// Creates a selector with no voices yet.
    #[must_use]
    pub fn new(preferences: VoicePreferences) -> Self {
        Self {
            preferences,
            voices: Vec::new(),
            selected: None,
            chosen_by_listener: false,
        }
    }

    /// Handles a voices-changed notification.
    ///
    /// An empty list is ignored (engines often announce before loading). A
    /// listener's explicit choice survives while it is still offered;
    /// otherwise the default is re-derived.
    pub fn voices_changed(&mut self, voices: Vec<Voice>) {
        if voices.is_empty() {
            return;
        }
        self.voices = voices;

        let still_offered = self
            .selected
            .as_ref()
            .is_some_and(|id| self.voices.iter().any(|voice| &voice.id == id));
        if self.chosen_by_listener && still_offered {
            return;
        }

        self.chosen_by_listener = false;
        self.selected = pick_default(&self.voices, &self.preferences).map(|voice| voice.id.clone());
    }

    /// Records the listener's explicit choice.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `id` is not currently offered.
    pub fn select(&mut self, id: &VoiceId) -> Result<(), DomainError> {
        if !self.voices.iter().any(|voice| &voice.id == id) {
            return Err(DomainError::Validation(format!("unknown voice: {id}")));
        }
        self.selected = Some(id.clone());
        self.chosen_by_listener = true;
        Ok(())
    }

    /// The currently selected voice.
    #[must_use]
    pub fn selected(&self) -> Option<&VoiceId> {
        self.selected.as_ref()
    }

    /// The picker entries in engine order.
    #[must_use]
    pub fn options(&self) -> Vec<VoiceOption> {
        self.voices
            .iter()
            .map(|voice| VoiceOption {
                id: voice.id.clone(),
                label: voice.label(),
                selected: self.selected.as_ref() == Some(&voice.id),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voices() -> Vec<Voice> {
        vec![
            Voice::new("samantha", "Samantha", "en-US"),
            Voice::new("rishi", "Rishi", "en-IN"),
            Voice::new("google-us", "Google US English", "en-US"),
            Voice::new("lekha", "Lekha", "hi-IN"),
            Voice::new("google-hi", "Google हिन्दी", "hi-IN"),
        ]
    }

    #[test]
    fn test_pick_default_prefers_exact_name() {
        let prefs = VoicePreferences::default();
        let voices = voices();

        assert_eq!(pick_default(&voices, &prefs).unwrap().id.as_str(), "google-hi");
    }

    #[test]
    fn test_pick_default_falls_through_priority_order() {
        // Arrange
        let prefs = VoicePreferences::default();
        let mut voices = voices();

        // Act / Assert
        voices.retain(|v| v.id.as_str() != "google-hi");
        assert_eq!(pick_default(&voices, &prefs).unwrap().id.as_str(), "lekha");

        voices.retain(|v| v.id.as_str() != "lekha");
        assert_eq!(pick_default(&voices, &prefs).unwrap().id.as_str(), "rishi");

        voices.retain(|v| v.id.as_str() != "rishi");
        assert_eq!(pick_default(&voices, &prefs).unwrap().id.as_str(), "google-us");

        voices.retain(|v| v.id.as_str() != "google-us");
        assert_eq!(pick_default(&voices, &prefs).unwrap().id.as_str(), "samantha");
    }

    #[test]
    fn test_pick_default_on_empty_list_is_none() {
        assert!(pick_default(&[], &VoicePreferences::default()).is_none());
    }

    #[test]
    fn test_resolve_for_submit_uses_requested_voice_when_offered() {
        let requested = VoiceId::new("rishi");

        assert_eq!(
            resolve_for_submit(Some(&requested), &voices()),
            Some(VoiceId::new("rishi"))
        );
    }

    #[test]
    fn test_resolve_for_submit_falls_back_to_first_voice() {
        let requested = VoiceId::new("gone");

        assert_eq!(
            resolve_for_submit(Some(&requested), &voices()),
            Some(VoiceId::new("samantha"))
        );
        assert_eq!(resolve_for_submit(None, &voices()), Some(VoiceId::new("samantha")));
        assert_eq!(resolve_for_submit(Some(&requested), &[]), None);
    }

    #[test]
    fn test_selector_derives_default_on_voices_changed() {
        let mut selector = VoiceSelector::new(VoicePreferences::default());

        selector.voices_changed(voices());

        assert_eq!(selector.selected(), Some(&VoiceId::new("google-hi")));
        let selected: Vec<_> = selector.options().into_iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].label, "Google हिन्दी (hi-IN)");
    }

    #[test]
    fn test_selector_ignores_empty_voice_announcements() {
        let mut selector = VoiceSelector::new(VoicePreferences::default());
        selector.voices_changed(voices());

        selector.voices_changed(Vec::new());

        assert_eq!(selector.selected(), Some(&VoiceId::new("google-hi")));
        assert_eq!(selector.options().len(), 5);
    }

    #[test]
    fn test_explicit_choice_survives_while_still_offered() {
        // Arrange
        let mut selector = VoiceSelector::new(VoicePreferences::default());
        selector.voices_changed(voices());
        selector.select(&VoiceId::new("rishi")).unwrap();

        // Act
        selector.voices_changed(voices());

        // Assert
        assert_eq!(selector.selected(), Some(&VoiceId::new("rishi")));
    }

    #[test]
    fn test_explicit_choice_is_replaced_once_withdrawn() {
        let mut selector = VoiceSelector::new(VoicePreferences::default());
        selector.voices_changed(voices());
        selector.select(&VoiceId::new("rishi")).unwrap();

        let mut fewer = voices();
        fewer.retain(|v| v.id.as_str() != "rishi");
        selector.voices_changed(fewer);

        assert_eq!(selector.selected(), Some(&VoiceId::new("google-hi")));
    }

    #[test]
    fn test_select_rejects_unknown_voice() {
        let mut selector = VoiceSelector::new(VoicePreferences::default());
        selector.voices_changed(voices());

        let result = selector.select(&VoiceId::new("nobody"));

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(selector.selected(), Some(&VoiceId::new("google-hi")));
    }
}
