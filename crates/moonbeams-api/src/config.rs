//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::str::FromStr;

use chrono::TimeDelta;
use moonbeams_narration::application::command_handlers::PlaybackConfig;
use moonbeams_narration::domain::voice::VoicePreferences;

use crate::error::AppError;

/// Story generator used when `STORY_SERVICE_URL` is unset.
pub const DEFAULT_STORY_SERVICE_URL: &str =
    "https://ketakis-little-moonbeams-ai-story.onrender.com/generate_story";

/// Text-to-speech program used when `MOONBEAMS_TTS_PROGRAM` is unset.
pub const DEFAULT_TTS_PROGRAM: &str = "espeak-ng";

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Endpoint of the story generator.
    pub story_service_url: String,
    /// Text-to-speech program.
    pub tts_program: String,
    /// Playback timing and utterance parameters.
    pub playback: PlaybackConfig,
    /// Default voice priorities.
    pub voices: VoicePreferences,
    /// OTLP collector for trace export, if any.
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = PlaybackConfig::default();
        let voice_defaults = VoicePreferences::default();
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        let grace_delay_ms: i64 = parse_or(&lookup, "MOONBEAMS_GRACE_DELAY_MS", 250)?;
        let keep_alive_secs: i64 = parse_or(&lookup, "MOONBEAMS_KEEP_ALIVE_SECS", 5)?;
        if grace_delay_ms < 0 {
            return Err(AppError::Config(
                "MOONBEAMS_GRACE_DELAY_MS must not be negative".into(),
            ));
        }
        if keep_alive_secs <= 0 {
            return Err(AppError::Config(
                "MOONBEAMS_KEEP_ALIVE_SECS must be positive".into(),
            ));
        }

        Ok(Self {
            host: text("HOST", "0.0.0.0"),
            port: parse_or(&lookup, "PORT", 3000)?,
            story_service_url: text("STORY_SERVICE_URL", DEFAULT_STORY_SERVICE_URL),
            tts_program: text("MOONBEAMS_TTS_PROGRAM", DEFAULT_TTS_PROGRAM),
            playback: PlaybackConfig {
                grace_delay: TimeDelta::milliseconds(grace_delay_ms),
                keep_alive_interval: TimeDelta::seconds(keep_alive_secs),
                rate: parse_or(&lookup, "MOONBEAMS_SPEECH_RATE", defaults.rate)?,
                pitch: parse_or(&lookup, "MOONBEAMS_SPEECH_PITCH", defaults.pitch)?,
            },
            voices: VoicePreferences {
                preferred_name: text("MOONBEAMS_PREFERRED_VOICE", &voice_defaults.preferred_name),
                primary_locale: text("MOONBEAMS_PRIMARY_LOCALE", &voice_defaults.primary_locale),
                secondary_locale: text(
                    "MOONBEAMS_SECONDARY_LOCALE",
                    &voice_defaults.secondary_locale,
                ),
                vendor: text("MOONBEAMS_VOICE_VENDOR", &voice_defaults.vendor),
            },
            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.is_empty()),
        })
    }

    /// The address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} is invalid: {e}"))),
        None => Ok(default),
    }
}
