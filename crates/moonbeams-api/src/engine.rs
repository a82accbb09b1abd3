//! `espeak-ng` narration engine.
//!
//! Each utterance runs as its own `espeak-ng` process. The process cannot be
//! suspended, so pausing kills it and keeps the utterance; resuming speaks
//! the utterance again from the start. Completion and voice notifications
//! go back to the coordinator over an unbounded channel.

use std::process::Stdio;

use moonbeams_core::engine::{NarrationEngine, Utterance, UtteranceId, Voice};
use moonbeams_core::error::DomainError;
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Words per minute at rate 1.0.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// `espeak-ng` pitch at pitch 1.0 (range 0-99).
const BASE_PITCH: f32 = 50.0;

/// Notifications from the engine to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineSignal {
    /// The utterance finished on its own.
    Completed(UtteranceId),
    /// The engine's voice list changed.
    VoicesChanged(Vec<Voice>),
}

#[derive(Debug)]
struct Speaking {
    utterance: Utterance,
    kill: oneshot::Sender<()>,
}

impl Speaking {
    fn is_running(&self) -> bool {
        !self.kill.is_closed()
    }
}

/// Narration engine backed by the `espeak-ng` command-line tool.
#[derive(Debug)]
pub struct EspeakEngine {
    program: String,
    voices: Vec<Voice>,
    signals: mpsc::UnboundedSender<EngineSignal>,
    speaking: Option<Speaking>,
    paused: Option<Utterance>,
}

impl EspeakEngine {
    /// Asks `program` for its voices. Returns `None` when the program cannot
    /// be run, in which case the service runs without narration.
    pub async fn probe(
        program: &str,
        signals: mpsc::UnboundedSender<EngineSignal>,
    ) -> Option<Self> {
        let output = match Command::new(program).arg("--voices").output().await {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                warn!(program, status = %output.status, "text-to-speech probe failed; narration disabled");
                return None;
            }
            Err(err) => {
                warn!(program, error = %err, "text-to-speech program not available; narration disabled");
                return None;
            }
        };

        let voices = parse_voice_list(&String::from_utf8_lossy(&output.stdout));
        debug!(program, count = voices.len(), "text-to-speech voices loaded");
        // The coordinator seeds its picker from `list_voices`; the signal
        // covers listeners attached later.
        let _ = signals.send(EngineSignal::VoicesChanged(voices.clone()));

        Some(Self {
            program: program.to_owned(),
            voices,
            signals,
            speaking: None,
            paused: None,
        })
    }

    fn speak(&mut self, utterance: Utterance) -> Result<(), DomainError> {
        self.kill_current();

        let mut child = Command::new(&self.program)
            .args(command_args(&utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DomainError::Engine(format!("failed to start {}: {e}", self.program)))?;

        let (kill, mut killed) = oneshot::channel();
        let signals = self.signals.clone();
        let id = utterance.id;
        tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => {
                    match status {
                        Ok(status) if !status.success() => {
                            warn!(utterance_id = %id, %status, "text-to-speech exited abnormally");
                        }
                        Ok(_) => {}
                        Err(err) => warn!(utterance_id = %id, error = %err, "lost text-to-speech process"),
                    }
                    let _ = signals.send(EngineSignal::Completed(id));
                }
                _ = &mut killed => {
                    let _ = child.kill().await;
                }
            }
        });

        self.speaking = Some(Speaking { utterance, kill });
        Ok(())
    }

    fn kill_current(&mut self) -> Option<Utterance> {
        let speaking = self.speaking.take()?;
        let running = speaking.is_running();
        let _ = speaking.kill.send(());
        running.then_some(speaking.utterance)
    }
}

impl NarrationEngine for EspeakEngine {
    fn submit(&mut self, utterance: Utterance) -> Result<(), DomainError> {
        self.paused = None;
        self.speak(utterance)
    }

    fn pause(&mut self) {
        if let Some(utterance) = self.kill_current() {
            debug!(utterance_id = %utterance.id, "utterance paused");
            self.paused = Some(utterance);
        }
    }

    fn resume(&mut self) {
        let Some(utterance) = self.paused.take() else {
            return;
        };
        let id = utterance.id;
        if let Err(err) = self.speak(utterance) {
            warn!(utterance_id = %id, error = %err, "could not resume utterance");
        }
    }

    fn cancel_all(&mut self) {
        self.kill_current();
        self.paused = None;
    }

    fn is_producing_audio(&self) -> bool {
        self.speaking.as_ref().is_some_and(Speaking::is_running)
    }

    fn list_voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }
}

/// Builds the `espeak-ng` arguments for one utterance.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn command_args(utterance: &Utterance) -> Vec<String> {
    let words_per_minute = (BASE_WORDS_PER_MINUTE * utterance.rate).round().max(80.0) as u32;
    let pitch = (BASE_PITCH * utterance.pitch).round().clamp(0.0, 99.0) as u32;

    let mut args = Vec::with_capacity(7);
    if let Some(voice) = &utterance.voice {
        args.push("-v".to_owned());
        args.push(voice.as_str().to_owned());
    }
    args.extend([
        "-s".to_owned(),
        words_per_minute.to_string(),
        "-p".to_owned(),
        pitch.to_string(),
        utterance.text.clone(),
    ]);
    args
}

/// Parses the table printed by `espeak-ng --voices`.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  hi              --/M      Hindi              inc/hi
/// ```
///
/// The language column doubles as the voice identifier.
#[must_use]
pub fn parse_voice_list(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("Pty"))
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [_, lang, _, name, ..] = fields.as_slice() else {
                return None;
            };
            Some(Voice::new(*lang, name.replace('_', " "), *lang))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use moonbeams_core::engine::VoiceId;

    use super::*;

    const VOICES: &str = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  af              --/M      Afrikaans          gmw/af
 5  en-gb           --/M      English_(Great_Britain) gmw/en            (en 2)
 5  hi              --/M      Hindi              inc/hi
";

    fn utterance(voice: Option<&str>, rate: f32, pitch: f32) -> Utterance {
        Utterance {
            id: UtteranceId(1),
            text: "Once upon a time.".into(),
            voice: voice.map(VoiceId::new),
            rate,
            pitch,
        }
    }

    #[test]
    fn test_parse_voice_list_reads_language_and_name() {
        let voices = parse_voice_list(VOICES);

        assert_eq!(voices.len(), 3);
        assert_eq!(voices[1].id.as_str(), "en-gb");
        assert_eq!(voices[1].name, "English (Great Britain)");
        assert_eq!(voices[2].label(), "Hindi (hi)");
    }

    #[test]
    fn test_parse_voice_list_ignores_noise() {
        assert!(parse_voice_list("").is_empty());
        assert!(parse_voice_list("espeak-ng: command not found\n").is_empty());
    }

    #[test]
    fn test_command_args_apply_voice_rate_and_pitch() {
        let args = command_args(&utterance(Some("hi"), 0.95, 1.0));

        assert_eq!(
            args,
            vec!["-v", "hi", "-s", "166", "-p", "50", "Once upon a time."]
        );
    }

    #[test]
    fn test_command_args_without_voice_use_engine_default() {
        let args = command_args(&utterance(None, 1.0, 3.0));

        assert_eq!(args, vec!["-s", "175", "-p", "99", "Once upon a time."]);
    }

    #[tokio::test]
    async fn test_probe_of_missing_program_disables_narration() {
        let (signals, _rx) = mpsc::unbounded_channel();

        let engine = EspeakEngine::probe("moonbeams-no-such-program", signals).await;

        assert!(engine.is_none());
    }

    #[tokio::test]
    async fn test_resume_without_pause_is_noop() {
        let (signals, _rx) = mpsc::unbounded_channel();
        let mut engine = EspeakEngine {
            program: "moonbeams-no-such-program".into(),
            voices: Vec::new(),
            signals,
            speaking: None,
            paused: None,
        };

        engine.resume();
        engine.pause();

        assert!(!engine.is_producing_audio());
        assert!(engine.paused.is_none());
    }

    #[tokio::test]
    async fn test_submit_reports_spawn_failure() {
        let (signals, _rx) = mpsc::unbounded_channel();
        let mut engine = EspeakEngine {
            program: "moonbeams-no-such-program".into(),
            voices: Vec::new(),
            signals,
            speaking: None,
            paused: None,
        };

        let result = engine.submit(utterance(None, 1.0, 1.0));

        assert!(matches!(result, Err(DomainError::Engine(_))));
        assert!(!engine.is_producing_audio());
    }
}
