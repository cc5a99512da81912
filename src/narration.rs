//! Voice guidance gated by a user controlled switch
use crate::itinerary::ManeuverStep;
use crate::services::speech::{select_voice, SpeechEngine};
use log::{debug, warn};

/// What happened to a narration request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Narration {
    Spoken,
    /// narration is switched off, the request was dropped
    Disabled,
    /// another utterance is still playing, the request was dropped
    Busy,
    /// the speech engine refused the utterance
    Failed,
}

/// Narration service owned by one navigator, speech stops when it is dropped.
///
/// At most one utterance plays at a time: a request arriving while the engine is still
/// speaking is dropped rather than queued.
pub struct NarrationService {
    engine: Box<dyn SpeechEngine>,
    enabled: bool,
    language: String,
    last_utterance: Option<String>,
}

impl NarrationService {
    pub fn new(engine: Box<dyn SpeechEngine>, language: String, enabled: bool) -> Self {
        NarrationService {
            engine,
            enabled,
            language,
            last_utterance: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_speaking(&mut self) -> bool {
        self.engine.is_speaking()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn last_utterance(&self) -> Option<&str> {
        self.last_utterance.as_deref()
    }

    /// Switch narration on or off, switching off silences the current utterance
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled && self.engine.is_speaking() {
            debug!("narration disabled, cancelling current utterance");
            self.engine.cancel();
        }
    }

    /// Flip the switch and return the new state
    pub fn toggle(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    pub fn narrate(&mut self, text: &str) -> Narration {
        if !self.enabled {
            return Narration::Disabled;
        }
        if self.engine.is_speaking() {
            debug!("already speaking, dropping: {}", text);
            return Narration::Busy;
        }

        let voices = self.engine.voices();
        let voice = select_voice(&voices, &self.language);
        match self.engine.speak(text, voice) {
            Ok(()) => {
                self.last_utterance = Some(text.to_string());
                Narration::Spoken
            }
            Err(e) => {
                warn!("speech engine failed: {}", e);
                Narration::Failed
            }
        }
    }

    pub fn narrate_step(&mut self, step: &ManeuverStep) -> Narration {
        self.narrate(&step.narration())
    }
}

impl Drop for NarrationService {
    fn drop(&mut self) {
        self.engine.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::speech::Voice;
    use crate::test_utils::{RecordingSpeech, SpeechLog};
    use std::sync::{Arc, Mutex};

    fn service(enabled: bool) -> (NarrationService, Arc<Mutex<SpeechLog>>) {
        let (engine, log) = RecordingSpeech::new(vec![
            Voice::new("Amelie", "fr-CA"),
            Voice::new("Samantha", "en-US"),
        ]);
        (
            NarrationService::new(Box::new(engine), "en-US".to_string(), enabled),
            log,
        )
    }

    #[test]
    fn speaks_with_the_preferred_voice() {
        let (mut narration, log) = service(true);
        assert_eq!(narration.narrate("Turn left"), Narration::Spoken);
        assert_eq!(narration.last_utterance(), Some("Turn left"));
        let log = log.lock().unwrap();
        assert_eq!(
            log.spoken,
            vec![("Turn left".to_string(), Some("Samantha".to_string()))]
        );
        assert_eq!(log.cancels, 0);
    }

    #[test]
    fn drops_requests_while_speaking() {
        let (mut narration, log) = service(true);
        narration.narrate("first");
        assert_eq!(narration.narrate("second"), Narration::Busy);
        log.lock().unwrap().speaking = false;
        assert_eq!(narration.narrate("third"), Narration::Spoken);
        let spoken: Vec<String> = log
            .lock()
            .unwrap()
            .spoken
            .iter()
            .map(|(text, _)| text.clone())
            .collect();
        assert_eq!(spoken, vec!["first", "third"]);
    }

    #[test]
    fn disabling_cancels_and_silences() {
        let (mut narration, log) = service(true);
        narration.narrate("Turn right");
        assert!(narration.is_speaking());

        assert!(!narration.toggle());
        assert!(!narration.is_speaking());
        assert_eq!(log.lock().unwrap().cancels, 1);
        assert_eq!(narration.narrate("Keep left"), Narration::Disabled);
        assert_eq!(log.lock().unwrap().spoken.len(), 1);
        assert_eq!(narration.last_utterance(), Some("Turn right"));

        assert!(narration.toggle());
        assert_eq!(narration.narrate("Keep left"), Narration::Spoken);
        assert_eq!(log.lock().unwrap().spoken.len(), 2);
    }

    #[test]
    fn starts_disabled_when_asked() {
        let (mut narration, log) = service(false);
        assert_eq!(narration.narrate("hello"), Narration::Disabled);
        assert!(log.lock().unwrap().spoken.is_empty());
    }

    #[test]
    fn dropping_the_service_cancels_speech() {
        let (mut narration, log) = service(true);
        narration.narrate("Continue");
        drop(narration);
        assert!(!log.lock().unwrap().speaking);
    }
}
