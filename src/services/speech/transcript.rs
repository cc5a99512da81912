//! Print utterances to the terminal instead of speaking them
use super::{SpeechEngine, Voice};
use crate::Error;
use city_navigator_derive::FromServiceConfig;
use log::info;
use std::io::{self, Write};

#[derive(Debug, FromServiceConfig)]
pub struct Transcript {
    prefix: String,
    language: String,
    /// once the terminal is taken over utterances go to the log instead
    #[service_config(skip)]
    to_log: bool,
}

impl Default for Transcript {
    fn default() -> Self {
        Transcript {
            prefix: "[voice]".to_string(),
            language: "en-US".to_string(),
            to_log: false,
        }
    }
}

impl SpeechEngine for Transcript {
    fn voices(&self) -> Vec<Voice> {
        vec![Voice::new("transcript", self.language.clone())]
    }

    fn speak(&mut self, utterance: &str, _voice: Option<&Voice>) -> Result<(), Error> {
        if self.to_log {
            info!("{} {}", self.prefix, utterance);
            return Ok(());
        }
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{} {}", self.prefix, utterance)?;
        Ok(())
    }

    // printing finishes immediately so there is never anything to cancel
    fn cancel(&mut self) {}

    fn is_speaking(&mut self) -> bool {
        false
    }

    fn writes_to_terminal(&self) -> bool {
        !self.to_log
    }

    fn release_terminal(&mut self) {
        self.to_log = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_transcript_stays_off_the_terminal() {
        let mut engine = Transcript::default();
        assert!(engine.writes_to_terminal());
        engine.release_terminal();
        assert!(!engine.writes_to_terminal());
        assert!(engine.speak("Turn left", None).is_ok());
        assert!(!engine.is_speaking());
    }
}
