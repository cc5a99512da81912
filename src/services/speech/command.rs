//! Speak utterances by running a text to speech program such as espeak
use super::{SpeechEngine, Voice};
use crate::Error;
use city_navigator_derive::FromServiceConfig;
use log::{debug, warn};
use std::process::{Child, Command, Stdio};

/// Defines how to launch the speech program, one process per utterance
#[derive(Debug, FromServiceConfig)]
pub struct SpeechCommand {
    program: String,
    /// flag placed before the voice name
    voice_flag: String,
    /// comma separated voice names, each is also used as the voice's language tag
    voices: String,
    #[service_config(skip)]
    child: Option<Child>,
}

impl Default for SpeechCommand {
    fn default() -> Self {
        SpeechCommand {
            program: "espeak".to_string(),
            voice_flag: "-v".to_string(),
            voices: "en-us,en-gb,fr-fr,de,es".to_string(),
            child: None,
        }
    }
}

impl SpeechEngine for SpeechCommand {
    fn voices(&self) -> Vec<Voice> {
        self.voices
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| Voice::new(v, v))
            .collect()
    }

    fn speak(&mut self, utterance: &str, voice: Option<&Voice>) -> Result<(), Error> {
        self.cancel();
        let mut cmd = Command::new(&self.program);
        if let Some(voice) = voice {
            cmd.arg(&self.voice_flag).arg(voice.name());
        }
        debug!("speaking with {}: {}", self.program, utterance);
        let child = cmd
            .arg(utterance)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        self.child = Some(child);
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.child.take() {
            // kill fails if the process already exited which is fine
            let _ = child.kill();
            if let Err(e) = child.wait() {
                warn!("could not reap {} process: {}", self.program, e);
            }
        }
    }

    fn is_speaking(&mut self) -> bool {
        let running = match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        };
        if !running {
            self.child = None;
        }
        running
    }
}

impl Drop for SpeechCommand {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(program: &str, voices: &str) -> SpeechCommand {
        // struct update syntax can't move fields out of a type with a Drop impl
        let mut engine = SpeechCommand::default();
        engine.program = program.to_string();
        engine.voices = voices.to_string();
        engine
    }

    #[test]
    fn voices_come_from_the_configured_list() {
        let engine = engine("espeak", " en-us, fr-fr ,");
        assert_eq!(
            engine.voices(),
            vec![Voice::new("en-us", "en-us"), Voice::new("fr-fr", "fr-fr")]
        );
    }

    #[test]
    fn missing_program_is_an_error() {
        let mut engine = engine("city-navigator-no-such-speech-program", "en");
        assert!(engine.speak("hello", None).is_err());
        assert!(!engine.is_speaking());
    }
}
