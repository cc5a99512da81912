//! Speak narration through a platform speech engine
use crate::config::{FromServiceConfig, ServiceConfig};
use crate::Error;
use serde::Deserialize;
mod command;
pub use command::SpeechCommand;
mod transcript;
pub use transcript::Transcript;

/// A voice offered by a speech engine
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Voice {
    name: String,
    /// BCP 47 style language tag, e.g. "en-US"
    language: String,
}

impl Voice {
    pub fn new<S: Into<String>, L: Into<String>>(name: S, language: L) -> Self {
        Voice {
            name: name.into(),
            language: language.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

/// trait that defines how utterances are played back
pub trait SpeechEngine {
    /// Voices available to `speak`
    fn voices(&self) -> Vec<Voice>;

    /// Start speaking `utterance`, the engine's default voice is used when `voice` is None
    fn speak(&mut self, utterance: &str, voice: Option<&Voice>) -> Result<(), Error>;

    /// Stop the utterance in progress, if any
    fn cancel(&mut self);

    fn is_speaking(&mut self) -> bool;

    /// True when utterances get written to the terminal
    fn writes_to_terminal(&self) -> bool {
        false
    }

    /// Stop using the terminal, called before a full screen interface takes it over
    fn release_terminal(&mut self) {}
}

/// Pick the voice for `language`: an exact tag match first, then one sharing the primary
/// language subtag ("en" for "en-GB").
pub fn select_voice<'a>(voices: &'a [Voice], language: &str) -> Option<&'a Voice> {
    let wanted = normalize_tag(language);
    let primary = wanted.split('-').next().unwrap_or_default().to_string();
    voices
        .iter()
        .find(|v| normalize_tag(&v.language) == wanted)
        .or_else(|| {
            voices
                .iter()
                .find(|v| normalize_tag(&v.language).split('-').next() == Some(primary.as_str()))
        })
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_ascii_lowercase()
}

pub fn new_speech_handler(config: &ServiceConfig) -> Result<Box<dyn SpeechEngine>, Error> {
    match config.handler() {
        "command" => Ok(Box::new(SpeechCommand::from_config(config)?)),
        "transcript" => Ok(Box::new(Transcript::from_config(config)?)),
        _ => Err(Error::UnknownServiceHandler(format!(
            "no speech handler exists for: {}",
            config.handler()
        ))),
    }
}
