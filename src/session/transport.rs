use std::time::Duration;
use tracing::debug;

use super::{Command, SessionEvent};
use crate::library::Locator;

/// The media engine side of a session: takes commands, reports lifecycle
/// events (metadata ready, time advanced, ended).
pub trait Transport {
    fn apply(&mut self, command: &Command);

    /// Events produced since the last poll.
    fn poll(&mut self, elapsed: Duration) -> Vec<SessionEvent>;
}

/// Applies transport commands in order. Returns `true` when one of them
/// asks the front end to prompt for annotation text.
pub fn apply_all<T: Transport + ?Sized>(transport: &mut T, commands: Vec<Command>) -> bool {
    let mut prompt = false;
    for command in &commands {
        match command {
            Command::PromptAnnotation => prompt = true,
            other => transport.apply(other),
        }
    }
    prompt
}

/// A transport with no decoder behind it: a clock that advances at the
/// playback rate over a fixed duration. Lets the terminal front end drive a
/// session end to end.
#[derive(Debug, Clone)]
pub struct ClockTransport {
    source: Option<Locator>,
    duration: f64,
    position: f64,
    rate: f64,
    playing: bool,
    loaded: bool,
    metadata_pending: bool,
}

impl ClockTransport {
    pub fn new(duration: Duration) -> Self {
        Self {
            source: None,
            duration: duration.as_secs_f64(),
            position: 0.0,
            rate: 1.0,
            playing: false,
            loaded: false,
            metadata_pending: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> Option<&Locator> {
        self.source.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn position(&self) -> f64 {
        self.position
    }

    #[cfg(test)]
    pub(crate) fn rate(&self) -> f64 {
        self.rate
    }

    #[cfg(test)]
    pub(crate) fn is_playing(&self) -> bool {
        self.playing
    }
}

impl Transport for ClockTransport {
    fn apply(&mut self, command: &Command) {
        match command {
            Command::SetSource(locator) => {
                debug!("Transport source -> {}", locator);
                self.source = Some(locator.clone());
                self.position = 0.0;
                self.playing = false;
                self.loaded = false;
                self.metadata_pending = false;
            }
            Command::Load => self.metadata_pending = self.source.is_some(),
            Command::Unload => {
                self.source = None;
                self.position = 0.0;
                self.playing = false;
                self.loaded = false;
                self.metadata_pending = false;
            }
            Command::Play => self.playing = self.source.is_some(),
            Command::Pause => self.playing = false,
            Command::Seek(target) => self.position = target.clamp(0.0, self.duration),
            Command::SetRate(rate) => self.rate = *rate,
            Command::PromptAnnotation => {}
        }
    }

    fn poll(&mut self, elapsed: Duration) -> Vec<SessionEvent> {
        if self.metadata_pending {
            self.metadata_pending = false;
            self.loaded = true;
            return vec![SessionEvent::MetadataLoaded {
                duration: self.duration,
            }];
        }

        if !self.loaded || !self.playing {
            return Vec::new();
        }

        self.position += elapsed.as_secs_f64() * self.rate;
        if self.position >= self.duration {
            self.position = self.duration;
            self.playing = false;
            return vec![
                SessionEvent::TimeUpdate {
                    position: self.position,
                },
                SessionEvent::Ended,
            ];
        }

        vec![SessionEvent::TimeUpdate {
            position: self.position,
        }]
    }
}
