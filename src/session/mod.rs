// Playback session - the cursor over the playlist and everything the
// transport should be doing right now. Input and transport callbacks come in
// as SessionEvents, transport work goes out as Commands.

pub mod transport;

pub use transport::{apply_all, ClockTransport, Transport};

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use crate::library::{Locator, MediaEntry, Playlist};
use crate::stats::annotations::format_seconds;
use crate::stats::{Annotation, AnnotationIndex, StatsPatch, StatsStore};

/// Lowest playback rate `AdjustRate` can reach.
pub const MIN_PLAYBACK_RATE: f64 = 0.2;

/// Whether a file picks up where it was left last time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResumePolicy {
    /// Checkpoint the position on every tick and seek back to it on load.
    #[default]
    Resume,
    /// Always start at 0 and never store positions.
    RestartFromZero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Paused,
    Playing,
}

/// Everything that can happen to a session: user input and transport callbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TogglePlayPause,
    SeekRelative(f64),
    Next,
    Previous,
    Restart,
    AdjustRate(f64),
    ResetRate,
    AddAnnotation,
    /// Answer to a [`Command::PromptAnnotation`]; `None` if the prompt was dismissed.
    AnnotationEntered(Option<String>),
    MetadataLoaded { duration: f64 },
    TimeUpdate { position: f64 },
    Ended,
}

/// Work for the transport adapter, in the order it must be applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetSource(Locator),
    Load,
    Unload,
    Play,
    Pause,
    Seek(f64),
    SetRate(f64),
    /// Ask the user for annotation text, then deliver
    /// [`SessionEvent::AnnotationEntered`].
    PromptAnnotation,
}

#[derive(Debug, Clone)]
struct PendingAnnotation {
    name: String,
    time_ms: u64,
    was_playing: bool,
}

/// One line of "where are we" for the status bar.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSummary {
    pub index: usize,
    pub total: usize,
    pub position: f64,
    pub duration: Option<f64>,
    pub rate: f64,
    pub previously_watched: bool,
}

impl fmt::Display for PlaybackSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Video {} of {} | {} / {} | Speed: {:.1}x | {}",
            self.index + 1,
            self.total,
            format_seconds(self.position),
            format_seconds(self.duration.unwrap_or(f64::NAN)),
            self.rate,
            if self.previously_watched { "Previously watched" } else { "New" }
        )
    }
}

pub struct PlaybackSession {
    playlist: Playlist,
    current_index: Option<usize>,
    is_playing: bool,
    playback_rate: f64,
    resume: ResumePolicy,

    // Last values reported by the transport for the current entry
    position: f64,
    duration: Option<f64>,

    pending_resume: Option<f64>,
    previously_watched: bool,
    pending_annotation: Option<PendingAnnotation>,
}

impl PlaybackSession {
    pub fn new(resume: ResumePolicy) -> Self {
        Self {
            playlist: Playlist::default(),
            current_index: None,
            is_playing: false,
            playback_rate: 1.0,
            resume,
            position: 0.0,
            duration: None,
            pending_resume: None,
            previously_watched: false,
            pending_annotation: None,
        }
    }

    pub fn state(&self) -> SessionState {
        match (self.current_entry(), self.is_playing) {
            (None, _) => SessionState::Empty,
            (Some(_), true) => SessionState::Playing,
            (Some(_), false) => SessionState::Paused,
        }
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_entry(&self) -> Option<&MediaEntry> {
        self.current_index.and_then(|i| self.playlist.get(i))
    }

    /// Name of the entry on screen, if any.
    pub fn label(&self) -> Option<&str> {
        self.current_entry().map(|e| e.name())
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn awaiting_annotation(&self) -> bool {
        self.pending_annotation.is_some()
    }

    pub fn summary(&self) -> Option<PlaybackSummary> {
        let index = self.current_index?;
        Some(PlaybackSummary {
            index,
            total: self.playlist.len(),
            position: self.position,
            duration: self.duration,
            rate: self.playback_rate,
            previously_watched: self.previously_watched,
        })
    }

    /// Swaps in a freshly selected folder and starts on its first entry.
    pub fn load_playlist(&mut self, playlist: Playlist, store: &mut StatsStore) -> Vec<Command> {
        self.checkpoint(store);
        self.pending_annotation = None;
        self.playlist = playlist;

        if self.playlist.is_empty() {
            self.current_index = None;
            self.is_playing = false;
            self.position = 0.0;
            self.duration = None;
            return vec![Command::Unload];
        }

        info!("Playlist loaded with {} entries", self.playlist.len());
        self.current_index = Some(0);
        self.load_current(store)
    }

    /// Transition function. Events that make no sense in the current state
    /// (anything but a playlist load while empty, say) produce no commands.
    pub fn handle(&mut self, event: SessionEvent, store: &mut StatsStore) -> Vec<Command> {
        if self.current_entry().is_none() {
            debug!("Ignoring {:?}: no playlist loaded", event);
            return Vec::new();
        }

        match event {
            SessionEvent::TogglePlayPause => self.toggle_play_pause(),
            SessionEvent::SeekRelative(delta) => self.seek_relative(delta),
            SessionEvent::Next => self.navigate(store, Playlist::next_index),
            SessionEvent::Previous => self.navigate(store, Playlist::previous_index),
            SessionEvent::Restart => self.restart(),
            SessionEvent::AdjustRate(delta) => self.adjust_rate(delta),
            SessionEvent::ResetRate => self.set_rate(1.0),
            SessionEvent::AddAnnotation => self.begin_annotation(),
            SessionEvent::AnnotationEntered(text) => self.finish_annotation(text, store),
            SessionEvent::MetadataLoaded { duration } => self.on_metadata(duration),
            SessionEvent::TimeUpdate { position } => self.on_time_update(position, store),
            SessionEvent::Ended => {
                debug!("End of media, advancing");
                self.navigate(store, Playlist::next_index)
            }
        }
    }

    fn load_current(&mut self, store: &mut StatsStore) -> Vec<Command> {
        let Some(entry) = self.current_entry().cloned() else {
            return Vec::new();
        };

        let record = store.get(entry.name());
        self.previously_watched = record.opened;
        self.pending_resume = match self.resume {
            ResumePolicy::Resume => record.current_time,
            ResumePolicy::RestartFromZero => None,
        };
        self.position = 0.0;
        self.duration = None;
        self.is_playing = false;

        if let Err(e) = store.put(entry.name(), StatsPatch::opened()) {
            warn!("Could not mark '{}' as opened: {}", entry.name(), e);
        }

        info!("Loading '{}'", entry.name());
        vec![Command::SetSource(entry.locator().clone()), Command::Load]
    }

    // Duration is only known from here on, so the resume seek waits for it.
    fn on_metadata(&mut self, duration: f64) -> Vec<Command> {
        if !duration.is_finite() || duration < 0.0 {
            warn!("Transport reported unusable duration {}", duration);
            self.duration = None;
        } else {
            self.duration = Some(duration);
        }

        let target = match (self.pending_resume.take(), self.duration) {
            (Some(stored), Some(duration)) if stored > 0.0 && stored < duration => {
                debug!("Resuming at {:.1}s", stored);
                stored
            }
            _ => 0.0,
        };

        self.position = target;
        let mut commands = vec![Command::Seek(target), Command::SetRate(self.playback_rate)];
        match self.pending_annotation.as_mut() {
            // hold still until the prompt is answered, then start
            Some(pending) => pending.was_playing = true,
            None => {
                self.is_playing = true;
                commands.push(Command::Play);
            }
        }
        commands
    }

    fn on_time_update(&mut self, position: f64, store: &mut StatsStore) -> Vec<Command> {
        if position.is_finite() {
            self.position = position.max(0.0);
        }
        self.checkpoint(store);
        Vec::new()
    }

    /// Best-effort save of the current position. Skipped until metadata has
    /// arrived, so an entry abandoned mid-load keeps its stored position.
    fn checkpoint(&self, store: &mut StatsStore) {
        if self.resume != ResumePolicy::Resume || self.duration.is_none() {
            return;
        }
        let Some(name) = self.label() else {
            return;
        };

        if let Err(e) = store.put(name, StatsPatch::position(self.position)) {
            warn!("Checkpoint for '{}' failed: {}", name, e);
        }
    }

    fn navigate(
        &mut self,
        store: &mut StatsStore,
        step: fn(&Playlist, usize) -> Option<usize>,
    ) -> Vec<Command> {
        let Some(current) = self.current_index else {
            return Vec::new();
        };
        // the transport lets go of the old entry first
        self.checkpoint(store);
        self.pending_annotation = None;

        self.current_index = step(&self.playlist, current);
        self.load_current(store)
    }

    fn toggle_play_pause(&mut self) -> Vec<Command> {
        self.is_playing = !self.is_playing;
        if self.is_playing {
            vec![Command::Play]
        } else {
            vec![Command::Pause]
        }
    }

    fn restart(&mut self) -> Vec<Command> {
        self.position = 0.0;
        let mut commands = vec![Command::Seek(0.0)];
        if !self.is_playing {
            self.is_playing = true;
            commands.push(Command::Play);
        }
        commands
    }

    fn seek_relative(&mut self, delta: f64) -> Vec<Command> {
        if !delta.is_finite() {
            return Vec::new();
        }

        let mut target = (self.position + delta).max(0.0);
        if let Some(duration) = self.duration {
            target = target.min(duration);
        }

        self.position = target;
        vec![Command::Seek(target)]
    }

    fn adjust_rate(&mut self, delta: f64) -> Vec<Command> {
        if !delta.is_finite() {
            return Vec::new();
        }
        self.set_rate(self.playback_rate + delta)
    }

    fn set_rate(&mut self, rate: f64) -> Vec<Command> {
        // keep 0.2 steps from accumulating float noise
        let rounded = (rate * 1_000_000.0).round() / 1_000_000.0;
        self.playback_rate = rounded.max(MIN_PLAYBACK_RATE);
        debug!("Playback rate {:.2}", self.playback_rate);
        vec![Command::SetRate(self.playback_rate)]
    }

    fn begin_annotation(&mut self) -> Vec<Command> {
        if self.pending_annotation.is_some() {
            return Vec::new();
        }
        let Some(name) = self.label().map(str::to_string) else {
            return Vec::new();
        };

        let was_playing = self.is_playing;
        self.pending_annotation = Some(PendingAnnotation {
            name,
            time_ms: (self.position * 1000.0).floor() as u64,
            was_playing,
        });

        let mut commands = Vec::new();
        if was_playing {
            self.is_playing = false;
            commands.push(Command::Pause);
        }
        commands.push(Command::PromptAnnotation);
        commands
    }

    fn finish_annotation(&mut self, text: Option<String>, store: &mut StatsStore) -> Vec<Command> {
        let Some(pending) = self.pending_annotation.take() else {
            return Vec::new();
        };

        let mut commands = Vec::new();
        if pending.was_playing {
            self.is_playing = true;
            commands.push(Command::Play);
        }

        match text.as_deref().and_then(|t| Annotation::from_input(pending.time_ms, t)) {
            Some(annotation) => {
                if let Err(e) = AnnotationIndex::append(store, &pending.name, annotation) {
                    warn!("Could not save annotation for '{}': {}", pending.name, e);
                }
            }
            None => debug!("Empty annotation discarded"),
        }

        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{OrderingPolicy, RawEntry};
    use std::path::Path;

    fn playlist(names: &[&str], store: &StatsStore) -> Playlist {
        let raw = names
            .iter()
            .map(|n| RawEntry::new(*n, format!("/videos/{}", n)));
        Playlist::ingest(Path::new("/videos"), raw, "webm", OrderingPolicy::UnopenedFirst, store)
            .unwrap()
    }

    fn loaded(names: &[&str], resume: ResumePolicy, store: &mut StatsStore) -> PlaybackSession {
        let mut session = PlaybackSession::new(resume);
        let list = playlist(names, store);
        session.load_playlist(list, store);
        session
    }

    #[test]
    fn test_empty_session_ignores_everything() {
        let mut store = StatsStore::in_memory();
        let mut session = PlaybackSession::new(ResumePolicy::Resume);

        for event in [
            SessionEvent::Next,
            SessionEvent::Previous,
            SessionEvent::Restart,
            SessionEvent::TogglePlayPause,
            SessionEvent::SeekRelative(5.0),
            SessionEvent::AdjustRate(0.2),
            SessionEvent::AddAnnotation,
            SessionEvent::Ended,
        ] {
            assert!(session.handle(event, &mut store).is_empty());
        }
        assert_eq!(session.state(), SessionState::Empty);
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_select_folder_loads_first_entry() {
        let mut store = StatsStore::in_memory();
        let mut session = PlaybackSession::new(ResumePolicy::Resume);
        let list = playlist(&["b.webm", "a.webm"], &store);

        let commands = session.load_playlist(list, &mut store);
        assert_eq!(session.current_index(), Some(0));
        assert_eq!(session.label(), Some("a.webm"));
        assert_eq!(
            commands,
            vec![
                Command::SetSource(Locator::from_path(Path::new("/videos/a.webm"))),
                Command::Load
            ]
        );
        assert!(store.get("a.webm").opened);
        assert!(!store.get("b.webm").opened);
        assert_eq!(session.state(), SessionState::Paused);

        let commands = session.handle(SessionEvent::MetadataLoaded { duration: 120.0 }, &mut store);
        assert_eq!(
            commands,
            vec![Command::Seek(0.0), Command::SetRate(1.0), Command::Play]
        );
        assert_eq!(session.state(), SessionState::Playing);
    }

    #[test]
    fn test_resume_seeks_after_metadata() {
        let mut store = StatsStore::in_memory();
        store.put("a.webm", StatsPatch::position(42.0)).unwrap();

        let mut session = loaded(&["a.webm"], ResumePolicy::Resume, &mut store);
        let commands = session.handle(SessionEvent::MetadataLoaded { duration: 100.0 }, &mut store);
        assert_eq!(commands[0], Command::Seek(42.0));
        assert_eq!(session.position(), 42.0);
    }

    #[test]
    fn test_resume_ignores_out_of_range_positions() {
        let mut store = StatsStore::in_memory();
        store.put("a.webm", StatsPatch::position(100.0)).unwrap();

        let mut session = loaded(&["a.webm"], ResumePolicy::Resume, &mut store);
        let commands = session.handle(SessionEvent::MetadataLoaded { duration: 100.0 }, &mut store);
        assert_eq!(commands[0], Command::Seek(0.0));
    }

    #[test]
    fn test_restart_policy_never_stores_position() {
        let mut store = StatsStore::in_memory();
        store.put("a.webm", StatsPatch::position(42.0)).unwrap();

        let mut session = loaded(&["a.webm", "b.webm"], ResumePolicy::RestartFromZero, &mut store);
        let commands = session.handle(SessionEvent::MetadataLoaded { duration: 100.0 }, &mut store);
        assert_eq!(commands[0], Command::Seek(0.0));

        session.handle(SessionEvent::TimeUpdate { position: 77.0 }, &mut store);
        session.handle(SessionEvent::Next, &mut store);
        assert_eq!(store.get("a.webm").current_time, Some(42.0));
    }

    #[test]
    fn test_time_updates_checkpoint_position() {
        let mut store = StatsStore::in_memory();
        let mut session = loaded(&["a.webm"], ResumePolicy::Resume, &mut store);

        // nothing is stored before metadata arrives
        session.handle(SessionEvent::TimeUpdate { position: 0.0 }, &mut store);
        assert_eq!(store.get("a.webm").current_time, None);

        session.handle(SessionEvent::MetadataLoaded { duration: 60.0 }, &mut store);
        session.handle(SessionEvent::TimeUpdate { position: 12.25 }, &mut store);
        assert_eq!(store.get("a.webm").current_time, Some(12.25));
        assert_eq!(session.summary().unwrap().position, 12.25);
    }

    #[test]
    fn test_navigation_checkpoints_before_switching() {
        let mut store = StatsStore::in_memory();
        let mut session = loaded(&["a.webm", "b.webm"], ResumePolicy::Resume, &mut store);
        session.handle(SessionEvent::MetadataLoaded { duration: 60.0 }, &mut store);
        session.handle(SessionEvent::SeekRelative(30.0), &mut store);

        session.handle(SessionEvent::Next, &mut store);
        assert_eq!(session.label(), Some("b.webm"));
        assert_eq!(store.get("a.webm").current_time, Some(30.0));
        assert!(store.get("b.webm").opened);
    }

    #[test]
    fn test_navigation_wraps_both_ways() {
        let mut store = StatsStore::in_memory();
        let mut session = loaded(&["a.webm", "b.webm", "c.webm"], ResumePolicy::Resume, &mut store);

        session.handle(SessionEvent::Previous, &mut store);
        assert_eq!(session.current_index(), Some(2));

        for _ in 0..3 {
            session.handle(SessionEvent::Next, &mut store);
        }
        assert_eq!(session.current_index(), Some(2));
    }

    #[test]
    fn test_ended_advances() {
        let mut store = StatsStore::in_memory();
        let mut session = loaded(&["a.webm", "b.webm"], ResumePolicy::Resume, &mut store);
        session.handle(SessionEvent::MetadataLoaded { duration: 10.0 }, &mut store);
        session.handle(SessionEvent::TimeUpdate { position: 10.0 }, &mut store);

        let commands = session.handle(SessionEvent::Ended, &mut store);
        assert_eq!(session.label(), Some("b.webm"));
        assert!(matches!(commands[0], Command::SetSource(_)));

        // a finished file starts over next time
        assert_eq!(store.get("a.webm").current_time, Some(10.0));
    }

    #[test]
    fn test_seek_is_clamped() {
        let mut store = StatsStore::in_memory();
        let mut session = loaded(&["a.webm"], ResumePolicy::Resume, &mut store);

        // before metadata only the lower bound applies
        session.handle(SessionEvent::SeekRelative(-3.7), &mut store);
        assert_eq!(session.position(), 0.0);

        session.handle(SessionEvent::MetadataLoaded { duration: 20.0 }, &mut store);
        assert_eq!(session.duration(), Some(20.0));
        for delta in [8.0, 3.7, 1e12, -1e12, -8.0, 3.7, f64::INFINITY] {
            let commands = session.handle(SessionEvent::SeekRelative(delta), &mut store);
            assert!((0.0..=20.0).contains(&session.position()));
            if let Some(Command::Seek(target)) = commands.first() {
                assert!((0.0..=20.0).contains(target));
            }
        }
        session.handle(SessionEvent::SeekRelative(1e9), &mut store);
        assert_eq!(session.position(), 20.0);
    }

    #[test]
    fn test_rate_floor_and_reset() {
        let mut store = StatsStore::in_memory();
        let mut session = loaded(&["a.webm"], ResumePolicy::Resume, &mut store);

        for _ in 0..20 {
            session.handle(SessionEvent::AdjustRate(-0.2), &mut store);
            assert!(session.playback_rate() >= MIN_PLAYBACK_RATE);
        }
        assert_eq!(session.playback_rate(), MIN_PLAYBACK_RATE);

        for _ in 0..15 {
            session.handle(SessionEvent::AdjustRate(0.2), &mut store);
        }
        assert_eq!(session.playback_rate(), 3.2);

        let commands = session.handle(SessionEvent::ResetRate, &mut store);
        assert_eq!(commands, vec![Command::SetRate(1.0)]);
        assert_eq!(session.playback_rate(), 1.0);
    }

    #[test]
    fn test_restart_and_toggle() {
        let mut store = StatsStore::in_memory();
        let mut session = loaded(&["a.webm"], ResumePolicy::Resume, &mut store);
        session.handle(SessionEvent::MetadataLoaded { duration: 20.0 }, &mut store);
        session.handle(SessionEvent::TimeUpdate { position: 15.0 }, &mut store);

        assert_eq!(
            session.handle(SessionEvent::TogglePlayPause, &mut store),
            vec![Command::Pause]
        );
        assert_eq!(session.state(), SessionState::Paused);

        let commands = session.handle(SessionEvent::Restart, &mut store);
        assert_eq!(commands, vec![Command::Seek(0.0), Command::Play]);
        assert_eq!(session.state(), SessionState::Playing);

        assert_eq!(
            session.handle(SessionEvent::Restart, &mut store),
            vec![Command::Seek(0.0)]
        );
    }

    #[test]
    fn test_annotation_pauses_and_resumes() {
        let mut store = StatsStore::in_memory();
        store.put("a.webm", StatsPatch::position(5.0)).unwrap();
        let mut session = loaded(&["a.webm"], ResumePolicy::Resume, &mut store);
        session.handle(SessionEvent::MetadataLoaded { duration: 20.0 }, &mut store);
        session.handle(SessionEvent::TimeUpdate { position: 1.5009 }, &mut store);

        let commands = session.handle(SessionEvent::AddAnnotation, &mut store);
        assert_eq!(commands, vec![Command::Pause, Command::PromptAnnotation]);
        assert!(session.awaiting_annotation());

        let commands = session.handle(
            SessionEvent::AnnotationEntered(Some("  note ".into())),
            &mut store,
        );
        assert_eq!(commands, vec![Command::Play]);

        let record = store.get("a.webm");
        assert!(record.opened);
        assert_eq!(record.current_time, Some(1.5009));
        assert_eq!(
            record.annotations,
            Some(vec![Annotation { time_ms: 1500, text: "note".into() }])
        );

        let view = AnnotationIndex::render_all(&store);
        assert_eq!(view.group("a.webm").unwrap().items[0].time_formatted, "0:01");
    }

    #[test]
    fn test_metadata_during_prompt_waits_for_the_answer() {
        let mut store = StatsStore::in_memory();
        let mut session = loaded(&["a.webm", "b.webm"], ResumePolicy::Resume, &mut store);

        let commands = session.handle(SessionEvent::AddAnnotation, &mut store);
        assert_eq!(commands, vec![Command::PromptAnnotation]);

        let commands = session.handle(SessionEvent::MetadataLoaded { duration: 5.0 }, &mut store);
        assert_eq!(commands, vec![Command::Seek(0.0), Command::SetRate(1.0)]);
        assert!(!session.is_playing());
        assert!(session.awaiting_annotation());

        let commands = session.handle(
            SessionEvent::AnnotationEntered(Some("typed note".into())),
            &mut store,
        );
        assert_eq!(commands, vec![Command::Play]);
        assert!(session.is_playing());
        assert_eq!(session.label(), Some("a.webm"));
        assert_eq!(
            store.get("a.webm").annotations,
            Some(vec![Annotation { time_ms: 0, text: "typed note".into() }])
        );
    }

    #[test]
    fn test_blank_annotation_is_dropped_and_paused_stays_paused() {
        let mut store = StatsStore::in_memory();
        let mut session = loaded(&["a.webm"], ResumePolicy::Resume, &mut store);

        let commands = session.handle(SessionEvent::AddAnnotation, &mut store);
        assert_eq!(commands, vec![Command::PromptAnnotation]);

        let commands = session.handle(SessionEvent::AnnotationEntered(Some("   ".into())), &mut store);
        assert!(commands.is_empty());
        assert_eq!(store.get("a.webm").annotations, None);

        session.handle(SessionEvent::AddAnnotation, &mut store);
        session.handle(SessionEvent::AnnotationEntered(None), &mut store);
        assert_eq!(store.get("a.webm").annotations, None);
    }

    #[test]
    fn test_summary_reports_watch_state_before_load() {
        let mut store = StatsStore::in_memory();
        store.put("b.webm", StatsPatch::opened()).unwrap();
        let mut session = loaded(&["a.webm", "b.webm"], ResumePolicy::Resume, &mut store);
        session.handle(SessionEvent::MetadataLoaded { duration: 75.0 }, &mut store);

        let summary = session.summary().unwrap();
        assert!(!summary.previously_watched);
        assert_eq!(summary.to_string(), "Video 1 of 2 | 0:00 / 1:15 | Speed: 1.0x | New");

        session.handle(SessionEvent::Next, &mut store);
        let summary = session.summary().unwrap();
        assert!(summary.previously_watched);
        assert_eq!(summary.to_string(), "Video 2 of 2 | 0:00 / 0:00 | Speed: 1.0x | Previously watched");
    }

    #[tokio::test]
    async fn test_empty_folder_leaves_session_alone() {
        use crate::error::PlayerError;
        use crate::library::{FolderSelector, FsDirectory};

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let mut store = StatsStore::in_memory();
        let session = loaded(&["a.webm", "b.webm"], ResumePolicy::Resume, &mut store);
        let selector = FolderSelector::new("webm", OrderingPolicy::UnopenedFirst);

        let err = selector
            .select(&FsDirectory::chosen(dir.path()), &store)
            .await
            .unwrap_err();
        assert!(matches!(err, PlayerError::NoMediaFound { .. }));
        assert_eq!(session.playlist().names(), vec!["a.webm", "b.webm"]);
        assert_eq!(session.current_index(), Some(0));
    }

    #[test]
    fn test_new_playlist_checkpoints_outgoing_entry() {
        let mut store = StatsStore::in_memory();
        let mut session = loaded(&["a.webm"], ResumePolicy::Resume, &mut store);
        session.handle(SessionEvent::MetadataLoaded { duration: 60.0 }, &mut store);
        session.handle(SessionEvent::TimeUpdate { position: 9.0 }, &mut store);

        let next = playlist(&["x.webm"], &store);
        session.load_playlist(next, &mut store);
        assert_eq!(store.get("a.webm").current_time, Some(9.0));
        assert_eq!(session.label(), Some("x.webm"));
        assert_eq!(session.current_index(), Some(0));
    }
}
