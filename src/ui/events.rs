use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use crate::config::PlayerConfig;
use crate::session::SessionEvent;

/// Raw terminal input, forwarded to the app loop.
#[derive(Debug, Clone)]
pub enum TerminalEvent {
    Key(KeyEvent),
    Resize,
}

/// What a key press means while no prompt is open.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Quit,
    OpenFolder,
    Session(SessionEvent),
}

pub struct EventHandler {
    event_sender: mpsc::UnboundedSender<TerminalEvent>,
    event_receiver: mpsc::UnboundedReceiver<TerminalEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();

        Self {
            event_sender,
            event_receiver,
        }
    }

    /// Starts forwarding terminal input into this handler's channel.
    pub fn spawn_reader(&self) {
        let sender = self.event_sender.clone();
        tokio::task::spawn_blocking(move || read_terminal_events(sender));
    }

    pub async fn next_event(&mut self) -> Option<TerminalEvent> {
        self.event_receiver.recv().await
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// Runs until the receiving side goes away.
fn read_terminal_events(sender: mpsc::UnboundedSender<TerminalEvent>) {
    loop {
        if sender.is_closed() {
            break;
        }

        match event::poll(Duration::from_millis(50)) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                debug!("Terminal poll failed: {}", e);
                break;
            }
        }

        let forwarded = match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                sender.send(TerminalEvent::Key(key))
            }
            Ok(Event::Resize(_, _)) => sender.send(TerminalEvent::Resize),
            Ok(_) => Ok(()),
            Err(e) => {
                debug!("Terminal read failed: {}", e);
                break;
            }
        };

        if forwarded.is_err() {
            break;
        }
    }
}

/// The player's single-key shortcuts.
pub fn key_to_app_event(key: KeyEvent, player: &PlayerConfig) -> Option<AppEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(AppEvent::Quit),
            _ => None,
        };
    }

    let session = |event| Some(AppEvent::Session(event));

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(AppEvent::Quit),
        KeyCode::Char('o') => Some(AppEvent::OpenFolder),

        // Transport
        KeyCode::Char(' ') | KeyCode::Char('k') => session(SessionEvent::TogglePlayPause),
        KeyCode::Char('0') => session(SessionEvent::Restart),

        // Scrubbing
        KeyCode::Left => session(SessionEvent::SeekRelative(-player.fine_seek_secs)),
        KeyCode::Right => session(SessionEvent::SeekRelative(player.fine_seek_secs)),
        KeyCode::Char('j') => session(SessionEvent::SeekRelative(-player.coarse_seek_secs)),
        KeyCode::Char('l') => session(SessionEvent::SeekRelative(player.coarse_seek_secs)),

        // Playlist
        KeyCode::Char('p') => session(SessionEvent::Previous),
        KeyCode::Char('n') => session(SessionEvent::Next),

        // Speed
        KeyCode::Char('z') => session(SessionEvent::AdjustRate(-player.rate_step)),
        KeyCode::Char('x') => session(SessionEvent::AdjustRate(player.rate_step)),
        KeyCode::Char('a') => session(SessionEvent::ResetRate),

        KeyCode::Enter => session(SessionEvent::AddAnnotation),

        _ => None,
    }
}
