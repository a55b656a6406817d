use super::{key_to_app_event, AppEvent, EventHandler, TerminalEvent, TerminalManager};
use crate::config::Config;
use crate::library::{FolderSelection, FolderSelector, FsDirectory};
use crate::session::{apply_all, ClockTransport, Command, PlaybackSession, SessionEvent, Transport};
use crate::stats::{AnnotationIndex, AnnotationView, StatsStore};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

const SHORTCUTS: &str =
    "space/k play  ←/→ ±3.7s  j/l ±8s  p/n prev/next  z/x speed  a 1.0x  0 restart  enter note  o open  q quit";

#[derive(Debug, Clone, PartialEq)]
enum InputMode {
    Normal,
    FolderPrompt(String),
    AnnotationPrompt(String),
}

pub struct App {
    config: Config,
    terminal: TerminalManager,
    event_handler: EventHandler,
    store: StatsStore,
    session: PlaybackSession,
    transport: ClockTransport,
    selector: FolderSelector,

    // UI state
    mode: InputMode,
    status: Option<String>,
    annotations: AnnotationView,
    list_state: ListState,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config, store: StatsStore) -> Result<Self> {
        let terminal = TerminalManager::new()?;
        let session = PlaybackSession::new(config.player.resume);
        let transport = ClockTransport::new(config.ui.simulated_duration());
        let selector = FolderSelector::new(config.player.media_extension.clone(), config.player.ordering);
        let annotations = AnnotationIndex::render_all(&store);

        Ok(Self {
            config,
            terminal,
            event_handler: EventHandler::new(),
            store,
            session,
            transport,
            selector,
            mode: InputMode::Normal,
            status: None,
            annotations,
            list_state: ListState::default(),
            should_quit: false,
        })
    }

    /// Runs until the user quits, then hands the store back for teardown.
    pub async fn run(mut self, folder: Option<PathBuf>) -> Result<StatsStore> {
        self.event_handler.spawn_reader();

        if let Some(folder) = folder {
            self.open_folder(FsDirectory::chosen(folder)).await;
        }

        let mut ticker = tokio::time::interval(self.config.ui.tick());
        let mut last_tick = Instant::now();

        while !self.should_quit {
            self.render()?;

            tokio::select! {
                event = self.event_handler.next_event() => match event {
                    Some(TerminalEvent::Key(key)) => self.handle_key(key).await,
                    Some(TerminalEvent::Resize) => {}
                    None => self.should_quit = true,
                },
                _ = ticker.tick() => {
                    let elapsed = last_tick.elapsed();
                    last_tick = Instant::now();
                    self.on_tick(elapsed);
                }
            }
        }

        info!("Player closed");
        Ok(self.store)
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        match std::mem::replace(&mut self.mode, InputMode::Normal) {
            InputMode::Normal => match key_to_app_event(key, &self.config.player) {
                // Esc dismisses an alert before it quits
                Some(AppEvent::Quit) if key.code == KeyCode::Esc && self.status.is_some() => {
                    self.status = None;
                }
                Some(AppEvent::Quit) => self.should_quit = true,
                Some(AppEvent::OpenFolder) => {
                    let preset = self
                        .config
                        .media_directories
                        .first()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    self.mode = InputMode::FolderPrompt(preset);
                }
                Some(AppEvent::Session(event)) => {
                    self.status = None;
                    self.dispatch(event);
                }
                None => {}
            },
            InputMode::FolderPrompt(mut input) => match key.code {
                KeyCode::Enter => {
                    let chosen = input.trim();
                    let source = if chosen.is_empty() {
                        FsDirectory::cancelled()
                    } else {
                        FsDirectory::chosen(chosen)
                    };
                    self.open_folder(source).await;
                }
                KeyCode::Esc => self.open_folder(FsDirectory::cancelled()).await,
                code => {
                    edit_line(&mut input, code);
                    self.mode = InputMode::FolderPrompt(input);
                }
            },
            InputMode::AnnotationPrompt(mut input) => match key.code {
                KeyCode::Enter => self.finish_annotation(Some(input)),
                KeyCode::Esc => self.finish_annotation(None),
                code => {
                    edit_line(&mut input, code);
                    self.mode = InputMode::AnnotationPrompt(input);
                }
            },
        }
    }

    async fn open_folder(&mut self, source: FsDirectory) {
        match self.selector.select(&source, &self.store).await {
            Ok(FolderSelection::Cancelled) => {}
            Ok(FolderSelection::Loaded { folder, playlist }) => {
                let commands = self.session.load_playlist(playlist, &mut self.store);
                self.apply(commands);
                self.list_state.select(self.session.current_index());
                self.status = Some(format!("Opened {}", folder.display()));
            }
            Err(e) => {
                warn!("Folder selection failed: {}", e);
                self.status = Some(e.to_string());
            }
        }
    }

    fn dispatch(&mut self, event: SessionEvent) {
        let commands = self.session.handle(event, &mut self.store);
        self.apply(commands);
        self.list_state.select(self.session.current_index());

        // the session dropped the prompt (switched entry), so stop collecting text
        if matches!(self.mode, InputMode::AnnotationPrompt(_)) && !self.session.awaiting_annotation() {
            self.mode = InputMode::Normal;
            self.status = Some("Annotation cancelled".to_string());
        }
    }

    fn apply(&mut self, commands: Vec<Command>) {
        if apply_all(&mut self.transport, commands) {
            self.mode = InputMode::AnnotationPrompt(String::new());
        }
    }

    fn finish_annotation(&mut self, text: Option<String>) {
        self.dispatch(SessionEvent::AnnotationEntered(text));
        self.annotations = AnnotationIndex::render_all(&self.store);
    }

    fn on_tick(&mut self, elapsed: std::time::Duration) {
        for event in self.transport.poll(elapsed) {
            self.dispatch(event);
        }
    }

    fn render(&mut self) -> Result<()> {
        let playlist_items: Vec<ListItem> = self
            .session
            .playlist()
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let marker = if Some(i) == self.session.current_index() {
                    "▶"
                } else if self.store.get(entry.name()).opened {
                    "✓"
                } else {
                    " "
                };
                ListItem::new(format!("{} {}", marker, entry.name()))
            })
            .collect();

        let title = self
            .session
            .label()
            .map(|name| format!(" {} ", name))
            .unwrap_or_else(|| " No folder open (press o) ".to_string());
        let summary = self
            .session
            .summary()
            .map(|s| s.to_string())
            .unwrap_or_default();
        let annotations = self.annotations.to_string();
        let notes_title = format!(" Annotations ({}) ", self.annotations.total());
        let prompt = match &self.mode {
            InputMode::Normal => self.status.clone().unwrap_or_else(|| SHORTCUTS.to_string()),
            InputMode::FolderPrompt(input) => format!("Folder: {}_", input),
            InputMode::AnnotationPrompt(input) => format!("Annotation: {}_", input),
        };
        let mut list_state = self.list_state.clone();

        self.terminal.draw(|f| {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(5), Constraint::Length(3), Constraint::Length(3)])
                .split(f.area());
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
                .split(rows[0]);

            let list = List::new(playlist_items)
                .block(Block::default().borders(Borders::ALL).title(title))
                .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            f.render_stateful_widget(list, columns[0], &mut list_state);

            let notes = Paragraph::new(annotations)
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title(notes_title));
            f.render_widget(notes, columns[1]);

            let stats = Paragraph::new(summary).block(Block::default().borders(Borders::ALL));
            f.render_widget(stats, rows[1]);

            let footer = Paragraph::new(prompt)
                .style(Style::default().fg(Color::Cyan))
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(footer, rows[2]);
        })?;

        self.list_state = list_state;
        Ok(())
    }
}

fn edit_line(input: &mut String, code: KeyCode) {
    match code {
        KeyCode::Char(c) => input.push(c),
        KeyCode::Backspace => {
            input.pop();
        }
        _ => {}
    }
}
