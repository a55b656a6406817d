// reelmark library - core modules for the folder video player
// The session state machine knows nothing about terminals or files on disk

pub mod config;   // settings and preferences
pub mod error;    // user-facing failures
pub mod library;  // folder scanning and playlist ordering
pub mod session;  // playback cursor and transport intent
pub mod stats;    // per-file records and annotations
#[cfg(feature = "tui")]
pub mod ui;       // terminal interface

// Export the stuff other modules actually use
pub use config::Config;
pub use error::{PlayerError, Result};
pub use library::{FolderSelection, FolderSelector, FsDirectory, MediaEntry, OrderingPolicy, Playlist};
pub use session::{Command, PlaybackSession, ResumePolicy, SessionEvent, SessionState};
pub use stats::{Annotation, AnnotationIndex, StatsPatch, StatsRecord, StatsStore};
