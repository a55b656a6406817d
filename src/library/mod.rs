pub mod entry;
pub mod playlist;
pub mod scanner;

pub use entry::{Locator, MediaEntry, RawEntry};
pub use playlist::{OrderingPolicy, Playlist};
pub use scanner::{DirectorySource, FolderSelection, FolderSelector, FsDirectory};

/// The container every folder scan filters for unless configured otherwise.
pub const DEFAULT_EXTENSION: &str = "webm";

/// Case-insensitive extension check on a bare filename. A name that is
/// only the extension (`.webm`) counts; directory scans skip dotfiles
/// before this is reached.
pub fn has_extension(name: &str, extension: &str) -> bool {
    let extension = extension.trim_start_matches('.');
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(extension))
}
