//! Finds music folders without a cover image and fixes them
//!
//! The classifier walks a tree and copies the only image of an audio
//! directory to `cover.jpg`. Directories with no image or several images
//! end up in an unresolved list, which the manual resolver opens one by
//! one in the file browser until a cover appears.

pub mod browser;
pub mod classifier;
pub mod config;
pub mod error;
pub mod models;
pub mod progress;
pub mod resolver;
pub mod unresolved_list;

pub use browser::{FileBrowser, SystemFileBrowser};
pub use classifier::{classify_directory, find_and_fix, find_and_fix_with_progress};
pub use config::{FixConfig, PollPolicy};
pub use error::{CoverError, CoverErrorKind};
pub use models::{
    CoverCopy, DirectoryEntry, FixAction, FixReport, ImageCandidate, ResolveOutcome,
    ResolveReport,
};
pub use progress::ProgressReporter;
pub use resolver::{resolve_all, resolve_directory, run_resolver, CancellationToken};
pub use unresolved_list::{read_list, write_list};
