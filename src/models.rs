//! Core data models for the cover fixer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::CoverError;

/// A directory visited during the walk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Directory path
    pub path: PathBuf,
    /// Names of the files directly inside the directory, exactly as on disk
    pub file_names: Vec<OsString>,
    /// At least one file has an audio extension
    pub has_audio: bool,
    /// A file named exactly like the cover exists
    pub has_cover: bool,
}

impl DirectoryEntry {
    /// Whether this directory still needs a cover
    pub fn needs_cover(&self) -> bool {
        self.has_audio && !self.has_cover
    }
}

/// A file that could serve as the directory's cover
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCandidate {
    /// Full path to the image
    pub path: PathBuf,
}

impl ImageCandidate {
    /// Create a candidate from a directory and a file name
    pub fn new(dir: &Path, name: impl AsRef<Path>) -> Self {
        Self {
            path: dir.join(name),
        }
    }
}

/// What the classifier did with a directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum FixAction {
    /// No audio, nothing to do
    NoAudio,
    /// Cover already present
    CoverPresent,
    /// The single candidate was copied to the cover file
    Copied { from: PathBuf },
    /// Copying the single candidate failed
    CopyFailed,
    /// Zero or several candidates, needs a human
    Unresolved { candidates: usize },
}

impl FixAction {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FixAction::NoAudio => "no_audio",
            FixAction::CoverPresent => "cover_present",
            FixAction::Copied { .. } => "copied",
            FixAction::CopyFailed => "copy_failed",
            FixAction::Unresolved { .. } => "unresolved",
        }
    }
}

impl std::fmt::Display for FixAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A cover created by copying an image candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverCopy {
    /// Image the cover was copied from
    pub source: PathBuf,
    /// Created cover file
    pub cover: PathBuf,
    /// Bytes copied
    pub bytes: u64,
}

/// Result of a classifier run
#[derive(Debug, Serialize)]
pub struct FixReport {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Total number of directories visited
    pub total_dirs: u64,
    /// Number of audio-bearing directories
    pub audio_dirs: u64,
    /// Number of audio-bearing directories that already had a cover
    pub covers_present: u64,
    /// Covers created during this run
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub copied: Vec<CoverCopy>,
    /// Directories left for manual resolution, in walk order
    pub unresolved: Vec<PathBuf>,
    /// Errors encountered during the run
    #[serde(skip)]
    pub errors: Vec<CoverError>,
    /// Total duration in milliseconds
    pub duration_ms: u64,
}

impl Default for FixReport {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            total_dirs: 0,
            audio_dirs: 0,
            covers_present: 0,
            copied: Vec::new(),
            unresolved: Vec::new(),
            errors: Vec::new(),
            duration_ms: 0,
        }
    }
}

impl FixReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of errors
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Check if every audio directory ended up with a cover
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Terminal state of one directory in the manual resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveOutcome {
    /// A cover showed up
    Resolved,
    /// The directory does not exist
    Missing,
    /// The wait ran out of time or checks
    TimedOut,
    /// The wait was cancelled, or never started because of a cancellation
    Cancelled,
    /// A cover was seen but was gone again at the final check
    CoverRemoved,
}

impl ResolveOutcome {
    /// Every outcome, in summary order
    pub const ALL: [ResolveOutcome; 5] = [
        ResolveOutcome::Resolved,
        ResolveOutcome::Missing,
        ResolveOutcome::TimedOut,
        ResolveOutcome::Cancelled,
        ResolveOutcome::CoverRemoved,
    ];

    /// Whether the directory belongs in the unresolved output
    pub fn is_unresolved(&self) -> bool {
        !matches!(self, ResolveOutcome::Resolved)
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolveOutcome::Resolved => "resolved",
            ResolveOutcome::Missing => "missing",
            ResolveOutcome::TimedOut => "timed_out",
            ResolveOutcome::Cancelled => "cancelled",
            ResolveOutcome::CoverRemoved => "cover_removed",
        }
    }
}

impl std::fmt::Display for ResolveOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a manual resolver run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolveReport {
    /// Every input directory with its outcome, in input order
    pub outcomes: Vec<(PathBuf, ResolveOutcome)>,
}

impl ResolveReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one directory
    pub fn record(&mut self, dir: PathBuf, outcome: ResolveOutcome) {
        self.outcomes.push((dir, outcome));
    }

    /// Directories that are still unresolved, in input order
    pub fn unresolved(&self) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_unresolved())
            .map(|(dir, _)| dir.clone())
            .collect()
    }

    /// Count directories with the given outcome
    pub fn count(&self, outcome: ResolveOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == outcome).count()
    }

    /// One-line summary with a count for every outcome
    pub fn summary(&self) -> String {
        let unresolved: Vec<String> = ResolveOutcome::ALL
            .iter()
            .filter(|outcome| outcome.is_unresolved())
            .map(|outcome| format!("{} {}", self.count(*outcome), outcome))
            .collect();
        format!(
            "Resolved {} of {} folders ({})",
            self.count(ResolveOutcome::Resolved),
            self.outcomes.len(),
            unresolved.join(", ")
        )
    }
}
