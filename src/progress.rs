//! Progress reporting module for classifier runs
//!
//! Emits one JSON object per line on stderr so a wrapping script can
//! follow a long walk over a large music library.

use serde::Serialize;
use std::cell::Cell;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::config::FixConfig;
use crate::models::FixReport;

/// Default minimum interval between two progress lines
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 500;

/// Start message sent when the walk begins
#[derive(Debug, Clone, Serialize)]
pub struct StartMessage {
    /// Message type identifier
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
    /// Walk root
    pub root: String,
    /// Whether copy failures go to the unresolved list
    pub escalate_copy_failures: bool,
    /// Whether copies are verified
    pub verify_copies: bool,
}

/// Progress message sent during the walk
#[derive(Debug, Clone, Serialize)]
pub struct ProgressMessage {
    /// Message type identifier ("p" for progress)
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
    /// Directories visited
    #[serde(rename = "d")]
    pub dirs: u64,
    /// Audio-bearing directories
    #[serde(rename = "a")]
    pub audio_dirs: u64,
    /// Covers created
    #[serde(rename = "c")]
    pub copied: usize,
    /// Unresolved directories
    #[serde(rename = "u")]
    pub unresolved: usize,
    /// Current directory
    pub dir: String,
}

/// Done message sent when the walk completes
#[derive(Debug, Clone, Serialize)]
pub struct DoneMessage {
    /// Message type identifier ("done" for completion)
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
    /// Total directories visited
    #[serde(rename = "td")]
    pub total_dirs: u64,
    /// Total audio-bearing directories
    #[serde(rename = "ad")]
    pub audio_dirs: u64,
    /// Covers created
    #[serde(rename = "cp")]
    pub copied: usize,
    /// Unresolved directories
    #[serde(rename = "ur")]
    pub unresolved: usize,
    /// Number of errors encountered
    #[serde(rename = "ec")]
    pub error_count: usize,
    /// Total duration in milliseconds
    pub ms: u64,
}

/// Progress reporter for outputting walk progress to stderr
///
/// Tracks timing and sequence numbers. A disabled reporter does nothing,
/// so callers can pass one unconditionally.
pub struct ProgressReporter {
    /// Whether progress reporting is enabled
    enabled: bool,
    /// Reporting interval in milliseconds
    interval_ms: u64,
    /// Last report time
    last_report: Cell<Instant>,
    /// Sequence number for messages
    seq: AtomicU64,
    /// Start time of the reporter
    start_time: Instant,
}

impl ProgressReporter {
    /// Create a new ProgressReporter
    ///
    /// # Arguments
    /// * `enabled` - Whether progress reporting is enabled
    /// * `interval_ms` - Minimum interval between progress messages in milliseconds
    pub fn new(enabled: bool, interval_ms: u64) -> Self {
        let now = Instant::now();
        Self {
            enabled,
            interval_ms,
            last_report: Cell::new(now),
            seq: AtomicU64::new(0),
            start_time: now,
        }
    }

    /// A reporter that never prints
    pub fn disabled() -> Self {
        Self::new(false, DEFAULT_PROGRESS_INTERVAL_MS)
    }

    /// Check if enough time has passed since the last report
    pub fn should_report(&self) -> bool {
        if !self.enabled {
            return false;
        }
        let elapsed = self.last_report.get().elapsed().as_millis() as u64;
        elapsed >= self.interval_ms
    }

    /// Get the next sequence number (monotonically increasing)
    pub fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Get the current timestamp in milliseconds since reporter creation
    pub fn current_timestamp(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    fn output_to_stderr<T: Serialize>(&self, msg: &T) {
        if let Ok(json) = serde_json::to_string(msg) {
            eprintln!("{}", json);
            std::io::stderr().flush().ok();
        }
    }

    /// Report the start of a walk
    pub fn report_start(&self, root: &Path, config: &FixConfig) {
        if !self.enabled {
            return;
        }

        let msg = StartMessage {
            msg_type: "start",
            seq: self.next_seq(),
            ts: self.current_timestamp(),
            root: root.to_string_lossy().to_string(),
            escalate_copy_failures: config.escalate_copy_failures,
            verify_copies: config.verify_copies,
        };
        self.output_to_stderr(&msg);
    }

    /// Report walk progress
    ///
    /// Returns true if a message was actually sent (respects interval timing).
    pub fn report_progress(&self, report: &FixReport, current_dir: &Path) -> bool {
        if !self.should_report() {
            return false;
        }

        let msg = ProgressMessage {
            msg_type: "p",
            seq: self.next_seq(),
            ts: self.current_timestamp(),
            dirs: report.total_dirs,
            audio_dirs: report.audio_dirs,
            copied: report.copied.len(),
            unresolved: report.unresolved.len(),
            dir: current_dir.to_string_lossy().to_string(),
        };
        self.output_to_stderr(&msg);
        self.last_report.set(Instant::now());
        true
    }

    /// Report walk completion
    pub fn report_done(&self, report: &FixReport) {
        if !self.enabled {
            return;
        }

        let msg = DoneMessage {
            msg_type: "done",
            seq: self.next_seq(),
            ts: self.current_timestamp(),
            total_dirs: report.total_dirs,
            audio_dirs: report.audio_dirs,
            copied: report.copied.len(),
            unresolved: report.unresolved.len(),
            error_count: report.error_count(),
            ms: report.duration_ms,
        };
        self.output_to_stderr(&msg);
    }

    /// Check if the reporter is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
