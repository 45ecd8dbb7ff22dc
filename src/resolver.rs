//! Manual resolver - opens each unresolved directory and waits for a cover

use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::browser::FileBrowser;
use crate::config::PollPolicy;
use crate::error::{CoverError, Result};
use crate::models::{ResolveOutcome, ResolveReport};
use crate::unresolved_list::{read_list, write_list};

/// Longest uninterrupted sleep, bounds how late a cancellation is noticed
const CANCEL_CHECK_SLICE: Duration = Duration::from_millis(100);

/// Shared flag used to abort a running wait
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; every clone observes it
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Check for a file named `cover_name` in `dir`, ignoring letter case
pub fn has_cover_ignore_case(dir: &Path, cover_name: &str) -> Result<bool> {
    let wanted = cover_name.to_lowercase();
    for entry in fs::read_dir(dir).map_err(|e| CoverError::from(e).with_path(dir))? {
        let entry = entry.map_err(|e| CoverError::from(e).with_path(dir))?;
        if entry.file_name().to_string_lossy().to_lowercase() == wanted {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Sleep for `duration` in short slices; false if cancelled meanwhile
fn sleep_cancellable(duration: Duration, cancel: &CancellationToken) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        if cancel.is_cancelled() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep((deadline - now).min(CANCEL_CHECK_SLICE));
    }
}

/// Poll `dir` until a cover shows up or the policy gives up
///
/// Each iteration sleeps first and checks afterwards, so a cover that is
/// already there is noticed after one interval. A directory that
/// disappears while waiting ends the wait as [`ResolveOutcome::Missing`].
pub fn wait_for_cover(dir: &Path, policy: &PollPolicy, cancel: &CancellationToken) -> ResolveOutcome {
    let start = Instant::now();
    let mut polls: u32 = 0;

    loop {
        if !sleep_cancellable(policy.interval, cancel) {
            return ResolveOutcome::Cancelled;
        }
        polls += 1;

        match has_cover_ignore_case(dir, &policy.cover_file_name) {
            Ok(true) => {
                info!("'{}' found in: {}", policy.cover_file_name, dir.display());
                return ResolveOutcome::Resolved;
            }
            Ok(false) => {
                info!("No cover file found in: {}. Please add it.", dir.display());
            }
            Err(err) => {
                if !dir.is_dir() {
                    warn!("Folder disappeared while waiting: {}", dir.display());
                    return ResolveOutcome::Missing;
                }
                warn!("Could not check {}: {}", dir.display(), err);
            }
        }

        if policy.max_polls.is_some_and(|max| polls >= max) {
            return ResolveOutcome::TimedOut;
        }
        if policy.timeout.is_some_and(|limit| start.elapsed() >= limit) {
            return ResolveOutcome::TimedOut;
        }
    }
}

/// Combine the wait result with the final cover check
fn settle_outcome(waited: ResolveOutcome, cover_present: bool) -> ResolveOutcome {
    match (waited, cover_present) {
        (_, true) => ResolveOutcome::Resolved,
        (ResolveOutcome::Resolved, false) => ResolveOutcome::CoverRemoved,
        (other, false) => other,
    }
}

/// Drive one directory from the existence check to a terminal outcome
pub fn resolve_directory(
    dir: &Path,
    browser: &dyn FileBrowser,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> ResolveOutcome {
    if !dir.is_dir() {
        println!("Folder does not exist: {}", dir.display());
        return ResolveOutcome::Missing;
    }
    if cancel.is_cancelled() {
        return ResolveOutcome::Cancelled;
    }

    println!("Checking folder: {}", dir.display());
    if let Err(err) = browser.open(dir) {
        warn!("{}", err);
    }

    let waited = wait_for_cover(dir, policy, cancel);
    if waited == ResolveOutcome::Missing {
        return waited;
    }

    // Final check, the cover may have arrived or gone since the last poll.
    let final_check = has_cover_ignore_case(dir, &policy.cover_file_name);
    if let Err(err) = &final_check {
        warn!("Could not check {}: {}", dir.display(), err);
    }
    let outcome = settle_outcome(waited, final_check.unwrap_or(false));

    if outcome.is_unresolved() {
        println!("Unresolved ({}): {}", outcome, dir.display());
    }
    outcome
}

/// Resolve every directory in order, collecting their outcomes
pub fn resolve_all(
    dirs: &[PathBuf],
    browser: &dyn FileBrowser,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> ResolveReport {
    let mut report = ResolveReport::new();
    for dir in dirs {
        let outcome = resolve_directory(dir, browser, policy, cancel);
        info!("{}: {}", dir.display(), outcome);
        report.record(dir.clone(), outcome);
    }
    report
}

/// Read `input`, resolve its directories and write the leftovers to `output`
///
/// The output file is always written, even when nothing is left.
pub fn run_resolver(
    input: &Path,
    output: &Path,
    browser: &dyn FileBrowser,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<ResolveReport> {
    let dirs = read_list(input)?;
    info!("Loaded {} folders from {}", dirs.len(), input.display());

    let report = resolve_all(&dirs, browser, policy, cancel);
    write_list(output, &report.unresolved())?;
    Ok(report)
}
