//! Classifier module - walks a music tree and fixes missing covers

use log::{debug, error, info, warn};
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::time::Instant;
use walkdir::WalkDir;

use crate::config::FixConfig;
use crate::error::{CoverError, Result};
use crate::models::{CoverCopy, DirectoryEntry, FixAction, FixReport, ImageCandidate};
use crate::progress::ProgressReporter;

/// Walk `root` and fix every audio directory that has exactly one image
pub fn find_and_fix(root: &Path, config: &FixConfig) -> Result<FixReport> {
    find_and_fix_with_progress(root, config, &ProgressReporter::disabled())
}

/// Walk `root` and fix covers, reporting progress through `reporter`
pub fn find_and_fix_with_progress(
    root: &Path,
    config: &FixConfig,
    reporter: &ProgressReporter,
) -> Result<FixReport> {
    if !root.is_dir() {
        return Err(CoverError::invalid_root(root.to_path_buf()));
    }

    let start = Instant::now();
    let mut report = FixReport::new();
    reporter.report_start(root, config);

    let walker = WalkDir::new(root)
        .follow_links(config.follow_links)
        .sort_by_file_name()
        .into_iter();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let err = CoverError::from(e);
                warn!("Skipping unreadable entry: {}", err);
                report.errors.push(err);
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let dir = entry.path();
        report.total_dirs += 1;

        let classified = match classify_directory(dir, config) {
            Ok(classified) => classified,
            Err(err) => {
                warn!("Could not list {}: {}", dir.display(), err);
                report.errors.push(err);
                continue;
            }
        };

        let action = fix_directory(&classified, config, &mut report);
        debug!("{}: {}", dir.display(), action);

        reporter.report_progress(&report, dir);
    }

    report.duration_ms = start.elapsed().as_millis() as u64;
    reporter.report_done(&report);
    Ok(report)
}

/// List a single directory and derive its audio and cover flags
pub fn classify_directory(dir: &Path, config: &FixConfig) -> Result<DirectoryEntry> {
    let mut file_names = Vec::new();

    for entry in fs::read_dir(dir).map_err(|e| CoverError::from(e).with_path(dir))? {
        let entry = entry.map_err(|e| CoverError::from(e).with_path(dir))?;
        let path = entry.path();
        // Symlinks to directories count as directories, everything else as a file.
        if path.is_dir() {
            continue;
        }
        file_names.push(entry.file_name());
    }
    file_names.sort();

    let has_audio = file_names
        .iter()
        .any(|name| config.is_audio(&name.to_string_lossy()));
    let has_cover = file_names
        .iter()
        .any(|name| name.as_os_str() == OsStr::new(&config.cover_file_name));

    Ok(DirectoryEntry {
        path: dir.to_path_buf(),
        file_names,
        has_audio,
        has_cover,
    })
}

/// Collect the image candidates of a directory, in file name order
pub fn image_candidates(entry: &DirectoryEntry, config: &FixConfig) -> Vec<ImageCandidate> {
    entry
        .file_names
        .iter()
        .filter(|name| config.is_image(&name.to_string_lossy()))
        .map(|name| ImageCandidate::new(&entry.path, name))
        .collect()
}

/// Apply the fix rules to one classified directory and record the result
fn fix_directory(entry: &DirectoryEntry, config: &FixConfig, report: &mut FixReport) -> FixAction {
    if !entry.has_audio {
        return FixAction::NoAudio;
    }
    report.audio_dirs += 1;

    if entry.has_cover {
        report.covers_present += 1;
        return FixAction::CoverPresent;
    }

    let candidates = image_candidates(entry, config);
    if candidates.len() != 1 {
        report.unresolved.push(entry.path.clone());
        return FixAction::Unresolved {
            candidates: candidates.len(),
        };
    }

    let source = &candidates[0].path;
    let target = entry.path.join(&config.cover_file_name);

    match target_state(source, &target) {
        TargetState::Absent => {}
        TargetState::AliasOfSource => {
            debug!(
                "{} already resolves to {}, leaving it alone",
                target.display(),
                source.display()
            );
            report.covers_present += 1;
            return FixAction::CoverPresent;
        }
        TargetState::Occupied => {
            let err = CoverError::copy_failed(
                source.clone(),
                target,
                "target exists and is not the image candidate",
            );
            return record_copy_failure(err, entry, config, report);
        }
    }

    match copy_cover(source, &target, config.verify_copies) {
        Ok(bytes) => {
            info!(
                "Created {} in: {} (from {})",
                config.cover_file_name,
                entry.path.display(),
                source.display()
            );
            report.copied.push(CoverCopy {
                source: source.clone(),
                cover: target,
                bytes,
            });
            FixAction::Copied {
                from: source.clone(),
            }
        }
        Err(err) => record_copy_failure(err, entry, config, report),
    }
}

fn record_copy_failure(
    err: CoverError,
    entry: &DirectoryEntry,
    config: &FixConfig,
    report: &mut FixReport,
) -> FixAction {
    error!("{}", err.message);
    report.errors.push(err);
    if config.escalate_copy_failures {
        report.unresolved.push(entry.path.clone());
    }
    FixAction::CopyFailed
}

/// What sits at the cover path of a directory whose listing had no cover
#[derive(Debug, PartialEq, Eq)]
enum TargetState {
    /// Nothing, free to copy
    Absent,
    /// The candidate itself under another letter case
    AliasOfSource,
    /// A directory or an unrelated file
    Occupied,
}

fn target_state(source: &Path, target: &Path) -> TargetState {
    match fs::metadata(target) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => TargetState::Absent,
        Ok(meta) if meta.is_file() && is_same_file(source, target) => TargetState::AliasOfSource,
        _ => TargetState::Occupied,
    }
}

#[cfg(unix)]
fn is_same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Copy `source` to `target`, optionally checking both digests afterwards
fn copy_cover(source: &Path, target: &Path, verify: bool) -> Result<u64> {
    let bytes = fs::copy(source, target).map_err(|e| {
        CoverError::copy_failed(source.to_path_buf(), target.to_path_buf(), e.to_string())
    })?;

    if verify {
        let source_digest = file_digest(source)?;
        let target_digest = file_digest(target)?;
        if source_digest != target_digest {
            return Err(CoverError::verify_failed(target.to_path_buf()));
        }
    }

    Ok(bytes)
}

/// Compute the MD5 digest of a file as lowercase hex
pub fn file_digest(path: &Path) -> Result<String> {
    use md5::{Digest, Md5};
    use std::io::Read;

    let mut file = fs::File::open(path).map_err(|e| CoverError::from(e).with_path(path))?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)
        .map_err(|e| CoverError::from(e).with_path(path))?;

    let mut hasher = Md5::new();
    hasher.update(&buffer);
    Ok(format!("{:x}", hasher.finalize()))
}
