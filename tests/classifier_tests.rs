//! End-to-end classifier runs against temporary music trees

use std::fs;
use std::path::{Path, PathBuf};

use cover_fixer::progress::ProgressReporter;
use cover_fixer::{find_and_fix, find_and_fix_with_progress, CoverErrorKind, FixConfig};
use tempfile::TempDir;

fn album(root: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    for (file, contents) in files {
        fs::write(dir.join(file), contents).unwrap();
    }
    dir
}

#[test]
fn test_single_image_is_copied_to_cover() {
    let temp = TempDir::new().unwrap();
    let dir = album(
        temp.path(),
        "AlbumA",
        &[("song.flac", b"audio"), ("folder.jpg", b"\xff\xd8jpeg bytes")],
    );

    let report = find_and_fix(temp.path(), &FixConfig::default()).unwrap();

    let cover = dir.join("cover.jpg");
    assert!(cover.exists());
    assert_eq!(fs::read(&cover).unwrap(), b"\xff\xd8jpeg bytes");
    assert!(report.unresolved.is_empty());
    assert_eq!(report.copied.len(), 1);
    assert_eq!(report.copied[0].source, dir.join("folder.jpg"));
    assert_eq!(report.copied[0].bytes, 12);
}

#[test]
fn test_multiple_images_are_unresolved() {
    let temp = TempDir::new().unwrap();
    let dir = album(
        temp.path(),
        "AlbumB",
        &[("song.mp3", b"a"), ("art1.png", b"1"), ("art2.jpg", b"2")],
    );

    let report = find_and_fix(temp.path(), &FixConfig::default()).unwrap();

    assert_eq!(report.unresolved, vec![dir.clone()]);
    assert!(!dir.join("cover.jpg").exists());
    assert!(report.copied.is_empty());
}

#[test]
fn test_no_image_is_unresolved() {
    let temp = TempDir::new().unwrap();
    let dir = album(temp.path(), "Bare", &[("01.ogg", b"a"), ("notes.txt", b"t")]);

    let report = find_and_fix(temp.path(), &FixConfig::default()).unwrap();

    assert_eq!(report.unresolved, vec![dir]);
}

#[test]
fn test_directories_without_audio_are_never_listed() {
    let temp = TempDir::new().unwrap();
    album(temp.path(), "Scans", &[("a.jpg", b"1"), ("b.png", b"2")]);
    album(temp.path(), "Empty", &[]);
    album(temp.path(), "Docs", &[("readme.txt", b"t")]);
    fs::write(temp.path().join("stray.jpg"), b"x").unwrap();

    let report = find_and_fix(temp.path(), &FixConfig::default()).unwrap();

    assert!(report.unresolved.is_empty());
    assert!(report.copied.is_empty());
    assert_eq!(report.audio_dirs, 0);
    assert_eq!(report.total_dirs, 4);
    assert!(!temp.path().join("Scans/cover.jpg").exists());
}

#[test]
fn test_existing_cover_is_left_alone() {
    let temp = TempDir::new().unwrap();
    let dir = album(
        temp.path(),
        "Done",
        &[("song.wav", b"a"), ("cover.jpg", b"original"), ("back.png", b"b")],
    );

    let report = find_and_fix(temp.path(), &FixConfig::default()).unwrap();

    assert!(report.unresolved.is_empty());
    assert_eq!(report.covers_present, 1);
    assert_eq!(fs::read(dir.join("cover.jpg")).unwrap(), b"original");
}

#[test]
fn test_root_directory_is_classified_too() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("track.m4a"), b"a").unwrap();

    let report = find_and_fix(temp.path(), &FixConfig::default()).unwrap();

    assert_eq!(report.unresolved, vec![temp.path().to_path_buf()]);
}

#[test]
fn test_unresolved_follow_walk_order_once_each() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let b = album(root, "B", &[("s.mp3", b"a")]);
    let a = album(root, "A", &[("s.mp3", b"a"), ("x.jpg", b"1"), ("y.jpg", b"2")]);
    let a_disc = album(root, "A/Disc 2", &[("s.flac", b"a")]);
    album(root, "C", &[("s.mp3", b"a"), ("only.gif", b"g")]);

    let report = find_and_fix(root, &FixConfig::default()).unwrap();

    assert_eq!(report.unresolved, vec![a, a_disc, b]);
    assert!(root.join("C/cover.jpg").exists());
}

#[test]
fn test_second_run_changes_nothing() {
    let temp = TempDir::new().unwrap();
    album(temp.path(), "Fixable", &[("song.flac", b"a"), ("front.jpeg", b"img")]);
    let stuck = album(temp.path(), "Stuck", &[("song.flac", b"a")]);

    let first = find_and_fix(temp.path(), &FixConfig::default()).unwrap();
    let second = find_and_fix(temp.path(), &FixConfig::default()).unwrap();

    assert_eq!(first.copied.len(), 1);
    assert!(second.copied.is_empty());
    assert_eq!(first.unresolved, vec![stuck.clone()]);
    assert_eq!(second.unresolved, vec![stuck]);
    assert_eq!(second.covers_present, 1);
}

#[test]
fn test_extension_overrides() {
    let temp = TempDir::new().unwrap();
    let dir = album(temp.path(), "Opus", &[("song.opus", b"a"), ("art.webp", b"w"), ("x.jpg", b"j")]);

    let default_report = find_and_fix(temp.path(), &FixConfig::default()).unwrap();
    assert!(default_report.unresolved.is_empty());
    assert!(!dir.join("cover.jpg").exists());

    let config = FixConfig::builder()
        .audio_extensions([".opus"])
        .image_extensions(["webp"])
        .build();
    let report = find_and_fix(temp.path(), &config).unwrap();

    assert!(report.unresolved.is_empty());
    assert_eq!(fs::read(dir.join("cover.jpg")).unwrap(), b"w");
}

#[test]
fn test_upper_case_extensions_are_recognised() {
    let temp = TempDir::new().unwrap();
    let dir = album(temp.path(), "Loud", &[("SONG.MP3", b"a"), ("FRONT.PNG", b"p")]);

    let report = find_and_fix(temp.path(), &FixConfig::default()).unwrap();

    assert!(report.unresolved.is_empty());
    assert_eq!(fs::read(dir.join("cover.jpg")).unwrap(), b"p");
}

#[cfg(unix)]
#[test]
fn test_copy_failure_is_escalated_by_default() {
    let temp = TempDir::new().unwrap();
    let dir = album(temp.path(), "Broken", &[("song.flac", b"a")]);
    std::os::unix::fs::symlink(temp.path().join("gone.jpg"), dir.join("art.jpg")).unwrap();

    let report = find_and_fix(temp.path(), &FixConfig::default()).unwrap();

    assert_eq!(report.unresolved, vec![dir.clone()]);
    assert_eq!(report.error_count(), 1);
    assert_eq!(report.errors[0].kind, CoverErrorKind::CopyFailed);
    assert!(!dir.join("cover.jpg").exists());
}

#[cfg(unix)]
#[test]
fn test_copy_failure_can_be_dropped() {
    let temp = TempDir::new().unwrap();
    let dir = album(temp.path(), "Broken", &[("song.flac", b"a")]);
    std::os::unix::fs::symlink(temp.path().join("gone.jpg"), dir.join("art.jpg")).unwrap();

    let config = FixConfig::builder().escalate_copy_failures(false).build();
    let report = find_and_fix(temp.path(), &config).unwrap();

    assert!(report.unresolved.is_empty());
    assert_eq!(report.error_count(), 1);
}

#[test]
fn test_progress_reporting_does_not_change_result() {
    let temp = TempDir::new().unwrap();
    let dir = album(temp.path(), "AlbumB", &[("song.mp3", b"a")]);

    let reporter = ProgressReporter::new(true, 0);
    let report = find_and_fix_with_progress(temp.path(), &FixConfig::default(), &reporter).unwrap();

    assert_eq!(report.unresolved, vec![dir]);
}

#[test]
fn test_report_serializes_unresolved() {
    let temp = TempDir::new().unwrap();
    album(temp.path(), "AlbumB", &[("song.mp3", b"a")]);

    let report = find_and_fix(temp.path(), &FixConfig::default()).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["unresolved"].as_array().unwrap().len(), 1);
    assert_eq!(json["audio_dirs"], 1);
    assert!(json.get("copied").is_none());
    assert!(json["started_at"].is_string());
}

#[test]
fn test_directory_named_like_cover_is_a_copy_failure() {
    let temp = TempDir::new().unwrap();
    let dir = album(temp.path(), "Album", &[("song.flac", b"a"), ("front.png", b"p")]);
    fs::create_dir(dir.join("cover.jpg")).unwrap();

    let report = find_and_fix(temp.path(), &FixConfig::default()).unwrap();

    assert_eq!(report.unresolved, vec![dir.clone()]);
    assert_eq!(report.covers_present, 0);
    assert_eq!(report.error_count(), 1);
    assert_eq!(report.errors[0].kind, CoverErrorKind::CopyFailed);
    assert!(dir.join("cover.jpg").is_dir());
}

#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_image_name_is_copied() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp = TempDir::new().unwrap();
    let dir = album(temp.path(), "Album", &[("song.flac", b"a")]);
    let image = dir.join(OsStr::from_bytes(b"caf\xe9.jpg"));
    fs::write(&image, b"latin-1 named art").unwrap();

    let report = find_and_fix(temp.path(), &FixConfig::default()).unwrap();

    assert!(report.unresolved.is_empty());
    assert_eq!(report.error_count(), 0);
    assert_eq!(report.copied[0].source, image);
    assert_eq!(fs::read(dir.join("cover.jpg")).unwrap(), b"latin-1 named art");
}
