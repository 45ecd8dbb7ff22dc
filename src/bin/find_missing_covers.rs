//! Cover fixer CLI
//!
//! Walks a music library, creates `cover.jpg` where exactly one image is
//! available and lists the folders that need a human.

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::process;

use cover_fixer::config::{DEFAULT_COVER_FILE_NAME, DEFAULT_OUTPUT_FILE};
use cover_fixer::progress::DEFAULT_PROGRESS_INTERVAL_MS;
use cover_fixer::{find_and_fix_with_progress, write_list, FixConfig, ProgressReporter};

const ABOUT: &str = r#"
Find music folders without a cover.jpg and fix the unambiguous ones.

Examples:
  find_missing_covers /music                       scan and fix, unresolved -> output.txt
  find_missing_covers /music -o todo.txt           write unresolved folders to todo.txt
  find_missing_covers /music --image-ext webp      only consider .webp images
  find_missing_covers /music --json                print the run report as JSON
"#;

/// Find and fix music folders without a cover image
#[derive(Parser)]
#[command(name = "find_missing_covers")]
#[command(author, version, about = ABOUT, long_about = None)]
struct Cli {
    /// Root folder of the music library
    folder_path: PathBuf,

    /// Audio extension, repeatable; replaces the default set
    #[arg(long = "audio-ext", value_name = "EXT")]
    audio_ext: Vec<String>,

    /// Image extension, repeatable; replaces the default set
    #[arg(long = "image-ext", value_name = "EXT")]
    image_ext: Vec<String>,

    /// File the unresolved folders are written to
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Name of the cover file
    #[arg(long, default_value = DEFAULT_COVER_FILE_NAME)]
    cover_name: String,

    /// Do not list folders whose copy failed as unresolved
    #[arg(long)]
    no_escalate_copy_failures: bool,

    /// Skip comparing copied covers with their source
    #[arg(long)]
    no_verify: bool,

    /// Follow symbolic links while walking
    #[arg(long)]
    follow_links: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Emit JSON progress lines on stderr
    #[arg(long)]
    progress: bool,
}

/// Parse arguments, exiting with status 1 on usage errors
fn parse_cli() -> Cli {
    Cli::try_parse().unwrap_or_else(|err| {
        let code = if err.use_stderr() { 1 } else { 0 };
        let _ = err.print();
        process::exit(code);
    })
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = parse_cli();

    if !cli.folder_path.is_dir() {
        println!("Invalid folder path. Please check the path and try again.");
        process::exit(1);
    }

    let mut builder = FixConfig::builder()
        .cover_file_name(cli.cover_name.clone())
        .escalate_copy_failures(!cli.no_escalate_copy_failures)
        .verify_copies(!cli.no_verify)
        .follow_links(cli.follow_links);
    if !cli.audio_ext.is_empty() {
        builder = builder.audio_extensions(&cli.audio_ext);
    }
    if !cli.image_ext.is_empty() {
        builder = builder.image_extensions(&cli.image_ext);
    }
    let config = builder.build();

    info!("Scanning {}", cli.folder_path.display());
    let reporter = ProgressReporter::new(cli.progress, DEFAULT_PROGRESS_INTERVAL_MS);
    let report = match find_and_fix_with_progress(&cli.folder_path, &config, &reporter) {
        Ok(report) => report,
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    };

    if !report.unresolved.is_empty() {
        if let Err(err) = write_list(&cli.output, &report.unresolved) {
            error!("Could not write {}: {}", cli.output.display(), err);
            process::exit(1);
        }
    }

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                error!("Could not serialize report: {}", err);
                process::exit(1);
            }
        }
        return;
    }

    info!(
        "Visited {} folders, {} with audio, {} covers created, {} errors in {}ms",
        report.total_dirs,
        report.audio_dirs,
        report.copied.len(),
        report.error_count(),
        report.duration_ms
    );

    if report.is_complete() {
        println!("All folders processed successfully!");
    } else {
        println!(
            "\nFolders with multiple or no images (could not create {}):",
            config.cover_file_name
        );
        for folder in &report.unresolved {
            println!("{}", folder.display());
        }
    }
}
