//! Manual cover resolver CLI
//!
//! Opens each folder from an unresolved list in the file browser and waits
//! until a cover file shows up in it.

use clap::Parser;
use env_logger::Env;
use log::{error, warn};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use cover_fixer::config::{DEFAULT_COVER_FILE_NAME, DEFAULT_POLL_INTERVAL_MS};
use cover_fixer::{run_resolver, CancellationToken, PollPolicy, SystemFileBrowser};

const ABOUT: &str = r#"
Open unresolved music folders one by one until each has a cover.

Examples:
  manual_cover_fix output.txt still_missing.txt
  manual_cover_fix output.txt still_missing.txt --timeout-secs 300
  manual_cover_fix output.txt still_missing.txt --max-polls 30

Press Ctrl-C to stop; remaining folders are written to the output file.
"#;

/// Walk through unresolved folders and wait for covers
#[derive(Parser)]
#[command(name = "manual_cover_fix")]
#[command(author, version, about = ABOUT, long_about = None)]
struct Cli {
    /// File listing the unresolved folders, one per line
    unresolved_folders_file: PathBuf,

    /// File the still unresolved folders are written to
    unresolved_output_file: PathBuf,

    /// Delay between two checks in milliseconds
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    poll_interval_ms: u64,

    /// Give up on a folder after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Give up on a folder after this many checks
    #[arg(long)]
    max_polls: Option<u32>,

    /// Name of the cover file (letter case is ignored)
    #[arg(long, default_value = DEFAULT_COVER_FILE_NAME)]
    cover_name: String,
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

    if !cli.unresolved_folders_file.exists() {
        println!("File not found: {}", cli.unresolved_folders_file.display());
        process::exit(1);
    }

    let policy = PollPolicy::builder()
        .interval(Duration::from_millis(cli.poll_interval_ms))
        .timeout(cli.timeout_secs.map(Duration::from_secs))
        .max_polls(cli.max_polls)
        .cover_file_name(cli.cover_name.clone())
        .build();

    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    if let Err(err) = ctrlc::set_handler(move || canceller.cancel()) {
        warn!("Ctrl-C will not stop the wait cleanly: {}", err);
    }

    let browser = SystemFileBrowser::for_current_platform();
    let report = match run_resolver(
        &cli.unresolved_folders_file,
        &cli.unresolved_output_file,
        &browser,
        &policy,
        &cancel,
    ) {
        Ok(report) => report,
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    };

    println!("\n{}", report.summary());
    println!(
        "Unresolved folders written to: {}",
        cli.unresolved_output_file.display()
    );
}
