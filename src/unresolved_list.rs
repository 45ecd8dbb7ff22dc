//! Reading and writing the unresolved list handoff file
//!
//! One directory path per line, UTF-8, no header, no escaping, each entry
//! followed by a newline.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{CoverError, Result};

/// Read a list file, trimming each line and skipping blank ones
pub fn read_list(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Err(CoverError::not_found(path.to_path_buf()));
    }

    let bytes = fs::read(path).map_err(|e| CoverError::from(e).with_path(path))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| CoverError::list_format(path.to_path_buf(), format!("not UTF-8: {}", e)))?;

    Ok(parse_list(&text))
}

/// Parse list contents already in memory
pub fn parse_list(text: &str) -> Vec<PathBuf> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Write `entries` to `path`, replacing any previous contents
pub fn write_list<P: AsRef<Path>>(path: &Path, entries: &[P]) -> Result<()> {
    let file = fs::File::create(path).map_err(|e| CoverError::from(e).with_path(path))?;
    let mut writer = BufWriter::new(file);

    for entry in entries {
        writeln!(writer, "{}", entry.as_ref().display())
            .map_err(|e| CoverError::from(e).with_path(path))?;
    }
    writer
        .flush()
        .map_err(|e| CoverError::from(e).with_path(path))?;
    Ok(())
}
