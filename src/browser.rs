//! Opening directories in the user's file browser

use log::debug;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

use crate::error::{CoverError, Result};

/// Something that can show a directory to the user
pub trait FileBrowser {
    /// Open `dir` without waiting for the browser to close
    fn open(&self, dir: &Path) -> Result<()>;
}

/// Launches the platform file browser as a detached process
///
/// Launchers are not waited for, but finished ones are reaped on the next
/// call so they do not linger as zombies.
#[derive(Debug)]
pub struct SystemFileBrowser {
    program: &'static str,
    children: Mutex<Vec<Child>>,
}

impl SystemFileBrowser {
    /// Pick the launcher for the platform this binary was built for
    pub fn for_current_platform() -> Self {
        Self::with_program(Self::platform_program())
    }

    /// Use a specific launcher program
    pub fn with_program(program: &'static str) -> Self {
        Self {
            program,
            children: Mutex::new(Vec::new()),
        }
    }

    /// Name of the launcher program
    pub fn program(&self) -> &'static str {
        self.program
    }

    /// Collect launchers that have exited; returns how many are still running
    pub fn reap_finished(&self) -> usize {
        let mut children = match self.children.lock() {
            Ok(children) => children,
            Err(poisoned) => poisoned.into_inner(),
        };
        children.retain_mut(|child| !matches!(child.try_wait(), Ok(Some(_)) | Err(_)));
        children.len()
    }

    fn platform_program() -> &'static str {
        if cfg!(target_os = "windows") {
            "explorer"
        } else if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        }
    }
}

impl Default for SystemFileBrowser {
    fn default() -> Self {
        Self::for_current_platform()
    }
}

impl FileBrowser for SystemFileBrowser {
    fn open(&self, dir: &Path) -> Result<()> {
        self.reap_finished();

        let child = Command::new(self.program)
            .arg(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                CoverError::browser_launch(dir.to_path_buf(), self.program, e.to_string())
            })?;

        debug!(
            "Started {} (pid {}) for {}",
            self.program,
            child.id(),
            dir.display()
        );
        match self.children.lock() {
            Ok(mut children) => children.push(child),
            Err(poisoned) => poisoned.into_inner().push(child),
        }
        Ok(())
    }
}
