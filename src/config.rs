//! Configuration for the classifier and the manual resolver

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Canonical cover file name
pub const DEFAULT_COVER_FILE_NAME: &str = "cover.jpg";

/// Default file the classifier writes unresolved directories to
pub const DEFAULT_OUTPUT_FILE: &str = "output.txt";

/// Default delay between two cover checks (2 seconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Normalise an extension to lowercase without a leading dot
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

fn extension_set(exts: &[&str]) -> HashSet<String> {
    exts.iter().map(|s| normalize_extension(s)).collect()
}

/// Check a file name against an extension set, ignoring case
fn name_has_extension(name: &str, extensions: &HashSet<String>) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_lowercase()))
        .unwrap_or(false)
}

/// Configuration for the classifier/fixer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixConfig {
    /// Extensions that mark a directory as audio-bearing
    pub audio_extensions: HashSet<String>,

    /// Extensions of cover image candidates
    pub image_extensions: HashSet<String>,

    /// Name of the cover file, matched case-sensitively
    pub cover_file_name: String,

    /// Add directories whose copy failed to the unresolved list
    pub escalate_copy_failures: bool,

    /// Compare source and copied cover digests after copying
    pub verify_copies: bool,

    /// Whether to follow symbolic links while walking
    pub follow_links: bool,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            audio_extensions: Self::default_audio_extensions(),
            image_extensions: Self::default_image_extensions(),
            cover_file_name: DEFAULT_COVER_FILE_NAME.to_string(),
            escalate_copy_failures: true,
            verify_copies: true,
            follow_links: false,
        }
    }
}

impl FixConfig {
    /// Create a config builder
    pub fn builder() -> FixConfigBuilder {
        FixConfigBuilder::new()
    }

    /// Get the default audio extensions
    pub fn default_audio_extensions() -> HashSet<String> {
        extension_set(&["flac", "mp3", "aac", "wav", "ogg", "m4a"])
    }

    /// Get the default image extensions
    pub fn default_image_extensions() -> HashSet<String> {
        extension_set(&["jpg", "jpeg", "png", "bmp", "gif"])
    }

    /// Check if a file name has an audio extension
    pub fn is_audio(&self, name: &str) -> bool {
        name_has_extension(name, &self.audio_extensions)
    }

    /// Check if a file name has an image extension
    pub fn is_image(&self, name: &str) -> bool {
        name_has_extension(name, &self.image_extensions)
    }
}

/// Builder for FixConfig
#[derive(Debug, Default)]
pub struct FixConfigBuilder {
    config: FixConfig,
}

impl FixConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the audio extension set
    pub fn audio_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.audio_extensions = extensions
            .into_iter()
            .map(|e| normalize_extension(e.as_ref()))
            .collect();
        self
    }

    /// Replace the image extension set
    pub fn image_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.image_extensions = extensions
            .into_iter()
            .map(|e| normalize_extension(e.as_ref()))
            .collect();
        self
    }

    /// Set the cover file name
    pub fn cover_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.cover_file_name = name.into();
        self
    }

    /// Enable or disable escalation of copy failures
    pub fn escalate_copy_failures(mut self, enabled: bool) -> Self {
        self.config.escalate_copy_failures = enabled;
        self
    }

    /// Enable or disable post-copy verification
    pub fn verify_copies(mut self, enabled: bool) -> Self {
        self.config.verify_copies = enabled;
        self
    }

    /// Enable or disable following symbolic links
    pub fn follow_links(mut self, enabled: bool) -> Self {
        self.config.follow_links = enabled;
        self
    }

    /// Build the config
    pub fn build(self) -> FixConfig {
        self.config
    }
}

/// How long and how often the resolver waits for a cover to appear
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollPolicy {
    /// Delay between two checks
    pub interval: Duration,

    /// Give up after this much time in a single directory
    pub timeout: Option<Duration>,

    /// Give up after this many checks in a single directory
    pub max_polls: Option<u32>,

    /// Cover file name, matched ignoring case
    pub cover_file_name: String,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            timeout: None,
            max_polls: None,
            cover_file_name: DEFAULT_COVER_FILE_NAME.to_string(),
        }
    }
}

impl PollPolicy {
    /// Create a policy builder
    pub fn builder() -> PollPolicyBuilder {
        PollPolicyBuilder::new()
    }

    /// Whether the wait has no bound other than cancellation
    pub fn is_unbounded(&self) -> bool {
        self.timeout.is_none() && self.max_polls.is_none()
    }
}

/// Builder for PollPolicy
#[derive(Debug, Default)]
pub struct PollPolicyBuilder {
    policy: PollPolicy,
}

impl PollPolicyBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delay between checks
    pub fn interval(mut self, interval: Duration) -> Self {
        self.policy.interval = interval;
        self
    }

    /// Set the per-directory timeout
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.policy.timeout = timeout;
        self
    }

    /// Set the maximum number of checks per directory
    pub fn max_polls(mut self, max_polls: Option<u32>) -> Self {
        self.policy.max_polls = max_polls;
        self
    }

    /// Set the cover file name
    pub fn cover_file_name(mut self, name: impl Into<String>) -> Self {
        self.policy.cover_file_name = name.into();
        self
    }

    /// Build the policy
    pub fn build(self) -> PollPolicy {
        self.policy
    }
}
