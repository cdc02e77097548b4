//! Man-page text sources.
//!
//! [`ManPageSource`] abstracts where raw man-page text comes from so
//! the retrieval engine can be exercised against in-memory fixtures.
//! The system source shells out to `man -P cat`; every failure mode
//! (missing page, missing `man`, non-zero exit, empty output, timeout)
//! is reported identically as absence.

use std::collections::HashMap;
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::debug;
use wait_timeout::ChildExt;

/// Timeout for the external man lookup (milliseconds).
const MAN_TIMEOUT_MS: u64 = 5_000;

/// A source of raw man-page text.
///
/// `fetch` is total: any failure yields `None`, never an error.
pub trait ManPageSource {
    /// Returns the rendered man page for `command`, or `None` when the
    /// source has no entry.
    fn fetch(&self, command: &str) -> Option<String>;
}

/// Fetches man pages by invoking `man -P cat <command>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemManSource;

impl ManPageSource for SystemManSource {
    fn fetch(&self, command: &str) -> Option<String> {
        let command = command.trim();
        if command.is_empty() {
            return None;
        }

        let mut child = match Command::new("man")
            .args(["-P", "cat", command])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(error) => {
                debug!(command, error = %error, "Failed to spawn man");
                return None;
            }
        };

        // Drain stdout on a background thread so a page larger than the
        // pipe buffer cannot deadlock the bounded wait below.
        let stdout_thread = child.stdout.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                buf
            })
        });
        let stderr_thread = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                buf
            })
        });

        let timeout = Duration::from_millis(MAN_TIMEOUT_MS);
        let status = match child.wait_timeout(timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                debug!(command, timeout_ms = MAN_TIMEOUT_MS, "man lookup timed out");
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
            Err(error) => {
                debug!(command, error = %error, "Failed to wait on man");
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
        };

        let stdout = stdout_thread
            .and_then(|thread| thread.join().ok())
            .unwrap_or_default();
        drop(stderr_thread.map(|thread| thread.join()));

        if !status.success() {
            debug!(command, code = ?status.code(), "man exited non-zero");
            return None;
        }

        let text = String::from_utf8_lossy(&stdout).into_owned();
        if text.is_empty() {
            return None;
        }
        Some(text)
    }
}

/// In-memory fixture source for tests.
///
/// # Examples
///
/// ```
/// use cmdscribe_manpage::{ManPageSource, StaticManSource};
///
/// let source = StaticManSource::new([("ls", "NAME\nls - list files\n")]);
/// assert!(source.fetch("ls").is_some());
/// assert!(source.fetch("ghost").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticManSource {
    pages: HashMap<String, String>,
}

impl StaticManSource {
    /// Builds a source from `(command, text)` pairs.
    pub fn new<I, K, V>(pages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pages: pages
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Adds or replaces a page.
    pub fn insert(&mut self, command: impl Into<String>, text: impl Into<String>) {
        self.pages.insert(command.into(), text.into());
    }
}

impl ManPageSource for StaticManSource {
    fn fetch(&self, command: &str) -> Option<String> {
        self.pages.get(command).cloned()
    }
}
