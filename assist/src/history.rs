//! Shell history reading.
//!
//! History lines arrive in one of three shapes: plain commands, zsh
//! extended-history records (`: 1700000000:0;actual command`), and
//! numbered `history` builtin output (`  123  actual command`). All
//! three normalize to the bare command.

use std::io::Read;
use std::process::{Command, Stdio};
use std::time::Duration;

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use wait_timeout::ChildExt;

use cmdscribe_core::ShellProfile;

use crate::config::Config;

/// Timeout for a configured history command (milliseconds).
const HISTORY_TIMEOUT_MS: u64 = 5_000;

static ZSH_EXTENDED_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^: \d+:\d+;(.*)$").expect("valid regex"));

static EVENT_NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s+").expect("valid regex"));

/// Normalizes raw history output into bare command lines, dropping
/// blanks.
///
/// # Examples
///
/// ```
/// use cmdscribe_assist::parse_history_output;
///
/// let raw = ": 1700000000:0;git status\n  42  ls -la\n\nplain command\n";
/// assert_eq!(
///     parse_history_output(raw),
///     vec!["git status", "ls -la", "plain command"]
/// );
/// ```
pub fn parse_history_output(output: &str) -> Vec<String> {
    output
        .split(['\r', '\n'])
        .filter_map(normalize_history_line)
        .collect()
}

fn normalize_history_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let without_zsh_meta = match ZSH_EXTENDED_PREFIX.captures(trimmed) {
        Some(captures) => captures.get(1).map_or(trimmed, |m| m.as_str()),
        None => trimmed,
    };
    let without_number = EVENT_NUMBER_PREFIX.replace(without_zsh_meta, "");
    let normalized = without_number.trim();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized.to_string())
    }
}

/// Fetches shell history, preferring a configured history command over
/// the profile's history file. Failures yield an empty list.
pub fn fetch_shell_history(config: &Config, profile: &ShellProfile) -> Vec<String> {
    if let Some(command) = config
        .history_command
        .as_deref()
        .filter(|command| !command.trim().is_empty())
    {
        return fetch_history_from_command(command);
    }
    fetch_history_from_file(profile)
}

fn fetch_history_from_file(profile: &ShellProfile) -> Vec<String> {
    let Some(home) = std::env::var_os("HOME").map(std::path::PathBuf::from) else {
        debug!("history: no home directory");
        return Vec::new();
    };
    let path = profile.history_file(&home);
    match std::fs::read_to_string(&path) {
        Ok(content) => parse_history_output(&content),
        Err(error) => {
            debug!(path = %path.display(), error = %error, "history: read failed");
            Vec::new()
        }
    }
}

fn fetch_history_from_command(command: &str) -> Vec<String> {
    let mut child = match Command::new("sh")
        .args(["-c", command])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(error) => {
            debug!(command, error = %error, "history: spawn failed");
            return Vec::new();
        }
    };

    let stdout_thread = child.stdout.take().map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    });

    match child.wait_timeout(Duration::from_millis(HISTORY_TIMEOUT_MS)) {
        Ok(Some(_)) => {}
        Ok(None) => {
            debug!(command, "history: command timed out");
            let _ = child.kill();
            let _ = child.wait();
            return Vec::new();
        }
        Err(error) => {
            debug!(command, error = %error, "history: wait failed");
            let _ = child.kill();
            let _ = child.wait();
            return Vec::new();
        }
    }

    let stdout = stdout_thread
        .and_then(|thread| thread.join().ok())
        .unwrap_or_default();
    parse_history_output(&String::from_utf8_lossy(&stdout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_lines_pass_through() {
        assert_eq!(
            parse_history_output("ls -la\ngit status\n"),
            vec!["ls -la", "git status"]
        );
    }

    #[test]
    fn test_zsh_extended_prefix_is_stripped() {
        assert_eq!(
            parse_history_output(": 1700000000:0;git push origin main\n"),
            vec!["git push origin main"]
        );
    }

    #[test]
    fn test_event_numbers_are_stripped() {
        assert_eq!(
            parse_history_output("  501  make test\n  502  make bench\n"),
            vec!["make test", "make bench"]
        );
    }

    #[test]
    fn test_blank_and_whitespace_lines_drop() {
        assert_eq!(
            parse_history_output("\n   \nls\n\r\n"),
            vec!["ls"]
        );
    }

    #[test]
    fn test_zsh_line_with_empty_command_drops() {
        assert!(parse_history_output(": 1700000000:0;\n").is_empty());
    }

    #[test]
    fn test_command_source_collects_output() {
        let config = Config {
            history_command: Some("printf 'one\\ntwo\\n'".to_string()),
            ..Config::default()
        };
        let profile = cmdscribe_core::profile_for(cmdscribe_core::ShellName::Bash);
        assert_eq!(fetch_shell_history(&config, &profile), vec!["one", "two"]);
    }

    #[test]
    fn test_failing_command_yields_empty_history() {
        let config = Config {
            history_command: Some("exit 1".to_string()),
            ..Config::default()
        };
        let profile = cmdscribe_core::profile_for(cmdscribe_core::ShellName::Bash);
        assert!(fetch_shell_history(&config, &profile).is_empty());
    }
}
