//! Output channels for assistant results.
//!
//! A result either lands on stdout, replaces the shell's edit buffer
//! (readline), or goes to the clipboard via a configured pipe command.
//! Clipboard failures fall back to stdout so the result is never lost.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::config::Config;

/// Where an assistant result is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputChannel {
    /// Print with a trailing newline.
    #[default]
    Stdout,
    /// Write raw text for the shell integration to capture into the
    /// edit buffer.
    Readline,
    /// Pipe through the configured clipboard command.
    Clipboard,
}

/// Delivers `text` on the chosen channel.
pub fn emit_output(channel: OutputChannel, text: &str, config: &Config) {
    match channel {
        OutputChannel::Stdout => write_stdout(text),
        OutputChannel::Readline => {
            print!("{text}");
            let _ = std::io::stdout().flush();
        }
        OutputChannel::Clipboard => write_clipboard(text, config),
    }
}

fn write_stdout(text: &str) {
    if text.ends_with('\n') {
        print!("{text}");
    } else {
        println!("{text}");
    }
    let _ = std::io::stdout().flush();
}

fn write_clipboard(text: &str, config: &Config) {
    let command = config.clipboard_command.as_deref().unwrap_or(default_clipboard_command());
    let spawned = Command::new("sh")
        .args(["-c", command])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(error) => {
            debug!(command, error = %error, "clipboard: spawn failed");
            write_stdout(text);
            return;
        }
    };

    if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(text.as_bytes());
    }
    match child.wait() {
        Ok(status) if status.success() => {}
        Ok(status) => {
            debug!(command, code = ?status.code(), "clipboard: command failed");
            write_stdout(text);
        }
        Err(error) => {
            debug!(command, error = %error, "clipboard: wait failed");
            write_stdout(text);
        }
    }
}

fn default_clipboard_command() -> &'static str {
    if cfg!(target_os = "macos") {
        "pbcopy"
    } else {
        "xclip -selection clipboard"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_channel_is_stdout() {
        assert_eq!(OutputChannel::default(), OutputChannel::Stdout);
    }

    #[test]
    fn test_clipboard_success_with_true_command() {
        // `cat > /dev/null` consumes stdin and exits zero.
        let config = Config {
            clipboard_command: Some("cat > /dev/null".to_string()),
            ..Config::default()
        };
        emit_output(OutputChannel::Clipboard, "text", &config);
    }
}
