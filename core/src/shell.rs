//! Shell identification and per-shell capability profiles.
//!
//! bash, zsh, and sh currently share tokenizer and classifier behavior;
//! the profile keeps the dispatch in one place so a divergence later is
//! a data change, not a new module.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::classify::{ClassifyStrategy, classify_tokens_with};
use crate::lexer::tokenize;
use crate::token::{ParsedCommand, ParsedToken};

/// Environment variable that overrides shell detection.
pub const SHELL_OVERRIDE_VAR: &str = "CMDSCRIBE_SHELL";

/// A shell supported by the integration scripts and profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellName {
    Bash,
    Zsh,
    Sh,
}

impl ShellName {
    /// All supported shells.
    pub const ALL: &'static [ShellName] = &[ShellName::Bash, ShellName::Zsh, ShellName::Sh];
}

impl fmt::Display for ShellName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShellName::Bash => "bash",
            ShellName::Zsh => "zsh",
            ShellName::Sh => "sh",
        };
        f.write_str(name)
    }
}

impl FromStr for ShellName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bash" => Ok(ShellName::Bash),
            "zsh" => Ok(ShellName::Zsh),
            "sh" => Ok(ShellName::Sh),
            _ => Err(()),
        }
    }
}

/// Capability bundle for one shell: how to tokenize and classify its
/// command lines, where its history lives, and which editor variable
/// carries the current line.
#[derive(Debug, Clone, Copy)]
pub struct ShellProfile {
    pub shell: ShellName,
    pub strategy: ClassifyStrategy,
}

impl ShellProfile {
    /// Tokenizes a command line for this shell.
    pub fn tokenize(&self, input: Option<&str>) -> Vec<String> {
        tokenize(input)
    }

    /// Classifies lexed tokens for this shell.
    pub fn classify(&self, tokens: &[String]) -> Vec<ParsedToken> {
        classify_tokens_with(self.strategy, tokens)
    }

    /// Tokenizes and classifies a line in one step.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdscribe_core::{profile_for, ShellName, TokenType};
    ///
    /// let profile = profile_for(ShellName::Bash);
    /// let (parsed, tokens) = profile.parse_line("ls -la");
    /// assert_eq!(parsed.tokens.len(), 2);
    /// assert_eq!(tokens[0].token_type, TokenType::Command);
    /// ```
    pub fn parse_line(&self, line: &str) -> (ParsedCommand, Vec<ParsedToken>) {
        let parsed = ParsedCommand::from_line(line);
        let tokens = self.classify(&parsed.tokens);
        (parsed, tokens)
    }

    /// Default history file for this shell, relative to `home`.
    ///
    /// zsh honors `HISTFILE` when set.
    pub fn history_file(&self, home: &std::path::Path) -> PathBuf {
        match self.shell {
            ShellName::Bash => home.join(".bash_history"),
            ShellName::Zsh => std::env::var_os("HISTFILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| home.join(".zsh_history")),
            ShellName::Sh => home.join(".sh_history"),
        }
    }

    /// Name of the environment variable holding the line being edited
    /// when the shell invokes us from a key binding.
    pub fn readline_var(&self) -> &'static str {
        match self.shell {
            // zsh widgets export BUFFER; bash and sh use readline.
            ShellName::Zsh => "BUFFER",
            ShellName::Bash | ShellName::Sh => "READLINE_LINE",
        }
    }
}

/// Returns the profile for a shell. All shells currently share the
/// [`ClassifyStrategy::Simple`] pipeline.
pub fn profile_for(shell: ShellName) -> ShellProfile {
    ShellProfile {
        shell,
        strategy: ClassifyStrategy::Simple,
    }
}

/// Resolves the active shell from explicit override and `$SHELL`
/// values. The override wins; otherwise the basename of the shell path
/// is matched against the supported set.
pub fn identify_shell_from(override_value: Option<&str>, shell_env: Option<&str>) -> Option<ShellName> {
    let candidate = override_value
        .filter(|value| !value.is_empty())
        .or(shell_env)
        .unwrap_or("");
    let basename = candidate.rsplit('/').next().unwrap_or("");
    basename.parse().ok()
}

/// Resolves the active shell from the process environment
/// (`CMDSCRIBE_SHELL`, then `$SHELL`).
pub fn identify_shell() -> Option<ShellName> {
    let override_value = std::env::var(SHELL_OVERRIDE_VAR).ok();
    let shell_env = std::env::var("SHELL").ok();
    identify_shell_from(override_value.as_deref(), shell_env.as_deref())
}

/// Returns the line currently being edited, if the shell exported it.
pub fn readline_line(profile: &ShellProfile) -> Option<String> {
    std::env::var(profile.readline_var())
        .ok()
        .filter(|line| !line.is_empty())
}

/// Returns `true` when the shell exported a non-empty edit line.
pub fn has_readline_line(profile: &ShellProfile) -> bool {
    readline_line(profile).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_from_shell_path() {
        assert_eq!(
            identify_shell_from(None, Some("/bin/bash")),
            Some(ShellName::Bash)
        );
        assert_eq!(
            identify_shell_from(None, Some("/usr/local/bin/zsh")),
            Some(ShellName::Zsh)
        );
        assert_eq!(identify_shell_from(None, Some("/bin/fish")), None);
        assert_eq!(identify_shell_from(None, None), None);
    }

    #[test]
    fn test_override_wins() {
        assert_eq!(
            identify_shell_from(Some("zsh"), Some("/bin/bash")),
            Some(ShellName::Zsh)
        );
        // Empty override falls through to $SHELL.
        assert_eq!(
            identify_shell_from(Some(""), Some("/bin/sh")),
            Some(ShellName::Sh)
        );
    }

    #[test]
    fn test_profiles_share_parsing_behavior() {
        for &shell in ShellName::ALL {
            let profile = profile_for(shell);
            let tokens = profile.tokenize(Some("echo \"hello world\""));
            assert_eq!(tokens, vec!["echo", "\"hello world\""]);
        }
    }

    #[test]
    fn test_history_files_differ_per_shell() {
        let home = std::path::Path::new("/home/user");
        assert_eq!(
            profile_for(ShellName::Bash).history_file(home),
            home.join(".bash_history")
        );
        assert_eq!(
            profile_for(ShellName::Sh).history_file(home),
            home.join(".sh_history")
        );
    }

    #[test]
    fn test_shell_name_round_trip() {
        for &shell in ShellName::ALL {
            let parsed: ShellName = shell.to_string().parse().unwrap();
            assert_eq!(parsed, shell);
        }
    }
}
