//! Token types for shell command classification.
//!
//! This module defines the data model shared by the lexer and the
//! classifier. The types round-trip through JSON with the same names the
//! annotated-view consumers use (`controlOperator` etc.).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Pipe operators. `|&` is the bash shorthand for `2>&1 |`.
pub const PIPE_OPERATORS: &[&str] = &["|", "|&"];

/// Control operators that end a command segment.
pub const CONTROL_OPERATORS: &[&str] = &["&&", "||", ";", "&"];

/// Redirect operators without a file-descriptor prefix.
pub const REDIRECT_OPERATORS: &[&str] = &["<<<", "<<", ">>", "<>&", "&>", ">&", "<", ">"];

/// All multi-character and single-character operators the lexer
/// recognizes, ordered so that longer sequences are tried first.
pub const OPERATOR_PRIORITY: &[&str] = &[
    "<<<", "<<", ">>", "<>&", "&>", ">&", "|&", "&&", "||", "|", "&", ";", "<", ">",
];

/// Redirects with a numeric file-descriptor prefix, e.g. `2>>` or `1>&`.
pub static NUMERIC_REDIRECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(>>|<<<|<<|<>&|&>|>&|>|<)").expect("valid regex"));

/// Environment-variable-style assignment prefix, e.g. `FOO=bar`.
pub static ASSIGNMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*=").expect("valid regex"));

/// Semantic role assigned to a token by the classifier.
///
/// # Examples
///
/// ```
/// use cmdscribe_core::TokenType;
///
/// assert_eq!(TokenType::ControlOperator.to_string(), "controlOperator");
/// assert_eq!(
///     serde_json::to_string(&TokenType::Redirect).unwrap(),
///     "\"redirect\""
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenType {
    /// The command name of a segment (e.g. `grep`).
    Command,
    /// A dash-prefixed flag (e.g. `-f`, `--color=auto`).
    Option,
    /// A positional argument.
    Argument,
    /// An environment assignment before the command (`FOO=bar cmd`).
    Assignment,
    /// A pipe operator connecting two segments.
    Pipe,
    /// A control operator (`&&`, `||`, `;`, `&`).
    ControlOperator,
    /// An input or output redirect.
    Redirect,
    /// An operator-like token with no known meaning.
    Unknown,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenType::Command => "command",
            TokenType::Option => "option",
            TokenType::Argument => "argument",
            TokenType::Assignment => "assignment",
            TokenType::Pipe => "pipe",
            TokenType::ControlOperator => "controlOperator",
            TokenType::Redirect => "redirect",
            TokenType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A token with its classified semantic role.
///
/// `option_value` is only populated by the
/// [`OptionValuePairing`](crate::ClassifyStrategy::OptionValuePairing)
/// classifier strategy, which folds a bare word following an option into
/// the option itself.
///
/// # Examples
///
/// ```
/// use cmdscribe_core::{ParsedToken, TokenType};
///
/// let token = ParsedToken::new("-f", TokenType::Option);
/// assert_eq!(token.value, "-f");
/// assert!(token.option_value.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedToken {
    /// The raw token text as produced by the lexer.
    pub value: String,
    /// The classified role.
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Value captured by the option-value-pairing strategy.
    #[serde(
        rename = "optionValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub option_value: Option<String>,
}

impl ParsedToken {
    /// Creates a token with no paired option value.
    pub fn new(value: impl Into<String>, token_type: TokenType) -> Self {
        Self {
            value: value.into(),
            token_type,
            option_value: None,
        }
    }

    /// Creates an option token carrying a paired value.
    pub fn with_option_value(value: impl Into<String>, option_value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            token_type: TokenType::Option,
            option_value: Some(option_value.into()),
        }
    }
}

/// A tokenized command line together with its original text.
///
/// # Examples
///
/// ```
/// use cmdscribe_core::ParsedCommand;
///
/// let parsed = ParsedCommand::from_line("ls -la /tmp");
/// assert_eq!(parsed.tokens, vec!["ls", "-la", "/tmp"]);
/// assert_eq!(parsed.joined(), "ls -la /tmp");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCommand {
    /// The command line exactly as typed.
    pub original: String,
    /// The lexed tokens in order.
    pub tokens: Vec<String>,
}

impl ParsedCommand {
    /// Tokenizes a command line and records the original text.
    pub fn from_line(line: &str) -> Self {
        Self {
            original: line.to_string(),
            tokens: crate::lexer::tokenize_str(line),
        }
    }

    /// Re-joins the tokens with single spaces.
    ///
    /// For input with single-space separation this round-trips the
    /// original line; internal multi-space runs collapse.
    pub fn joined(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Lexical kind of a raw token, derived purely from operator-set
/// membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTokenKind {
    /// An ordinary word.
    Word,
    /// A recognized shell operator.
    Op,
    /// Reserved for operator-like tokens outside every known set.
    Unknown,
}

/// A raw token before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub raw: String,
    pub kind: RawTokenKind,
}

/// Returns `true` when `token` is a pipe operator.
pub fn is_pipe_operator(token: &str) -> bool {
    PIPE_OPERATORS.contains(&token)
}

/// Returns `true` when `token` is a control operator.
pub fn is_control_operator(token: &str) -> bool {
    CONTROL_OPERATORS.contains(&token)
}

/// Returns `true` when `token` is a redirect, with or without a numeric
/// file-descriptor prefix.
pub fn is_redirect_operator(token: &str) -> bool {
    REDIRECT_OPERATORS.contains(&token)
        || NUMERIC_REDIRECT
            .find(token)
            .is_some_and(|m| m.end() == token.len())
}

/// Derives raw-token kinds for a lexed token sequence.
pub fn raw_tokens(tokens: &[String]) -> Vec<RawToken> {
    tokens
        .iter()
        .map(|token| {
            let kind = if is_pipe_operator(token)
                || is_control_operator(token)
                || is_redirect_operator(token)
            {
                RawTokenKind::Op
            } else {
                RawTokenKind::Word
            };
            RawToken {
                raw: token.clone(),
                kind,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_redirect_matching() {
        assert!(is_redirect_operator("2>>"));
        assert!(is_redirect_operator("2>"));
        assert!(is_redirect_operator("10<"));
        assert!(is_redirect_operator("1>&"));
        assert!(!is_redirect_operator("2"));
        assert!(!is_redirect_operator("2x>"));
        assert!(!is_redirect_operator("2>file"));
    }

    #[test]
    fn test_operator_sets_are_disjoint_from_words() {
        assert!(is_pipe_operator("|"));
        assert!(is_pipe_operator("|&"));
        assert!(is_control_operator("&&"));
        assert!(!is_control_operator("|"));
        assert!(is_redirect_operator("<<<"));
        assert!(!is_redirect_operator("grep"));
    }

    #[test]
    fn test_token_type_serde_names() {
        let json = serde_json::to_string(&TokenType::ControlOperator).unwrap();
        assert_eq!(json, "\"controlOperator\"");
        let back: TokenType = serde_json::from_str("\"assignment\"").unwrap();
        assert_eq!(back, TokenType::Assignment);
    }

    #[test]
    fn test_raw_token_kinds() {
        let tokens = vec!["echo".to_string(), "|".to_string(), "2>>".to_string()];
        let raw = raw_tokens(&tokens);
        assert_eq!(raw[0].kind, RawTokenKind::Word);
        assert_eq!(raw[1].kind, RawTokenKind::Op);
        assert_eq!(raw[2].kind, RawTokenKind::Op);
    }
}
