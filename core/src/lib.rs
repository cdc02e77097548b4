//! Shell command tokenization and classification.
//!
//! This crate turns a raw command line into a structured, classified
//! token sequence:
//!
//! - [`tokenize`] / [`tokenize_str`] — a shell-lexical tokenizer that
//!   honors quoting, backslash escapes, and greedy multi-character
//!   operator matching (including numeric-prefixed redirects such as
//!   `2>>`).
//! - [`classify_tokens`] — assigns each token a semantic
//!   [`TokenType`] (command, option, argument, assignment, pipe,
//!   control operator, redirect, unknown) using positional state.
//! - [`ShellProfile`] — per-shell capability bundle (bash/zsh/sh)
//!   selecting tokenizer, classifier strategy, history location, and
//!   readline accessor.
//!
//! All parsing functions are total: no input is rejected, and the
//! worst case is a best-effort classification.
//!
//! # Example
//!
//! ```
//! use cmdscribe_core::{classify_tokens, tokenize_str, TokenType};
//!
//! let tokens = tokenize_str("cat file | grep foo > out.txt");
//! let parsed = classify_tokens(&tokens);
//!
//! assert_eq!(parsed[0].token_type, TokenType::Command);
//! assert_eq!(parsed[2].token_type, TokenType::Pipe);
//! assert_eq!(parsed[5].token_type, TokenType::Redirect);
//! ```

mod classify;
mod lexer;
mod shell;
mod token;

pub use classify::{ClassifyStrategy, classify_tokens, classify_tokens_with, command_names};
pub use lexer::{tokenize, tokenize_str};
pub use shell::{
    SHELL_OVERRIDE_VAR, ShellName, ShellProfile, has_readline_line, identify_shell,
    identify_shell_from, profile_for, readline_line,
};
pub use token::{
    ASSIGNMENT_PATTERN, CONTROL_OPERATORS, NUMERIC_REDIRECT, OPERATOR_PRIORITY, PIPE_OPERATORS,
    ParsedCommand, ParsedToken, RawToken, RawTokenKind, REDIRECT_OPERATORS, TokenType,
    is_control_operator, is_pipe_operator, is_redirect_operator, raw_tokens,
};
