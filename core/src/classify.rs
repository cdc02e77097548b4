//! Positional token classification.
//!
//! Assigns a [`TokenType`] to each lexed token using a small state
//! machine: a segment starts expecting a command, pipes and control
//! operators start a new segment, and everything after the command is
//! an option or argument. Classification is total; nothing is rejected.

use crate::token::{
    ASSIGNMENT_PATTERN, ParsedToken, RawTokenKind, TokenType, is_control_operator,
    is_pipe_operator, is_redirect_operator, raw_tokens,
};

/// How option tokens relate to the word that follows them.
///
/// The two strategies exist because consumers disagree on whether an
/// option "owns" its value: the annotated view wants one entry per
/// token, while schema-style consumers want `-o value` folded together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifyStrategy {
    /// Options and the words after them stay separate tokens.
    #[default]
    Simple,
    /// An option followed by a non-dash word captures it as its
    /// `option_value`, consuming the word.
    OptionValuePairing,
}

/// Classifies tokens with the default [`ClassifyStrategy::Simple`]
/// strategy.
///
/// # Examples
///
/// ```
/// use cmdscribe_core::{classify_tokens, tokenize_str, TokenType};
///
/// let tokens = tokenize_str("grep -f file pattern");
/// let parsed = classify_tokens(&tokens);
/// let types: Vec<TokenType> = parsed.iter().map(|t| t.token_type).collect();
/// assert_eq!(
///     types,
///     vec![
///         TokenType::Command,
///         TokenType::Option,
///         TokenType::Argument,
///         TokenType::Argument,
///     ]
/// );
/// ```
pub fn classify_tokens(tokens: &[String]) -> Vec<ParsedToken> {
    classify_tokens_with(ClassifyStrategy::Simple, tokens)
}

/// Classifies tokens with an explicit strategy.
pub fn classify_tokens_with(strategy: ClassifyStrategy, tokens: &[String]) -> Vec<ParsedToken> {
    let raw = raw_tokens(tokens);
    let mut parsed: Vec<ParsedToken> = Vec::with_capacity(raw.len());
    let mut expecting_command = true;
    let mut command_seen = false;

    let mut i = 0;
    while i < raw.len() {
        let token = &raw[i];
        i += 1;
        if token.raw.is_empty() {
            continue;
        }

        if token.kind == RawTokenKind::Op {
            if is_pipe_operator(&token.raw) {
                parsed.push(ParsedToken::new(&token.raw, TokenType::Pipe));
                expecting_command = true;
                command_seen = false;
                continue;
            }
            if is_control_operator(&token.raw) {
                parsed.push(ParsedToken::new(&token.raw, TokenType::ControlOperator));
                expecting_command = true;
                command_seen = false;
                continue;
            }
            if is_redirect_operator(&token.raw) {
                // Redirects don't end the segment and don't consume
                // their target; the target classifies as an argument.
                parsed.push(ParsedToken::new(&token.raw, TokenType::Redirect));
                continue;
            }
            parsed.push(ParsedToken::new(&token.raw, TokenType::Unknown));
            continue;
        }

        if token.kind == RawTokenKind::Unknown {
            parsed.push(ParsedToken::new(&token.raw, TokenType::Unknown));
            continue;
        }

        if !command_seen && ASSIGNMENT_PATTERN.is_match(&token.raw) {
            parsed.push(ParsedToken::new(&token.raw, TokenType::Assignment));
            continue;
        }

        if expecting_command {
            parsed.push(ParsedToken::new(&token.raw, TokenType::Command));
            expecting_command = false;
            command_seen = true;
            continue;
        }

        if token.raw.starts_with('-') {
            if strategy == ClassifyStrategy::OptionValuePairing {
                let next = raw.get(i);
                if let Some(next) = next {
                    if next.kind == RawTokenKind::Word && !next.raw.starts_with('-') {
                        parsed.push(ParsedToken::with_option_value(&token.raw, &next.raw));
                        i += 1;
                        continue;
                    }
                }
            }
            parsed.push(ParsedToken::new(&token.raw, TokenType::Option));
            continue;
        }

        parsed.push(ParsedToken::new(&token.raw, TokenType::Argument));
    }

    parsed
}

/// Returns the distinct command-token values in first-seen order.
///
/// # Examples
///
/// ```
/// use cmdscribe_core::{classify_tokens, command_names, tokenize_str};
///
/// let parsed = classify_tokens(&tokenize_str("cat a | grep b | cat c"));
/// assert_eq!(command_names(&parsed), vec!["cat", "grep"]);
/// ```
pub fn command_names(tokens: &[ParsedToken]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for token in tokens {
        if token.token_type == TokenType::Command && !names.contains(&token.value) {
            names.push(token.value.clone());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize_str;

    fn types(input: &str) -> Vec<TokenType> {
        classify_tokens(&tokenize_str(input))
            .iter()
            .map(|t| t.token_type)
            .collect()
    }

    #[test]
    fn test_command_option_arguments() {
        assert_eq!(
            types("grep -f file pattern"),
            vec![
                TokenType::Command,
                TokenType::Option,
                TokenType::Argument,
                TokenType::Argument,
            ]
        );
        let parsed = classify_tokens(&tokenize_str("grep -f file pattern"));
        assert_eq!(parsed[1].value, "-f");
    }

    #[test]
    fn test_pipeline_with_control_and_redirect() {
        assert_eq!(
            types("cat file | grep foo && echo done > out.txt"),
            vec![
                TokenType::Command,
                TokenType::Argument,
                TokenType::Pipe,
                TokenType::Command,
                TokenType::Argument,
                TokenType::ControlOperator,
                TokenType::Command,
                TokenType::Argument,
                TokenType::Redirect,
                TokenType::Argument,
            ]
        );
    }

    #[test]
    fn test_assignment_before_command_only() {
        assert_eq!(
            types("FOO=bar make target"),
            vec![
                TokenType::Assignment,
                TokenType::Command,
                TokenType::Argument,
            ]
        );
        // After the command the same shape is an argument.
        assert_eq!(
            types("env FOO=bar"),
            vec![TokenType::Command, TokenType::Argument]
        );
    }

    #[test]
    fn test_assignment_resets_after_pipe() {
        assert_eq!(
            types("cat f | FOO=bar cmd"),
            vec![
                TokenType::Command,
                TokenType::Argument,
                TokenType::Pipe,
                TokenType::Assignment,
                TokenType::Command,
            ]
        );
    }

    #[test]
    fn test_numeric_redirect_classifies_as_redirect() {
        assert_eq!(
            types("cmd 2>> err.log"),
            vec![TokenType::Command, TokenType::Redirect, TokenType::Argument]
        );
    }

    #[test]
    fn test_redirect_does_not_reset_segment() {
        // The token after a redirect target is still in the same
        // segment, so a dash word is an option.
        assert_eq!(
            types("cmd > out -v"),
            vec![
                TokenType::Command,
                TokenType::Redirect,
                TokenType::Argument,
                TokenType::Option,
            ]
        );
    }

    #[test]
    fn test_option_value_pairing_strategy() {
        let tokens = tokenize_str("grep -f file pattern");
        let parsed = classify_tokens_with(ClassifyStrategy::OptionValuePairing, &tokens);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1].value, "-f");
        assert_eq!(parsed[1].option_value.as_deref(), Some("file"));
        assert_eq!(parsed[2].token_type, TokenType::Argument);
    }

    #[test]
    fn test_option_value_pairing_skips_dash_words() {
        let tokens = tokenize_str("ls -l -a");
        let parsed = classify_tokens_with(ClassifyStrategy::OptionValuePairing, &tokens);
        assert_eq!(parsed.len(), 3);
        assert!(parsed[1].option_value.is_none());
    }

    #[test]
    fn test_empty_tokens_are_skipped() {
        let tokens = vec!["ls".to_string(), String::new(), "-l".to_string()];
        let parsed = classify_tokens(&tokens);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].token_type, TokenType::Option);
    }

    #[test]
    fn test_command_names_dedupe() {
        let parsed = classify_tokens(&tokenize_str("cat a | grep b | cat c"));
        assert_eq!(command_names(&parsed), vec!["cat", "grep"]);
    }
}
