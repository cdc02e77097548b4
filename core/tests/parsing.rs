//! End-to-end parsing tests across all shell profiles.

use cmdscribe_core::{ParsedCommand, ShellName, TokenType, profile_for};

#[test]
fn all_shells_tokenize_quoted_phrases() {
    for &shell in ShellName::ALL {
        let profile = profile_for(shell);
        let tokens = profile.tokenize(Some("echo \"hello world\""));
        assert_eq!(tokens.len(), 2, "{shell}: expected exactly two tokens");
        assert_eq!(tokens[0], "echo");
        assert_eq!(tokens[1], "\"hello world\"");
    }
}

#[test]
fn all_shells_classify_options_and_arguments() {
    for &shell in ShellName::ALL {
        let profile = profile_for(shell);
        let (_, parsed) = profile.parse_line("grep -f file pattern");
        let types: Vec<TokenType> = parsed.iter().map(|t| t.token_type).collect();
        assert_eq!(
            types,
            vec![
                TokenType::Command,
                TokenType::Option,
                TokenType::Argument,
                TokenType::Argument,
            ],
            "{shell}"
        );
        assert_eq!(parsed[1].value, "-f");
        assert_eq!(parsed[2].value, "file");
        assert_eq!(parsed[3].value, "pattern");
    }
}

#[test]
fn all_shells_classify_pipes_control_operators_and_redirects() {
    for &shell in ShellName::ALL {
        let profile = profile_for(shell);
        let (_, parsed) = profile.parse_line("cat file | grep foo && echo done > out.txt");
        let types: Vec<TokenType> = parsed.iter().map(|t| t.token_type).collect();
        assert_eq!(
            types,
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
            ],
            "{shell}"
        );
    }
}

#[test]
fn single_spaced_commands_round_trip_through_join() {
    let commands = [
        "ls -la /tmp",
        "cat file | grep foo && echo done > out.txt",
        "FOO=bar make -j4 target",
        "tar -xzf archive.tar.gz",
    ];
    for command in commands {
        let parsed = ParsedCommand::from_line(command);
        assert_eq!(parsed.joined(), command);
    }
}

#[test]
fn multi_space_runs_collapse_but_stay_equivalent() {
    let parsed = ParsedCommand::from_line("ls   -la");
    assert_eq!(parsed.joined(), "ls -la");
    let reparsed = ParsedCommand::from_line(&parsed.joined());
    assert_eq!(reparsed.tokens, parsed.tokens);
}
