//! System prompts for the assistant's LLM calls.
//!
//! Prompts are shell-aware so the model targets the right dialect, and
//! they all insist on bare command output: no markdown, no prompt
//! characters, no commentary.

use cmdscribe_core::ShellName;

use crate::config::PromptOverride;

fn role_preamble(shell: ShellName) -> String {
    format!("You are a command-line expert working with the shell: {shell}.")
}

/// System prompt for command completion.
pub fn suggest_system_prompt(shell: ShellName) -> String {
    format!(
        "{role}\n\
         You will be provided with a JSON payload containing:\n\
         - \"input\": the partial {shell} command the user has typed\n\
         - \"tokens\": an array of parsed tokens for the current input\n\
         - \"context\": concise excerpts from relevant man pages\n\
         Produce the single best complete {shell} command that satisfies the described intent.\n\
         - You may replace or reorder the tokens as needed; do not merely append text.\n\
         - Return exactly one command line with no trailing commentary or markdown.\n\
         - Do not include surrounding quotes, code fences, or prompt characters.",
        role = role_preamble(shell),
    )
}

/// System prompt for one-line command explanation.
pub fn explain_system_prompt(shell: ShellName) -> String {
    format!(
        "{role}\n\
         You will be provided with a JSON payload containing:\n\
         - \"command\": the complete {shell} command\n\
         - \"tokens\": the parsed tokens for the command\n\
         - \"context\": concise excerpts from relevant man pages\n\
         Explain what the command does in a single concise sentence (no more than 30 words).\n\
         - Emphasize the overall effect and the role of key tokens.\n\
         - Do not include markdown, lists, or multiple sentences.\n\
         - Return only the explanation text.",
        role = role_preamble(shell),
    )
}

/// System prompt for natural-language command generation.
pub fn generate_system_prompt(shell: ShellName) -> String {
    format!(
        "{role}\n\
         You will be provided with a natural language prompt describing a task.\n\
         Generate the single most likely {shell} command that achieves the goal.\n\
         The command may combine pipes and shell operators but must be a single line.\n\
         ONLY return the command itself, with no explanation or formatting.",
        role = role_preamble(shell),
    )
}

/// System prompt for per-token descriptions, embedding the JSON
/// response schema.
pub fn describe_tokens_prompt(shell: ShellName) -> String {
    format!(
        "{role}\n\
         Return ONLY valid JSON that matches the following schema:\n\
         {{\"descriptions\": [{{\"index\": number, \"description\": string}}]}}\n\
         Analyze the provided {shell} command, already parsed into individual tokens.\n\
         Return one description entry for every token index provided.\n\
         - Each entry must include the token index it describes.\n\
         - Order entries from the lowest index to the highest.\n\
         - If you cannot describe a token, set its description to \"\".\n\
         - Never omit or add indices beyond the range provided.\n\
         - Keep each description to a single concise sentence (no more than 20 words).\n\
         You will be provided with parsedTokens (index, value, type) and context\n\
         (relevant man page excerpts).",
        role = role_preamble(shell),
    )
}

/// Applies a configured override to a built-in system prompt and user
/// payload, collapsing whitespace the way prompts are transmitted.
pub fn resolve_prompt(
    override_config: &PromptOverride,
    default_system: String,
    user_payload: String,
) -> (String, String) {
    let system = override_config
        .system_prompt
        .clone()
        .unwrap_or(default_system);
    let user = match &override_config.user_prompt {
        Some(preamble) => format!("{preamble}\n\n{user_payload}"),
        None => user_payload,
    };
    (sanitize_prompt(&system), user)
}

/// Collapses internal whitespace runs into single spaces.
fn sanitize_prompt(prompt: &str) -> String {
    prompt.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_name_the_shell() {
        let prompt = suggest_system_prompt(ShellName::Zsh);
        assert!(prompt.contains("zsh"));
        assert!(!prompt.contains("bash"));
    }

    #[test]
    fn test_describe_prompt_embeds_schema() {
        let prompt = describe_tokens_prompt(ShellName::Bash);
        assert!(prompt.contains("\"descriptions\""));
        assert!(prompt.contains("\"index\""));
    }

    #[test]
    fn test_override_replaces_system_prompt() {
        let override_config = PromptOverride {
            system_prompt: Some("Be terse.".to_string()),
            user_prompt: None,
        };
        let (system, user) = resolve_prompt(
            &override_config,
            "default system".to_string(),
            "payload".to_string(),
        );
        assert_eq!(system, "Be terse.");
        assert_eq!(user, "payload");
    }

    #[test]
    fn test_user_preamble_is_prepended() {
        let override_config = PromptOverride {
            system_prompt: None,
            user_prompt: Some("Prefer POSIX.".to_string()),
        };
        let (_, user) = resolve_prompt(&override_config, "sys".to_string(), "payload".to_string());
        assert!(user.starts_with("Prefer POSIX.\n\n"));
    }

    #[test]
    fn test_sanitize_collapses_newlines() {
        let (system, _) = resolve_prompt(
            &PromptOverride::default(),
            "a\n  b\t c".to_string(),
            String::new(),
        );
        assert_eq!(system, "a b c");
    }
}
