//! Top-level assistant actions: suggest, explain, generate.

use cmdscribe_core::ShellName;
use cmdscribe_manpage::ManPageSource;
use cmdscribe_manpage::ManPageStore;
use tracing::debug;

use crate::config::Config;
use crate::context::build_command_context;
use crate::llm::{LlmClient, LlmError, LlmRequest};
use crate::prompts::{
    explain_system_prompt, generate_system_prompt, resolve_prompt, suggest_system_prompt,
};

/// Completes a partial command line.
///
/// The payload carries the raw input, the classified token values, and
/// BM25 man-page context for every command token seen so far.
pub fn suggest<S: ManPageSource>(
    line: &str,
    store: &ManPageStore<S>,
    llm: &dyn LlmClient,
    shell: ShellName,
    config: &Config,
) -> Result<String, LlmError> {
    let command_context = build_command_context(line, store, &config.context_options());
    let payload = serde_json::json!({
        "input": line,
        "tokens": command_context
            .tokens
            .iter()
            .map(|token| token.value.as_str())
            .collect::<Vec<_>>(),
        "context": command_context.context,
    });

    let (system, user) = resolve_prompt(
        &config.prompts.suggest,
        suggest_system_prompt(shell),
        payload.to_string(),
    );
    let completion = llm.complete(&LlmRequest { system, user })?;
    Ok(first_line(&completion))
}

/// Explains a complete command line in one sentence.
///
/// An empty line short-circuits without touching the LLM.
pub fn explain<S: ManPageSource>(
    line: &str,
    store: &ManPageStore<S>,
    llm: &dyn LlmClient,
    shell: ShellName,
    config: &Config,
) -> Result<String, LlmError> {
    if line.trim().is_empty() {
        debug!("explain: empty line");
        return Ok("No command to explain.".to_string());
    }

    let command_context = build_command_context(line, store, &config.context_options());
    let payload = serde_json::json!({
        "command": line,
        "tokens": command_context
            .tokens
            .iter()
            .map(|token| token.value.as_str())
            .collect::<Vec<_>>(),
        "context": command_context.context,
    });

    let (system, user) = resolve_prompt(
        &config.prompts.explain,
        explain_system_prompt(shell),
        payload.to_string(),
    );
    let explanation = llm.complete(&LlmRequest { system, user })?;
    Ok(explanation.trim().to_string())
}

/// Generates a command from a natural-language prompt.
pub fn generate(
    prompt: &str,
    llm: &dyn LlmClient,
    shell: ShellName,
    config: &Config,
) -> Result<String, LlmError> {
    let (system, user) = resolve_prompt(
        &config.prompts.generate,
        generate_system_prompt(shell),
        prompt.to_string(),
    );
    let completion = llm.complete(&LlmRequest { system, user })?;
    Ok(first_line(&completion))
}

/// Commands must be a single line; anything past the first is model
/// chatter.
fn first_line(completion: &str) -> String {
    completion.trim().lines().next().unwrap_or("").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::StaticLlmClient;
    use cmdscribe_manpage::StaticManSource;

    fn store() -> ManPageStore<StaticManSource> {
        ManPageStore::new(StaticManSource::new([(
            "ls",
            "NAME\nls - list directory contents\n",
        )]))
    }

    #[test]
    fn test_suggest_returns_single_line() {
        let client = StaticLlmClient::responding("ls -la\nextra chatter");
        let result = suggest(
            "ls -",
            &store(),
            &client,
            ShellName::Bash,
            &Config::default(),
        )
        .unwrap();
        assert_eq!(result, "ls -la");
    }

    #[test]
    fn test_explain_short_circuits_empty_line() {
        let client = StaticLlmClient::failing(|| LlmError::NotConfigured);
        let result = explain(
            "   ",
            &store(),
            &client,
            ShellName::Bash,
            &Config::default(),
        )
        .unwrap();
        assert_eq!(result, "No command to explain.");
    }

    #[test]
    fn test_explain_trims_response() {
        let client = StaticLlmClient::responding("  Lists files in long format.  \n");
        let result = explain(
            "ls -la",
            &store(),
            &client,
            ShellName::Bash,
            &Config::default(),
        )
        .unwrap();
        assert_eq!(result, "Lists files in long format.");
    }

    #[test]
    fn test_generate_propagates_llm_errors() {
        let client = StaticLlmClient::failing(|| LlmError::NotConfigured);
        let result = generate("list files", &client, ShellName::Bash, &Config::default());
        assert!(result.is_err());
    }
}
