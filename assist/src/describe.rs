//! Per-token description orchestration.
//!
//! Structural tokens (pipes, redirects, operators, assignments) get
//! static descriptions; recognizable argument shapes get heuristic
//! ones; everything else is filled by the LLM, grounded in BM25
//! man-page context. Results are cached keyed by the original command
//! string and a hash of the man-page content they were derived from.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::debug;

use cmdscribe_cache::DescriptionCache;
use cmdscribe_core::{
    ParsedCommand, ParsedToken, ShellName, TokenType, classify_tokens, command_names,
};
use cmdscribe_manpage::{ManPage, ManPageSource, ManPageStore, build_context};

use crate::config::Config;
use crate::llm::{LlmClient, LlmRequest, parse_token_descriptions};
use crate::prompts::{describe_tokens_prompt, resolve_prompt};

/// Placeholder for tokens nothing could describe.
pub const NO_DESCRIPTION: &str = "(no description available)";

static EXTENSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\s]+\.[A-Za-z0-9]{1,5}$").expect("valid regex"));

static NUMERIC_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("valid regex"));

static OUTPUT_REDIRECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d*>>?").expect("valid regex"));

/// How a description run went; surfaced by `config-debug` style tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribeDiagnostics {
    pub token_count: usize,
    pub static_count: usize,
    pub cache_hit: bool,
    pub llm_attempted: bool,
    pub llm_received_length: Option<usize>,
    pub llm_repaired: bool,
    pub missing_indices: Vec<usize>,
    pub extra_indices: Vec<i64>,
    pub duplicate_indices: Vec<usize>,
}

/// Hashes the man-page content descriptions are grounded in.
///
/// The hash input is the ordered `[name, synopsis, description]` of
/// every page, each present part fed to the hasher followed by a
/// newline separator (absent parts contribute only the separator).
/// Descriptions derived from changed pages therefore miss the cache.
///
/// # Examples
///
/// ```
/// use cmdscribe_assist::hash_man_sources;
/// use cmdscribe_manpage::extract_man_sections;
///
/// let a = extract_man_sections("ls", "NAME\nls - list files\n");
/// let b = extract_man_sections("ls", "NAME\nls - list files, differently\n");
/// assert_ne!(hash_man_sources(&[a.clone()]), hash_man_sources(&[b]));
/// assert_eq!(hash_man_sources(&[a.clone()]), hash_man_sources(&[a]));
/// ```
pub fn hash_man_sources(man_pages: &[ManPage]) -> String {
    let mut hasher = Sha256::new();
    for page in man_pages {
        for part in [&page.name, &page.synopsis, &page.description] {
            if let Some(text) = part {
                hasher.update(text.as_bytes());
            }
            hasher.update(b"\n");
        }
    }
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

/// Returns the static description for a token, if it has one.
///
/// Static coverage includes all structural token types plus common
/// argument and option shapes; tokens without a static description are
/// the LLM's job.
pub fn static_token_description(
    token: &ParsedToken,
    index: usize,
    all_tokens: &[ParsedToken],
) -> Option<String> {
    match token.token_type {
        TokenType::Pipe => return Some("Pipe output to the next command".to_string()),
        TokenType::ControlOperator => return Some("Control command execution flow".to_string()),
        TokenType::Redirect => return Some("Redirect input or output".to_string()),
        TokenType::Assignment => return Some("Set an environment variable".to_string()),
        TokenType::Unknown => return Some("Unknown token".to_string()),
        _ => {}
    }

    if token.token_type == TokenType::Argument {
        let previous = index.checked_sub(1).and_then(|i| all_tokens.get(i));
        if let Some(previous) = previous {
            if previous.token_type == TokenType::Redirect {
                return Some(describe_redirect_target(&previous.value, &token.value));
            }
        }
        if is_likely_file_path(&token.value) {
            return Some(describe_file_path(&token.value));
        }
        if is_glob_pattern(&token.value) {
            return Some(format!("Pattern argument ({}) used for matching", token.value));
        }
        if NUMERIC_VALUE.is_match(&token.value) {
            return Some(format!("Numeric argument ({})", token.value));
        }
    }

    if token.token_type == TokenType::Option {
        if token.value == "-h" || token.value == "--help" {
            return Some("Display help information".to_string());
        }
        if token.value == "-v" || token.value == "--version" {
            return Some("Show version information".to_string());
        }
    }

    None
}

fn describe_redirect_target(redirect: &str, value: &str) -> String {
    if OUTPUT_REDIRECT.is_match(redirect) || redirect.contains('>') {
        format!("Output target for redirect ({value})")
    } else if redirect.contains("<<") {
        format!("Here-document delimiter ({value})")
    } else if redirect.contains('<') {
        format!("Input source for redirect ({value})")
    } else {
        format!("Redirect target ({value})")
    }
}

fn is_likely_file_path(value: &str) -> bool {
    value.starts_with('/')
        || value.starts_with("./")
        || value.starts_with("../")
        || value.starts_with("~/")
        || value.contains(['/', '\\'])
        || EXTENSION_SUFFIX.is_match(value)
}

fn describe_file_path(value: &str) -> String {
    if value.starts_with('/') {
        format!("Absolute path argument ({value})")
    } else if value.starts_with("./") || value.starts_with("../") {
        format!("Relative path argument ({value})")
    } else if value.starts_with("~/") {
        format!("Home-relative path argument ({value})")
    } else {
        format!("File argument ({value})")
    }
}

fn is_glob_pattern(value: &str) -> bool {
    value.contains(['*', '?', '['])
}

/// Produces one description per token for a command line.
///
/// The pipeline: gather man pages for the command tokens, hash their
/// sections, consult the cache, fill static descriptions, ask the LLM
/// for the gaps (when a client is available), replace remaining blanks
/// with [`NO_DESCRIPTION`], and persist the result.
pub fn fetch_token_descriptions<S: ManPageSource>(
    parsed: &ParsedCommand,
    store: &ManPageStore<S>,
    cache: Option<&DescriptionCache>,
    llm: Option<&dyn LlmClient>,
    shell: ShellName,
    config: &Config,
) -> (Vec<String>, DescribeDiagnostics) {
    let tokens = classify_tokens(&parsed.tokens);
    let names = command_names(&tokens);
    let man_pages = store.get_all(&names);
    let source_hash = hash_man_sources(&man_pages);

    let mut diagnostics = DescribeDiagnostics {
        token_count: parsed.tokens.len(),
        ..Default::default()
    };

    if let Some(cache) = cache {
        match cache.get(parsed, &source_hash) {
            Ok(Some(cached)) => {
                diagnostics.cache_hit = true;
                diagnostics.static_count = cached.iter().filter(|d| !d.is_empty()).count();
                return (cached, diagnostics);
            }
            Ok(None) => {}
            Err(error) => debug!(error = %error, "Cache lookup failed"),
        }
    }

    let mut descriptions = vec![String::new(); parsed.tokens.len()];
    for (index, token) in tokens.iter().enumerate() {
        if let Some(description) = static_token_description(token, index, &tokens) {
            if let Some(slot) = descriptions.get_mut(index) {
                *slot = description;
            }
        }
    }
    diagnostics.static_count = descriptions.iter().filter(|d| !d.is_empty()).count();

    let has_missing = descriptions.iter().any(String::is_empty);
    if has_missing {
        if let Some(llm) = llm {
            diagnostics.llm_attempted = true;
            if let Some(result) = request_llm_descriptions(
                parsed, &tokens, &man_pages, llm, shell, config,
            ) {
                diagnostics.llm_received_length = Some(result.received_length);
                diagnostics.llm_repaired = result.repaired;
                diagnostics.missing_indices = result.missing_indices;
                diagnostics.extra_indices = result.extra_indices;
                diagnostics.duplicate_indices = result.duplicate_indices;

                // Static descriptions always win; the LLM only fills
                // the slots static coverage left blank.
                for (index, token) in tokens.iter().enumerate() {
                    if static_token_description(token, index, &tokens).is_none() {
                        if let Some(description) = result.descriptions.get(index) {
                            if !description.is_empty() {
                                descriptions[index] = description.clone();
                            }
                        }
                    }
                }
            }
        }
    }

    for slot in &mut descriptions {
        if slot.is_empty() {
            *slot = NO_DESCRIPTION.to_string();
        }
    }

    if let Some(cache) = cache {
        if let Err(error) = cache.put(parsed, &source_hash, &descriptions) {
            debug!(error = %error, "Cache save failed");
        }
    }

    (descriptions, diagnostics)
}

fn request_llm_descriptions(
    parsed: &ParsedCommand,
    tokens: &[ParsedToken],
    man_pages: &[ManPage],
    llm: &dyn LlmClient,
    shell: ShellName,
    config: &Config,
) -> Option<crate::llm::TokenDescriptionsResult> {
    let options = config.context_options();
    let context = man_pages
        .iter()
        .map(|page| build_context(page, tokens, &options))
        .collect::<Vec<_>>()
        .join("\n\n");

    let payload = serde_json::json!({
        "expectedTokenCount": tokens.len(),
        "parsedTokens": tokens
            .iter()
            .enumerate()
            .map(|(index, token)| {
                serde_json::json!({
                    "index": index,
                    "value": token.value,
                    "type": token.token_type,
                })
            })
            .collect::<Vec<_>>(),
        "context": context,
    });

    let (system, user) = resolve_prompt(
        &config.prompts.describe,
        describe_tokens_prompt(shell),
        payload.to_string(),
    );

    let response = match llm.complete(&LlmRequest { system, user }) {
        Ok(response) => response,
        Err(error) => {
            debug!(error = %error, command = %parsed.original, "Description request failed");
            return None;
        }
    };

    parse_token_descriptions(&response, tokens.len())
}
