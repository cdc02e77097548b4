//! Assistant plumbing: configuration, prompts, the LLM boundary, and
//! the description orchestrator.
//!
//! This crate glues the parsing and retrieval layers into user-facing
//! behavior:
//!
//! - [`Config`] — YAML user configuration with full serde defaults.
//! - [`LlmClient`] — the provider seam; [`CommandLlmClient`] pipes
//!   prompts through an external command, [`StaticLlmClient`] serves
//!   tests.
//! - [`build_command_context`] — command line → classified tokens →
//!   per-command BM25 man-page context.
//! - [`fetch_token_descriptions`] — static + LLM descriptions behind
//!   the SQLite cache, keyed by a hash of the grounding man pages.
//! - [`suggest`] / [`explain`] / [`generate`] — the three LLM-backed
//!   actions.
//! - Shell history reading and output channels.

mod actions;
mod config;
mod context;
mod describe;
mod history;
mod llm;
mod output;
mod prompts;

pub use actions::{explain, generate, suggest};
pub use config::{
    Config, ConfigError, ContextConfig, LlmConfig, PromptOverride, PromptsConfig,
};
pub use context::{CommandContext, build_command_context};
pub use describe::{
    DescribeDiagnostics, NO_DESCRIPTION, fetch_token_descriptions, hash_man_sources,
    static_token_description,
};
pub use history::{fetch_shell_history, parse_history_output};
pub use llm::{
    CommandLlmClient, DescriptionEntry, DescriptionsPayload, LlmClient, LlmError, LlmRequest,
    StaticLlmClient, TokenDescriptionsResult, align_descriptions, parse_token_descriptions,
};
pub use output::{OutputChannel, emit_output};
pub use prompts::{
    describe_tokens_prompt, explain_system_prompt, generate_system_prompt, resolve_prompt,
    suggest_system_prompt,
};
