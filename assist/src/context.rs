//! Command-line context assembly.
//!
//! Ties the parsing pipeline to the retrieval engine: a raw command
//! line becomes classified tokens, each distinct command token loads
//! its man page through the store, and each page contributes a
//! budgeted BM25 context block.

use cmdscribe_core::{ParsedCommand, ParsedToken, classify_tokens, command_names};
use cmdscribe_manpage::{ContextOptions, ManPage, ManPageSource, ManPageStore, build_context};

/// Everything derived from one command line in a single pass.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// The lexed command line.
    pub parsed_command: ParsedCommand,
    /// Classified tokens.
    pub tokens: Vec<ParsedToken>,
    /// Man pages found for the command tokens, in first-seen order.
    pub man_pages: Vec<ManPage>,
    /// Joined BM25 context blocks, one per man page.
    pub context: String,
}

/// Builds the full context for a command line.
///
/// Man pages are looked up sequentially, one per distinct command
/// token; absent pages are skipped silently.
///
/// # Examples
///
/// ```
/// use cmdscribe_assist::build_command_context;
/// use cmdscribe_manpage::{ContextOptions, ManPageStore, StaticManSource};
///
/// let store = ManPageStore::new(StaticManSource::new([(
///     "ls",
///     "NAME\nls - list directory contents\n",
/// )]));
/// let context = build_command_context("ls -la", &store, &ContextOptions::default());
///
/// assert_eq!(context.tokens.len(), 2);
/// assert_eq!(context.man_pages.len(), 1);
/// assert!(context.context.contains("ls - list directory contents"));
/// ```
pub fn build_command_context<S: ManPageSource>(
    line: &str,
    store: &ManPageStore<S>,
    options: &ContextOptions,
) -> CommandContext {
    let parsed_command = ParsedCommand::from_line(line);
    let tokens = classify_tokens(&parsed_command.tokens);
    let names = command_names(&tokens);
    let man_pages = store.get_all(&names);

    let context = man_pages
        .iter()
        .map(|page| build_context(page, &tokens, options))
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    CommandContext {
        parsed_command,
        tokens,
        man_pages,
        context,
    }
}
