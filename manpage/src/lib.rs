//! Man-page loading, parsing, and BM25-ranked context retrieval.
//!
//! The pipeline: a [`ManPageSource`] supplies rendered man-page text
//! (`man -P cat` or in-memory fixtures), [`extract_man_sections`]
//! cleans it and splits out NAME/SYNOPSIS/DESCRIPTION plus parsed
//! option entries, and [`build_context`] assembles a character-budgeted
//! excerpt ranked by BM25 relevance against a classified command line.
//! A [`ManPageStore`] memoizes parsed pages per command name.
//!
//! Everything here is total over its inputs: a missing or malformed
//! man page degrades to `None` or an empty section, never an error.
//!
//! # Example
//!
//! ```
//! use cmdscribe_core::{classify_tokens, tokenize_str};
//! use cmdscribe_manpage::{ContextOptions, ManPageStore, StaticManSource, build_context};
//!
//! let source = StaticManSource::new([(
//!     "ls",
//!     "NAME\nls - list directory contents\n\nSYNOPSIS\nls [OPTION]... [FILE]...\n",
//! )]);
//! let store = ManPageStore::new(source);
//!
//! let tokens = classify_tokens(&tokenize_str("ls -la"));
//! let page = store.get("ls").unwrap();
//! let context = build_context(&page, &tokens, &ContextOptions::default());
//! assert!(context.contains("SYNOPSIS"));
//! ```

mod parser;
mod retrieval;
mod source;
mod store;

use serde::{Deserialize, Serialize};

pub use parser::{ManOption, ManSections, parse_man_options, split_into_sections, strip_formatting};
pub use retrieval::{
    ContextOptions, DEFAULT_CONTEXT_CHARS, DEFAULT_MAX_SNIPPETS, build_context,
};
pub use source::{ManPageSource, StaticManSource, SystemManSource};
pub use store::ManPageStore;

/// A parsed man page for one command.
///
/// Created once per distinct command name and never mutated; absent
/// pages are represented as `None` at the lookup layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManPage {
    /// Command the page documents.
    pub command: String,
    /// Raw page text as fetched, formatting artifacts included.
    pub full_text: String,
    /// NAME section, cleaned.
    pub name: Option<String>,
    /// SYNOPSIS section, cleaned.
    pub synopsis: Option<String>,
    /// DESCRIPTION section, cleaned.
    pub description: Option<String>,
    /// Option entries parsed from the DESCRIPTION section, or from the
    /// whole page when the DESCRIPTION yields none.
    pub options: Vec<ManOption>,
}

/// Cleans raw man-page text and extracts its sections and options.
///
/// Option parsing runs against the DESCRIPTION section first and falls
/// back to the entire cleaned text when that yields nothing, which
/// covers pages that list options under a separate OPTIONS heading.
///
/// # Examples
///
/// ```
/// use cmdscribe_manpage::extract_man_sections;
///
/// let text = "NAME\nfoo - sample\n\nOPTIONS\n  -q  be quiet\n";
/// let page = extract_man_sections("foo", text);
/// assert_eq!(page.name.as_deref(), Some("foo - sample\n\n"));
/// assert_eq!(page.options[0].short.as_deref(), Some("-q"));
/// ```
pub fn extract_man_sections(command: &str, full_text: &str) -> ManPage {
    let cleaned = strip_formatting(full_text);
    let sections = split_into_sections(&cleaned);

    let mut options = match sections.description.as_deref() {
        Some(description) => parse_man_options(description),
        None => Vec::new(),
    };
    if options.is_empty() {
        options = parse_man_options(&cleaned);
    }

    ManPage {
        command: command.to_string(),
        full_text: full_text.to_string(),
        name: sections.name,
        synopsis: sections.synopsis,
        description: sections.description,
        options,
    }
}
