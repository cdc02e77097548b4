//! Context assembly against fixture man pages.

use cmdscribe_core::{classify_tokens, tokenize_str};
use cmdscribe_manpage::{
    ContextOptions, ManPageStore, StaticManSource, build_context, extract_man_sections,
};

const FOO_PAGE: &str = "NAME\n\
foo - sample command\n\
\n\
SYNOPSIS\n\
foo [options] <file>\n\
\n\
DESCRIPTION\n\
foo processes files and writes output to stdout.\n\
\n\
OPTIONS\n\
\x20    -a, --annotate   add annotations to the output\n\
\x20    -b, --batch      process files in batch mode\n\
\n\
EXAMPLES\n\
\x20    foo -a input.txt\n\
\n\
BUGS\n\
there are known issues in very old environments.\n";

#[test]
fn prioritizes_relevant_sections_within_budget() {
    let man = extract_man_sections("foo", FOO_PAGE);
    let tokens = classify_tokens(&tokenize_str("foo -a input.txt"));

    let context = build_context(
        &man,
        &tokens,
        &ContextOptions {
            max_chars: 400,
            max_snippets: 4,
        },
    );

    assert!(context.chars().count() <= 400);
    assert!(context.contains("SYNOPSIS"));
    assert!(context.contains("-a, --annotate"));
    assert!(!context.contains("BUGS"));
}

#[test]
fn store_and_retrieval_compose_end_to_end() {
    let source = StaticManSource::new([("foo", FOO_PAGE)]);
    let store = ManPageStore::new(source);

    let tokens = classify_tokens(&tokenize_str("foo --batch data.csv"));
    let page = store.get("foo").expect("fixture page");
    let context = build_context(&page, &tokens, &ContextOptions::default());

    assert!(context.starts_with("Man page context for `foo`:"));
    assert!(context.contains("--batch"));
}

#[test]
fn missing_page_is_absent_not_an_error() {
    let store = ManPageStore::new(StaticManSource::default());
    assert!(store.get("no-such-command").is_none());
}

#[test]
fn parsed_options_survive_sections_without_description() {
    let page_text = "NAME\nbar - other tool\n\nOPTIONS\n  -x, --extract  pull files out\n";
    let page = extract_man_sections("bar", page_text);
    assert!(page.description.is_none());
    assert_eq!(page.options.len(), 1);
    assert_eq!(page.options[0].short.as_deref(), Some("-x"));
    assert_eq!(page.options[0].long.as_deref(), Some("--extract"));
}
