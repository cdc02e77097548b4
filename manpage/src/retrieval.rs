//! BM25-ranked man-page context assembly.
//!
//! Scores man-page paragraphs against query terms derived from a
//! classified command line, then assembles a character-budgeted context
//! string: a header, the NAME and SYNOPSIS sections, and the top-ranked
//! paragraphs. The budget is a hard cap; overflowing snippets are
//! truncated with an ellipsis rather than dropped.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use cmdscribe_core::{ParsedToken, TokenType};

use crate::ManPage;
use crate::parser::strip_formatting;

const BM25_K1: f64 = 1.5;
const BM25_B: f64 = 0.75;

/// Default character budget for an assembled context.
pub const DEFAULT_CONTEXT_CHARS: usize = 2_000;

/// Default cap on ranked snippets per context.
pub const DEFAULT_MAX_SNIPPETS: usize = 6;

static SCORING_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9][a-z0-9_-]*").expect("valid regex"));

static HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9\s-]+$").expect("valid regex"));

/// Budget knobs for [`build_context`].
#[derive(Debug, Clone, Copy)]
pub struct ContextOptions {
    /// Maximum context length in Unicode scalar values.
    pub max_chars: usize,
    /// Maximum number of BM25-ranked snippets appended after the
    /// mandatory NAME/SYNOPSIS snippets.
    pub max_snippets: usize,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_CONTEXT_CHARS,
            max_snippets: DEFAULT_MAX_SNIPPETS,
        }
    }
}

#[derive(Debug, Clone)]
struct ParagraphScore {
    text: String,
    score: f64,
}

/// Builds a budgeted context string for one man page.
///
/// The header and the NAME/SYNOPSIS sections are always attempted
/// first; remaining budget goes to paragraphs ranked by BM25 relevance
/// against terms extracted from the classified tokens. When no
/// paragraph scores above zero the full paragraph list is used in
/// document order, so a man page with no term overlap still yields
/// leading content rather than nothing.
///
/// # Examples
///
/// ```
/// use cmdscribe_manpage::{build_context, extract_man_sections, ContextOptions};
/// use cmdscribe_core::{classify_tokens, tokenize_str};
///
/// let man = extract_man_sections("true", "NAME\ntrue - do nothing\n");
/// let tokens = classify_tokens(&tokenize_str("true"));
/// let context = build_context(&man, &tokens, &ContextOptions::default());
/// assert!(context.starts_with("Man page context for `true`:"));
/// ```
pub fn build_context(man: &ManPage, tokens: &[ParsedToken], options: &ContextOptions) -> String {
    let cleaned = strip_formatting(&man.full_text);
    let paragraphs = split_into_paragraphs(&cleaned);
    let query_terms = extract_query_terms(tokens, &man.command);
    let scored = score_paragraphs(paragraphs, &query_terms);

    let header = format!("Man page context for `{}`:", man.command);
    let mut pieces: Vec<String> = vec![header.clone()];
    let mut remaining = options.max_chars.saturating_sub(char_len(&header));

    let mut mandatory: Vec<String> = Vec::new();
    if let Some(name) = non_blank(man.name.as_deref()) {
        mandatory.push(format!("NAME\n{}", normalize_snippet(name)));
    }
    if let Some(synopsis) = non_blank(man.synopsis.as_deref()) {
        mandatory.push(format!("SYNOPSIS\n{}", normalize_snippet(synopsis)));
    }

    let mut seen: HashSet<String> = HashSet::new();
    for snippet in &mandatory {
        append_snippet(snippet, &mut pieces, &mut remaining, &mut seen);
    }

    let positive: Vec<&ParagraphScore> = scored.iter().filter(|entry| entry.score > 0.0).collect();
    let ranked: Vec<&ParagraphScore> = if positive.is_empty() {
        scored.iter().collect()
    } else {
        positive
    };

    for entry in ranked.iter().take(options.max_snippets) {
        append_snippet(&entry.text, &mut pieces, &mut remaining, &mut seen);
        if remaining == 0 {
            break;
        }
    }

    let mut context = pieces.join("\n\n");
    if char_len(&context) > options.max_chars {
        let clamped: String = context
            .chars()
            .take(options.max_chars.saturating_sub(1))
            .collect();
        context = format!("{}…", clamped.trim_end());
    }
    context
}

/// Appends one snippet to the context, charging the budget.
///
/// Every snippet after the first costs its length plus a two-character
/// separator allowance. A snippet that overflows a budget of at least
/// two characters is hard-truncated with an ellipsis and zeroes the
/// budget; with one character or less left it is dropped.
fn append_snippet(
    snippet: &str,
    pieces: &mut Vec<String>,
    remaining: &mut usize,
    seen: &mut HashSet<String>,
) {
    let trimmed = normalize_snippet(snippet);
    if trimmed.is_empty() {
        return;
    }
    let key = trimmed.to_lowercase();
    if seen.contains(&key) {
        return;
    }
    let separator_cost = if pieces.is_empty() { 0 } else { 2 };
    let cost = char_len(&trimmed) + separator_cost;
    if cost > *remaining {
        if *remaining <= 1 {
            return;
        }
        let allowed = remaining.saturating_sub(separator_cost + 1);
        let truncated: String = trimmed.chars().take(allowed).collect();
        pieces.push(format!("{}…", truncated.trim_end()));
        *remaining = 0;
        seen.insert(key);
        return;
    }
    pieces.push(trimmed);
    *remaining = remaining.saturating_sub(cost);
    seen.insert(key);
}

/// Splits cleaned text into paragraphs at blank lines, prefixing each
/// paragraph with the nearest preceding short all-caps heading.
fn split_into_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut pending_heading: Option<String> = None;

    for line in text.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            flush_paragraph(&mut buffer, &mut pending_heading, &mut paragraphs);
            continue;
        }
        if is_heading_line(trimmed) {
            flush_paragraph(&mut buffer, &mut pending_heading, &mut paragraphs);
            pending_heading = Some(trimmed.to_string());
            continue;
        }
        buffer.push(line);
    }
    flush_paragraph(&mut buffer, &mut pending_heading, &mut paragraphs);

    paragraphs
}

fn flush_paragraph(
    buffer: &mut Vec<&str>,
    pending_heading: &mut Option<String>,
    paragraphs: &mut Vec<String>,
) {
    if buffer.is_empty() {
        return;
    }
    let snippet = normalize_snippet(&buffer.join("\n"));
    buffer.clear();
    if snippet.is_empty() {
        return;
    }
    match pending_heading.take() {
        Some(heading) => paragraphs.push(format!("{heading}\n{snippet}")),
        None => paragraphs.push(snippet),
    }
}

fn is_heading_line(line: &str) -> bool {
    char_len(line) <= 40 && char_len(line) >= 2 && HEADING_LINE.is_match(line)
}

/// Extracts lowercase query terms from the command name and tokens.
///
/// Options contribute their flag with dashes stripped and any `=`
/// value; assignments contribute both name and value; arguments
/// contribute path segments and dot-separated parts of the final
/// segment so file-extension terms surface.
fn extract_query_terms(tokens: &[ParsedToken], command: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut add_terms = |value: &str| {
        for term in scoring_terms(value) {
            if seen.insert(term.clone()) {
                terms.push(term);
            }
        }
    };

    add_terms(command);

    for token in tokens {
        add_terms(&token.value);
        match token.token_type {
            TokenType::Option => {
                let stripped = token.value.trim_start_matches('-');
                add_terms(stripped);
                if let Some(eq) = token.value.find('=') {
                    add_terms(&token.value[eq + 1..]);
                }
            }
            TokenType::Assignment => {
                let mut parts = token.value.splitn(2, '=');
                if let Some(name) = parts.next() {
                    add_terms(name);
                }
                if let Some(value) = parts.next() {
                    add_terms(value);
                }
            }
            TokenType::Argument => {
                let segments: Vec<&str> = token.value.split(['/', '\\']).collect();
                for segment in &segments {
                    add_terms(segment);
                }
                if let Some(last) = segments.last() {
                    if last.contains('.') {
                        for part in last.split('.') {
                            add_terms(part);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    terms
}

/// Scores paragraphs with BM25 against the query terms, sorted by
/// descending score (stable, so ties keep document order).
fn score_paragraphs(paragraphs: Vec<String>, query_terms: &[String]) -> Vec<ParagraphScore> {
    if paragraphs.is_empty() {
        return Vec::new();
    }

    struct Doc {
        text: String,
        token_count: usize,
        freq: HashMap<String, usize>,
    }

    let docs: Vec<Doc> = paragraphs
        .into_iter()
        .map(|text| {
            let tokens = scoring_terms(&text);
            let mut freq: HashMap<String, usize> = HashMap::new();
            for token in &tokens {
                *freq.entry(token.clone()).or_insert(0) += 1;
            }
            Doc {
                text,
                token_count: tokens.len(),
                freq,
            }
        })
        .collect();

    let n = docs.len();
    let avg_doc_length =
        docs.iter().map(|doc| doc.token_count).sum::<usize>() as f64 / n.max(1) as f64;

    let doc_freq: HashMap<&str, usize> = query_terms
        .iter()
        .map(|term| {
            let df = docs.iter().filter(|doc| doc.freq.contains_key(term)).count();
            (term.as_str(), df)
        })
        .collect();

    let mut scores: Vec<ParagraphScore> = docs
        .into_iter()
        .map(|doc| {
            let mut score = 0.0;
            for term in query_terms {
                let Some(&tf) = doc.freq.get(term) else {
                    continue;
                };
                let df = doc_freq.get(term.as_str()).copied().unwrap_or(0);
                if df == 0 {
                    continue;
                }
                let idf = (1.0 + (n as f64 - df as f64 + 0.5) / (df as f64 + 0.5)).ln();
                let tf = tf as f64;
                let numerator = tf * (BM25_K1 + 1.0);
                let denominator = tf
                    + BM25_K1
                        * (1.0 - BM25_B + BM25_B * doc.token_count as f64 / avg_doc_length.max(1.0));
                score += idf * numerator / denominator;
            }
            ParagraphScore {
                text: doc.text,
                score,
            }
        })
        .collect();

    scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scores
}

/// Shared term extractor: lowercase runs of `[a-z0-9][a-z0-9_-]*`.
fn scoring_terms(value: &str) -> Vec<String> {
    let lowered = value.to_lowercase();
    SCORING_TERM
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Strips trailing whitespace per line, then trims the whole block.
fn normalize_snippet(snippet: &str) -> String {
    snippet
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract_man_sections;
    use cmdscribe_core::{classify_tokens, tokenize_str};

    const FULL_TEXT: &str = "NAME\n\
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

    fn sample_page() -> crate::ManPage {
        extract_man_sections("foo", FULL_TEXT)
    }

    fn sample_tokens() -> Vec<cmdscribe_core::ParsedToken> {
        classify_tokens(&tokenize_str("foo -a input.txt"))
    }

    #[test]
    fn test_paragraphs_carry_headings() {
        let paragraphs = split_into_paragraphs(FULL_TEXT);
        assert!(paragraphs.iter().any(|p| p.starts_with("OPTIONS\n")));
        assert!(paragraphs.iter().any(|p| p.starts_with("BUGS\n")));
    }

    #[test]
    fn test_query_terms_cover_token_shapes() {
        let tokens = classify_tokens(&tokenize_str("FOO=bar tar -xzf dir/archive.tar.gz"));
        let terms = extract_query_terms(&tokens, "tar");
        for expected in ["tar", "foo", "bar", "xzf", "dir", "archive", "gz"] {
            assert!(terms.iter().any(|t| t == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_option_value_after_equals_contributes() {
        let tokens = classify_tokens(&tokenize_str("ls --color=auto"));
        let terms = extract_query_terms(&tokens, "ls");
        assert!(terms.iter().any(|t| t == "auto"));
        assert!(terms.iter().any(|t| t == "color"));
    }

    #[test]
    fn test_scores_prefer_matching_paragraphs() {
        let paragraphs = split_into_paragraphs(FULL_TEXT);
        let terms = vec!["annotate".to_string(), "batch".to_string()];
        let scored = score_paragraphs(paragraphs, &terms);
        assert!(scored[0].text.contains("--annotate"));
        assert!(scored[0].score > 0.0);
        assert!(scored.last().unwrap().score == 0.0);
    }

    #[test]
    fn test_zero_match_query_falls_back_to_document_order() {
        let man = crate::ManPage {
            command: "ghost".to_string(),
            full_text: "First paragraph body.\n\nSecond paragraph body.\n".to_string(),
            name: None,
            synopsis: None,
            description: None,
            options: Vec::new(),
        };
        let tokens = classify_tokens(&tokenize_str("zzz qqq"));
        let context = build_context(&man, &tokens, &ContextOptions::default());
        // Nothing matched, so the full paragraph list is used in order.
        let first = context.find("First paragraph body.").unwrap();
        let second = context.find("Second paragraph body.").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_budget_is_respected() {
        let man = sample_page();
        let tokens = sample_tokens();
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
        assert!(!context.contains("known issues"));
    }

    #[test]
    fn test_mandatory_snippets_come_before_ranked() {
        let man = sample_page();
        let tokens = sample_tokens();
        let context = build_context(&man, &tokens, &ContextOptions::default());
        let name_pos = context.find("NAME").unwrap();
        let options_pos = context.find("-a, --annotate").unwrap();
        assert!(name_pos < options_pos);
    }

    #[test]
    fn test_duplicate_snippets_are_skipped() {
        let man = sample_page();
        let tokens = sample_tokens();
        let context = build_context(&man, &tokens, &ContextOptions::default());
        // NAME appears once as mandatory snippet and once as a ranked
        // paragraph; the dedupe keeps a single copy of the body.
        assert_eq!(context.matches("foo - sample command").count(), 1);
    }

    #[test]
    fn test_tiny_budget_clamps_whole_output() {
        let man = sample_page();
        let tokens = sample_tokens();
        let context = build_context(
            &man,
            &tokens,
            &ContextOptions {
                max_chars: 24,
                max_snippets: 4,
            },
        );
        assert!(context.chars().count() <= 24);
        assert!(context.ends_with('…'));
    }

    #[test]
    fn test_exhausted_budget_drops_snippets() {
        let man = sample_page();
        let tokens = sample_tokens();
        // The header alone consumes the whole budget, so every snippet
        // is dropped rather than truncated.
        let header = "Man page context for `foo`:";
        let context = build_context(
            &man,
            &tokens,
            &ContextOptions {
                max_chars: header.chars().count(),
                max_snippets: 4,
            },
        );
        assert_eq!(context, header);
    }

    #[test]
    fn test_empty_man_page_yields_header_only() {
        let man = crate::ManPage {
            command: "ghost".to_string(),
            full_text: String::new(),
            name: None,
            synopsis: None,
            description: None,
            options: Vec::new(),
        };
        let context = build_context(&man, &[], &ContextOptions::default());
        assert_eq!(context, "Man page context for `ghost`:");
    }
}
