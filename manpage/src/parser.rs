//! Formatting cleanup and section parsing for rendered man pages.
//!
//! `man -P cat` output carries two formatting artifacts: ANSI SGR
//! escape sequences and backspace overstrikes (`c\bc` for bold,
//! `_\bc` for underline). Both are removed before any parsing.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SGR_SEQUENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{1b}\\[[0-9;]*m").expect("valid regex"));

static SECTION_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z\s]+$").expect("valid regex"));

/// One option entry parsed from a man page, e.g. `-a, --all  do not
/// ignore entries starting with .`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManOption {
    /// Short form (e.g. `-a`).
    pub short: Option<String>,
    /// Long form (e.g. `--all`).
    pub long: Option<String>,
    /// Description text, falling back to the raw option spec when the
    /// line carries no two-column description.
    pub description: String,
}

/// The NAME/SYNOPSIS/DESCRIPTION sections of a man page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManSections {
    pub name: Option<String>,
    pub synopsis: Option<String>,
    pub description: Option<String>,
}

/// Strips ANSI SGR sequences and resolves backspace overstrikes.
///
/// A literal backspace deletes the previous character, which collapses
/// the `X\bX` bold and `_\bX` underline encodings to plain text.
///
/// # Examples
///
/// ```
/// use cmdscribe_manpage::strip_formatting;
///
/// assert_eq!(strip_formatting("N\u{8}NA\u{8}AM\u{8}ME\u{8}E"), "NAME");
/// assert_eq!(strip_formatting("_\u{8}h_\u{8}i"), "hi");
/// assert_eq!(strip_formatting("\u{1b}[1mbold\u{1b}[0m"), "bold");
/// ```
pub fn strip_formatting(text: &str) -> String {
    let no_ansi = SGR_SEQUENCE.replace_all(text, "");
    let mut result = String::with_capacity(no_ansi.len());
    for ch in no_ansi.chars() {
        if ch == '\u{8}' {
            result.pop();
        } else {
            result.push(ch);
        }
    }
    result
}

/// Splits cleaned man-page text into NAME/SYNOPSIS/DESCRIPTION.
///
/// Recognized headings must match exactly after trimming; any other
/// all-caps heading line ends the active capture without opening a new
/// one. Captured lines keep their original content.
pub fn split_into_sections(text: &str) -> ManSections {
    #[derive(Clone, Copy, PartialEq)]
    enum Active {
        Name,
        Synopsis,
        Description,
    }

    let mut sections = ManSections::default();
    let mut current: Option<Active> = None;

    for line in text.split('\n') {
        let trimmed = line.trim();
        match trimmed {
            "NAME" => {
                current = Some(Active::Name);
                sections.name = Some(String::new());
                continue;
            }
            "SYNOPSIS" => {
                current = Some(Active::Synopsis);
                sections.synopsis = Some(String::new());
                continue;
            }
            "DESCRIPTION" => {
                current = Some(Active::Description);
                sections.description = Some(String::new());
                continue;
            }
            _ => {}
        }
        if SECTION_HEADING.is_match(trimmed) {
            current = None;
            continue;
        }
        let Some(active) = current else {
            continue;
        };
        let target = match active {
            Active::Name => sections.name.as_mut(),
            Active::Synopsis => sections.synopsis.as_mut(),
            Active::Description => sections.description.as_mut(),
        };
        if let Some(buffer) = target {
            buffer.push_str(line);
            buffer.push('\n');
        }
    }

    sections
}

/// Parses `-x, --long  description` option lines from man-page text.
///
/// A candidate line is any line whose trimmed content starts with `-`.
/// The line splits into columns on runs of two or more spaces: the
/// first column is the option spec, the rest joined with single spaces
/// form the description.
///
/// # Examples
///
/// ```
/// use cmdscribe_manpage::parse_man_options;
///
/// let options = parse_man_options("     -a, --all   do not ignore hidden entries\n");
/// assert_eq!(options[0].short.as_deref(), Some("-a"));
/// assert_eq!(options[0].long.as_deref(), Some("--all"));
/// assert_eq!(options[0].description, "do not ignore hidden entries");
/// ```
pub fn parse_man_options(text: &str) -> Vec<ManOption> {
    let mut options = Vec::new();

    for line in text.split('\n') {
        let trimmed = line.trim();
        if !trimmed.starts_with('-') {
            continue;
        }

        let mut columns = split_columns(trimmed);
        let option_spec = columns.next().unwrap_or_default();
        let description = columns.collect::<Vec<_>>().join(" ").trim().to_string();

        let mut short: Option<String> = None;
        let mut long: Option<String> = None;
        for piece in option_spec.split(',') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            // Only the flag itself counts; `-o FILE` keeps just `-o`.
            let flag = piece.split(' ').next().unwrap_or(piece);
            if flag.starts_with("--") {
                long = Some(flag.to_string());
            } else if flag.starts_with('-') {
                short = Some(flag.to_string());
            }
        }

        let description = if description.is_empty() {
            option_spec.to_string()
        } else {
            description
        };
        options.push(ManOption {
            short,
            long,
            description,
        });
    }

    options
}

/// Splits a line on runs of two or more spaces.
fn split_columns(line: &str) -> impl Iterator<Item = &str> {
    let mut columns = Vec::new();
    let mut rest = line;
    loop {
        match rest.find("  ") {
            Some(pos) => {
                columns.push(&rest[..pos]);
                rest = rest[pos..].trim_start_matches(' ');
                if rest.is_empty() {
                    break;
                }
            }
            None => {
                columns.push(rest);
                break;
            }
        }
    }
    columns.into_iter().filter(|column| !column.is_empty())
}
