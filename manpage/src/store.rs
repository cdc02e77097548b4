//! Process-scoped man-page memoization.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::source::ManPageSource;
use crate::{ManPage, extract_man_sections};

/// Memoizing cache over a [`ManPageSource`].
///
/// Each distinct command name is fetched and parsed at most once per
/// store lifetime; negative lookups are remembered too. The store has
/// no eviction — the expected cardinality is the handful of distinct
/// command names seen in a session.
///
/// # Examples
///
/// ```
/// use cmdscribe_manpage::{ManPageStore, StaticManSource};
///
/// let source = StaticManSource::new([("ls", "NAME\nls - list files\n")]);
/// let store = ManPageStore::new(source);
///
/// let page = store.get("ls").unwrap();
/// assert_eq!(page.command, "ls");
/// assert!(store.get("ghost").is_none());
/// ```
pub struct ManPageStore<S: ManPageSource> {
    source: S,
    pages: RefCell<HashMap<String, Option<ManPage>>>,
}

impl<S: ManPageSource> ManPageStore<S> {
    /// Creates an empty store over the given source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            pages: RefCell::new(HashMap::new()),
        }
    }

    /// Returns the parsed man page for `command`, fetching and parsing
    /// it on first use.
    pub fn get(&self, command: &str) -> Option<ManPage> {
        if let Some(cached) = self.pages.borrow().get(command) {
            return cached.clone();
        }
        let page = self
            .source
            .fetch(command)
            .map(|raw| extract_man_sections(command, &raw));
        self.pages
            .borrow_mut()
            .insert(command.to_string(), page.clone());
        page
    }

    /// Returns parsed pages for each command, skipping absent ones and
    /// preserving input order.
    pub fn get_all(&self, commands: &[String]) -> Vec<ManPage> {
        commands
            .iter()
            .filter_map(|command| self.get(command))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Source that counts fetches to observe memoization.
    struct CountingSource {
        calls: Cell<usize>,
    }

    impl ManPageSource for CountingSource {
        fn fetch(&self, command: &str) -> Option<String> {
            self.calls.set(self.calls.get() + 1);
            (command == "ls").then(|| "NAME\nls - list files\n".to_string())
        }
    }

    #[test]
    fn test_fetch_happens_once_per_command() {
        let store = ManPageStore::new(CountingSource {
            calls: Cell::new(0),
        });
        assert!(store.get("ls").is_some());
        assert!(store.get("ls").is_some());
        assert_eq!(store.source.calls.get(), 1);
    }

    #[test]
    fn test_negative_lookups_are_memoized() {
        let store = ManPageStore::new(CountingSource {
            calls: Cell::new(0),
        });
        assert!(store.get("ghost").is_none());
        assert!(store.get("ghost").is_none());
        assert_eq!(store.source.calls.get(), 1);
    }

    #[test]
    fn test_get_all_preserves_order_and_skips_missing() {
        let store = ManPageStore::new(CountingSource {
            calls: Cell::new(0),
        });
        let commands = vec!["ghost".to_string(), "ls".to_string()];
        let pages = store.get_all(&commands);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].command, "ls");
    }
}
