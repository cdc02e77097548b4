//! SQLite storage for per-token descriptions.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};

use cmdscribe_core::ParsedCommand;

use crate::error::Result;

const CREATE_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS token_descriptions (
    command TEXT NOT NULL,
    source_hash TEXT NOT NULL,
    token_index INTEGER NOT NULL,
    token_value TEXT NOT NULL,
    description TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    PRIMARY KEY (command, source_hash, token_index)
);";

/// Cache of token descriptions keyed by `(original command, source
/// hash)`.
///
/// The source hash covers the man-page content the descriptions were
/// derived from, so entries invalidate automatically when the relevant
/// pages change; stale rows are simply never matched again and are
/// overwritten on the next save for the same key.
///
/// # Examples
///
/// ```
/// use cmdscribe_cache::DescriptionCache;
/// use cmdscribe_core::ParsedCommand;
///
/// let cache = DescriptionCache::open_in_memory().unwrap();
/// let parsed = ParsedCommand::from_line("ls -la");
///
/// assert!(cache.get(&parsed, "hash").unwrap().is_none());
/// cache.put(&parsed, "hash", &["List files".into(), "Long format".into()]).unwrap();
/// let hit = cache.get(&parsed, "hash").unwrap().unwrap();
/// assert_eq!(hit[1], "Long format");
/// ```
pub struct DescriptionCache {
    conn: Connection,
}

impl DescriptionCache {
    /// Opens (and creates if needed) a cache database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(CREATE_TABLE)?;
        Ok(Self { conn })
    }

    /// Opens an in-memory cache, used by tests and `--no-cache` runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CREATE_TABLE)?;
        Ok(Self { conn })
    }

    /// Default on-disk cache location
    /// (`$XDG_CACHE_HOME`/cmdscribe/cmdscribe.sqlite or
    /// `~/.cache/cmdscribe/cmdscribe.sqlite`).
    pub fn default_path() -> PathBuf {
        let base = std::env::var_os("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))
            .unwrap_or_else(std::env::temp_dir);
        base.join("cmdscribe").join("cmdscribe.sqlite")
    }

    /// Looks up cached descriptions for a command under a source hash.
    ///
    /// Returns `None` unless a complete row set exists: the number of
    /// stored rows must equal the command's token count.
    pub fn get(&self, parsed: &ParsedCommand, source_hash: &str) -> Result<Option<Vec<String>>> {
        let mut stmt = self.conn.prepare(
            "SELECT token_index, description FROM token_descriptions
             WHERE command = ?1 AND source_hash = ?2
             ORDER BY token_index ASC",
        )?;
        let rows: Vec<(usize, String)> = stmt
            .query_map(params![parsed.original, source_hash], |row| {
                Ok((row.get::<_, i64>(0)? as usize, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if rows.is_empty() || rows.len() != parsed.tokens.len() {
            return Ok(None);
        }

        let mut descriptions = vec![String::new(); parsed.tokens.len()];
        for (index, description) in rows {
            if let Some(slot) = descriptions.get_mut(index) {
                *slot = description;
            }
        }
        Ok(Some(descriptions))
    }

    /// Stores one row per token, replacing any existing rows for the
    /// same `(command, source_hash, index)` key.
    pub fn put(
        &self,
        parsed: &ParsedCommand,
        source_hash: &str,
        descriptions: &[String],
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let mut stmt = self.conn.prepare(
            "INSERT OR REPLACE INTO token_descriptions
             (command, source_hash, token_index, token_value, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for (index, token) in parsed.tokens.iter().enumerate() {
            let description = descriptions.get(index).map(String::as_str).unwrap_or("");
            stmt.execute(params![
                parsed.original,
                source_hash,
                index as i64,
                token,
                description,
                now
            ])?;
        }
        Ok(())
    }

    /// Removes every cached row.
    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM token_descriptions", [])?;
        Ok(())
    }
}
