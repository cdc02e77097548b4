//! LLM client boundary.
//!
//! Provider adapters live behind the [`LlmClient`] trait; everything on
//! this side of the seam is synchronous text-in/text-out. The shipped
//! [`CommandLlmClient`] pipes prompts through a user-configured external
//! command, which keeps provider SDKs and network code out of the
//! workspace entirely.

use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use wait_timeout::ChildExt;

/// Maximum length kept for a single token description.
const MAX_DESCRIPTION_LENGTH: usize = 160;

/// Typed error for LLM completion attempts.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// No LLM command is configured.
    #[error("no llm command configured")]
    NotConfigured,

    /// Spawning or talking to the external command failed.
    #[error("llm command failed: {0}")]
    Io(#[from] std::io::Error),

    /// The external command exited non-zero.
    #[error("llm command exited with status {0}")]
    Failed(i32),

    /// The external command exceeded its time budget.
    #[error("llm command timed out after {0} ms")]
    TimedOut(u64),

    /// The response was not in the expected format.
    #[error("invalid llm response: {0}")]
    InvalidResponse(String),
}

/// A single completion request.
#[derive(Debug, Clone, Serialize)]
pub struct LlmRequest {
    /// System prompt establishing the task.
    pub system: String,
    /// User payload, usually a JSON document.
    pub user: String,
}

/// A synchronous completion provider.
pub trait LlmClient {
    /// Produces a completion for the request.
    fn complete(&self, request: &LlmRequest) -> Result<String, LlmError>;
}

/// Pipes requests through an external command via `sh -c`.
///
/// The request is serialized as JSON on stdin; stdout is the
/// completion. Non-zero exit, timeout, and empty output are all typed
/// errors so callers can degrade gracefully.
pub struct CommandLlmClient {
    command: String,
    timeout: Duration,
}

impl CommandLlmClient {
    /// Creates a client for a shell command line.
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    /// Builds a client from configuration, or `None` when no command is
    /// configured.
    pub fn from_config(config: &crate::config::LlmConfig) -> Option<Self> {
        config
            .command
            .as_ref()
            .map(|command| Self::new(command, Duration::from_millis(config.timeout_ms)))
    }
}

impl LlmClient for CommandLlmClient {
    fn complete(&self, request: &LlmRequest) -> Result<String, LlmError> {
        let payload = serde_json::to_string(request)
            .map_err(|error| LlmError::InvalidResponse(error.to_string()))?;

        debug!(command = %self.command, bytes = payload.len(), "Invoking llm command");
        let mut child = Command::new("sh")
            .args(["-c", &self.command])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // The write can fail if the command exits early; surface
            // that through the exit status below instead.
            let _ = stdin.write_all(payload.as_bytes());
        }

        let stdout_thread = child.stdout.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                buf
            })
        });

        let status = match child.wait_timeout(self.timeout)? {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(LlmError::TimedOut(self.timeout.as_millis() as u64));
            }
        };

        let stdout = stdout_thread
            .and_then(|thread| thread.join().ok())
            .unwrap_or_default();

        if !status.success() {
            return Err(LlmError::Failed(status.code().unwrap_or(-1)));
        }

        let text = String::from_utf8_lossy(&stdout).trim().to_string();
        if text.is_empty() {
            return Err(LlmError::InvalidResponse("empty output".to_string()));
        }
        Ok(text)
    }
}

/// Canned-response client for tests.
pub struct StaticLlmClient {
    response: Result<String, fn() -> LlmError>,
}

impl StaticLlmClient {
    /// Always answers with `response`.
    pub fn responding(response: impl Into<String>) -> Self {
        Self {
            response: Ok(response.into()),
        }
    }

    /// Always fails with the produced error.
    pub fn failing(error: fn() -> LlmError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

impl LlmClient for StaticLlmClient {
    fn complete(&self, _request: &LlmRequest) -> Result<String, LlmError> {
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(make_error) => Err(make_error()),
        }
    }
}

/// One indexed description entry in the wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptionEntry {
    pub index: i64,
    pub description: String,
}

/// Wire format for token-description responses:
/// `{"descriptions": [{"index": 0, "description": "…"}]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptionsPayload {
    pub descriptions: Vec<DescriptionEntry>,
}

/// A repaired, exact-length description vector plus repair diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDescriptionsResult {
    /// One description per token index; unresolved slots are empty.
    pub descriptions: Vec<String>,
    /// Number of entries the model actually returned.
    pub received_length: usize,
    /// Whether any repair was necessary.
    pub repaired: bool,
    /// Indices the model never filled.
    pub missing_indices: Vec<usize>,
    /// Out-of-range indices the model invented.
    pub extra_indices: Vec<i64>,
    /// Indices the model filled more than once (first entry wins).
    pub duplicate_indices: Vec<usize>,
}

/// Parses a token-descriptions completion and aligns it to the
/// expected token count.
///
/// Returns `None` only when the payload is not parseable JSON of the
/// expected shape; a parseable but sloppy payload (wrong order, gaps,
/// duplicates, stray indices) is repaired and reported via the
/// diagnostics fields.
pub fn parse_token_descriptions(
    response: &str,
    expected_length: usize,
) -> Option<TokenDescriptionsResult> {
    let payload: DescriptionsPayload = match serde_json::from_str(response) {
        Ok(payload) => payload,
        Err(error) => {
            debug!(error = %error, "Discarding unparseable description payload");
            return None;
        }
    };
    Some(align_descriptions(&payload.descriptions, expected_length))
}

/// Aligns indexed entries into an exact-length description vector.
pub fn align_descriptions(
    entries: &[DescriptionEntry],
    expected_length: usize,
) -> TokenDescriptionsResult {
    let mut descriptions = vec![String::new(); expected_length];
    let mut missing: Vec<usize> = (0..expected_length).collect();
    let mut extra_indices: Vec<i64> = Vec::new();
    let mut duplicate_indices: Vec<usize> = Vec::new();
    let mut seen: Vec<bool> = vec![false; expected_length];
    let mut repaired = false;

    for entry in entries {
        let index = entry.index;
        if index < 0 || index as usize >= expected_length {
            repaired = true;
            extra_indices.push(index);
            continue;
        }
        let index = index as usize;
        if seen[index] {
            repaired = true;
            duplicate_indices.push(index);
            continue;
        }
        seen[index] = true;
        descriptions[index] = sanitize_description(&entry.description);
        missing.retain(|&slot| slot != index);
    }

    if !missing.is_empty() {
        repaired = true;
    }
    extra_indices.sort_unstable();
    duplicate_indices.sort_unstable();

    TokenDescriptionsResult {
        descriptions,
        received_length: entries.len(),
        repaired,
        missing_indices: missing,
        extra_indices,
        duplicate_indices,
    }
}

/// Collapses whitespace and caps the length of one description.
fn sanitize_description(description: &str) -> String {
    let normalized = description.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() > MAX_DESCRIPTION_LENGTH {
        let capped: String = normalized.chars().take(MAX_DESCRIPTION_LENGTH).collect();
        capped.trim_end().to_string()
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: i64, description: &str) -> DescriptionEntry {
        DescriptionEntry {
            index,
            description: description.to_string(),
        }
    }

    #[test]
    fn test_align_exact_match_is_unrepaired() {
        let result = align_descriptions(&[entry(0, "first"), entry(1, "second")], 2);
        assert!(!result.repaired);
        assert_eq!(result.descriptions, vec!["first", "second"]);
        assert!(result.missing_indices.is_empty());
    }

    #[test]
    fn test_align_reorders_entries() {
        let result = align_descriptions(&[entry(1, "second"), entry(0, "first")], 2);
        assert!(!result.repaired);
        assert_eq!(result.descriptions, vec!["first", "second"]);
    }

    #[test]
    fn test_align_reports_missing_indices() {
        let result = align_descriptions(&[entry(0, "only")], 3);
        assert!(result.repaired);
        assert_eq!(result.missing_indices, vec![1, 2]);
        assert_eq!(result.descriptions[1], "");
    }

    #[test]
    fn test_align_drops_out_of_range_and_duplicates() {
        let entries = [
            entry(0, "a"),
            entry(0, "dup"),
            entry(5, "beyond"),
            entry(-1, "negative"),
        ];
        let result = align_descriptions(&entries, 2);
        assert!(result.repaired);
        assert_eq!(result.descriptions[0], "a");
        assert_eq!(result.extra_indices, vec![-1, 5]);
        assert_eq!(result.duplicate_indices, vec![0]);
        assert_eq!(result.received_length, 4);
    }

    #[test]
    fn test_sanitize_collapses_whitespace_and_caps_length() {
        assert_eq!(sanitize_description("  a\n\tb   c "), "a b c");
        let long = "x".repeat(400);
        assert_eq!(sanitize_description(&long).chars().count(), 160);
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(parse_token_descriptions("not json", 2).is_none());
        assert!(parse_token_descriptions("{\"wrong\": []}", 2).is_none());
    }

    #[test]
    fn test_parse_accepts_wire_format() {
        let response = r#"{"descriptions": [{"index": 0, "description": "List files"}]}"#;
        let result = parse_token_descriptions(response, 1).unwrap();
        assert_eq!(result.descriptions, vec!["List files"]);
        assert!(!result.repaired);
    }

    #[test]
    fn test_static_client_round_trips() {
        let client = StaticLlmClient::responding("done");
        let request = LlmRequest {
            system: "s".to_string(),
            user: "u".to_string(),
        };
        assert_eq!(client.complete(&request).unwrap(), "done");
    }

    #[test]
    fn test_command_client_pipes_through_shell() {
        // `cat` echoes the JSON payload back, which is a non-empty
        // completion from the client's point of view.
        let client = CommandLlmClient::new("cat", Duration::from_secs(5));
        let request = LlmRequest {
            system: "system".to_string(),
            user: "user".to_string(),
        };
        let output = client.complete(&request).unwrap();
        assert!(output.contains("\"system\""));
    }

    #[test]
    fn test_command_client_reports_failure() {
        let client = CommandLlmClient::new("exit 3", Duration::from_secs(5));
        let request = LlmRequest {
            system: String::new(),
            user: String::new(),
        };
        match client.complete(&request) {
            Err(LlmError::Failed(code)) => assert_eq!(code, 3),
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
