//! Markdown documents with YAML front matter.
//!
//! The front matter must open on the very first line with `---` and close
//! with the next `---` line:
//!
//! ```text
//! ---
//! summary: Scheduled maintenance tonight
//! defer: 2024-01-01 18:00
//! ttl: 4h
//! ---
//!
//! Optional Markdown body.
//! ```
//!
//! The body is passed through as text. Rendering it is up to the consumer.

use std::path::Path;

use crate::error::{BroadcastError, Result};
use crate::message::BroadcastMessage;
use crate::metadata::{NormalizedMetadata, RawMetadata};

const FENCE: &str = "---";

/// Split a document into its front-matter block and its body.
///
/// The body has leading blank lines and trailing whitespace removed and ends
/// with a single newline. It is `None` when nothing but whitespace follows the
/// front matter.
///
/// # Errors
/// `MissingMetadataBlock` if the document does not start with a closed
/// front-matter block.
pub fn split(document: &str) -> Result<(&str, Option<String>)> {
    let document = document.strip_prefix('\u{feff}').unwrap_or(document);

    let mut lines = document.split_inclusive('\n');
    let opening = lines.next().ok_or(BroadcastError::MissingMetadataBlock)?;
    if !is_fence(opening) {
        return Err(BroadcastError::MissingMetadataBlock);
    }

    let block_start = opening.len();
    let mut offset = block_start;
    for line in lines {
        if is_fence(line) {
            let block = &document[block_start..offset];
            let body = normalize_body(&document[offset + line.len()..]);
            return Ok((block, body));
        }
        offset += line.len();
    }
    Err(BroadcastError::MissingMetadataBlock)
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == FENCE
}

fn normalize_body(rest: &str) -> Option<String> {
    let lines: Vec<&str> = rest
        .lines()
        .skip_while(|line| line.trim().is_empty())
        .collect();
    let body = lines.join("\n");
    let body = body.trim_end();
    if body.is_empty() {
        None
    } else {
        Some(format!("{body}\n"))
    }
}

/// Whether a path names a broadcast document: a visible `.md` file other
/// than a README.
pub fn is_broadcast_path(path: &Path) -> bool {
    let is_markdown = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
    if !is_markdown {
        return false;
    }
    match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => !name.starts_with('.') && !name.eq_ignore_ascii_case("readme.md"),
        None => false,
    }
}

/// A parsed broadcast document: its source text, validated metadata, and body.
#[derive(Debug, Clone)]
pub struct BroadcastDocument {
    text: String,
    source_identifier: String,
    metadata: NormalizedMetadata,
    body: Option<String>,
}

impl BroadcastDocument {
    /// Parse and validate a document.
    ///
    /// # Errors
    /// `MissingMetadataBlock`, `InvalidMetadata`, or any normalization error.
    pub fn parse(text: impl Into<String>, source_identifier: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let source_identifier = source_identifier.into();

        let (block, body) = split(&text)?;
        let raw = RawMetadata::from_yaml(block)?;
        let metadata = NormalizedMetadata::normalize(&raw)?;
        tracing::debug!(
            source = %source_identifier,
            has_body = body.is_some(),
            "parsed broadcast document"
        );

        Ok(BroadcastDocument {
            text,
            source_identifier,
            metadata,
            body,
        })
    }

    /// The full document text, front matter included.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source_identifier(&self) -> &str {
        &self.source_identifier
    }

    pub fn metadata(&self) -> &NormalizedMetadata {
        &self.metadata
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Whether the broadcast applies to the named environment.
    pub fn is_relevant_to_env(&self, env: &str) -> bool {
        self.metadata.is_relevant_to_env(env)
    }

    /// Build the broadcast message, deriving its scheduling policy.
    ///
    /// # Errors
    /// Propagates errors from [`SchedulingPolicy::derive`].
    ///
    /// [`SchedulingPolicy::derive`]: crate::scheduler::SchedulingPolicy::derive
    pub fn to_broadcast(&self) -> Result<BroadcastMessage> {
        BroadcastMessage::from_metadata(
            self.source_identifier.clone(),
            &self.metadata,
            self.body.clone(),
        )
    }
}
