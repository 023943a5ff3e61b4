//! Core data models used throughout GridAI.
//!
//! These types represent the chunks, conversation turns, and prompt
//! envelopes that flow between the extractor, the composer, and the oracle.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Who authored a [`Turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name used by the chat completions API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A contiguous slice of extracted document text, bounded by word count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub index: usize,
    pub word_count: usize,
    pub text: String,
}

/// Per-file outcome of an extraction pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub pages: usize,
    /// Pages whose text came from the fallback path.
    pub recovered_pages: usize,
    /// Pages that produced no text on either path.
    pub empty_pages: usize,
}

/// The chunked documents of one upload batch.
///
/// Built once per batch and never mutated; a new batch replaces it.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSet {
    files: Vec<FileReport>,
    chunks: Vec<Chunk>,
}

impl DocumentSet {
    pub fn new(files: Vec<FileReport>, chunks: Vec<Chunk>) -> Self {
        Self { files, chunks }
    }

    pub fn files(&self) -> &[FileReport] {
        &self.files
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn word_count(&self) -> usize {
        self.chunks.iter().map(|c| c.word_count).sum()
    }
}

/// Append-only conversation log.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// The exact turn sequence sent to the oracle for one call.
///
/// Only the composer constructs envelopes, which guarantees the first turn
/// is always a system directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptEnvelope {
    turns: Vec<Turn>,
}

impl PromptEnvelope {
    pub(crate) fn with_directive(directive: &str) -> Self {
        Self {
            turns: vec![Turn::system(directive)],
        }
    }

    pub(crate) fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn directive(&self) -> &str {
        &self.turns[0].content
    }

    pub fn last(&self) -> &Turn {
        // non-empty by construction
        &self.turns[self.turns.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Final answer for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    /// True when at least one contributing oracle call failed and its
    /// share of `text` is an error placeholder.
    pub degraded: bool,
}
