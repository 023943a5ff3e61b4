//! One user's session: the loaded documents and the conversation.
//!
//! The session decides which composition mode answers a question and turns
//! oracle failures into placeholder text, so a failed call never ends the
//! conversation. All state is owned here; nothing is shared between sessions.

use std::path::PathBuf;

use uuid::Uuid;

use crate::chunk::{self, ChunkError};
use crate::compose::{self, Mode};
use crate::extract::{ExtractError, Extractor};
use crate::models::{Answer, Conversation, DocumentSet, PromptEnvelope, Turn};
use crate::oracle::{self, Oracle};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Chunk(#[from] ChunkError),
}

pub struct Session {
    id: Uuid,
    oracle: Box<dyn Oracle>,
    extractor: Extractor,
    chunk_words: usize,
    documents: Option<DocumentSet>,
    conversation: Conversation,
}

impl Session {
    /// Create a session. `chunk_words` must be > 0; it is checked when the
    /// first batch is loaded.
    pub fn new(oracle: Box<dyn Oracle>, chunk_words: usize) -> Self {
        Self::with_extractor(oracle, Extractor::default(), chunk_words)
    }

    pub fn with_extractor(oracle: Box<dyn Oracle>, extractor: Extractor, chunk_words: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            oracle,
            extractor,
            chunk_words,
            documents: None,
            conversation: Conversation::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn documents(&self) -> Option<&DocumentSet> {
        self.documents.as_ref()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Extract and chunk a batch, replacing any previous one.
    ///
    /// An empty batch is a no-op. On failure the previous documents stay
    /// loaded. A batch that yields no text at all leaves no document loaded.
    pub fn load_documents(&mut self, paths: &[PathBuf]) -> Result<Option<&DocumentSet>, LoadError> {
        if paths.is_empty() {
            return Ok(self.documents.as_ref());
        }

        let extraction = self.extractor.extract_files(paths)?;
        let chunks = chunk::chunk_text(&extraction.text, self.chunk_words)?;

        tracing::info!(
            session = %self.id,
            files = extraction.files.len(),
            pages = extraction.pages(),
            recovered = extraction.recovered_pages(),
            skipped = extraction.empty_pages(),
            chunks = chunks.len(),
            "documents loaded"
        );

        if chunks.is_empty() {
            tracing::warn!(session = %self.id, "batch contained no extractable text");
            self.documents = None;
        } else {
            self.documents = Some(DocumentSet::new(extraction.files, chunks));
        }
        Ok(self.documents.as_ref())
    }

    pub fn clear_documents(&mut self) {
        self.documents = None;
    }

    /// Answer a standalone question without touching the conversation.
    ///
    /// With documents loaded the oracle is asked once per chunk, in order,
    /// and the answers are joined by a blank line. Returns `None` for a
    /// blank question.
    pub async fn ask(&self, question: &str) -> Option<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }

        let answer = match &self.documents {
            Some(docs) => {
                tracing::info!(session = %self.id, mode = %Mode::ChunkedSingleShot, chunks = docs.chunks().len(), "answering");
                let mut parts = Vec::with_capacity(docs.chunks().len());
                let mut degraded = false;
                for envelope in compose::per_chunk(docs.chunks(), question) {
                    let part = self.call(&envelope).await;
                    degraded |= part.degraded;
                    parts.push(part.text);
                }
                Answer {
                    text: parts.join("\n\n"),
                    degraded,
                }
            }
            None => {
                tracing::info!(session = %self.id, mode = %Mode::General, "answering");
                self.call(&compose::general(question)).await
            }
        };
        Some(answer)
    }

    /// Answer the next question of the conversation.
    ///
    /// Appends the user turn, sends the whole history (with all document
    /// context prefixed to the newest turn when documents are loaded), and
    /// appends the reply. Returns `None` for a blank question.
    pub async fn chat(&mut self, question: &str) -> Option<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }

        let earlier = self.conversation.turns();
        let envelope = match &self.documents {
            Some(docs) => {
                tracing::info!(session = %self.id, mode = %Mode::Conversational, turns = earlier.len() + 1, "answering");
                compose::follow_up(docs.chunks(), earlier, question)
            }
            None => {
                tracing::info!(session = %self.id, mode = %Mode::General, turns = earlier.len() + 1, "answering");
                let mut envelope = compose::general_with_history(earlier);
                envelope.push(Turn::user(question));
                envelope
            }
        };
        self.conversation.push(Turn::user(question));

        let answer = self.call(&envelope).await;
        self.conversation.push(Turn::assistant(answer.text.clone()));
        Some(answer)
    }

    async fn call(&self, envelope: &PromptEnvelope) -> Answer {
        match self.oracle.complete(envelope).await {
            Ok(text) => Answer {
                text,
                degraded: false,
            },
            Err(e) => {
                tracing::warn!(
                    session = %self.id,
                    model = %self.oracle.model(),
                    kind = e.kind(),
                    retryable = e.is_retryable(),
                    error = %e,
                    "oracle call failed"
                );
                Answer {
                    text: oracle::placeholder(&e),
                    degraded: true,
                }
            }
        }
    }
}
