//! Prompt envelope assembly.
//!
//! | Mode | Documents | History | Envelope |
//! |------|-----------|---------|----------|
//! | A | yes | no | one per chunk: directive + context-prefixed question |
//! | B | yes | yes | directive + history, last user turn prefixed with all chunks |
//! | C | no | either | general directive + question or history as-is |

use crate::chunk;
use crate::directive::{DOCUMENT_DIRECTIVE, GENERAL_DIRECTIVE};
use crate::models::{Chunk, PromptEnvelope, Role, Turn};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposeError {
    #[error("conversation is empty")]
    EmptyHistory,
    #[error("last conversation turn is from {0}, expected user")]
    LastTurnNotUser(Role),
}

/// Which assembly strategy produced an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Document-grounded, one envelope per chunk.
    ChunkedSingleShot,
    /// Document-grounded, full history plus flattened context.
    Conversational,
    /// No document; general-knowledge directive.
    General,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Mode::ChunkedSingleShot => "chunked",
            Mode::Conversational => "conversational",
            Mode::General => "general",
        })
    }
}

/// Mode A: one two-turn envelope per chunk, in chunk order.
pub fn per_chunk(chunks: &[Chunk], question: &str) -> Vec<PromptEnvelope> {
    chunks
        .iter()
        .map(|c| {
            let mut env = PromptEnvelope::with_directive(DOCUMENT_DIRECTIVE);
            env.push(Turn::user(format!(
                "Context:\n{}\n\nQuestion: {}",
                c.text, question
            )));
            env
        })
        .collect()
}

/// Mode B: replay every turn but the last untouched, and prefix the last
/// (user) turn with the flattened context of all chunks.
pub fn with_history(chunks: &[Chunk], history: &[Turn]) -> Result<PromptEnvelope, ComposeError> {
    let (current, earlier) = history.split_last().ok_or(ComposeError::EmptyHistory)?;
    if current.role != Role::User {
        return Err(ComposeError::LastTurnNotUser(current.role));
    }
    Ok(follow_up(chunks, earlier, &current.content))
}

/// Mode B for a question not yet recorded: `earlier` is replayed as-is and
/// `question` becomes the context-prefixed final turn.
pub fn follow_up(chunks: &[Chunk], earlier: &[Turn], question: &str) -> PromptEnvelope {
    let mut env = PromptEnvelope::with_directive(DOCUMENT_DIRECTIVE);
    for turn in earlier {
        env.push(turn.clone());
    }
    env.push(Turn::user(format!(
        "Context:\n{}\n{}",
        chunk::flatten(chunks),
        question
    )));
    env
}

/// Mode C, stateless: directive plus the bare question.
pub fn general(question: &str) -> PromptEnvelope {
    let mut env = PromptEnvelope::with_directive(GENERAL_DIRECTIVE);
    env.push(Turn::user(question));
    env
}

/// Mode C, conversational: directive plus the whole history as-is.
pub fn general_with_history(history: &[Turn]) -> PromptEnvelope {
    let mut env = PromptEnvelope::with_directive(GENERAL_DIRECTIVE);
    for turn in history {
        env.push(turn.clone());
    }
    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::chunk_text;

    fn chunks() -> Vec<Chunk> {
        chunk_text("grid plan alpha bravo", 2).unwrap()
    }

    #[test]
    fn per_chunk_envelopes_follow_chunk_order() {
        let envs = per_chunk(&chunks(), "What voltage?");
        assert_eq!(envs.len(), 2);
        for env in &envs {
            assert_eq!(env.len(), 2);
            assert_eq!(env.directive(), DOCUMENT_DIRECTIVE);
        }
        assert_eq!(
            envs[0].last().content,
            "Context:\ngrid plan\n\nQuestion: What voltage?"
        );
        assert_eq!(
            envs[1].last().content,
            "Context:\nalpha bravo\n\nQuestion: What voltage?"
        );
    }

    #[test]
    fn per_chunk_without_chunks_is_empty() {
        assert!(per_chunk(&[], "q").is_empty());
    }

    #[test]
    fn history_passes_prior_turns_and_augments_last() {
        let history = vec![
            Turn::user("first  question\n"),
            Turn::assistant("first answer"),
            Turn::user("follow up"),
        ];
        let env = with_history(&chunks(), &history).unwrap();
        assert_eq!(env.len(), 4);
        assert_eq!(env.directive(), DOCUMENT_DIRECTIVE);
        assert_eq!(&env.turns()[1..3], &history[..2]);
        assert_eq!(
            env.last(),
            &Turn::user("Context:\ngrid plan\nalpha bravo\nfollow up")
        );
    }

    #[test]
    fn history_single_turn() {
        let env = with_history(&chunks(), &[Turn::user("q")]).unwrap();
        assert_eq!(env.len(), 2);
        assert_eq!(env.last().content, "Context:\ngrid plan\nalpha bravo\nq");
    }

    #[test]
    fn follow_up_matches_history_with_question_appended() {
        let earlier = vec![Turn::user("first"), Turn::assistant("answer")];
        let mut history = earlier.clone();
        history.push(Turn::user("second"));
        assert_eq!(
            follow_up(&chunks(), &earlier, "second"),
            with_history(&chunks(), &history).unwrap()
        );
    }

    #[test]
    fn history_rejects_empty_and_non_user_tail() {
        assert_eq!(
            with_history(&chunks(), &[]),
            Err(ComposeError::EmptyHistory)
        );
        let history = vec![Turn::user("q"), Turn::assistant("a")];
        assert_eq!(
            with_history(&chunks(), &history),
            Err(ComposeError::LastTurnNotUser(Role::Assistant))
        );
    }

    #[test]
    fn general_is_exactly_two_turns() {
        let env = general("What does IEEE Std 80 cover?");
        assert_eq!(
            env.turns(),
            &[
                Turn::system(GENERAL_DIRECTIVE),
                Turn::user("What does IEEE Std 80 cover?")
            ]
        );
    }

    #[test]
    fn general_with_history_is_unmodified() {
        let history = vec![Turn::user("a"), Turn::assistant("b"), Turn::user("c")];
        let env = general_with_history(&history);
        assert_eq!(env.directive(), GENERAL_DIRECTIVE);
        assert_eq!(&env.turns()[1..], history.as_slice());
    }
}
