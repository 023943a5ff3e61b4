//! Interactive chat loop for `gridai chat`.
//!
//! Reads one line at a time. Plain lines are questions for the session;
//! lines starting with `/` are commands:
//!
//! | Command | Effect |
//! |---------|--------|
//! | `/load <path>...` | Extract and chunk PDFs (files or directories), replacing loaded documents. Paths are whitespace-separated |
//! | `/clear` | Unload documents; later questions use general knowledge |
//! | `/docs` | List loaded files |
//! | `/history` | Print the conversation so far |
//! | `/help` | List commands |
//! | `/quit` | Leave (so does end of input) |
//!
//! Errors from `/load` are printed inline and the session continues.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::directive::ASSISTANT_NAME;
use crate::models::{DocumentSet, Role, Turn};
use crate::session::Session;
use crate::upload;

const HELP: &str = "\
Commands:
  /load <path>...  load PDF files or directories (replaces loaded documents);
                   paths are separated by spaces, so a path cannot contain one
  /clear           unload documents
  /docs            list loaded documents
  /history         show the conversation
  /quit            leave";

enum Command<'a> {
    Ask(&'a str),
    Load(Vec<PathBuf>),
    Clear,
    Docs,
    History,
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse(line: &str) -> Command<'_> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Ask(line);
    };
    let mut parts = rest.split_whitespace();
    match parts.next().unwrap_or_default() {
        "load" => Command::Load(parts.map(PathBuf::from).collect()),
        "clear" => Command::Clear,
        "docs" => Command::Docs,
        "history" => Command::History,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other),
    }
}

/// Run the loop until `/quit` or end of input.
pub async fn run_chat<R, W>(session: &mut Session, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    writeln!(out, "{}", greeting(session.documents()))?;

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        match parse(&line) {
            Command::Ask(question) => {
                if let Some(answer) = session.chat(question).await {
                    writeln!(out, "{}", render_turn(&Turn::assistant(answer.text)))?;
                }
            }
            Command::Load(inputs) if inputs.is_empty() => {
                writeln!(out, "usage: /load <path>...")?;
            }
            Command::Load(inputs) => match upload::collect_pdf_paths(&inputs) {
                Ok(paths) if paths.is_empty() => writeln!(
                    out,
                    "No PDF files found in {}; documents unchanged.",
                    join_paths(&inputs)
                )?,
                Ok(paths) => match session.load_documents(&paths) {
                    Ok(Some(docs)) => writeln!(out, "{}", loaded_summary(docs))?,
                    Ok(None) => writeln!(out, "No text found; answering from general knowledge.")?,
                    Err(e) => writeln!(out, "error: {:#}", anyhow::Error::from(e))?,
                },
                Err(e) => writeln!(out, "error: {:#}", anyhow::Error::from(e))?,
            },
            Command::Clear => {
                session.clear_documents();
                writeln!(out, "Documents cleared.")?;
            }
            Command::Docs => match session.documents() {
                Some(docs) => {
                    for file in docs.files() {
                        writeln!(out, "  {}  ({} pages)", file.path.display(), file.pages)?;
                    }
                    writeln!(out, "{} chunks, {} words", docs.chunks().len(), docs.word_count())?;
                }
                None => writeln!(out, "No documents loaded.")?,
            },
            Command::History => {
                for turn in session.conversation().turns() {
                    writeln!(out, "{}", render_turn(turn))?;
                }
            }
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => break,
            Command::Unknown(name) => writeln!(out, "unknown command: /{} (try /help)", name)?,
        }
    }

    Ok(())
}

fn greeting(docs: Option<&DocumentSet>) -> String {
    match docs {
        Some(docs) => format!("GridAI: {} Type /help for commands.", loaded_summary(docs)),
        None => "GridAI: ask about substation engineering, or /load PDFs. Type /help for commands."
            .to_string(),
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn loaded_summary(docs: &DocumentSet) -> String {
    format!(
        "Loaded {} PDFs ({} chunks).",
        docs.files().len(),
        docs.chunks().len()
    )
}

/// One line per turn, labelled by speaker.
pub fn render_turn(turn: &Turn) -> String {
    let speaker = match turn.role {
        Role::User => "You",
        Role::Assistant => ASSISTANT_NAME,
        Role::System => "System",
    };
    format!("{}: {}", speaker, turn.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_commands() {
        assert!(matches!(parse("  hello there "), Command::Ask("hello there")));
        assert!(matches!(parse("/quit"), Command::Quit));
        assert!(matches!(parse("/exit"), Command::Quit));
        assert!(matches!(parse("/frobnicate"), Command::Unknown("frobnicate")));
        match parse("/load a.pdf dir") {
            Command::Load(paths) => {
                assert_eq!(paths, vec![PathBuf::from("a.pdf"), PathBuf::from("dir")])
            }
            _ => panic!("expected load"),
        }
    }

    #[test]
    fn load_paths_split_on_whitespace_as_documented() {
        match parse("/load my drawings.pdf") {
            Command::Load(paths) => assert_eq!(paths.len(), 2),
            _ => panic!("expected load"),
        }
        assert!(HELP.contains("separated by spaces"));
    }

    #[test]
    fn render_labels_speakers() {
        assert_eq!(render_turn(&Turn::user("hi")), "You: hi");
        assert_eq!(render_turn(&Turn::assistant("hello")), "Eric: hello");
    }
}
