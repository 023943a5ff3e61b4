//! # GridAI CLI (`gridai`)
//!
//! The `gridai` binary is the front end for GridAI. It extracts and chunks
//! PDFs, answers single questions, and runs an interactive chat session.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `gridai extract <PATH>...` | Print the text extracted from PDFs |
//! | `gridai chunk <PATH>...` | Show how the extracted text is chunked |
//! | `gridai ask "<question>"` | Answer one question, optionally over `--pdf` files |
//! | `gridai chat` | Interactive conversation, optionally over `--pdf` files |
//!
//! ## Examples
//!
//! ```bash
//! # General knowledge, no documents
//! gridai ask "What does IEEE Std 80 cover?"
//!
//! # Ask over a folder of plans
//! gridai ask "What is the design fault current?" --pdf ./plans
//!
//! # Conversation with documents loaded up front
//! gridai chat --pdf spec.pdf --pdf drawings.pdf
//! ```
//!
//! `OPENAI_API_KEY` must be set (environment, `.env`, or the configured
//! secrets file) for `ask` and `chat`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use gridai::chunk::chunk_text;
use gridai::config::{self, Config};
use gridai::extract::{self, Extraction};
use gridai::logging::{init_tracing, LogConfig};
use gridai::oracle::OpenAiOracle;
use gridai::repl::run_chat;
use gridai::session::Session;
use gridai::upload::collect_pdf_paths;

/// GridAI: a document-grounded assistant for substation engineering.
#[derive(Parser)]
#[command(
    name = "gridai",
    about = "GridAI — a document-grounded assistant for substation engineering",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/gridai.toml`; built-in defaults apply when the
    /// file does not exist.
    #[arg(long, global = true, default_value = "./config/gridai.toml")]
    config: PathBuf,

    /// Override `chunking.chunk_words` (words per chunk, must be > 0).
    #[arg(long, global = true)]
    chunk_words: Option<usize>,

    /// Debug-level logging for gridai (ignored when RUST_LOG is set).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the text extracted from PDF files or directories.
    Extract {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Extract and chunk PDFs, then print one line per chunk.
    Chunk {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print chunks as JSON instead.
        #[arg(long)]
        json: bool,
    },

    /// Answer a single question.
    ///
    /// With `--pdf`, the question is asked against each chunk of the
    /// documents and the partial answers are printed in chunk order.
    Ask {
        question: String,

        /// PDF file or directory to answer from (repeatable).
        #[arg(long = "pdf")]
        pdfs: Vec<PathBuf>,
    },

    /// Start an interactive conversation.
    Chat {
        /// PDF file or directory to load before the first question (repeatable).
        #[arg(long = "pdf")]
        pdfs: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // only a missing .env is ignored
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(anyhow::Error::new(e).context("Failed to load .env"));
        }
    }
    let cli = Cli::parse();

    init_tracing(LogConfig {
        verbose: cli.verbose,
        ..LogConfig::default()
    });

    let mut cfg = config::load_config_or_default(&cli.config)?;
    if let Some(n) = cli.chunk_words {
        cfg.chunking.chunk_words = n;
    }
    cfg.validate()?;

    match cli.command {
        Commands::Extract { paths } => {
            let extraction = extract_inputs(&paths)?;
            print!("{}", extraction.text);
        }
        Commands::Chunk { paths, json } => {
            let extraction = extract_inputs(&paths)?;
            let chunks = chunk_text(&extraction.text, cfg.chunking.chunk_words)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&chunks)?);
            } else {
                for c in &chunks {
                    println!("chunk {:>4}  {:>6} words  {}", c.index, c.word_count, preview(&c.text));
                }
                println!(
                    "{} chunks from {} pages in {} files",
                    chunks.len(),
                    extraction.pages(),
                    extraction.files.len()
                );
            }
        }
        Commands::Ask { question, pdfs } => {
            let session = open_session(&cfg, &pdfs)?;
            if let Some(answer) = session.ask(&question).await {
                println!("{}", answer.text);
            }
        }
        Commands::Chat { pdfs } => {
            let mut session = open_session(&cfg, &pdfs)?;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            run_chat(&mut session, stdin, &mut stdout).await?;
        }
    }

    Ok(())
}

fn extract_inputs(inputs: &[PathBuf]) -> Result<Extraction> {
    let paths = collect_pdf_paths(inputs)?;
    Ok(extract::extract_text(&paths)?)
}

/// Resolve the credential first so a missing key fails before any work.
fn open_session(cfg: &Config, pdfs: &[PathBuf]) -> Result<Session> {
    let api_key = config::resolve_api_key(&cfg.oracle)?;
    let oracle = OpenAiOracle::new(&cfg.oracle, api_key);
    let mut session = Session::new(Box::new(oracle), cfg.chunking.chunk_words);

    let paths = collect_pdf_paths(pdfs)?;
    if !pdfs.is_empty() && paths.is_empty() {
        tracing::warn!(inputs = %describe(pdfs), "no PDF files found; answering from general knowledge");
    }
    session
        .load_documents(&paths)
        .with_context(|| format!("Failed to load {}", describe(pdfs)))?;
    Ok(session)
}

fn describe(paths: &[PathBuf]) -> String {
    match paths {
        [one] => one.display().to_string(),
        _ => format!("{} paths", paths.len()),
    }
}

fn preview(text: &str) -> String {
    const WIDTH: usize = 60;
    let mut out: String = text.chars().take(WIDTH).collect();
    if text.chars().nth(WIDTH).is_some() {
        out.push('…');
    }
    out
}
