//! # GridAI
//!
//! A document-grounded question-answering assistant for substation
//! engineering and program management.
//!
//! GridAI extracts text from an optional batch of PDFs, splits it into
//! fixed-size word chunks, and answers questions through a chat completions
//! oracle, either with the document text as context or, when nothing is
//! loaded, with a fixed domain-knowledge directive.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌─────────┐   ┌──────────┐
//! │  upload  │──▶│  extract  │──▶│  chunk  │──▶│ session  │
//! │ PDF list │   │ text+fall │   │  words  │   │ docs+log │
//! └──────────┘   └───────────┘   └─────────┘   └────┬─────┘
//!                                                   │
//!                               ┌─────────┐   ┌─────▼────┐
//!                               │ oracle  │◀──│ compose  │
//!                               │ OpenAI  │   │ A / B / C│
//!                               └─────────┘   └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and credential loading |
//! | [`models`] | Core data types |
//! | [`upload`] | Upload batch path collection |
//! | [`extract`] | PDF text extraction with per-page fallback |
//! | [`chunk`] | Word chunking |
//! | [`directive`] | Fixed system directives |
//! | [`compose`] | Prompt envelope assembly |
//! | [`oracle`] | Completion oracle trait and OpenAI client |
//! | [`session`] | Session state and question routing |
//! | [`repl`] | Interactive chat loop |
//! | [`logging`] | Tracing setup |

pub mod chunk;
pub mod compose;
pub mod config;
pub mod directive;
pub mod extract;
pub mod logging;
pub mod models;
pub mod oracle;
pub mod repl;
pub mod session;
pub mod upload;
