//! PDF text extraction with a per-page fallback path.
//!
//! Each page is read from the PDF text layer first (`pdf-extract`). When a
//! page comes back empty, typically a scanned or image-only page, the page's
//! content stream is re-read with `lopdf`, which decodes some font encodings
//! the primary path drops. A page that is empty on both paths contributes
//! nothing. No OCR engine is involved.
//!
//! A file that cannot be read, or whose text layer cannot be parsed at all,
//! fails the whole batch with an [`ExtractError`] naming the file.

use std::path::{Path, PathBuf};

use crate::models::FileReport;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse PDF {}: {message}", path.display())]
    Pdf { path: PathBuf, message: String },
}

impl ExtractError {
    /// The file that caused the batch to fail.
    pub fn path(&self) -> &Path {
        match self {
            ExtractError::Io { path, .. } | ExtractError::Pdf { path, .. } => path,
        }
    }
}

/// A way of turning PDF bytes into per-page text.
pub trait PageSource: Send + Sync {
    /// Short label used in log events.
    fn name(&self) -> &'static str;
    /// Text of every page, in page order.
    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<String>, String>;
}

/// Primary path: the PDF text layer via `pdf-extract`.
pub struct TextLayer;

impl PageSource for TextLayer {
    fn name(&self) -> &'static str {
        "text-layer"
    }

    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<String>, String> {
        guarded(|| pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| e.to_string()))
    }
}

/// Fallback path: decode each page's content stream with `lopdf`.
pub struct ContentStream;

impl PageSource for ContentStream {
    fn name(&self) -> &'static str {
        "content-stream"
    }

    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<String>, String> {
        guarded(|| {
            let doc = lopdf::Document::load_mem(bytes).map_err(|e| e.to_string())?;
            // get_pages() is keyed by 1-based page number in page order
            let texts = doc
                .get_pages()
                .keys()
                .map(|&number| doc.extract_text(&[number]).unwrap_or_default())
                .collect();
            Ok(texts)
        })
    }
}

/// Run a decoder, turning a panic inside it into an error.
///
/// Both PDF crates panic on some malformed content streams (undefined
/// fonts, bad operands) rather than returning an error.
fn guarded<F>(decode: F) -> Result<Vec<String>, String>
where
    F: FnOnce() -> Result<Vec<String>, String> + std::panic::UnwindSafe,
{
    std::panic::catch_unwind(decode).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown cause".to_string());
        Err(format!("decoder panicked: {}", reason))
    })
}

/// Concatenated text of one batch plus per-file reports.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub text: String,
    pub files: Vec<FileReport>,
}

impl Extraction {
    pub fn pages(&self) -> usize {
        self.files.iter().map(|f| f.pages).sum()
    }

    pub fn recovered_pages(&self) -> usize {
        self.files.iter().map(|f| f.recovered_pages).sum()
    }

    pub fn empty_pages(&self) -> usize {
        self.files.iter().map(|f| f.empty_pages).sum()
    }
}

pub struct Extractor {
    primary: Box<dyn PageSource>,
    fallback: Box<dyn PageSource>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(Box::new(TextLayer), Box::new(ContentStream))
    }
}

impl Extractor {
    pub fn new(primary: Box<dyn PageSource>, fallback: Box<dyn PageSource>) -> Self {
        Self { primary, fallback }
    }

    /// Extract every file in order. Each non-empty page contributes its text
    /// followed by a newline.
    pub fn extract_files(&self, paths: &[PathBuf]) -> Result<Extraction, ExtractError> {
        let mut out = Extraction::default();
        for path in paths {
            let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
                path: path.clone(),
                source,
            })?;
            let report = self.extract_into(path, &bytes, &mut out.text)?;
            tracing::debug!(
                file = %path.display(),
                pages = report.pages,
                recovered = report.recovered_pages,
                empty = report.empty_pages,
                "extracted file"
            );
            out.files.push(report);
        }
        Ok(out)
    }

    /// Extract one in-memory PDF, appending its text to `text`.
    pub fn extract_into(
        &self,
        path: &Path,
        bytes: &[u8],
        text: &mut String,
    ) -> Result<FileReport, ExtractError> {
        let pages = self
            .primary
            .page_texts(bytes)
            .map_err(|message| ExtractError::Pdf {
                path: path.to_path_buf(),
                message,
            })?;

        let mut report = FileReport {
            path: path.to_path_buf(),
            pages: pages.len(),
            ..FileReport::default()
        };
        // Loaded lazily, at most once per file.
        let mut fallback: Option<Vec<String>> = None;

        for (index, page) in pages.iter().enumerate() {
            if !page.trim().is_empty() {
                text.push_str(page);
                text.push('\n');
                continue;
            }

            let recovered = fallback.get_or_insert_with(|| {
                self.fallback.page_texts(bytes).unwrap_or_else(|e| {
                    tracing::warn!(
                        file = %path.display(),
                        source = self.fallback.name(),
                        error = %e,
                        "fallback extraction failed"
                    );
                    Vec::new()
                })
            });

            match recovered.get(index).filter(|t| !t.trim().is_empty()) {
                Some(page) => {
                    text.push_str(page);
                    text.push('\n');
                    report.recovered_pages += 1;
                }
                None => {
                    tracing::debug!(file = %path.display(), page = index + 1, "page has no text");
                    report.empty_pages += 1;
                }
            }
        }

        Ok(report)
    }
}

/// Extract a batch with the default text-layer + content-stream paths.
pub fn extract_text(paths: &[PathBuf]) -> Result<Extraction, ExtractError> {
    Extractor::default().extract_files(paths)
}
