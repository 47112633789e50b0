//! Concatenate the text of every page of every document, in order.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Something readable that holds a document: a file on disk or an uploaded buffer.
#[derive(Debug, Clone)]
pub enum DocumentHandle {
    Path(PathBuf),
    Bytes { name: String, bytes: Vec<u8> },
}

impl DocumentHandle {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        DocumentHandle::Path(path.into())
    }

    pub fn bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        DocumentHandle::Bytes {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Name used in errors and logs.
    pub fn label(&self) -> String {
        match self {
            DocumentHandle::Path(path) => path.display().to_string(),
            DocumentHandle::Bytes { name, .. } => name.clone(),
        }
    }

    fn read(&self) -> std::io::Result<Cow<'_, [u8]>> {
        match self {
            DocumentHandle::Path(path) => std::fs::read(path).map(Cow::Owned),
            DocumentHandle::Bytes { bytes, .. } => Ok(Cow::Borrowed(bytes.as_slice())),
        }
    }
}

impl From<&Path> for DocumentHandle {
    fn from(path: &Path) -> Self {
        DocumentHandle::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for DocumentHandle {
    fn from(path: PathBuf) -> Self {
        DocumentHandle::Path(path)
    }
}

/// Low-level failure reported by a parser.
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),

    #[error("not a parsable document: {0}")]
    Open(String),

    #[error("page {page}: {reason}")]
    Page { page: u32, reason: String },
}

/// Extraction failed for one handle. Nothing after it was processed.
#[derive(Debug, Error)]
#[error("failed to extract text from '{handle}': {failure}")]
pub struct ParseError {
    pub handle: String,
    #[source]
    pub failure: ParseFailure,
}

/// Parsing capability: open bytes, list pages, pull text from a page.
pub trait DocumentParser {
    type Document;

    fn open(&self, bytes: &[u8]) -> Result<Self::Document, ParseFailure>;

    /// Page numbers in reading order.
    fn page_numbers(&self, document: &Self::Document) -> Vec<u32>;

    fn page_text(&self, document: &Self::Document, page: u32) -> Result<String, ParseFailure>;
}

/// Runs a [`DocumentParser`] over a list of handles.
pub struct DocumentTextExtractor<P> {
    parser: P,
}

impl<P: DocumentParser> DocumentTextExtractor<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }

    /// Text of all pages of all documents, joined with no separator.
    pub fn extract(&self, documents: &[DocumentHandle]) -> Result<String, ParseError> {
        let mut text = String::new();
        for handle in documents {
            for page in self.extract_pages(handle)? {
                text.push_str(&page);
            }
        }
        Ok(text)
    }

    /// Per-page text of a single document.
    pub fn extract_pages(&self, handle: &DocumentHandle) -> Result<Vec<String>, ParseError> {
        let wrap = |failure: ParseFailure| ParseError {
            handle: handle.label(),
            failure,
        };

        let bytes = handle.read().map_err(|e| wrap(e.into()))?;
        let document = self.parser.open(&bytes).map_err(wrap)?;

        let pages = self
            .parser
            .page_numbers(&document)
            .into_iter()
            .map(|page| self.parser.page_text(&document, page))
            .collect::<Result<Vec<_>, _>>()
            .map_err(wrap)?;

        tracing::debug!(
            document = %handle.label(),
            pages = pages.len(),
            chars = pages.iter().map(|p| p.chars().count()).sum::<usize>(),
            "extracted document"
        );
        Ok(pages)
    }
}

impl<P: DocumentParser + Default> Default for DocumentTextExtractor<P> {
    fn default() -> Self {
        Self::new(P::default())
    }
}

impl<P> fmt::Debug for DocumentTextExtractor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentTextExtractor").finish_non_exhaustive()
    }
}
