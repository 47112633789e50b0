//! Document text extraction

pub mod extractor;
pub mod pdf;

pub use extractor::{DocumentHandle, DocumentParser, DocumentTextExtractor, ParseError, ParseFailure};
pub use pdf::PdfParser;
