//! bb HTML
//!
//! HTML5 parsing (html5ever) into the bb DOM, and serialization back out.

mod parser;
mod serializer;

pub use parser::HtmlParser;
pub use serializer::{document_html, inner_html, outer_html};

use bb_dom::Document;

/// Parse an HTML string into a Document
pub fn parse(html: &str, url: &str) -> Result<Document, HtmlError> {
    HtmlParser::new().parse_with_url(html, url)
}

/// Serialize a whole document
pub fn serialize(document: &Document) -> String {
    document_html(document)
}

/// HTML I/O error
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("Failed to read HTML input: {0}")]
    Read(#[from] std::io::Error),

    #[error("DOM construction failed: {0}")]
    Dom(#[from] bb_dom::DomError),
}
