//! PDF metadata extraction

use std::path::Path;

use lopdf::{Document, Object};

use crate::error::{Error, Result};
use crate::pdf::document::resolve_dict;

/// Count pages by reading the Count field from the Pages dictionary
///
/// This trusts the root `/Count` rather than walking the tree, which also works
/// for nested page trees.
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let catalog = doc.catalog()?;
    let pages = catalog
        .get(b"Pages")
        .ok()
        .and_then(|pages| resolve_dict(doc, pages))
        .ok_or_else(|| Error::PageTree("No Pages in catalog".to_string()))?;

    match pages.get(b"Count") {
        Ok(Object::Integer(n)) if *n >= 0 => Ok(*n as usize),
        _ => Err(Error::PageTree("Count is not a page count".to_string())),
    }
}

/// PDF metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
    /// Producing application (if present)
    pub producer: Option<String>,
}

/// Extract metadata from PDF bytes
pub fn extract_metadata(bytes: &[u8]) -> Result<PdfMetadata> {
    let doc = Document::load_mem(bytes)?;
    let page_count = count_pages_from_catalog(&doc)?;
    if page_count == 0 {
        return Err(Error::EmptyPdf);
    }

    let info = doc.trailer.get(b"Info").ok().and_then(|info| resolve_dict(&doc, info));
    let entry = |key: &[u8]| -> Option<String> {
        let bytes = info?.get(key).ok()?.as_str().ok()?;
        String::from_utf8(bytes.to_vec()).ok()
    };

    Ok(PdfMetadata {
        page_count,
        title: entry(b"Title"),
        author: entry(b"Author"),
        producer: entry(b"Producer"),
    })
}

/// Count the pages of PDF bytes
pub fn count_pages(bytes: &[u8]) -> Result<usize> {
    let doc = Document::load_mem(bytes)?;
    count_pages_from_catalog(&doc)
}

/// Read metadata from a file on disk
pub fn read_metadata(path: &Path) -> Result<PdfMetadata> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    extract_metadata(&std::fs::read(path)?)
}
