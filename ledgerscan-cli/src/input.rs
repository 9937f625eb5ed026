use anyhow::{Context, Result};
use ledgerscan_core::Result as StatementResult;
use ledgerscan_ingest::{Page, PageTextSource, extract_document_text};
use std::fs;
use std::path::Path;

/// Plain text with form feeds between pages, the way `pdftotext` writes it.
pub struct FormFeedPages;

impl PageTextSource for FormFeedPages {
    fn extract_pages(&self, document: &[u8]) -> StatementResult<Vec<Page>> {
        let text = String::from_utf8_lossy(document);
        let mut pages: Vec<Page> = text.split('\x0c').map(Page::from_text).collect();
        // a trailing form feed does not start another page
        if pages.len() > 1 && pages.last().is_some_and(|p| p.text.trim().is_empty()) {
            pages.pop();
        }
        Ok(pages)
    }
}

pub fn read_statement_text(path: &Path, page_separators: bool) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    extract_document_text(&bytes, &FormFeedPages, None, page_separators)
        .with_context(|| format!("extract text from {}", path.display()))
}
