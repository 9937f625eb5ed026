//! Page-text collaborators.
//!
//! PDF rendering and OCR live outside this crate. Callers plug them in
//! through [`PageTextSource`] and [`TextRecognizer`]; this module only
//! assembles their output into the single document string the parser reads.

use ledgerscan_core::{Result, StatementError};
use log::{debug, warn};

/// Rendered page image handed to a recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    pub bytes: Vec<u8>,
    pub dpi: u32,
}

/// One page of an extracted document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    /// Text layer, possibly empty for scanned pages.
    pub text: String,
    pub image: Option<PageImage>,
}

impl Page {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn scanned(image: PageImage) -> Self {
        Self {
            text: String::new(),
            image: Some(image),
        }
    }
}

/// `(document bytes) -> ordered pages`
pub trait PageTextSource {
    fn extract_pages(&self, document: &[u8]) -> Result<Vec<Page>>;
}

/// `(page image) -> text`, only consulted for pages without a text layer.
pub trait TextRecognizer {
    fn recognize_text(&self, image: &PageImage) -> Result<String>;
}

fn page_text(number: usize, page: &Page, recognizer: Option<&dyn TextRecognizer>) -> String {
    if !page.text.trim().is_empty() {
        return page.text.clone();
    }
    let (Some(image), Some(recognizer)) = (&page.image, recognizer) else {
        debug!("page {number} has no text and no recognizer");
        return String::new();
    };
    match recognizer.recognize_text(image) {
        Ok(text) => text,
        Err(err) => {
            warn!("dropping page {number}: {err}");
            String::new()
        }
    }
}

/// Join page texts into one document.
///
/// With `separators`, each page is preceded by a `--- Page N ---` line.
/// A failing recognizer drops only that page's text.
pub fn assemble_document_text(
    pages: &[Page],
    recognizer: Option<&dyn TextRecognizer>,
    separators: bool,
) -> String {
    let mut out = String::new();
    for (idx, page) in pages.iter().enumerate() {
        let number = idx + 1;
        if separators {
            out.push_str(&format!("\n--- Page {number} ---\n"));
        }
        out.push_str(&page_text(number, page, recognizer));
        out.push('\n');
    }
    out
}

/// Run a page source and assemble its pages.
pub fn extract_document_text(
    document: &[u8],
    source: &dyn PageTextSource,
    recognizer: Option<&dyn TextRecognizer>,
    separators: bool,
) -> Result<String> {
    if document.is_empty() {
        return Err(StatementError::EmptyDocument);
    }
    let pages = source.extract_pages(document)?;
    Ok(assemble_document_text(&pages, recognizer, separators))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingRecognizer {
        calls: Cell<usize>,
        fail: bool,
    }

    impl TextRecognizer for CountingRecognizer {
        fn recognize_text(&self, image: &PageImage) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(StatementError::TextExtraction("ocr engine crashed".to_string()));
            }
            Ok(format!("recognized {} bytes", image.bytes.len()))
        }
    }

    struct SplitOnFormFeed;

    impl PageTextSource for SplitOnFormFeed {
        fn extract_pages(&self, document: &[u8]) -> Result<Vec<Page>> {
            let text = std::str::from_utf8(document)
                .map_err(|e| StatementError::TextExtraction(e.to_string()))?;
            Ok(text.split('\x0c').map(Page::from_text).collect())
        }
    }

    fn image() -> PageImage {
        PageImage {
            bytes: vec![0; 4],
            dpi: 300,
        }
    }

    #[test]
    fn test_recognizer_only_for_pages_without_text() {
        let recognizer = CountingRecognizer {
            calls: Cell::new(0),
            fail: false,
        };
        let pages = vec![Page::from_text("page one"), Page::scanned(image())];
        let text = assemble_document_text(&pages, Some(&recognizer), true);
        assert_eq!(recognizer.calls.get(), 1);
        assert!(text.contains("--- Page 1 ---\npage one"));
        assert!(text.contains("--- Page 2 ---\nrecognized 4 bytes"));
    }

    #[test]
    fn test_failing_recognizer_drops_page() {
        let recognizer = CountingRecognizer {
            calls: Cell::new(0),
            fail: true,
        };
        let pages = vec![Page::scanned(image()), Page::from_text("kept")];
        let text = assemble_document_text(&pages, Some(&recognizer), false);
        assert_eq!(text, "\nkept\n");
    }

    #[test]
    fn test_scanned_page_without_recognizer_is_blank() {
        let text = assemble_document_text(&[Page::scanned(image())], None, false);
        assert_eq!(text.trim(), "");
    }

    #[test]
    fn test_extract_document_text() {
        let text = extract_document_text(b"first\x0csecond", &SplitOnFormFeed, None, true).unwrap();
        assert!(text.contains("--- Page 2 ---\nsecond"));
        assert!(matches!(
            extract_document_text(b"", &SplitOnFormFeed, None, true),
            Err(StatementError::EmptyDocument)
        ));
    }
}
