//! ledgerscan-ingest: OCR correction, field extraction and the cascade of
//! layout-specific transaction extractors for bank statement text.

pub mod dates;
pub mod fields;
pub mod normalizer;
pub mod parsers;
pub mod source;
pub mod statement_parser;

pub use dates::{parse_amount, parse_date};
pub use normalizer::{Correction, CorrectionRules, CorrectionStats, OcrCorrector, normalize};
pub use source::{Page, PageImage, PageTextSource, TextRecognizer, assemble_document_text, extract_document_text};
pub use statement_parser::{Extraction, ParserOptions, StatementParser, extract_transactions, parse_statement};
