//! Errors surfaced by the statement pipeline.
//!
//! Parsing itself is best-effort: bad tokens, missing sections and missing
//! metadata are recovered silently. Only the cases below reach the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatementError {
    #[error("document text is empty")]
    EmptyDocument,

    #[error("invalid correction pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("json projection failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv projection failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("text extraction failed: {0}")]
    TextExtraction(String),
}

pub type Result<T> = std::result::Result<T, StatementError>;
