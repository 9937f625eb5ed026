//! Format extractors.
//!
//! Every extractor is a pure function over normalized statement text. It
//! returns the transactions it recognizes, or an empty list when its layout
//! is absent. `CASCADE` is the order the statement parser tries them in;
//! the first non-empty result wins and the rest are skipped.

pub mod atm_withdrawals;
pub mod capital_one_us;
pub mod chase_debit;
pub mod check_register;
pub mod debit_credit_ledger;
pub mod generic;
pub mod itemized;
pub mod reference_deposits;
pub mod sectioned_ledger;
pub mod split_columns;

use ledgerscan_core::Transaction;
use regex::Regex;

/// A named layout-specific extractor.
#[derive(Debug, Clone, Copy)]
pub struct FormatExtractor {
    pub name: &'static str,
    pub extract: fn(&str, i32) -> Vec<Transaction>,
}

/// Extractors in priority order. The generic line scanner is not listed;
/// it only runs when all of these come back empty.
pub const CASCADE: &[FormatExtractor] = &[
    FormatExtractor {
        name: "itemized-sections",
        extract: itemized::parse_itemized_sections_text,
    },
    FormatExtractor {
        name: "sectioned-ledger",
        extract: sectioned_ledger::parse_sectioned_ledger_text,
    },
    FormatExtractor {
        name: "transaction-detail",
        extract: chase_debit::parse_chase_debit_text,
    },
    FormatExtractor {
        name: "checking-resulting-balance",
        extract: capital_one_us::parse_capital_one_checking_text,
    },
    FormatExtractor {
        name: "card-activity",
        extract: capital_one_us::parse_capital_one_us_text,
    },
    FormatExtractor {
        name: "debit-credit-ledger",
        extract: debit_credit_ledger::parse_debit_credit_ledger_text,
    },
    FormatExtractor {
        name: "split-columns",
        extract: split_columns::parse_split_columns_text,
    },
];

/// Slices of `text` that follow each `header` match, each cut at the
/// earliest `terminator` match (or the next header, or end of text).
pub(crate) fn sections<'t>(text: &'t str, header: &Regex, terminators: &[&Regex]) -> Vec<&'t str> {
    let headers: Vec<_> = header.find_iter(text).collect();
    headers
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let limit = headers.get(i + 1).map_or(text.len(), |next| next.start());
            let body = &text[m.end()..limit];
            let end = terminators
                .iter()
                .filter_map(|t| t.find(body).map(|f| f.start()))
                .min()
                .unwrap_or(body.len());
            &body[..end]
        })
        .collect()
}

/// First section only; see [`sections`].
pub(crate) fn section<'t>(text: &'t str, header: &Regex, terminators: &[&Regex]) -> Option<&'t str> {
    sections(text, header, terminators).into_iter().next()
}

/// Lowercased `haystack` contains any of `needles`.
pub(crate) fn mentions(haystack: &str, needles: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    needles.iter().any(|n| lower.contains(n))
}

/// Any of `words` appears as a whole word in lowercased `haystack`.
pub(crate) fn mentions_word(haystack: &str, words: &[&str]) -> bool {
    haystack
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| words.contains(&w))
}

/// Collapse runs of whitespace to single spaces.
pub(crate) fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
