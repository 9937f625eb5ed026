//! OCR correction for extracted statement text.
//!
//! Three ordered stages run over the whole document:
//!   1. whole-word substitutions (`Acccunt` -> `Account`)
//!   2. pattern substitutions for spaced-out or merged words (`R e f` -> `Ref`)
//!   3. contextual fixes anchored to banking phrases, dates and currency
//!
//! Built-in tables come first; caller-supplied rules are appended to the
//! matching stage. The corrector is immutable once built.

use ledgerscan_core::{Result, StatementError};
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const WORD_CORRECTIONS: &[(&str, &str)] = &[
    ("Acccunt", "Account"),
    ("acccunt", "account"),
    ("Amcunt", "Amount"),
    ("amcunt", "amount"),
    ("Depcsit", "Deposit"),
    ("depcsit", "deposit"),
    ("Depcsits", "Deposits"),
    ("depcsits", "deposits"),
    ("Descripticn", "Description"),
    ("descripticn", "description"),
    ("Tctal", "Total"),
    ("tctal", "total"),
    ("quasricns", "questions"),
    ("ycu", "you"),
    ("Ref N br", "Ref Nbr"),
    ("N br", "Nbr"),
    ("Tran", "Trans"),
];

const PATTERN_CORRECTIONS: &[(&str, &str)] = &[
    (r"\bcn\b", "on"),
    (r"R e f", "Ref"),
    (r"N u m b e r", "Number"),
    (r"N b r", "Nbr"),
];

const CONTEXTUAL_CORRECTIONS: &[(&str, &str)] = &[
    (r"Balance cn\b", "Balance on"),
    (r"\bMayr\b", "May"),
    // 10l03 -> 10/03
    (r"\b(\d{1,2})l(\d{1,2})\b", "${1}/${2}"),
    (r"Â£", "$$"),
    (r"[£€]", "$$"),
    // the word stage has already turned "ycu" into "you"
    (r"I f\s*y\s*[co]\s*u", "If you"),
    (r"ca[l1!]{2,}", "call"),
];

/// Caller-supplied additions to the built-in correction tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRules {
    /// Whole-word, case-sensitive literal replacements.
    #[serde(default)]
    pub words: Vec<Correction>,
    /// Regex replacements; `$1`-style group references are expanded.
    #[serde(default)]
    pub patterns: Vec<Correction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub from: String,
    pub to: String,
}

impl CorrectionRules {
    pub fn with_word(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.words.push(Correction { from: from.into(), to: to.into() });
        self
    }

    pub fn with_pattern(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.patterns.push(Correction { from: from.into(), to: to.into() });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.patterns.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Rule {
    re: Regex,
    replacement: String,
    literal: bool,
}

impl Rule {
    fn word(from: &str, to: &str) -> Result<Self> {
        // Only anchor on a side that starts/ends with a word character,
        // otherwise `\b` could never match next to punctuation.
        let starts_word = from.chars().next().is_some_and(|c| c.is_alphanumeric() || c == '_');
        let ends_word = from.chars().last().is_some_and(|c| c.is_alphanumeric() || c == '_');
        let pattern = format!(
            "{}{}{}",
            if starts_word { r"\b" } else { "" },
            regex::escape(from),
            if ends_word { r"\b" } else { "" },
        );
        Ok(Self {
            re: compile(&pattern)?,
            replacement: to.to_string(),
            literal: true,
        })
    }

    fn pattern(from: &str, to: &str) -> Result<Self> {
        Ok(Self {
            re: compile(from)?,
            replacement: to.to_string(),
            literal: false,
        })
    }

    fn apply(&self, text: &str) -> String {
        if self.literal {
            self.re.replace_all(text, NoExpand(&self.replacement)).into_owned()
        } else {
            self.re.replace_all(text, self.replacement.as_str()).into_owned()
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| StatementError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Word-level comparison between raw and corrected text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorrectionStats {
    pub total_words: usize,
    pub words_changed: usize,
    pub original_length: usize,
    pub corrected_length: usize,
}

impl CorrectionStats {
    pub fn between(original: &str, corrected: &str) -> Self {
        let original_words: Vec<&str> = original.split_whitespace().collect();
        let corrected_words: Vec<&str> = corrected.split_whitespace().collect();
        let words_changed = original_words
            .iter()
            .zip(&corrected_words)
            .filter(|(a, b)| a != b)
            .count();

        Self {
            total_words: original_words.len(),
            words_changed,
            original_length: original.chars().count(),
            corrected_length: corrected.chars().count(),
        }
    }
}

/// Immutable OCR corrector.
#[derive(Debug, Clone)]
pub struct OcrCorrector {
    words: Vec<(String, Rule)>,
    patterns: Vec<Rule>,
    contextual: Vec<Rule>,
}

impl OcrCorrector {
    /// Built-in tables merged with `rules`. Fails only when a caller pattern
    /// does not compile.
    pub fn with_rules(rules: &CorrectionRules) -> Result<Self> {
        let builtin_words = WORD_CORRECTIONS.iter().map(|(from, to)| (*from, *to));
        let extra_words = rules.words.iter().map(|c| (c.from.as_str(), c.to.as_str()));
        let words = builtin_words
            .chain(extra_words)
            .filter(|(from, _)| !from.is_empty())
            .map(|(from, to)| Ok((from.to_string(), Rule::word(from, to)?)))
            .collect::<Result<Vec<_>>>()?;

        let builtin_patterns = PATTERN_CORRECTIONS.iter().map(|(from, to)| (*from, *to));
        let extra_patterns = rules.patterns.iter().map(|c| (c.from.as_str(), c.to.as_str()));
        let patterns = builtin_patterns
            .chain(extra_patterns)
            .map(|(from, to)| Rule::pattern(from, to))
            .collect::<Result<Vec<_>>>()?;

        let contextual = CONTEXTUAL_CORRECTIONS
            .iter()
            .map(|(from, to)| Rule::pattern(from, to))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { words, patterns, contextual })
    }

    /// Correct known OCR misreadings. Total: any input yields some output.
    pub fn normalize(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }

        let mut text = raw.to_string();
        for (_, rule) in &self.words {
            text = rule.apply(&text);
        }
        for rule in self.patterns.iter().chain(&self.contextual) {
            text = rule.apply(&text);
        }
        text
    }

    /// Direct lookup of a single token in the word table.
    pub fn correct_word<'a>(&'a self, word: &'a str) -> &'a str {
        self.words
            .iter()
            .find(|(from, _)| from == word)
            .map(|(_, rule)| rule.replacement.as_str())
            .unwrap_or(word)
    }
}

impl Default for OcrCorrector {
    fn default() -> Self {
        // The built-in tables are literals covered by tests; they always compile.
        Self::with_rules(&CorrectionRules::default()).expect("built-in correction tables")
    }
}

/// Normalize with the built-in tables only.
pub fn normalize(raw: &str) -> String {
    static BUILT_IN: OnceLock<OcrCorrector> = OnceLock::new();
    BUILT_IN.get_or_init(OcrCorrector::default).normalize(raw)
}
