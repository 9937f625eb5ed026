//! Cascading statement parser.
//!
//! Field extractors always run. Transactions come from the first format
//! extractor in [`CASCADE`] that finds anything; if none does, the generic
//! line scanner runs. Results from different extractors are never merged.

use chrono::{Datelike, Local, NaiveDate};
use ledgerscan_core::{BankStatement, Result, StatementError, Transaction};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::fields::{
    SummaryTotal, extract_account_holder_name, extract_account_number, extract_balance, extract_bank_name,
    extract_period_end, extract_period_start, extract_statement_date, extract_summary_total,
};
use crate::normalizer::{CorrectionRules, OcrCorrector};
use crate::parsers::CASCADE;
use crate::parsers::generic::parse_generic_text;

/// Name reported when the generic line scanner produced the transactions.
pub const GENERIC_STRATEGY: &str = "generic-lines";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserOptions {
    /// Year for `MM-DD` style dates when the statement has no statement date.
    /// `None` means the current calendar year.
    #[serde(default)]
    pub fallback_year: Option<i32>,
    #[serde(default)]
    pub corrections: CorrectionRules,
}

/// Transactions plus the strategy that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub strategy: &'static str,
    pub transactions: Vec<Transaction>,
}

/// Run the cascade over normalized text.
pub fn extract_transactions(text: &str, year: i32) -> Extraction {
    for extractor in CASCADE {
        let transactions = (extractor.extract)(text, year);
        if !transactions.is_empty() {
            debug!("{} matched {} transactions", extractor.name, transactions.len());
            return Extraction {
                strategy: extractor.name,
                transactions,
            };
        }
    }

    let transactions = parse_generic_text(text, year);
    debug!("no layout matched; generic scan found {} transactions", transactions.len());
    Extraction {
        strategy: GENERIC_STRATEGY,
        transactions,
    }
}

#[derive(Debug, Clone)]
pub struct StatementParser {
    corrector: OcrCorrector,
    fallback_year: Option<i32>,
}

impl Default for StatementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementParser {
    pub fn new() -> Self {
        Self {
            corrector: OcrCorrector::default(),
            fallback_year: None,
        }
    }

    pub fn with_options(options: &ParserOptions) -> Result<Self> {
        Ok(Self {
            corrector: OcrCorrector::with_rules(&options.corrections)?,
            fallback_year: options.fallback_year,
        })
    }

    pub fn corrector(&self) -> &OcrCorrector {
        &self.corrector
    }

    pub fn normalize(&self, raw_text: &str) -> String {
        self.corrector.normalize(raw_text)
    }

    /// Normalize raw extracted text, then parse it.
    pub fn parse(&self, raw_text: &str) -> Result<BankStatement> {
        if raw_text.trim().is_empty() {
            return Err(StatementError::EmptyDocument);
        }
        self.parse_normalized(&self.normalize(raw_text))
    }

    /// Parse text that has already been through the normalizer.
    pub fn parse_normalized(&self, text: &str) -> Result<BankStatement> {
        self.parse_with_strategy(text).map(|(statement, _)| statement)
    }

    /// Like [`parse_normalized`](Self::parse_normalized), also naming the
    /// strategy that produced the transactions.
    pub fn parse_with_strategy(&self, text: &str) -> Result<(BankStatement, &'static str)> {
        if text.trim().is_empty() {
            return Err(StatementError::EmptyDocument);
        }

        let statement_date = extract_statement_date(text);
        let year = self.infer_year(statement_date);
        let Extraction { strategy, transactions } = extract_transactions(text, year);

        let statement = BankStatement {
            account_number: extract_account_number(text),
            account_holder_name: extract_account_holder_name(text),
            bank_name: extract_bank_name(text),
            statement_date,
            period_start: extract_period_start(text),
            period_end: extract_period_end(text),
            beginning_balance: extract_balance(text, "Beginning").unwrap_or_default(),
            ending_balance: extract_balance(text, "Ending").unwrap_or_default(),
            total_deposits: extract_summary_total(text, SummaryTotal::Deposits),
            total_withdrawals: extract_summary_total(text, SummaryTotal::Withdrawals),
            total_atm_withdrawals: extract_summary_total(text, SummaryTotal::AtmWithdrawals),
            total_checks: extract_summary_total(text, SummaryTotal::Checks),
            total_fees: extract_summary_total(text, SummaryTotal::Fees),
            transactions,
        };
        Ok((statement, strategy))
    }

    /// Statement date's year, else the configured fallback, else this year.
    pub fn infer_year(&self, statement_date: Option<NaiveDate>) -> i32 {
        statement_date
            .map(|d| d.year())
            .or(self.fallback_year)
            .unwrap_or_else(|| Local::now().year())
    }
}

/// Parse raw text with the built-in corrections.
pub fn parse_statement(raw_text: &str) -> Result<BankStatement> {
    StatementParser::new().parse(raw_text)
}
