//! Multi-line ATM withdrawal records.
//!
//! Expected text (dates may also sit on their own line):
//!   ATM Withdrawal
//!   1ST NATIONAL PLAZA
//!   KANSAS CITY MO   05-02 05-03 $60.00

use ledgerscan_core::{Transaction, TransactionKind};
use regex::Regex;
use std::sync::OnceLock;

use crate::dates::{parse_amount, parse_date};

fn atm_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"ATM Withdrawal[ \t]*\r?\n",
            r"[ \t]*(?P<loc1>[^\n]+?)[ \t]*\r?\n",
            r"[ \t]*(?P<loc2>[^\n]+?)[ \t]*(?:\r?\n[ \t]*)?",
            r"(?P<date>\d{1,2}[-/]\d{1,2})[ \t]+(?P<post>\d{1,2}[-/]\d{1,2})[ \t]+",
            r"\$?(?P<amt>\d[\d,]*\.\d{2})"
        ))
        .expect("atm withdrawal regex")
    })
}

pub fn parse_atm_withdrawals_text(text: &str, year: i32) -> Vec<Transaction> {
    atm_re()
        .captures_iter(text)
        .filter_map(|caps| {
            let date = parse_date(&caps["date"], year)?;
            let loc1 = caps["loc1"].trim();
            let loc2 = caps["loc2"].trim();
            Some(
                Transaction::new(TransactionKind::AtmWithdrawal, date, parse_amount(&caps["amt"]))
                    .with_posted_date(parse_date(&caps["post"], year))
                    .with_description(format!("ATM Withdrawal at {loc1}"))
                    .with_location(format!("{loc1}, {loc2}")),
            )
        })
        .collect()
}
