//! Fixed check register.
//!
//! Expected text:
//!   Date Paid Check Number Amount Reference Number
//!   05-12 1001 $75.00 00012345678
//!   Total Checks Paid $305.00

use ledgerscan_core::{Transaction, TransactionKind};
use regex::Regex;
use std::sync::OnceLock;

use crate::dates::{parse_amount, parse_date};
use crate::parsers::section;

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)Date\s+Paid\s+Check\s+Number\s+Amount\s+Reference\s+Number")
            .expect("check register header regex")
    })
}

fn total_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Total\s+Checks").expect("check register total regex"))
}

fn row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2}[-/]\d{1,2})\s+(\d{3,6})\s+\$?(\d[\d,]*\.\d{2})(?:\s+(.+))?$")
            .expect("check register row regex")
    })
}

pub fn parse_check_register_text(text: &str, year: i32) -> Vec<Transaction> {
    let Some(body) = section(text, header_re(), &[total_re()]) else {
        return Vec::new();
    };

    body.lines()
        .filter_map(|line| {
            let caps = row_re().captures(line.trim())?;
            let date = parse_date(&caps[1], year)?;
            let number = &caps[2];
            let mut txn = Transaction::new(TransactionKind::Check, date, parse_amount(&caps[3]))
                .with_check_number(number)
                .with_description(format!("Check #{number}"));
            if let Some(reference) = caps.get(4) {
                let reference: String = reference.as_str().split_whitespace().collect();
                txn = txn.with_reference_number(reference);
            }
            Some(txn)
        })
        .collect()
}
