//! Reference-number deposits.
//!
//! Expected text:
//!   Deposit Ref Nbr: 130012345 05-15 $3,615.08

use ledgerscan_core::{Transaction, TransactionKind};
use regex::Regex;
use std::sync::OnceLock;

use crate::dates::{parse_amount, parse_date};

fn deposit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Deposit\s+Ref\s+Nbr:?\s*(\d+)\s+(\d{1,2}[-/]\d{1,2})\s+\$?(\d[\d,]*\.\d{2})")
            .expect("reference deposit regex")
    })
}

pub fn parse_reference_deposits_text(text: &str, year: i32) -> Vec<Transaction> {
    deposit_re()
        .captures_iter(text)
        .filter_map(|caps| {
            let date = parse_date(&caps[2], year)?;
            Some(
                Transaction::new(TransactionKind::Deposit, date, parse_amount(&caps[3]))
                    .with_reference_number(&caps[1]),
            )
        })
        .collect()
}
