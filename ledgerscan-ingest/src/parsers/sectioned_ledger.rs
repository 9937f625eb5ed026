//! Sectioned business ledger.
//!
//! Deposits and withdrawals are printed in separate sections, each with a
//! `Date Description of Transaction ... Amount` header. A row starts with a
//! `Mon DD` date; its description may wrap onto following lines and the
//! amount may sit alone on a later line.
//!
//!   Deposits I Credits
//!   Date Description of Transaction Ref Number Amount
//!   Feb 3 Mobile Check Deposit 8900123 1,200.00
//!   Other Withdrawals
//!   Date Description of Transaction Ref Number Amount
//!   Feb 5 Debit Purchase VISA ON 020416
//!   WAL-MART #1234 SPRINGFIELD
//!   88.15-

use chrono::NaiveDate;
use ledgerscan_core::{Direction, Transaction, TransactionKind};
use log::trace;
use regex::Regex;
use std::sync::OnceLock;

use crate::dates::{month_from_name, parse_amount, parse_date};
use crate::parsers::{mentions, sections, squash};

/// Maximum number of lines a wrapped row may span after its date line.
const LOOKAHEAD: usize = 5;

fn deposits_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)Deposits[ \t]*(?:I|&|and|/)[ \t]*Credits[^\n]*\r?\n",
            r"[ \t]*Date[ \t]+Description[ \t]+of[ \t]+Transaction[^\n]*Amount[^\n]*\r?\n"
        ))
        .expect("ledger deposits header regex")
    })
}

fn withdrawals_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)Other[ \t]+Withdrawals[^\n]*\r?\n",
            r"(?:[^\n]*Card[ \t]+Number:[^\n]*\r?\n)?",
            r"[ \t]*Date[ \t]+Description[ \t]+of[ \t]+Transaction[^\n]*Amount[^\n]*\r?\n"
        ))
        .expect("ledger withdrawals header regex")
    })
}

fn section_end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?im)^[ \t]*(?:---[ \t]*)?Page\b|BALANCE YOUR ACCOUNT|",
            r"^[ \t]*Total[ \t]+(?:Other[ \t]+)?(?:Deposits|Withdrawals)|^[ \t]*Other[ \t]+Withdrawals"
        ))
        .expect("ledger section end regex")
    })
}

fn single_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z]{3,9})\.?\s+(\d{1,2})\s+(.+?)\s+\$?((?:\d[\d,]*)?\.\d{2})-?$")
            .expect("ledger single line regex")
    })
}

fn row_start_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z]{3,9})\.?\s+(\d{1,2})\b\s*(.*)$").expect("ledger row start regex")
    })
}

fn amount_only_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\$?((?:\d[\d,]*)?\.\d{2})-?$").expect("ledger amount only regex"))
}

/// A `Mon DD` row start with a real month name.
fn row_date(line: &str, year: i32) -> Option<NaiveDate> {
    let caps = row_start_re().captures(line)?;
    month_from_name(&caps[1])?;
    parse_date(&format!("{} {}", &caps[1], &caps[2]), year)
}

fn is_noise(line: &str) -> bool {
    line.is_empty()
        || line.starts_with("Total")
        || line.contains("Card Number:")
        || line.contains("(continued)")
        || line.starts_with("Page")
}

fn is_wrapped_text(line: &str, year: i32) -> bool {
    !is_noise(line) && row_date(line, year).is_none() && !line.starts_with(|c: char| c.is_ascii_digit())
}

fn classify(description: &str, section: Direction) -> TransactionKind {
    match section {
        Direction::In if mentions(description, &["interest"]) => TransactionKind::Interest,
        Direction::In if mentions(description, &["transfer"]) => TransactionKind::Transfer,
        Direction::In => TransactionKind::Deposit,
        Direction::Out if mentions(description, &["debit purchase", "debit card"]) => TransactionKind::DebitCard,
        Direction::Out if mentions(description, &["atm"]) => TransactionKind::AtmWithdrawal,
        Direction::Out if mentions(description, &["check"]) => TransactionKind::Check,
        Direction::Out if mentions(description, &["fee", "service charge"]) => TransactionKind::Fee,
        Direction::Out => TransactionKind::Withdrawal,
    }
}

fn build(date: NaiveDate, description: &str, amount: &str, section: Direction) -> Transaction {
    let description = squash(description);
    Transaction::new(classify(&description, section), date, parse_amount(amount))
        .with_description(description)
        .with_direction(section)
}

fn parse_rows(body: &str, year: i32, section: Direction) -> Vec<Transaction> {
    let lines: Vec<&str> = body.lines().map(str::trim).collect();
    let mut out = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        i += 1;
        if is_noise(line) {
            continue;
        }
        let Some(date) = row_date(line, year) else {
            continue;
        };

        if let Some(caps) = single_line_re().captures(line) {
            let mut description = caps[3].to_string();
            // one wrapped description line without its own amount
            if let Some(next) = lines.get(i).copied().filter(|next| is_wrapped_text(next, year)) {
                description.push(' ');
                description.push_str(next);
                i += 1;
            }
            out.push(build(date, &description, &caps[4], section));
            continue;
        }

        // Amount on a later line.
        let Some(caps) = row_start_re().captures(line) else {
            continue;
        };
        let mut description = caps[3].to_string();
        let mut amount = None;
        let window_end = (i + LOOKAHEAD).min(lines.len());
        let mut j = i;
        while j < window_end {
            let next = lines[j];
            if let Some(a) = amount_only_re().captures(next) {
                amount = Some(a[1].to_string());
                break;
            }
            if row_date(next, year).is_some() || next.starts_with("Total") {
                break;
            }
            if !next.is_empty() && !next.chars().all(|c| c.is_ascii_digit()) {
                description.push(' ');
                description.push_str(next);
            }
            j += 1;
        }

        match amount {
            Some(amount) => {
                out.push(build(date, &description, &amount, section));
                i = j + 1;
            }
            None => trace!("no amount within {LOOKAHEAD} lines of {line:?}"),
        }
    }

    out
}

pub fn parse_sectioned_ledger_text(text: &str, year: i32) -> Vec<Transaction> {
    let mut out: Vec<Transaction> = sections(text, deposits_header_re(), &[section_end_re()])
        .into_iter()
        .flat_map(|body| parse_rows(body, year, Direction::In))
        .collect();
    out.extend(
        sections(text, withdrawals_header_re(), &[section_end_re()])
            .into_iter()
            .flat_map(|body| parse_rows(body, year, Direction::Out)),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const LEDGER: &str = "\
Deposits I Credits
Date Description of Transaction Ref Number Amount
Feb 3 Mobile Check Deposit 8900123 1,200.00
Feb 10 Interest Paid .26
Total Deposits I Credits $1,200.26
Other Withdrawals
Card Number: xxxx-xxxx-xxxx-1234
Date Description of Transaction Ref Number Amount
Feb 5 Debit Purchase VISA ON 020416
WAL-MART #1234 SPRINGFIELD
88.15-
Feb 9 Electronic Withdrawal To CITY UTILITIES 45.00-
REF=0409 WEB
Page 2 of 3
Other Withdrawals (continued)
Date Description of Transaction Ref Number Amount
Feb 12 ATM Withdrawal MAIN ST 60.00-
";

    #[test]
    fn test_deposit_rows() {
        let txns = parse_sectioned_ledger_text(LEDGER, 2016);
        let deposits: Vec<_> = txns.iter().filter(|t| t.direction == Direction::In).collect();
        assert_eq!(deposits.len(), 2);
        assert_eq!(deposits[0].kind, TransactionKind::Deposit);
        assert_eq!(deposits[0].amount, dec!(1200.00));
        assert_eq!(deposits[1].kind, TransactionKind::Interest);
        assert_eq!(deposits[1].amount, dec!(0.26));
    }

    #[test]
    fn test_multi_line_row_with_trailing_amount() {
        let txns = parse_sectioned_ledger_text(LEDGER, 2016);
        let purchase = txns
            .iter()
            .find(|t| t.kind == TransactionKind::DebitCard)
            .unwrap();
        assert_eq!(purchase.amount, dec!(88.15));
        assert_eq!(purchase.direction, Direction::Out);
        assert_eq!(
            purchase.description,
            "Debit Purchase VISA ON 020416 WAL-MART #1234 SPRINGFIELD"
        );
        assert_eq!(purchase.transaction_date, NaiveDate::from_ymd_opt(2016, 2, 5).unwrap());
    }

    #[test]
    fn test_continuation_after_single_line_row() {
        let txns = parse_sectioned_ledger_text(LEDGER, 2016);
        let utility = txns
            .iter()
            .find(|t| t.description.contains("CITY UTILITIES"))
            .unwrap();
        assert_eq!(utility.kind, TransactionKind::Withdrawal);
        assert_eq!(utility.description, "Electronic Withdrawal To CITY UTILITIES REF=0409 WEB");
    }

    #[test]
    fn test_continued_section_on_next_page() {
        let txns = parse_sectioned_ledger_text(LEDGER, 2016);
        assert_eq!(txns.len(), 5);
        let atm = txns.last().unwrap();
        assert_eq!(atm.kind, TransactionKind::AtmWithdrawal);
        assert_eq!(atm.amount, dec!(60.00));
    }

    #[test]
    fn test_amount_beyond_lookahead_is_dropped() {
        let text = "\
Other Withdrawals
Date Description of Transaction Amount
Mar 1 Wire Out
a
b
c
d
e
f
10.00
";
        assert!(parse_sectioned_ledger_text(text, 2016).is_empty());
    }

    #[test]
    fn test_absent_anchor_is_empty() {
        assert!(parse_sectioned_ledger_text("Feb 3 Deposit 10.00", 2016).is_empty());
    }
}
