//! Capital One US statement parsers
//!
//! Card activity rows after PDF-to-text:
//!   Trans Date     Post Date      Description                                         Amount
//!   Jul 20         Jul 22         H-E-B #455SAN MARCOSTX                                $5.82
//!   Jul 28         Jul 29         CAPITAL ONE MOBILE PYMT                             - $14.05
//!
//! Checking rows, with the description on the following line:
//!   Date     Amount      Resulting Balance   Transaction Type   Description
//!   05/02    -$42.10     $1,957.90           Debit
//!   Debit Card Purchase - KROGER #123 AUSTIN TX

use ledgerscan_core::{Direction, Transaction, TransactionKind};
use regex::Regex;
use std::sync::OnceLock;

use crate::dates::{parse_amount, parse_date};
use crate::parsers::{mentions, sections, squash};

fn card_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Trans\s+Date\s+Post\s+Date\s+Description\s+Amount").expect("card activity header regex")
    })
}

fn card_txn_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^\s*(?P<trans>[A-Za-z]{3}\s+\d{1,2})\s+",
            r"(?P<post>[A-Za-z]{3}\s+\d{1,2})\s+",
            r"(?P<desc>.+?)\s+",
            r"-?\s*\$(?P<amt>\d{1,3}(?:,\d{3})*\.\d{2})\s*$"
        ))
        .expect("card activity row regex")
    })
}

/// Payments and credits to the card account.
const CARD_CREDIT_WORDS: &[&str] = &["payment", "pymt", "thank you", "credit", "refund", "return"];

/// Parse extracted card statement text into transactions.
///
/// `statement_year` is required because transaction rows only include MMM DD.
pub fn parse_capital_one_us_text(text: &str, statement_year: i32) -> Vec<Transaction> {
    let mut in_section = false;
    let mut out = Vec::new();

    for line in text.lines() {
        if !in_section {
            if card_header_re().is_match(line) {
                in_section = true;
            }
            continue;
        }

        let Some(caps) = card_txn_re().captures(line) else {
            continue;
        };
        let Some(trans) = parse_date(&caps["trans"], statement_year) else {
            continue;
        };
        let post = parse_date(&caps["post"], statement_year);
        let desc = caps["desc"].trim();

        let txn = if mentions(desc, CARD_CREDIT_WORDS) {
            Transaction::new(TransactionKind::Transfer, trans, parse_amount(&caps["amt"]))
                .with_direction(Direction::In)
        } else {
            Transaction::new(TransactionKind::CreditCard, trans, parse_amount(&caps["amt"]))
        };
        out.push(txn.with_posted_date(post).with_description(desc));
    }

    out
}

fn checking_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)Date\s+Amount\s+Resulting\s+Balance\s+Transaction\s+Type\s+Description[^\n]*\n")
            .expect("checking header regex")
    })
}

fn checking_end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^[ \t]*(?:---[ \t]*)?PAGE\b|Check\s+No\.").expect("checking terminator regex")
    })
}

fn checking_row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^(?P<date>\d{1,2}/\d{1,2})\s+",
            r"(?P<amount>[-+]?\s*\$?[\d,]+\.\d{2})\s+",
            r"(?P<balance>-?\$?[\d,]+\.\d{2})\s+",
            r"(?P<type>[A-Za-z]+)\s*(?P<rest>.*)$"
        ))
        .expect("checking row regex")
    })
}

fn is_checking_noise(line: &str) -> bool {
    line.is_empty()
        || line.starts_with("---")
        || mentions(line, &["account detail", "continued", "products and services"])
}

fn checking_kind(kind_column: &str, desc: &str) -> (TransactionKind, Direction) {
    match kind_column.to_lowercase().as_str() {
        "credit" if mentions(desc, &["interest"]) => (TransactionKind::Interest, Direction::In),
        "credit" if mentions(desc, &["transfer"]) => (TransactionKind::Transfer, Direction::In),
        "credit" | "deposit" => (TransactionKind::Deposit, Direction::In),
        "check" => (TransactionKind::Check, Direction::Out),
        "fee" => (TransactionKind::Fee, Direction::Out),
        "debit" if mentions(desc, &["debit card", "purchase"]) => (TransactionKind::DebitCard, Direction::Out),
        "debit" if mentions(desc, &["atm"]) => (TransactionKind::AtmWithdrawal, Direction::Out),
        "debit" if mentions(desc, &["check"]) => (TransactionKind::Check, Direction::Out),
        "debit" if mentions(desc, &["transfer"]) => (TransactionKind::Transfer, Direction::Out),
        "debit" | "withdrawal" => (TransactionKind::Withdrawal, Direction::Out),
        _ => (TransactionKind::Other, Direction::Out),
    }
}

/// Parse checking text with `Date Amount Resulting Balance Transaction Type
/// Description` tables. Every continued table on later pages is read too.
pub fn parse_capital_one_checking_text(text: &str, statement_year: i32) -> Vec<Transaction> {
    let mut out = Vec::new();

    for body in sections(text, checking_header_re(), &[checking_end_re()]) {
        let lines: Vec<&str> = body.lines().map(str::trim).collect();
        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            i += 1;
            if is_checking_noise(line) {
                continue;
            }
            let Some(caps) = checking_row_re().captures(line) else {
                continue;
            };
            let Some(date) = parse_date(&caps["date"], statement_year) else {
                continue;
            };

            let mut desc = caps["rest"].trim().to_string();
            if let Some(next) = lines.get(i).copied() {
                if !next.is_empty() && !is_checking_noise(next) && !checking_row_re().is_match(next) {
                    desc = squash(&format!("{desc} {next}"));
                    i += 1;
                }
            }

            let (kind, direction) = checking_kind(&caps["type"], &desc);
            let mut txn = Transaction::new(kind, date, parse_amount(&caps["amount"]))
                .with_description(desc.as_str())
                .with_direction(direction)
                .with_balance(parse_amount(&caps["balance"]));
            if kind == TransactionKind::Check {
                if let Some(number) = desc.split(|c: char| !c.is_ascii_digit()).find(|s| s.len() >= 3) {
                    txn = txn
                        .with_check_number(number)
                        .with_description(format!("Check #{number}"));
                }
            }
            out.push(txn);
        }
    }

    out
}
