//! Transaction-detail checking statement parser (text)
//!
//! Expected extracted-text section:
//!   TRANSACTION DETAIL
//!          DATE        DESCRIPTION                                     AMOUNT     BALANCE
//!                      Beginning Balance                                          $68.70
//!          04/22       Discover     E-Payment 8148   Web ID: ...       -15.00      53.70
//!
//! Rows print a signed amount, but the sign is not trusted: direction comes
//! from the running balance when the previous balance is known.

use ledgerscan_core::{Direction, Transaction, TransactionKind};
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;

use crate::dates::{parse_amount, parse_date};
use crate::parsers::mentions;

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"TRANSACTION\s+DETAIL").expect("transaction detail header regex"))
}

// DATE DESCRIPTION AMOUNT BALANCE
fn txn_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^\s*(?P<date>\d{2}/\d{2})\s+",
            r"(?P<desc>.+?)\s+",
            r"(?P<amount>-?\$?[\d,]+\.\d{2})\s+",
            r"(?P<balance>-?\$?[\d,]+\.\d{2})\s*$"
        ))
        .expect("transaction detail row regex")
    })
}

fn opening_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*Beginning\s+Balance\s+(?P<balance>-?\$?[\d,]+\.\d{2})\s*$")
            .expect("transaction detail opening regex")
    })
}

fn closing_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*Ending\s+Balance\b").expect("transaction detail closing regex"))
}

/// Signed running balance; a leading `-` means overdrawn.
fn signed_balance(raw: &str) -> Decimal {
    let magnitude = parse_amount(raw);
    if raw.trim_start().starts_with('-') {
        -magnitude
    } else {
        magnitude
    }
}

fn direction_from_keywords(desc: &str) -> Direction {
    if mentions(desc, &["payroll", "deposit", "credit", "interest", "refund", "zelle from", "transfer from"]) {
        Direction::In
    } else {
        Direction::Out
    }
}

fn kind_for(desc: &str, direction: Direction) -> TransactionKind {
    match direction {
        Direction::In if mentions(desc, &["interest"]) => TransactionKind::Interest,
        Direction::In if mentions(desc, &["transfer", "zelle"]) => TransactionKind::Transfer,
        Direction::In => TransactionKind::Deposit,
        Direction::Out if mentions(desc, &["atm"]) => TransactionKind::AtmWithdrawal,
        Direction::Out if mentions(desc, &["card purchase", "recurring card", "pos "]) => TransactionKind::DebitCard,
        Direction::Out if mentions(desc, &["check #", "check "]) => TransactionKind::Check,
        Direction::Out if mentions(desc, &["fee", "service charge"]) => TransactionKind::Fee,
        Direction::Out if mentions(desc, &["transfer", "zelle", "payment"]) => TransactionKind::Transfer,
        Direction::Out => TransactionKind::Withdrawal,
    }
}

/// Parse extracted statement text into transaction-detail rows.
///
/// `statement_year` is required because rows are MM/DD.
pub fn parse_chase_debit_text(text: &str, statement_year: i32) -> Vec<Transaction> {
    let mut in_section = false;
    let mut previous_balance: Option<Decimal> = None;
    let mut out = Vec::new();

    for line in text.lines() {
        if !in_section {
            if header_re().is_match(line) {
                in_section = true;
            }
            continue;
        }

        if closing_re().is_match(line) {
            break;
        }

        if let Some(caps) = opening_re().captures(line) {
            previous_balance = Some(signed_balance(&caps["balance"]));
            continue;
        }

        if let Some(caps) = txn_re().captures(line) {
            let Some(date) = parse_date(&caps["date"], statement_year) else {
                continue;
            };

            let desc = caps["desc"].trim();
            let amount = parse_amount(&caps["amount"]);
            let balance = signed_balance(&caps["balance"]);

            let direction = match previous_balance {
                Some(prev) if balance > prev => Direction::In,
                Some(prev) if balance < prev => Direction::Out,
                _ => direction_from_keywords(desc),
            };
            previous_balance = Some(balance);

            let kind = kind_for(desc, direction);
            let mut txn = Transaction::new(kind, date, amount)
                .with_description(desc)
                .with_direction(direction)
                .with_balance(balance);
            if kind == TransactionKind::Check {
                if let Some(number) = desc.split(|c: char| !c.is_ascii_digit()).find(|s| s.len() >= 3) {
                    txn = txn.with_check_number(number);
                }
            }
            out.push(txn);
        }
    }

    out
}
