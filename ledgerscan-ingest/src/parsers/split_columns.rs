//! Broken tables where text extraction separated the columns.
//!
//! The dates and descriptions come out as one block and the amounts and
//! balances as another:
//!
//!   Date Description
//!   1 February Card payment - High St Petrol Station
//!   3 February Direct debit - Green Mobile Airtime
//!   Money out Money in Balance
//!   24.50 39,975.50
//!   20.00 39,955.50
//!
//! Rows are paired by position: the n-th description gets the n-th amount line.

use chrono::NaiveDate;
use ledgerscan_core::{Direction, Transaction, TransactionKind};
use log::debug;
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;

use crate::dates::{amount_token_re, month_from_name, parse_amount, parse_date};
use crate::parsers::mentions;

fn descriptions_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^[ \t]*Date[ \t]+Description[ \t]*$").expect("split date header regex"))
}

fn amounts_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^[ \t]*Money(?:[ \t]+out)?[ \t]+Money(?:[ \t]+in)?[ \t]+Balance[ \t]*$")
            .expect("split amounts header regex")
    })
}

fn dated_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})\s+([A-Za-z]{3,9})\s+(.+)$").expect("split dated line regex"))
}

fn is_skipped(line: &str) -> bool {
    line.is_empty()
        || line.starts_with("---")
        || line.starts_with("Page")
        || line.starts_with("Bank Statement")
        || mentions(line, &["brought forward", "carried forward", "opening balance", "closing balance"])
}

/// Date and description rows, in order.
fn description_rows(block: &str, year: i32) -> Vec<(NaiveDate, String)> {
    let mut rows = Vec::new();
    let mut last_date = None;

    for line in block.lines().map(str::trim) {
        if is_skipped(line) {
            continue;
        }
        let dated = dated_line_re().captures(line).and_then(|caps| {
            month_from_name(&caps[2])?;
            let date = parse_date(&format!("{} {}", &caps[1], &caps[2]), year)?;
            Some((date, caps[3].trim().to_string()))
        });
        match (dated, last_date) {
            (Some((date, desc)), _) => {
                last_date = Some(date);
                rows.push((date, desc));
            }
            // another transaction on the same day
            (None, Some(date)) => rows.push((date, line.to_string())),
            (None, None) => {}
        }
    }

    rows
}

/// Amount lines with at least an amount and a balance.
fn amount_rows(block: &str) -> Vec<Vec<Decimal>> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !is_skipped(line))
        .map(|line| {
            amount_token_re()
                .captures_iter(line)
                .map(|c| parse_amount(&c[1]))
                .collect::<Vec<_>>()
        })
        .filter(|amounts| amounts.len() >= 2)
        .collect()
}

fn classify(desc: &str) -> (TransactionKind, Direction) {
    if mentions(desc, &["interest"]) {
        (TransactionKind::Interest, Direction::In)
    } else if mentions(desc, &["deposit", "salary", "payroll", "biweekly", "refund", "transfer from"]) {
        (TransactionKind::Deposit, Direction::In)
    } else if mentions(desc, &["withdrawal", "cash"]) {
        (TransactionKind::AtmWithdrawal, Direction::Out)
    } else if mentions(desc, &["card payment", "purchase"]) {
        (TransactionKind::DebitCard, Direction::Out)
    } else {
        (TransactionKind::Withdrawal, Direction::Out)
    }
}

pub fn parse_split_columns_text(text: &str, year: i32) -> Vec<Transaction> {
    let Some(dates_header) = descriptions_header_re().find(text) else {
        return Vec::new();
    };
    let Some(amounts_header) = amounts_header_re().find_at(text, dates_header.end()) else {
        return Vec::new();
    };

    let descriptions = description_rows(&text[dates_header.end()..amounts_header.start()], year);
    let amounts = amount_rows(&text[amounts_header.end()..]);
    if descriptions.len() != amounts.len() {
        debug!(
            "split columns: {} description rows vs {} amount rows",
            descriptions.len(),
            amounts.len()
        );
    }

    descriptions
        .into_iter()
        .zip(amounts)
        .map(|((date, desc), amounts)| {
            let (kind, direction) = classify(&desc);
            // three columns: out, in, balance
            let amount = match (amounts.as_slice(), direction) {
                ([_, money_in, _], Direction::In) => *money_in,
                ([first, ..], _) => *first,
                ([], _) => Decimal::ZERO,
            };
            let mut txn = Transaction::new(kind, date, amount)
                .with_description(desc)
                .with_direction(direction);
            if let Some(balance) = amounts.last() {
                txn = txn.with_balance(*balance);
            }
            txn
        })
        .collect()
}
